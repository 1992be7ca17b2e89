use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use detaxizer_api::{
    ArtifactStore, DispatcherClient, EnvExecutionName, HttpArtifactStore, LocalArtifactStore, StorageProvisioner,
};
use detaxizer_engine::{LaunchError, LaunchSettings, LogUploadStatus, Orchestrator, RunInvocation};
use detaxizer_registry::{DefaultPolicy, Registry, ResolvedParameters, add_parameter_args, values_from_matches};
use detaxizer_util::expand_tilde;
use indexmap::IndexMap;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Volume name shown by `plan`, which never provisions.
const PLAN_PVC_PLACEHOLDER: &str = "<provisioned-volume>";

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(error) = run_cli() {
        let code = error.downcast_ref::<LaunchError>().map_or(1, LaunchError::exit_code);
        eprintln!("Error: {error:#}");
        std::process::exit(code);
    }
}

fn init_tracing() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Filter from `RUST_LOG` directives, `info` when unset or unparsable.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn run_cli() -> Result<()> {
    let registry = Registry::embedded().context("embedded parameter catalog is invalid")?;
    let matches = build_cli(&registry).get_matches();
    dispatch(&registry, &matches)
}

fn dispatch(registry: &Registry, matches: &ArgMatches) -> Result<()> {
    let (name, sub) = matches.subcommand().context("expected a subcommand; see --help")?;
    match name {
        "params" => print_params(registry, sub),
        "plan" => print_plan(registry, &load_settings(matches, sub)?, sub),
        "provision" => provision(&load_settings(matches, sub)?),
        "run" => launch(registry, &load_settings(matches, sub)?, sub),
        other => anyhow::bail!("unknown subcommand: {other}"),
    }
}

fn load_settings(root: &ArgMatches, sub: &ArgMatches) -> Result<LaunchSettings, LaunchError> {
    let settings_path = sub
        .get_one::<String>("settings")
        .or_else(|| root.get_one::<String>("settings"))
        .map(|path| expand_tilde(path));
    LaunchSettings::load(settings_path.as_deref()).map_err(LaunchError::invalid_input)
}

fn build_cli(registry: &Registry) -> Command {
    let catalog = registry.catalog();
    Command::new("detaxizer")
        .about("Launch the nf-core/detaxizer pipeline on the managed platform")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg(
            Arg::new("settings")
                .long("settings")
                .global(true)
                .action(ArgAction::Set)
                .value_name("FILE")
                .help("JSON launch settings file"),
        )
        .subcommand(
            Command::new("params")
                .about("Print the parameter catalog and workflow metadata as JSON")
                .arg(Arg::new("pretty").long("pretty").action(ArgAction::SetTrue).help("Pretty-print the JSON")),
        )
        .subcommand(
            with_input_args(add_parameter_args(
                Command::new("plan").about("Show the pipeline command line and environment without running anything"),
                catalog,
            ))
            .arg(
                Arg::new("pvc-name")
                    .long("pvc-name")
                    .action(ArgAction::Set)
                    .value_name("NAME")
                    .help("Volume name to show in the environment overlay"),
            ),
        )
        .subcommand(Command::new("provision").about("Provision the shared storage volume and print its name"))
        .subcommand(with_input_args(add_parameter_args(
            Command::new("run").about("Provision storage, prepare the working directory, and run the pipeline"),
            catalog,
        )))
}

fn with_input_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("params-file")
                .long("params-file")
                .action(ArgAction::Set)
                .value_name("FILE")
                .help_heading("Launcher options")
                .help("JSON object of parameter values; command-line flags take precedence"),
        )
        .arg(
            Arg::new("emit-defaults")
                .long("emit-defaults")
                .action(ArgAction::SetTrue)
                .help_heading("Launcher options")
                .help("Pass catalog defaults to the pipeline as explicit flags"),
        )
}

/// Merge the params file and command-line flags, then resolve against the
/// catalog and check required parameters.
fn collect_parameters(registry: &Registry, matches: &ArgMatches) -> Result<ResolvedParameters, LaunchError> {
    let mut supplied = match matches.get_one::<String>("params-file") {
        Some(path) => registry.load_params_file(&expand_tilde(path)).map_err(LaunchError::invalid_input)?,
        None => IndexMap::new(),
    };
    supplied.extend(values_from_matches(registry.catalog(), matches).map_err(LaunchError::invalid_input)?);

    let policy = if matches.get_flag("emit-defaults") {
        DefaultPolicy::Emit
    } else {
        DefaultPolicy::Omit
    };
    let resolved = registry.resolve(&supplied, policy).map_err(LaunchError::invalid_input)?;

    let missing = resolved.missing_required(registry.catalog());
    if !missing.is_empty() {
        return Err(LaunchError::configuration(format!(
            "missing required parameters: {}",
            missing.join(", ")
        )));
    }
    Ok(resolved)
}

fn print_params(registry: &Registry, matches: &ArgMatches) -> Result<()> {
    let export = registry.export_json();
    let rendered = if matches.get_flag("pretty") {
        serde_json::to_string_pretty(&export)?
    } else {
        serde_json::to_string(&export)?
    };
    println!("{rendered}");
    Ok(())
}

fn print_plan(registry: &Registry, settings: &LaunchSettings, matches: &ArgMatches) -> Result<()> {
    let parameters = collect_parameters(registry, matches)?;
    let pvc_name = matches
        .get_one::<String>("pvc-name")
        .map(String::as_str)
        .unwrap_or(PLAN_PVC_PLACEHOLDER);

    println!("{}", serde_json::to_string_pretty(&plan_json(registry, settings, pvc_name, parameters))?);
    Ok(())
}

/// JSON document printed by `plan`.
fn plan_json(registry: &Registry, settings: &LaunchSettings, pvc_name: &str, parameters: ResolvedParameters) -> serde_json::Value {
    let invocation = RunInvocation::new(settings, registry.catalog(), pvc_name, parameters);
    serde_json::json!({
        "command_line": invocation.command_line(),
        "rendered": invocation.display_command(),
        "working_directory": invocation.working_directory,
        "environment": invocation.environment,
        "parameters": invocation.parameters,
    })
}

fn provision(settings: &LaunchSettings) -> Result<()> {
    let dispatcher = DispatcherClient::new(&settings.dispatcher_url).map_err(LaunchError::from_provisioning)?;
    info!(storage_gib = settings.storage_gib, "provisioning shared storage");
    let pvc_name = dispatcher
        .provision(settings.storage_gib)
        .map_err(LaunchError::from_provisioning)?;
    println!("{pvc_name}");
    Ok(())
}

fn launch(registry: &Registry, settings: &LaunchSettings, matches: &ArgMatches) -> Result<()> {
    let parameters = collect_parameters(registry, matches)?;
    let dispatcher = DispatcherClient::new(&settings.dispatcher_url).map_err(LaunchError::from_provisioning)?;
    let store = artifact_store(settings)?;
    let names = EnvExecutionName::default();
    let orchestrator = Orchestrator::new(settings, registry.catalog(), &dispatcher, store.as_ref(), &names);

    let report = orchestrator.run(parameters);
    match &report.log_upload {
        Some(Ok(LogUploadStatus::Uploaded { remote })) => info!(%remote, "pipeline log uploaded"),
        Some(Ok(LogUploadStatus::SkippedNoExecutionName)) => warn!("pipeline log not uploaded: execution name unavailable"),
        Some(Ok(LogUploadStatus::MissingLogFile)) | Some(Err(_)) | None => {}
    }
    report.into_outcome()?;
    Ok(())
}

/// HTTP store when an endpoint is configured, otherwise a local directory.
fn artifact_store(settings: &LaunchSettings) -> Result<Box<dyn ArtifactStore>> {
    if let Some(endpoint) = &settings.artifact_endpoint {
        let store = HttpArtifactStore::new(endpoint).map_err(LaunchError::invalid_input)?;
        return Ok(Box::new(store));
    }

    let root = settings
        .artifact_dir
        .clone()
        .or_else(|| dirs_next::data_local_dir().map(|dir| dir.join("detaxizer").join("artifacts")))
        .unwrap_or_else(|| PathBuf::from("artifacts"));
    info!(root = %root.display(), "storing artifacts locally");
    Ok(Box::new(LocalArtifactStore::new(root)))
}
