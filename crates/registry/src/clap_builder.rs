use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand};
use detaxizer_types::{CatalogError, ParameterCatalog, ParameterDescriptor, ParameterKind, ParameterValue};
use indexmap::IndexMap;

/// Adds one long flag per catalog parameter to a Clap command.
///
/// Flags are grouped under help headings taken from the catalog's section
/// titles: a descriptor with a `section_title` opens a new heading, and
/// descriptors without one inherit the heading of the one before. No Clap
/// defaults are registered; defaults are applied later according to the
/// caller's [`detaxizer_types::DefaultPolicy`].
///
/// Boolean parameters accept an optional value, so `--skip_blastn` and
/// `--skip_blastn true` are equivalent.
///
/// # Arguments
///
/// * `command` - The command receiving the parameter flags
/// * `catalog` - Catalog whose parameters become flags
///
/// # Examples
///
/// ```rust
/// use detaxizer_registry::{Registry, add_parameter_args};
///
/// let registry = Registry::embedded().unwrap();
/// let command = add_parameter_args(clap::Command::new("plan"), registry.catalog());
/// assert!(command.get_arguments().any(|arg| arg.get_id() == "tax2filter"));
/// ```
pub fn add_parameter_args(mut command: ClapCommand, catalog: &ParameterCatalog) -> ClapCommand {
    let mut heading: Option<&'static str> = None;
    for descriptor in catalog.iter() {
        if let Some(title) = &descriptor.section_title {
            let title: &'static str = Box::leak(title.clone().into_boxed_str());
            heading = Some(title);
        }
        command = command.arg(build_parameter_argument(descriptor, heading));
    }
    command
}

/// Collects the parameter values present in parsed Clap matches.
///
/// Only flags the user actually passed are returned, keyed by parameter name
/// in catalog order. Each raw value is parsed according to the declared kind.
pub fn values_from_matches(catalog: &ParameterCatalog, matches: &ArgMatches) -> Result<IndexMap<String, ParameterValue>, CatalogError> {
    let mut values = IndexMap::new();
    for descriptor in catalog.iter() {
        let Some(raw) = matches.get_one::<String>(&descriptor.name) else {
            continue;
        };
        let value = ParameterValue::parse_str(descriptor.kind, raw).map_err(|source| CatalogError::InvalidValue {
            name: descriptor.name.clone(),
            source,
        })?;
        values.insert(descriptor.name.clone(), value);
    }
    Ok(values)
}

/// Builds a single long flag for a parameter descriptor.
fn build_parameter_argument(descriptor: &ParameterDescriptor, heading: Option<&'static str>) -> Arg {
    let name: &'static str = Box::leak(descriptor.name.clone().into_boxed_str());
    let mut arg = Arg::new(name)
        .long(name)
        .action(ArgAction::Set)
        .value_name(value_name(descriptor.kind))
        .help(generate_help_text(descriptor));

    if descriptor.kind == ParameterKind::Boolean {
        arg = arg.num_args(0..=1).default_missing_value("true");
    }
    if let Some(heading) = heading {
        arg = arg.help_heading(heading);
    }
    arg
}

fn value_name(kind: ParameterKind) -> &'static str {
    match kind {
        ParameterKind::File => "FILE",
        ParameterKind::Directory => "DIR",
        ParameterKind::String => "TEXT",
        ParameterKind::Boolean => "BOOL",
        ParameterKind::Integer => "INT",
        ParameterKind::Float => "FLOAT",
    }
}

/// Generates help text for a parameter flag.
///
/// Uses the catalog description when present, falling back to the kind, and
/// appends the pipeline default and a required marker.
fn generate_help_text(descriptor: &ParameterDescriptor) -> String {
    let mut help = descriptor
        .description
        .clone()
        .unwrap_or_else(|| format!("type: {}", descriptor.kind));
    if let Some(default) = &descriptor.default {
        help.push_str(&format!(" [pipeline default: {}]", default));
    }
    if !descriptor.optional {
        help.push_str(" [required]");
    }
    help
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Registry;

    fn plan_command() -> (Registry, ClapCommand) {
        let registry = Registry::embedded().unwrap();
        let command = add_parameter_args(ClapCommand::new("plan"), registry.catalog());
        (registry, command)
    }

    #[test]
    fn parses_flags_into_typed_values() {
        let (registry, command) = plan_command();
        let matches = command
            .try_get_matches_from([
                "plan",
                "--enable_filter",
                "--tax2filter",
                "Homo",
                "--cutoff_tax2filter",
                "3",
                "--outdir",
                "latch:///results",
            ])
            .unwrap();
        let values = values_from_matches(registry.catalog(), &matches).unwrap();
        let names: Vec<_> = values.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["outdir", "enable_filter", "cutoff_tax2filter", "tax2filter"]);
        assert_eq!(values["enable_filter"], ParameterValue::Boolean(true));
        assert_eq!(values["cutoff_tax2filter"], ParameterValue::Integer(3));
        assert_eq!(values["outdir"], ParameterValue::directory("latch:///results"));
    }

    #[test]
    fn explicit_boolean_values_are_honoured() {
        let (registry, command) = plan_command();
        let matches = command.try_get_matches_from(["plan", "--saveReference", "false"]).unwrap();
        let values = values_from_matches(registry.catalog(), &matches).unwrap();
        assert_eq!(values["saveReference"], ParameterValue::Boolean(false));
    }

    #[test]
    fn mistyped_values_name_the_parameter() {
        let (registry, command) = plan_command();
        let matches = command.try_get_matches_from(["plan", "--blast_evalue", "tiny"]).unwrap();
        let error = values_from_matches(registry.catalog(), &matches).unwrap_err();
        assert!(error.to_string().contains("blast_evalue"), "error: {error}");
    }

    #[test]
    fn help_mentions_defaults_and_sections() {
        let (_, command) = plan_command();
        let arg = command.get_arguments().find(|arg| arg.get_id() == "kraken2confidence").unwrap();
        assert_eq!(arg.get_help_heading(), Some("kraken2"));
        assert!(arg.get_help().unwrap().to_string().contains("[pipeline default: 0.05]"));
    }
}
