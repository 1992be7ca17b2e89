use detaxizer_registry::{DefaultPolicy, ParameterValue, Registry, RegistryError};

fn write_params(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("params.json");
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

#[test]
fn loads_and_resolves_params_file() {
    let registry = Registry::embedded().unwrap();
    let (_dir, path) = write_params(
        r#"{
  "input": "latch:///detaxizer/samplesheet.csv",
  "outdir": "latch:///detaxizer/results",
  "kraken2confidence": 0.1,
  "skip_blastn": true,
  "email": null
}"#,
    );

    let supplied = registry.load_params_file(&path).expect("params file loads");
    assert_eq!(supplied.len(), 4);

    let resolved = registry.resolve(&supplied, DefaultPolicy::Omit).unwrap();
    assert_eq!(resolved.get("kraken2confidence"), Some(&ParameterValue::Float(0.1)));
    assert_eq!(resolved.get("email"), None);
    assert_eq!(resolved.get("genome"), None);
    assert!(resolved.missing_required(registry.catalog()).is_empty());
}

#[test]
fn emit_policy_forwards_catalog_defaults() {
    let registry = Registry::embedded().unwrap();
    let (_dir, path) = write_params(r#"{"input": "/data/samples.csv", "outdir": "/data/out"}"#);
    let supplied = registry.load_params_file(&path).unwrap();
    let resolved = registry.resolve(&supplied, DefaultPolicy::Emit).unwrap();
    assert_eq!(resolved.get("genome"), Some(&ParameterValue::text("GRCh38")));
    assert_eq!(resolved.get("saveReference"), Some(&ParameterValue::Boolean(true)));
    assert_eq!(resolved.get("fasta"), None);
}

#[test]
fn rejects_unknown_keys_and_non_objects() {
    let registry = Registry::embedded().unwrap();
    let (_dir, path) = write_params(r#"{"not_a_parameter": 1}"#);
    let error = registry.load_params_file(&path).unwrap_err();
    assert!(error.to_string().contains("not_a_parameter"), "error: {error}");

    let (_dir, path) = write_params("[1, 2, 3]");
    assert!(matches!(registry.load_params_file(&path), Err(RegistryError::NotAnObject { .. })));
}

#[test]
fn missing_file_reports_path() {
    let registry = Registry::embedded().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.json");
    let error = registry.load_params_file(&missing).unwrap_err();
    assert!(matches!(error, RegistryError::Io { .. }));
    assert!(error.to_string().contains("absent.json"));
}
