//! Translation of resolved parameters into pipeline command-line flags.

use detaxizer_types::{ParameterCatalog, ParameterValue, ResolvedParameters};

/// Build the parameter flags for a run, in catalog declaration order.
///
/// | value | tokens |
/// |---|---|
/// | absent | none |
/// | `Boolean(true)` | `--name` |
/// | `Boolean(false)` | none |
/// | anything else | `--name`, value |
///
/// The output depends only on its inputs, so repeated calls produce identical
/// token sequences.
pub fn build_parameter_flags(catalog: &ParameterCatalog, resolved: &ResolvedParameters) -> Vec<String> {
    let mut flags = Vec::new();
    for descriptor in catalog.iter() {
        let Some(value) = resolved.get(&descriptor.name) else {
            continue;
        };
        match value {
            ParameterValue::Boolean(true) => flags.push(descriptor.flag()),
            ParameterValue::Boolean(false) => {}
            ParameterValue::File(_)
            | ParameterValue::Directory(_)
            | ParameterValue::String(_)
            | ParameterValue::Integer(_)
            | ParameterValue::Float(_) => {
                flags.push(descriptor.flag());
                flags.push(value.to_string());
            }
        }
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use detaxizer_registry::{DefaultPolicy, Registry};
    use indexmap::IndexMap;

    fn resolve(pairs: &[(&str, ParameterValue)], policy: DefaultPolicy) -> (Registry, ResolvedParameters) {
        let registry = Registry::embedded().unwrap();
        let supplied: IndexMap<String, ParameterValue> = pairs.iter().map(|(name, value)| (name.to_string(), value.clone())).collect();
        let resolved = registry.resolve(&supplied, policy).unwrap();
        (registry, resolved)
    }

    #[test]
    fn filter_scenario_emits_exactly_the_supplied_flags() {
        let (registry, resolved) = resolve(
            &[
                ("enable_filter", ParameterValue::Boolean(true)),
                ("tax2filter", ParameterValue::text("Homo")),
                ("outdir", ParameterValue::directory("latch:///detaxizer/out")),
            ],
            DefaultPolicy::Omit,
        );
        let flags = build_parameter_flags(registry.catalog(), &resolved);
        assert_eq!(
            flags,
            vec!["--outdir", "latch:///detaxizer/out", "--enable_filter", "--tax2filter", "Homo"]
        );
    }

    #[test]
    fn absent_and_false_values_contribute_nothing() {
        let (registry, resolved) = resolve(&[("skip_blastn", ParameterValue::Boolean(false))], DefaultPolicy::Omit);
        assert!(build_parameter_flags(registry.catalog(), &resolved).is_empty());
    }

    #[test]
    fn numbers_use_shortest_decimal_form() {
        let (registry, resolved) = resolve(
            &[
                ("blast_coverage", ParameterValue::Float(40.0)),
                ("kraken2confidence", ParameterValue::Float(0.05)),
                ("cutoff_tax2filter", ParameterValue::Integer(-3)),
            ],
            DefaultPolicy::Omit,
        );
        let flags = build_parameter_flags(registry.catalog(), &resolved);
        assert_eq!(
            flags,
            vec!["--kraken2confidence", "0.05", "--cutoff_tax2filter", "-3", "--blast_coverage", "40"]
        );
    }

    #[test]
    fn emitted_defaults_are_deterministic_and_paired() {
        let (registry, resolved) = resolve(&[("input", ParameterValue::file("/data/samples.csv"))], DefaultPolicy::Emit);
        let first = build_parameter_flags(registry.catalog(), &resolved);
        let second = build_parameter_flags(registry.catalog(), &resolved);
        assert_eq!(first, second);

        let non_boolean_present = resolved
            .present()
            .filter(|(_, value)| !matches!(value, ParameterValue::Boolean(_)))
            .count();
        let true_booleans = resolved
            .present()
            .filter(|(_, value)| matches!(value, ParameterValue::Boolean(true)))
            .count();
        assert_eq!(first.len(), non_boolean_present * 2 + true_booleans);
        assert_eq!(&first[..2], ["--input", "/data/samples.csv"]);
        assert!(first.contains(&"--saveReference".to_string()));
    }
}
