//! The nf-core/detaxizer parameter catalog.
//!
//! Declaration order here is the order of the UI form and of the generated
//! pipeline command line. Defaults mirror the pipeline's own `nextflow.config`
//! so that omitting a parameter and forwarding its default are equivalent.

use detaxizer_types::{
    CatalogError, ParameterCatalog, ParameterDescriptor as Param, ParameterKind as Kind, ParameterValue as Value, TaskResources,
    WorkflowMetadata,
};

/// Identifier of the wrapped workflow; also the log destination segment.
pub const WORKFLOW_IDENTIFIER: &str = "nf_nf_core_detaxizer";

/// Default kraken2 database archive.
pub const DEFAULT_KRAKEN2_DB: &str = "https://genome-idx.s3.amazonaws.com/kraken/k2_standard_08gb_20231009.tar.gz";

/// Build the detaxizer parameter catalog.
pub fn detaxizer_catalog() -> Result<ParameterCatalog, CatalogError> {
    ParameterCatalog::from_descriptors(detaxizer_descriptors())
}

/// Workflow metadata exported with the catalog.
pub fn detaxizer_metadata() -> WorkflowMetadata {
    WorkflowMetadata {
        identifier: WORKFLOW_IDENTIFIER.to_string(),
        display_name: "nf-core/detaxizer".to_string(),
        description: Some(
            "Identify and remove reads of a taxon (human by default) from short-read sequencing data, \
             classifying with kraken2 and validating with blastn."
                .to_string(),
        ),
        initialize_resources: TaskResources {
            cpu: 0.25,
            memory_gib: 0.5,
            storage_gib: 1,
        },
        runtime_resources: TaskResources {
            cpu: 4.0,
            memory_gib: 8.0,
            storage_gib: 100,
        },
    }
}

fn detaxizer_descriptors() -> Vec<Param> {
    vec![
        // Input/output options
        Param::required("input", Kind::File)
            .with_section("Input/output options")
            .with_description("Path to comma-separated file containing information about the samples in the experiment."),
        Param::required("outdir", Kind::Directory).as_output().with_description(
            "The output directory where the results will be saved. You have to use absolute paths to storage on Cloud infrastructure.",
        ),
        Param::optional("email", Kind::String).with_description("Email address for completion summary."),
        Param::optional("multiqc_title", Kind::String)
            .with_description("MultiQC report title. Printed as page header, used for filename if not otherwise specified."),
        // General workflow parameters
        Param::optional("enable_filter", Kind::Boolean)
            .with_section("General workflow parameters")
            .with_description("If the filtering step should be carried out."),
        Param::optional("filter_trimmed", Kind::Boolean).with_description("If the pre-processed reads should be used by the filter."),
        Param::optional("filter_with_kraken2", Kind::Boolean).with_description("If the output of kraken2 should be used for filtering."),
        Param::optional("skip_blastn", Kind::Boolean).with_description("If blastn should be skipped."),
        Param::optional("save_intermediates", Kind::Boolean).with_description("Save intermediates to the results folder."),
        // kraken2
        Param::optional("kraken2db", Kind::String)
            .with_default(Value::text(DEFAULT_KRAKEN2_DB))
            .with_section("kraken2")
            .with_description("The database which is used in the classification step."),
        Param::optional("kraken2confidence", Kind::Float)
            .with_default(Value::Float(0.05))
            .with_description("Confidence in the classification of a read as a certain taxon."),
        Param::optional("cutoff_tax2filter", Kind::Integer)
            .with_default(Value::Integer(2))
            .with_description(
                "If a read has less k-mers assigned to the taxon/taxa to be assessed/to be filtered the read is ignored by the pipeline.",
            ),
        Param::optional("cutoff_tax2keep", Kind::Float)
            .with_default(Value::Float(0.5))
            .with_description(
                "Ratio per read of assigned to tax2filter k-mers to k-mers assigned to any other taxon (except unclassified).",
            ),
        Param::optional("cutoff_unclassified", Kind::Float)
            .with_default(Value::Float(0.0))
            .with_description("Ratio per read of assigned to tax2filter k-mers to unclassified k-mers."),
        Param::optional("tax2filter", Kind::String)
            .with_default(Value::text("Homo"))
            .with_description("The taxon or taxonomic group to be assessed or filtered by the pipeline."),
        // blastn
        Param::optional("blast_coverage", Kind::Float)
            .with_default(Value::Float(40.0))
            .with_section("blastn")
            .with_description(
                "Coverage is the percentage of the query sequence which can be found in the alignments of the sequence match. \
                 It can be used to fine-tune the validation step.",
            ),
        Param::optional("blast_evalue", Kind::Float)
            .with_default(Value::Float(0.01))
            .with_description(
                "The expected(e)-value contains information on how many hits of the same score can be found in a database of the size \
                 used in the query by chance. The parameter can be used to fine-tune the validation step.",
            ),
        Param::optional("blast_identity", Kind::Float)
            .with_default(Value::Float(40.0))
            .with_description(
                "Identity is the percentage of the exact matches in the query and the sequence found in the database. \
                 The parameter can be used to fine-tune the validation step.",
            ),
        // fastp
        Param::optional("reads_minlength", Kind::Integer)
            .with_default(Value::Integer(0))
            .with_section("fastp options")
            .with_description("fastp option defining the minimum readlength of a read"),
        Param::optional("fastp_save_trimmed_fail", Kind::Boolean)
            .with_description("fastp option defining if the reads which failed to be trimmed should be saved"),
        Param::optional("fastp_qualified_quality", Kind::Integer)
            .with_default(Value::Integer(0))
            .with_description("fastp option to define the threshold of quality of an individual base"),
        Param::optional("fastp_cut_mean_quality", Kind::Integer)
            .with_default(Value::Integer(15))
            .with_description("fastp option to define the mean quality for trimming"),
        Param::optional("save_clipped_reads", Kind::Boolean)
            .with_description("fastp option to define if the clipped reads should be saved"),
        // Reference genome options
        Param::optional("genome", Kind::String)
            .with_default(Value::text("GRCh38"))
            .with_section("Reference genome options")
            .with_description("Name of iGenomes reference."),
        Param::optional("fasta", Kind::File).with_description("Path to FASTA genome file."),
        Param::optional("saveReference", Kind::Boolean).with_default(Value::Boolean(true)),
        Param::optional("igenomes_base", Kind::Directory).with_description("Directory / URL base for iGenomes references."),
        // Generic options
        Param::optional("multiqc_methods_description", Kind::String)
            .with_section("Generic options")
            .with_description("Custom MultiQC yaml file containing HTML including a methods description."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_builds_with_unique_names() {
        let catalog = detaxizer_catalog().expect("catalog has unique names");
        assert_eq!(catalog.len(), 28);
        assert_eq!(catalog.names().next(), Some("input"));
        assert_eq!(catalog.names().last(), Some("multiqc_methods_description"));
    }

    #[test]
    fn defaults_match_declared_kinds() {
        let catalog = detaxizer_catalog().unwrap();
        for descriptor in catalog.iter() {
            if let Some(default) = &descriptor.default {
                assert_eq!(default.kind(), descriptor.kind, "default of '{}' has the wrong kind", descriptor.name);
                assert!(descriptor.optional, "'{}' has a default but is required", descriptor.name);
            }
        }
    }

    #[test]
    fn only_input_and_outdir_are_required() {
        let catalog = detaxizer_catalog().unwrap();
        let required: Vec<_> = catalog.iter().filter(|d| !d.optional).map(|d| d.name.as_str()).collect();
        assert_eq!(required, vec!["input", "outdir"]);
        assert!(catalog.get("outdir").unwrap().output);
    }
}
