//! Command line interface for `export pedigree` and `export labels`.

use std::path::PathBuf;

use clap::Parser;
use thousands::Separable;

use crate::{
    common::expand_input_paths,
    seqr::{SubjectRegistry, TagRegistry},
};

use super::{hpo::HpoWriter, labels::ExternalLabelWriter, pedigree::PedigreeWriter};

/// File name of the pedigree file in the output directory.
pub const PEDIGREE_FILE: &str = "pedigree.fam";
/// File name of the HPO file in the output directory.
pub const HPO_FILE: &str = "hpo.json";

/// Command line arguments for `export pedigree` sub command.
#[derive(Parser, Debug)]
#[command(about = "Write pedigree and HPO files from seqr individual exports", long_about = None)]
pub struct PedigreeArgs {
    /// seqr individual export(s), prefix with `@` for file with line-wise paths.
    #[arg(long, required = true)]
    pub path_subjects: Vec<String>,
    /// Output directory, created if missing.
    #[arg(long)]
    pub path_output_dir: PathBuf,
    /// Restrict output to the given families.
    #[arg(long)]
    pub family: Option<Vec<String>>,
}

/// Main entry point for the `export pedigree` command.
pub fn run_pedigree(
    common_args: &crate::common::Args,
    args: &PedigreeArgs,
) -> Result<(), anyhow::Error> {
    tracing::info!("Starting `export pedigree`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    if !args.path_output_dir.exists() {
        tracing::warn!(
            "Output directory {:?} does not exist, creating it.",
            &args.path_output_dir
        );
        std::fs::create_dir_all(&args.path_output_dir)?;
    }

    let subjects = SubjectRegistry::parse(&expand_input_paths(&args.path_subjects)?)?;
    tracing::info!(
        "loaded {} subjects from {} families",
        subjects.len().separate_with_commas(),
        subjects.get_families().len().separate_with_commas()
    );

    let pedigree_path = args.path_output_dir.join(PEDIGREE_FILE);
    tracing::info!("Writing pedigree file to {:?}", &pedigree_path);
    PedigreeWriter::new(&subjects, args.family.clone()).write(&pedigree_path)?;

    let hpo_path = args.path_output_dir.join(HPO_FILE);
    tracing::info!("Writing HPO file to {:?}", &hpo_path);
    HpoWriter::new(&subjects, args.family.clone()).write(&hpo_path)?;

    Ok(())
}

/// Command line arguments for `export labels` sub command.
#[derive(Parser, Debug)]
#[command(about = "Write external label file from seqr tag exports", long_about = None)]
pub struct LabelsArgs {
    /// seqr saved variant export(s), prefix with `@` for file with line-wise paths.
    #[arg(long, required = true)]
    pub path_tags: Vec<String>,
    /// Path to output JSON file.
    #[arg(long)]
    pub path_output: PathBuf,
    /// Restrict output to the given families.
    #[arg(long)]
    pub family: Option<Vec<String>>,
    /// Restrict output to the given tags.
    #[arg(long)]
    pub tag: Option<Vec<String>>,
}

/// Main entry point for the `export labels` command.
pub fn run_labels(
    common_args: &crate::common::Args,
    args: &LabelsArgs,
) -> Result<(), anyhow::Error> {
    tracing::info!("Starting `export labels`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let tags = TagRegistry::parse(&expand_input_paths(&args.path_tags)?)?;
    tracing::info!(
        "loaded {} tag rows for {} families",
        tags.len().separate_with_commas(),
        tags.get_families().len().separate_with_commas()
    );

    tracing::info!("Writing external label file to {:?}", &args.path_output);
    ExternalLabelWriter::new(&tags, args.family.clone(), args.tag.clone())
        .write(&args.path_output)?;

    Ok(())
}
