//! Command line interface for `groups assign`.

use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand_core::SeedableRng;
use thousands::Separable;

use crate::{
    common::expand_input_paths,
    seqr::{SubjectRegistry, TagRegistry},
};

use super::{load_history, load_samples, write_assignments, Group, GroupAssigner};

/// Command line arguments for `groups assign` sub command.
#[derive(Parser, Debug)]
#[command(about = "Assign families to train and holdout groups", long_about = None)]
pub struct Args {
    /// seqr individual export(s), prefix with `@` for file with line-wise paths.
    #[arg(long, required = true)]
    pub path_subjects: Vec<String>,
    /// seqr saved variant export(s), prefix with `@` for file with line-wise paths.
    #[arg(long, required = true)]
    pub path_tags: Vec<String>,
    /// Optional file with subject IDs that have samples, one per line.
    #[arg(long)]
    pub path_samples: Option<String>,
    /// Optional output of an earlier run; its groups are kept.
    #[arg(long)]
    pub path_history: Option<String>,
    /// Seed for random number generator, if any.
    #[arg(long)]
    pub rng_seed: Option<u64>,
    /// Path to output TSV file.
    #[arg(long)]
    pub path_output: PathBuf,
}

/// Main entry point for the `groups assign` command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("Starting `groups assign`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let subjects = SubjectRegistry::parse(&expand_input_paths(&args.path_subjects)?)?;
    let tags = TagRegistry::parse(&expand_input_paths(&args.path_tags)?)?;
    tracing::info!(
        "loaded {} subjects and {} tag rows",
        subjects.len().separate_with_commas(),
        tags.len().separate_with_commas()
    );
    if tags.is_empty() {
        tracing::warn!("No tag rows loaded, all families will be untagged.");
    }

    let samples = args
        .path_samples
        .as_ref()
        .map(|path| load_samples(shellexpand::tilde(path).into_owned()))
        .transpose()?;
    if let Some(samples) = &samples {
        tracing::info!("loaded {} sample IDs", samples.len().separate_with_commas());
    }
    let history = args
        .path_history
        .as_ref()
        .map(|path| load_history(shellexpand::tilde(path).into_owned()))
        .transpose()?;

    let mut rng = if let Some(rng_seed) = args.rng_seed {
        StdRng::seed_from_u64(rng_seed)
    } else {
        StdRng::from_entropy()
    };

    let assignments = GroupAssigner::default().assign(
        &subjects,
        &tags,
        samples.as_ref(),
        history.as_ref(),
        &mut rng,
    )?;
    let n_train = assignments
        .iter()
        .filter(|a| a.group == Group::Train)
        .count();
    tracing::info!(
        "{} families, {} in train and {} in holdout",
        assignments.len().separate_with_commas(),
        n_train.separate_with_commas(),
        (assignments.len() - n_train).separate_with_commas()
    );

    tracing::info!("Writing groups to {:?}", &args.path_output);
    write_assignments(&args.path_output, &assignments)?;

    Ok(())
}
