//! Building a history file from the pedigree of an earlier data release.
//!
//! All families of the pedigree file are put into one group, each with its
//! highest-precedence tag.  The result can be passed to `groups assign` so
//! that families from the earlier release keep their group.

use std::path::PathBuf;

use clap::Parser;
use itertools::Itertools;
use thousands::Separable;

use crate::{
    common::{expand_input_paths, UNTAGGED},
    export::pedigree::read_pedigree,
    seqr::TagRegistry,
};

use super::{write_assignments, AssignerConfig, Assignment, Group};

/// Command line arguments for `groups history` sub command.
#[derive(Parser, Debug)]
#[command(about = "Build group history from an earlier pedigree file", long_about = None)]
pub struct Args {
    /// Pedigree file of the earlier release.
    #[arg(long)]
    pub path_pedigree: String,
    /// seqr saved variant export(s), prefix with `@` for file with line-wise paths.
    #[arg(long, required = true)]
    pub path_tags: Vec<String>,
    /// Group to put the families into.
    #[arg(long, value_enum, default_value_t = Group::Train)]
    pub group: Group,
    /// Path to output TSV file.
    #[arg(long)]
    pub path_output: PathBuf,
}

/// Assign each family in `family_ids` to `group`, tagged by `tags`.
pub fn history_assignments(
    family_ids: &[String],
    tags: &TagRegistry,
    group: Group,
    config: &AssignerConfig,
) -> Vec<Assignment> {
    family_ids
        .iter()
        .map(|family_id| Assignment {
            family_id: family_id.clone(),
            group,
            tag: tags
                .highest_precedence_tag(family_id, &config.tags_of_interest)
                .unwrap_or(UNTAGGED)
                .to_string(),
        })
        .collect()
}

/// Main entry point for the `groups history` command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("Starting `groups history`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let pedigree = read_pedigree(shellexpand::tilde(&args.path_pedigree).into_owned())?;
    let family_ids: Vec<String> = pedigree
        .into_iter()
        .map(|record| record.family_id)
        .unique()
        .collect();
    tracing::info!(
        "loaded {} families from pedigree",
        family_ids.len().separate_with_commas()
    );
    let tags = TagRegistry::parse(&expand_input_paths(&args.path_tags)?)?;

    let assignments =
        history_assignments(&family_ids, &tags, args.group, &AssignerConfig::default());
    tracing::info!("Writing history to {:?}", &args.path_output);
    write_assignments(&args.path_output, &assignments)?;

    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use temp_testdir::TempDir;

    use super::{history_assignments, run, Args};
    use crate::{
        common::Args as CommonArgs,
        groups::{load_history, AssignerConfig, Group},
        seqr::TagRegistry,
    };

    #[test]
    fn history_assignments_tags() -> Result<(), anyhow::Error> {
        let tags = TagRegistry::parse(&["tests/seqr/valid_tags.tsv"])?;
        let families = vec![
            String::from("multi_both"),
            String::from("disinteresting"),
            String::from("unknown"),
        ];

        let assignments =
            history_assignments(&families, &tags, Group::Holdout, &AssignerConfig::default());

        assert_eq!(
            assignments
                .iter()
                .map(|a| (a.family_id.as_str(), a.group, a.tag.as_str()))
                .collect::<Vec<_>>(),
            vec![
                ("multi_both", Group::Holdout, "Known gene for phenotype"),
                ("disinteresting", Group::Holdout, "untagged"),
                ("unknown", Group::Holdout, "untagged"),
            ]
        );

        Ok(())
    }

    #[test]
    fn run_smoke() -> Result<(), anyhow::Error> {
        let tmp_dir = TempDir::default();
        let args = Args {
            path_pedigree: String::from("tests/export/pedigree.fam"),
            path_tags: vec![String::from("tests/groups/tags.tsv")],
            group: Group::Train,
            path_output: tmp_dir.join("history.tsv"),
        };

        run(&CommonArgs::default(), &args)?;

        assert_eq!(
            std::fs::read_to_string(tmp_dir.join("history.tsv"))?,
            "family_id\tgroup\ttag\n\
             RGP_123\ttrain\tKnown gene for phenotype\n\
             RGP_321\ttrain\tuntagged\n"
        );
        let history = load_history(tmp_dir.join("history.tsv"))?;
        assert_eq!(history["RGP_321"].group, Some(Group::Train));

        Ok(())
    }
}
