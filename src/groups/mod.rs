//! Assignment of families to train and holdout groups.
//!
//! Families are stratified by their highest-precedence clinical tag. Within
//! each tag, a fixed fraction of families goes to train. Families whose group
//! was fixed by an earlier run (the history) keep it; only the remaining
//! families are shuffled and split.

pub mod cli;
pub mod history;

use std::{path::Path, str::FromStr};

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use rand::seq::SliceRandom;
use thousands::Separable;

use crate::{
    common::{
        column_indices, io::open_read_maybe_gz, io::open_write_maybe_gz, io::read_lines, non_blank,
        PROP_TRAIN, TAGS_OF_INTEREST, UNTAGGED,
    },
    err::Error,
    seqr::{SubjectRegistry, TagRegistry},
};

/// The group a family is assigned to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Group {
    /// Model development.
    Train,
    /// Held-out evaluation.
    Holdout,
}

/// One row of the group assignment table.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Assignment {
    pub family_id: String,
    pub group: Group,
    /// Tag used for stratification, `untagged` if none applies.
    pub tag: String,
}

/// Prior group and tag of a family, blank values do not overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryEntry {
    pub group: Option<Group>,
    pub tag: Option<String>,
}

/// Assignments of an earlier run, keyed by family ID.
pub type History = IndexMap<String, HistoryEntry>;

/// Configuration of the `GroupAssigner`.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignerConfig {
    /// Tags to stratify by, highest precedence first.
    pub tags_of_interest: Vec<String>,
    /// Fraction of each tag group to assign to train.
    pub prop_train: f64,
}

impl Default for AssignerConfig {
    fn default() -> Self {
        Self {
            tags_of_interest: TAGS_OF_INTEREST.iter().map(|s| s.to_string()).collect(),
            prop_train: PROP_TRAIN,
        }
    }
}

/// Restrict `subjects` in place to subjects and families eligible for grouping.
///
/// 1. subjects without loaded data are removed,
/// 2. families without any affected subject left are removed,
/// 3. if `samples` is given, families with any subject missing from it are removed.
pub fn filter_subjects(
    subjects: &mut SubjectRegistry,
    samples: Option<&IndexSet<String>>,
) -> Result<(), Error> {
    for subject_id in subjects.get_subjects() {
        if !subjects.is_data_loaded(&subject_id)? {
            subjects.remove_subject(&subject_id)?;
        }
    }
    tracing::debug!(
        "{} subjects with data loaded",
        subjects.len().separate_with_commas()
    );

    for family_id in subjects.get_families() {
        let mut any_affected = false;
        for subject_id in subjects.get_subjects_for_family(&family_id)? {
            any_affected = any_affected || subjects.is_affected(&subject_id)?;
        }
        if !any_affected {
            tracing::debug!("removing family {} without affected subject", &family_id);
            subjects.remove_family(&family_id)?;
        }
    }

    if let Some(samples) = samples {
        for family_id in subjects.get_families() {
            let members = subjects.get_subjects_for_family(&family_id)?;
            if let Some(missing) = members.iter().find(|s| !samples.contains(*s)) {
                tracing::debug!(
                    "removing family {}, subject {} has no sample",
                    &family_id,
                    missing
                );
                subjects.remove_family(&family_id)?;
            }
        }
    }

    tracing::debug!(
        "{} eligible families",
        subjects.get_families().len().separate_with_commas()
    );
    Ok(())
}

/// Group assignment state of one family while partitioning.
#[derive(Debug)]
struct Row {
    group: Option<Group>,
    tag: String,
}

/// Balanced, history-consistent assignment of families to groups.
#[derive(Debug, Clone, Default)]
pub struct GroupAssigner {
    config: AssignerConfig,
}

impl GroupAssigner {
    pub fn new(config: AssignerConfig) -> Self {
        Self { config }
    }

    /// Number of families with the tag to newly assign to train.
    ///
    /// The target is `floor(prop_train * total)`; families already in train
    /// count against it and the result never exceeds `unassigned`.
    pub fn train_quota(&self, total: usize, already_train: usize, unassigned: usize) -> usize {
        let target = (total as f64 * self.config.prop_train).floor() as usize;
        target.saturating_sub(already_train).min(unassigned)
    }

    /// Return the families of `subjects` that are eligible for assignment.
    pub fn eligible_families(
        &self,
        subjects: &SubjectRegistry,
        samples: Option<&IndexSet<String>>,
    ) -> Result<Vec<String>, Error> {
        let mut subjects = subjects.clone();
        filter_subjects(&mut subjects, samples)?;
        Ok(subjects.get_families())
    }

    /// Compute group assignments for all eligible families.
    ///
    /// The result has one row per eligible family in order of first
    /// occurrence. Families of `history` that are not eligible are dropped.
    pub fn assign<R>(
        &self,
        subjects: &SubjectRegistry,
        tags: &TagRegistry,
        samples: Option<&IndexSet<String>>,
        history: Option<&History>,
        rng: &mut R,
    ) -> Result<Vec<Assignment>, Error>
    where
        R: rand::Rng + ?Sized,
    {
        let mut rows: IndexMap<String, Row> = self
            .eligible_families(subjects, samples)?
            .into_iter()
            .map(|family_id| {
                let tag = tags
                    .highest_precedence_tag(&family_id, &self.config.tags_of_interest)
                    .unwrap_or(UNTAGGED)
                    .to_string();
                (family_id, Row { group: None, tag })
            })
            .collect();

        if let Some(history) = history {
            let mut loaded = 0usize;
            for (family_id, entry) in history {
                if let Some(row) = rows.get_mut(family_id) {
                    if let Some(group) = entry.group {
                        row.group = Some(group);
                    }
                    if let Some(tag) = &entry.tag {
                        row.tag = tag.clone();
                    }
                    loaded += 1;
                }
            }
            tracing::info!(
                "Loaded {} of {} assignments from history",
                loaded.separate_with_commas(),
                history.len().separate_with_commas()
            );
        }

        let tag_values: Vec<String> = rows.values().map(|row| row.tag.clone()).unique().collect();
        let mut assigned = 0usize;
        for tag in &tag_values {
            let mut unassigned: Vec<usize> = rows
                .values()
                .enumerate()
                .filter(|(_, row)| &row.tag == tag && row.group.is_none())
                .map(|(i, _)| i)
                .collect();
            unassigned.shuffle(rng);

            let total = rows.values().filter(|row| &row.tag == tag).count();
            let already_train = rows
                .values()
                .filter(|row| &row.tag == tag && row.group == Some(Group::Train))
                .count();
            let n_train = self.train_quota(total, already_train, unassigned.len());

            for (k, i) in unassigned.iter().enumerate() {
                if let Some((_, row)) = rows.get_index_mut(*i) {
                    row.group = Some(if k < n_train {
                        Group::Train
                    } else {
                        Group::Holdout
                    });
                }
            }

            tracing::info!(
                "Assigning groups for tag {:?}: {} newly assigned ({} to train)",
                tag,
                unassigned.len().separate_with_commas(),
                n_train.separate_with_commas()
            );
            assigned += unassigned.len();
        }
        tracing::info!("Assigned {} families to groups.", assigned.separate_with_commas());

        Ok(rows
            .into_iter()
            .map(|(family_id, row)| Assignment {
                family_id,
                // every row got a group in the loop above
                group: row.group.unwrap_or(Group::Holdout),
                tag: row.tag,
            })
            .collect())
    }
}

/// Load list of subject IDs with available samples, one per line without header.
pub fn load_samples<P: AsRef<Path>>(path: P) -> Result<IndexSet<String>, Error> {
    let path = path.as_ref();
    Ok(read_lines(path)
        .map_err(|e| Error::io(path, e))?
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

/// Load the output of an earlier run as history.
///
/// # Errors
///
/// `Error::MissingColumn` if `family_id` or `group` is missing,
/// `Error::InvalidValue` for unknown group values.
pub fn load_history<P: AsRef<Path>>(path: P) -> Result<History, Error> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(open_read_maybe_gz(path).map_err(|e| Error::io(path, e))?);
    let headers = reader.headers().map_err(|e| Error::csv(path, e))?.clone();
    let idx = column_indices(path, &headers, &["family_id", "group"])?;
    let tag_idx = headers.iter().position(|header| header == "tag");

    let mut result = History::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::csv(path, e))?;
        let Some(family_id) = non_blank(&record, idx[0]) else {
            continue;
        };
        let group = non_blank(&record, idx[1])
            .map(|value| {
                Group::from_str(value).map_err(|_| Error::InvalidValue {
                    path: path.to_path_buf(),
                    message: format!("unknown group {:?} for family {}", value, family_id),
                })
            })
            .transpose()?;
        let tag = tag_idx
            .and_then(|i| non_blank(&record, i))
            .map(String::from);
        if result
            .insert(family_id.to_string(), HistoryEntry { group, tag })
            .is_some()
        {
            tracing::warn!(
                "Family {} listed more than once in history {:?}, the last row is used.",
                family_id,
                path
            );
        }
    }
    Ok(result)
}

/// Write assignments as TSV with header `family_id`, `group`, `tag`.
pub fn write_assignments<P: AsRef<Path>>(
    path: P,
    assignments: &[Assignment],
) -> Result<(), Error> {
    let path = path.as_ref();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_writer(open_write_maybe_gz(path).map_err(|e| Error::io(path, e))?);
    for assignment in assignments {
        writer
            .serialize(assignment)
            .map_err(|e| Error::csv(path, e))?;
    }
    writer
        .into_inner()
        .map_err(|e| Error::io(path, e.into_error()))?
        .finish()
        .map_err(|e| Error::io(path, e))
}
