//! Common functionality.

use std::path::Path;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

use crate::err::Error;

pub mod io;

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Verbosity::new(0, 0),
        }
    }
}

/// Clinical tags used for stratifying families, highest precedence first.
pub const TAGS_OF_INTEREST: &[&str] = &[
    "Known gene for phenotype",
    "Tier 1 - Novel gene and phenotype",
    "Tier 1 - Novel gene for known phenotype",
    "Tier 1 - Phenotype expansion",
    "Tier 1 - Novel mode of inheritance",
    "Tier 1 - Known gene, new phenotype",
    "Tier 2 - Novel gene and phenotype",
    "Tier 2 - Novel gene for known phenotype",
    "Tier 2 - Phenotype expansion",
    "Tier 2 - Phenotype not delineated",
    "Tier 2 - Known gene, new phenotype",
];

/// Tag value used for families without any tag of interest.
pub const UNTAGGED: &str = "untagged";

/// Fraction of each tag group assigned to train.
///
/// Must stay fixed so that successive runs remain comparable.
pub const PROP_TRAIN: f64 = 0.5;

/// Create final list of input paths.
///
/// A leading `~` is expanded and paths prefixed with `@` name a file that
/// lists one path per line.
pub fn expand_input_paths(paths: &[String]) -> Result<Vec<String>, Error> {
    let mut result = Vec::new();
    for path in paths {
        if let Some(list_path) = path.strip_prefix('@') {
            let list_path = shellexpand::tilde(list_path).into_owned();
            let lines = io::read_lines(&list_path).map_err(|e| Error::io(&list_path, e))?;
            for line in lines {
                let line = line.trim();
                if !line.is_empty() {
                    result.push(shellexpand::tilde(line).into_owned());
                }
            }
        } else {
            result.push(shellexpand::tilde(path).into_owned());
        }
    }
    tracing::debug!(
        "final input file list is (#: {}): {:?}",
        result.len(),
        &result
    );
    Ok(result)
}

/// Return the position of each of `required` in `headers`.
///
/// # Errors
///
/// `Error::MissingColumn` naming the first absent column.
pub fn column_indices<P: AsRef<Path>>(
    path: P,
    headers: &csv::StringRecord,
    required: &[&str],
) -> Result<Vec<usize>, Error> {
    required
        .iter()
        .map(|column| {
            headers
                .iter()
                .position(|header| header == *column)
                .ok_or_else(|| Error::MissingColumn {
                    path: path.as_ref().to_path_buf(),
                    column: column.to_string(),
                })
        })
        .collect()
}

/// Return value of the field at `idx`, `None` if the field is absent or blank.
pub fn non_blank(record: &csv::StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).filter(|value| !value.is_empty())
}
