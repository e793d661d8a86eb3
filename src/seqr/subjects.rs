//! Registry of subjects parsed from seqr individual exports.

use std::path::Path;

use indexmap::IndexMap;
use itertools::Itertools;
use thousands::Separable;

use crate::{
    common::{column_indices, io::open_read_maybe_gz, non_blank},
    err::Error,
};

/// Column names in the seqr individual export.
pub mod columns {
    pub const FAMILY_ID: &str = "Family ID";
    pub const INDIVIDUAL_ID: &str = "Individual ID";
    pub const PATERNAL_ID: &str = "Paternal ID";
    pub const MATERNAL_ID: &str = "Maternal ID";
    pub const SEX: &str = "Sex";
    pub const AFFECTED_STATUS: &str = "Affected Status";
    pub const DATA_LOADED: &str = "Individual Data Loaded";
    pub const HPO_TERMS_PRESENT: &str = "HPO Terms (present)";

    /// All columns that must be present, in the order used for lookup.
    pub const REQUIRED: &[&str] = &[
        FAMILY_ID,
        INDIVIDUAL_ID,
        PATERNAL_ID,
        MATERNAL_ID,
        SEX,
        AFFECTED_STATUS,
        DATA_LOADED,
        HPO_TERMS_PRESENT,
    ];
}

/// Sex of a subject.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
)]
pub enum Sex {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Sex {
    /// Interpret a seqr `Sex` value; everything but `Male` and `Female` is unknown.
    pub fn from_seqr(value: &str) -> Self {
        match value {
            "Male" => Sex::Male,
            "Female" => Sex::Female,
            _ => Sex::Unknown,
        }
    }
}

/// One individual from the seqr export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subject {
    /// Unique subject ID.
    pub subject_id: String,
    /// Family ID.
    pub family_id: String,
    /// Paternal ID, empty if unknown.
    pub paternal_id: String,
    /// Maternal ID, empty if unknown.
    pub maternal_id: String,
    /// Sex.
    pub sex: Sex,
    /// Whether the affected status is `Affected`.
    pub affected: bool,
    /// Whether the individual data loaded flag is `Yes`.
    pub data_loaded: bool,
    /// HPO term IDs present in the subject.
    pub hpo_terms_present: Vec<String>,
}

/// Parse the `|`-delimited HPO terms column.
///
/// Each term is cut at its first `(` so that `"HP:0001250 (Seizure)"`
/// becomes `"HP:0001250"`.
pub fn parse_hpo_terms(value: Option<&str>) -> Vec<String> {
    match value {
        None => Vec::new(),
        Some(value) => value
            .split('|')
            .map(|term| term.split('(').next().unwrap_or_default().trim().to_string())
            .collect(),
    }
}

/// Subjects in input order with an index from family ID to members.
#[derive(Debug, Clone, Default)]
pub struct SubjectRegistry {
    subjects: IndexMap<String, Subject>,
    families: IndexMap<String, Vec<String>>,
}

impl SubjectRegistry {
    /// Parse one or more seqr individual exports.
    ///
    /// Rows of all files are concatenated. Duplicate subject IDs keep their
    /// first occurrence and a warning is logged.
    ///
    /// # Errors
    ///
    /// `Error::Io` if a file cannot be opened, `Error::MissingColumn` if any
    /// file lacks a required column.
    pub fn parse<P: AsRef<Path>>(paths: &[P]) -> Result<Self, Error> {
        let mut subjects = Vec::new();
        for path in paths {
            let path = path.as_ref();
            tracing::debug!("parsing subjects from {:?}", path);
            subjects.extend(Self::parse_one(path)?);
        }
        Ok(Self::from_subjects(subjects))
    }

    fn parse_one(path: &Path) -> Result<Vec<Subject>, Error> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(open_read_maybe_gz(path).map_err(|e| Error::io(path, e))?);
        let headers = reader.headers().map_err(|e| Error::csv(path, e))?.clone();
        let idx = column_indices(path, &headers, columns::REQUIRED)?;

        let mut result = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| Error::csv(path, e))?;
            let field = |i: usize| non_blank(&record, idx[i]).unwrap_or_default().to_string();
            result.push(Subject {
                family_id: field(0),
                subject_id: field(1),
                paternal_id: field(2),
                maternal_id: field(3),
                sex: Sex::from_seqr(&field(4)),
                affected: field(5) == "Affected",
                data_loaded: field(6) == "Yes",
                hpo_terms_present: parse_hpo_terms(non_blank(&record, idx[7])),
            });
        }
        Ok(result)
    }

    /// Build registry from subjects, keeping the first of duplicate IDs.
    pub fn from_subjects<I>(subjects: I) -> Self
    where
        I: IntoIterator<Item = Subject>,
    {
        let mut result = Self::default();
        let mut duplicates = 0usize;
        for subject in subjects {
            if result.subjects.contains_key(&subject.subject_id) {
                duplicates += 1;
                continue;
            }
            result
                .families
                .entry(subject.family_id.clone())
                .or_default()
                .push(subject.subject_id.clone());
            result.subjects.insert(subject.subject_id.clone(), subject);
        }
        if duplicates > 0 {
            tracing::warn!(
                "Duplicate subject IDs found in input files ({} rows). Duplicates will be removed.",
                duplicates.separate_with_commas()
            );
        }
        result
    }

    /// Return all subject IDs in input order.
    pub fn get_subjects(&self) -> Vec<String> {
        self.subjects.keys().cloned().collect()
    }

    /// Return distinct family IDs in order of first occurrence.
    pub fn get_families(&self) -> Vec<String> {
        self.subjects
            .values()
            .map(|subject| subject.family_id.clone())
            .unique()
            .collect()
    }

    /// Return subject IDs of the given family.
    pub fn get_subjects_for_family(&self, family_id: &str) -> Result<Vec<String>, Error> {
        self.families
            .get(family_id)
            .cloned()
            .ok_or_else(|| Error::FamilyNotFound(family_id.to_string()))
    }

    /// Remove one subject.
    pub fn remove_subject(&mut self, subject_id: &str) -> Result<(), Error> {
        let subject = self
            .subjects
            .shift_remove(subject_id)
            .ok_or_else(|| Error::SubjectNotFound(subject_id.to_string()))?;
        if let Some(members) = self.families.get_mut(&subject.family_id) {
            members.retain(|member| member != subject_id);
            if members.is_empty() {
                self.families.shift_remove(&subject.family_id);
            }
        }
        Ok(())
    }

    /// Remove a family and all of its subjects.
    pub fn remove_family(&mut self, family_id: &str) -> Result<(), Error> {
        let members = self
            .families
            .shift_remove(family_id)
            .ok_or_else(|| Error::FamilyNotFound(family_id.to_string()))?;
        for member in members {
            self.subjects.shift_remove(&member);
        }
        Ok(())
    }

    /// Return the full record of a subject.
    pub fn get_subject(&self, subject_id: &str) -> Result<&Subject, Error> {
        self.subjects
            .get(subject_id)
            .ok_or_else(|| Error::SubjectNotFound(subject_id.to_string()))
    }

    pub fn get_sex(&self, subject_id: &str) -> Result<Sex, Error> {
        Ok(self.get_subject(subject_id)?.sex)
    }

    pub fn get_family_id(&self, subject_id: &str) -> Result<&str, Error> {
        Ok(&self.get_subject(subject_id)?.family_id)
    }

    /// Return the paternal ID, empty if unknown.
    pub fn get_paternal_id(&self, subject_id: &str) -> Result<&str, Error> {
        Ok(&self.get_subject(subject_id)?.paternal_id)
    }

    /// Return the maternal ID, empty if unknown.
    pub fn get_maternal_id(&self, subject_id: &str) -> Result<&str, Error> {
        Ok(&self.get_subject(subject_id)?.maternal_id)
    }

    pub fn is_affected(&self, subject_id: &str) -> Result<bool, Error> {
        Ok(self.get_subject(subject_id)?.affected)
    }

    pub fn is_data_loaded(&self, subject_id: &str) -> Result<bool, Error> {
        Ok(self.get_subject(subject_id)?.data_loaded)
    }

    pub fn get_hpo_terms_present(&self, subject_id: &str) -> Result<&[String], Error> {
        Ok(&self.get_subject(subject_id)?.hpo_terms_present)
    }

    /// Number of subjects.
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}
