//! Writers for pedigree, HPO, and external label files.
//!
//! Writers only see registries through the narrow `Provide*Info` traits
//! defined here.

pub mod cli;
pub mod hpo;
pub mod labels;
pub mod pedigree;

use std::{io::Write, path::Path};

use crate::{
    common::io::open_write_maybe_gz,
    err::Error,
    seqr::{Sex, SubjectRegistry, TagRegistry},
};

/// Information required for writing pedigree files.
pub trait ProvidePedigreeInfo {
    fn get_subjects(&self) -> Vec<String>;
    fn get_family_id(&self, subject_id: &str) -> Result<&str, Error>;
    fn get_paternal_id(&self, subject_id: &str) -> Result<&str, Error>;
    fn get_maternal_id(&self, subject_id: &str) -> Result<&str, Error>;
    fn get_sex(&self, subject_id: &str) -> Result<Sex, Error>;
    fn is_affected(&self, subject_id: &str) -> Result<bool, Error>;
}

/// Information required for writing HPO files.
pub trait ProvideHpoInfo {
    fn get_subjects(&self) -> Vec<String>;
    fn get_family_id(&self, subject_id: &str) -> Result<&str, Error>;
    fn get_hpo_terms_present(&self, subject_id: &str) -> Result<&[String], Error>;
}

/// Information required for writing external label files.
pub trait ProvideTagInfo {
    fn get_families(&self) -> Vec<String>;
    fn get_variants_for_family(&self, family_id: &str) -> Vec<String>;
    fn get_tags_for_family_and_variant(
        &self,
        family_id: &str,
        variant_id: &str,
    ) -> Result<Vec<String>, Error>;
}

impl ProvidePedigreeInfo for SubjectRegistry {
    fn get_subjects(&self) -> Vec<String> {
        SubjectRegistry::get_subjects(self)
    }

    fn get_family_id(&self, subject_id: &str) -> Result<&str, Error> {
        SubjectRegistry::get_family_id(self, subject_id)
    }

    fn get_paternal_id(&self, subject_id: &str) -> Result<&str, Error> {
        SubjectRegistry::get_paternal_id(self, subject_id)
    }

    fn get_maternal_id(&self, subject_id: &str) -> Result<&str, Error> {
        SubjectRegistry::get_maternal_id(self, subject_id)
    }

    fn get_sex(&self, subject_id: &str) -> Result<Sex, Error> {
        SubjectRegistry::get_sex(self, subject_id)
    }

    fn is_affected(&self, subject_id: &str) -> Result<bool, Error> {
        SubjectRegistry::is_affected(self, subject_id)
    }
}

impl ProvideHpoInfo for SubjectRegistry {
    fn get_subjects(&self) -> Vec<String> {
        SubjectRegistry::get_subjects(self)
    }

    fn get_family_id(&self, subject_id: &str) -> Result<&str, Error> {
        SubjectRegistry::get_family_id(self, subject_id)
    }

    fn get_hpo_terms_present(&self, subject_id: &str) -> Result<&[String], Error> {
        SubjectRegistry::get_hpo_terms_present(self, subject_id)
    }
}

impl ProvideTagInfo for TagRegistry {
    fn get_families(&self) -> Vec<String> {
        TagRegistry::get_families(self)
    }

    fn get_variants_for_family(&self, family_id: &str) -> Vec<String> {
        TagRegistry::get_variants_for_family(self, family_id)
    }

    fn get_tags_for_family_and_variant(
        &self,
        family_id: &str,
        variant_id: &str,
    ) -> Result<Vec<String>, Error> {
        TagRegistry::get_tags_for_family_and_variant(self, family_id, variant_id)
    }
}

/// Whether `family_id` passes the optional family restriction.
fn is_included(families_to_write: Option<&[String]>, family_id: &str) -> bool {
    families_to_write.map_or(true, |families| families.iter().any(|f| f == family_id))
}

/// Create `path` and hand a writer to `f`, finishing the file afterwards.
fn write_to_path<P, F>(path: P, f: F) -> Result<(), Error>
where
    P: AsRef<Path>,
    F: FnOnce(&mut dyn Write) -> Result<(), Error>,
{
    let path = path.as_ref();
    let mut writer = open_write_maybe_gz(path).map_err(|e| Error::io(path, e))?;
    f(&mut writer)?;
    writer.finish().map_err(|e| Error::io(path, e))
}

/// Serialize `value` as JSON with four spaces of indentation.
fn write_json_pretty<T: serde::Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), Error> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(writer, formatter);
    value.serialize(&mut ser)?;
    Ok(())
}
