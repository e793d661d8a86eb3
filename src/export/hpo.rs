//! Writing of per-subject HPO term JSON files.

use std::{io::Write, path::Path};

use indexmap::IndexMap;

use crate::err::Error;

use super::{is_included, write_json_pretty, write_to_path, ProvideHpoInfo};

/// Entry of the HPO file, keyed by subject ID.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HpoEntry {
    pub family_id: String,
    pub hpo_terms: Vec<String>,
}

/// Write HPO file from a `ProvideHpoInfo`.
///
/// The output looks as follows.
///
/// ```text
/// {
///     "RGP_111_3": {
///         "family_id": "RGP_111",
///         "hpo_terms": [
///             "HP:0012448",
///             "HP:0000252"
///         ]
///     }
/// }
/// ```
pub struct HpoWriter<'a, T: ProvideHpoInfo> {
    hpo_info: &'a T,
    families_to_write: Option<Vec<String>>,
}

impl<'a, T: ProvideHpoInfo> HpoWriter<'a, T> {
    /// Construct new writer; `families_to_write` of `None` means all families.
    pub fn new(hpo_info: &'a T, families_to_write: Option<Vec<String>>) -> Self {
        Self {
            hpo_info,
            families_to_write,
        }
    }

    /// Collect entries of all included subjects.
    pub fn entries(&self) -> Result<IndexMap<String, HpoEntry>, Error> {
        let mut result = IndexMap::new();
        for subject_id in self.hpo_info.get_subjects() {
            let family_id = self.hpo_info.get_family_id(&subject_id)?;
            if !is_included(self.families_to_write.as_deref(), family_id) {
                continue;
            }
            let entry = HpoEntry {
                family_id: family_id.to_string(),
                hpo_terms: self.hpo_info.get_hpo_terms_present(&subject_id)?.to_vec(),
            };
            result.insert(subject_id, entry);
        }
        Ok(result)
    }

    pub fn write_to(&self, writer: &mut dyn Write) -> Result<usize, Error> {
        let entries = self.entries()?;
        write_json_pretty(writer, &entries)?;
        Ok(entries.len())
    }

    /// Write HPO file to `path`.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        write_to_path(path, |writer| {
            let count = self.write_to(writer)?;
            tracing::debug!("wrote HPO terms of {} subjects to {:?}", count, path);
            Ok(())
        })
    }
}
