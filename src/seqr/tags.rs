//! Registry of variant tags parsed from seqr saved variant exports.

use std::path::Path;

use indexmap::{IndexMap, IndexSet};

use crate::{
    common::{column_indices, io::open_read_maybe_gz, non_blank, TAGS_OF_INTEREST},
    err::Error,
};

/// Column names in the seqr saved variant export.
pub mod columns {
    pub const FAMILY: &str = "family";
    pub const TAGS: &str = "tags";

    /// Columns that must be present.
    pub const REQUIRED: &[&str] = &[FAMILY, TAGS];
    /// Columns making up the variant ID, joined with `-`.
    pub const VARIANT: &[&str] = &["chrom", "pos", "ref", "alt"];
}

/// Split a `|`-delimited tags value; blank values have no tags.
pub fn split_tags(value: Option<&str>) -> Vec<String> {
    match value {
        None => Vec::new(),
        Some(value) => value.split('|').map(String::from).collect(),
    }
}

/// One row of the tag export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRecord {
    /// Family ID.
    pub family_id: String,
    /// Variant ID as `chrom-pos-ref-alt`, empty if not available.
    pub variant_id: String,
    /// Tags assigned to the variant.
    pub tags: Vec<String>,
}

/// Tag records in input order with an index from family ID to row positions.
///
/// Duplicate rows are kept as they are.
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    records: Vec<TagRecord>,
    by_family: IndexMap<String, Vec<usize>>,
}

impl TagRegistry {
    /// Parse one or more seqr tag exports, concatenating their rows.
    ///
    /// # Errors
    ///
    /// `Error::Io` if a file cannot be opened, `Error::MissingColumn` if
    /// `family` or `tags` is missing.
    pub fn parse<P: AsRef<Path>>(paths: &[P]) -> Result<Self, Error> {
        let mut records = Vec::new();
        for path in paths {
            let path = path.as_ref();
            tracing::debug!("parsing tags from {:?}", path);
            records.extend(Self::parse_one(path)?);
        }
        Ok(Self::from_records(records))
    }

    fn parse_one(path: &Path) -> Result<Vec<TagRecord>, Error> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(open_read_maybe_gz(path).map_err(|e| Error::io(path, e))?);
        let headers = reader.headers().map_err(|e| Error::csv(path, e))?.clone();
        let idx = column_indices(path, &headers, columns::REQUIRED)?;
        let variant_idx = column_indices(path, &headers, columns::VARIANT).ok();
        if variant_idx.is_none() {
            tracing::debug!("no variant columns in {:?}, variant IDs will be empty", path);
        }

        let mut result = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| Error::csv(path, e))?;
            let variant_id = variant_idx
                .as_ref()
                .map(|variant_idx| {
                    variant_idx
                        .iter()
                        .map(|i| record.get(*i).unwrap_or_default())
                        .collect::<Vec<_>>()
                        .join("-")
                })
                .unwrap_or_default();
            result.push(TagRecord {
                family_id: non_blank(&record, idx[0]).unwrap_or_default().to_string(),
                variant_id,
                tags: split_tags(non_blank(&record, idx[1])),
            });
        }
        Ok(result)
    }

    /// Build registry from records.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = TagRecord>,
    {
        let records: Vec<_> = records.into_iter().collect();
        let mut by_family: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (i, record) in records.iter().enumerate() {
            by_family.entry(record.family_id.clone()).or_default().push(i);
        }
        Self { records, by_family }
    }

    fn family_records<'a>(&'a self, family_id: &str) -> impl Iterator<Item = &'a TagRecord> + 'a {
        self.by_family
            .get(family_id)
            .into_iter()
            .flatten()
            .map(move |i| &self.records[*i])
    }

    /// Return the first entry of `precedence` present among all tags of the family.
    pub fn highest_precedence_tag<'p, S: AsRef<str>>(
        &self,
        family_id: &str,
        precedence: &'p [S],
    ) -> Option<&'p str> {
        let tags: IndexSet<&str> = self
            .family_records(family_id)
            .flat_map(|record| record.tags.iter().map(String::as_str))
            .collect();
        precedence
            .iter()
            .map(|tag| AsRef::<str>::as_ref(tag))
            .find(|tag| tags.contains(tag))
    }

    /// Return the highest-precedence tag of interest for the family.
    ///
    /// `None` if the family has no rows or none of its tags is of interest.
    pub fn get_highest_precedence_tag(&self, family_id: &str) -> Option<&'static str> {
        self.highest_precedence_tag(family_id, TAGS_OF_INTEREST)
    }

    /// Return all family IDs in order of first occurrence.
    pub fn get_families(&self) -> Vec<String> {
        self.by_family.keys().cloned().collect()
    }

    /// Return distinct variant IDs of the family, empty if the family is unknown.
    pub fn get_variants_for_family(&self, family_id: &str) -> Vec<String> {
        self.family_records(family_id)
            .map(|record| record.variant_id.clone())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }

    /// Return the tags of the first row for the given family and variant.
    ///
    /// # Errors
    ///
    /// `Error::TagFamilyNotFound` if the family has no rows at all.
    pub fn get_tags_for_family_and_variant(
        &self,
        family_id: &str,
        variant_id: &str,
    ) -> Result<Vec<String>, Error> {
        if !self.by_family.contains_key(family_id) {
            return Err(Error::TagFamilyNotFound(family_id.to_string()));
        }
        Ok(self
            .family_records(family_id)
            .find(|record| record.variant_id == variant_id)
            .map(|record| record.tags.clone())
            .unwrap_or_default())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
