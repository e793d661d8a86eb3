//! Reading and writing of PLINK-style six-column pedigree (FAM) files.

use std::{io::Write, path::Path};

use crate::{
    common::io::open_read_maybe_gz,
    err::Error,
    seqr::Sex,
};

use super::{is_included, write_to_path, ProvidePedigreeInfo};

/// Encode sex as `1` (male), `2` (female) or `0` (unknown).
pub fn encode_sex(sex: Sex) -> &'static str {
    match sex {
        Sex::Male => "1",
        Sex::Female => "2",
        Sex::Unknown => "0",
    }
}

/// Encode affected status as `2` (affected) or `1` (unaffected).
pub fn encode_affected(affected: bool) -> &'static str {
    if affected {
        "2"
    } else {
        "1"
    }
}

/// Encode parent ID, `0` if unknown.
pub fn encode_parent(parent_id: &str) -> &str {
    if parent_id.is_empty() {
        "0"
    } else {
        parent_id
    }
}

/// Write pedigree file from a `ProvidePedigreeInfo`.
pub struct PedigreeWriter<'a, T: ProvidePedigreeInfo> {
    pedigree_info: &'a T,
    families_to_write: Option<Vec<String>>,
}

impl<'a, T: ProvidePedigreeInfo> PedigreeWriter<'a, T> {
    /// Construct new writer; `families_to_write` of `None` means all families.
    pub fn new(pedigree_info: &'a T, families_to_write: Option<Vec<String>>) -> Self {
        Self {
            pedigree_info,
            families_to_write,
        }
    }

    fn pedigree_line(&self, subject_id: &str) -> Result<String, Error> {
        let info = self.pedigree_info;
        Ok(format!(
            "{}\t{}\t{}\t{}\t{}\t{}\n",
            info.get_family_id(subject_id)?,
            subject_id,
            encode_parent(info.get_paternal_id(subject_id)?),
            encode_parent(info.get_maternal_id(subject_id)?),
            encode_sex(info.get_sex(subject_id)?),
            encode_affected(info.is_affected(subject_id)?),
        ))
    }

    /// Write one line per included subject to `writer`.
    pub fn write_to(&self, writer: &mut dyn Write) -> Result<usize, Error> {
        let mut count = 0;
        for subject_id in self.pedigree_info.get_subjects() {
            let family_id = self.pedigree_info.get_family_id(&subject_id)?;
            if !is_included(self.families_to_write.as_deref(), family_id) {
                continue;
            }
            writer
                .write_all(self.pedigree_line(&subject_id)?.as_bytes())
                .map_err(Error::Write)?;
            count += 1;
        }
        Ok(count)
    }

    /// Write pedigree file to `path`.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        write_to_path(path, |writer| {
            let count = self.write_to(writer)?;
            tracing::debug!("wrote {} pedigree lines to {:?}", count, path);
            Ok(())
        })
    }
}

/// One line of a pedigree file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PedigreeRecord {
    pub family_id: String,
    pub subject_id: String,
    /// Paternal ID, empty if `0`.
    pub paternal_id: String,
    /// Maternal ID, empty if `0`.
    pub maternal_id: String,
    pub sex: Sex,
    pub affected: bool,
}

fn decode_parent(value: &str) -> String {
    if value == "0" {
        String::new()
    } else {
        value.to_string()
    }
}

fn decode_sex(value: &str) -> Sex {
    match value {
        "1" => Sex::Male,
        "2" => Sex::Female,
        _ => Sex::Unknown,
    }
}

/// Read a six-column pedigree file without header.
///
/// # Errors
///
/// `Error::InvalidValue` for lines with fewer than six columns.
pub fn read_pedigree<P: AsRef<Path>>(path: P) -> Result<Vec<PedigreeRecord>, Error> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(open_read_maybe_gz(path).map_err(|e| Error::io(path, e))?);

    let mut result = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::csv(path, e))?;
        if record.len() < 6 {
            return Err(Error::InvalidValue {
                path: path.to_path_buf(),
                message: format!(
                    "line {} has {} columns, expected 6",
                    record.position().map_or(0, |pos| pos.line()),
                    record.len()
                ),
            });
        }
        result.push(PedigreeRecord {
            family_id: record[0].to_string(),
            subject_id: record[1].to_string(),
            paternal_id: decode_parent(&record[2]),
            maternal_id: decode_parent(&record[3]),
            sex: decode_sex(&record[4]),
            affected: &record[5] == "2",
        });
    }
    Ok(result)
}
