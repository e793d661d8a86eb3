use std::path::PathBuf;

/// Error type for parsing, querying, and writing cohort metadata.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Subject ID {0:?} not found")]
    SubjectNotFound(String),
    #[error("Family ID {0:?} not found")]
    FamilyNotFound(String),
    #[error("Family ID {0:?} not found in tags")]
    TagFamilyNotFound(String),
    #[error("Input {path:?} must contain column {column:?}")]
    MissingColumn { path: PathBuf, column: String },
    #[error("Invalid value in {path:?}: {message}")]
    InvalidValue { path: PathBuf, message: String },
    #[error("Problem accessing {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Problem parsing {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Problem writing output: {0}")]
    Write(#[source] std::io::Error),
    #[error("Problem writing JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Helper to wrap an I/O error together with the path that caused it.
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Helper to wrap a CSV error together with the path that caused it.
    pub fn csv<P: Into<PathBuf>>(path: P, source: csv::Error) -> Self {
        Error::Csv {
            path: path.into(),
            source,
        }
    }
}
