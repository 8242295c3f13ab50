use std::{io, path::PathBuf};

use thiserror::Error;

use crate::{correlate::decode::DecodeError, timepoint::TimestampError};

/// Every way a conversion run can fail. All of them abort the run.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("{file} line {line}: {source}")]
    Parse {
        file: String,
        line: u64,
        #[source]
        source: TimestampError,
    },

    #[error("{file} line {line}: {source}")]
    Decode {
        file: String,
        line: u64,
        #[source]
        source: DecodeError,
    },

    #[error("{file} has {found} data rows but {primary} has {expected}")]
    RowCountMismatch {
        file: String,
        primary: String,
        expected: u64,
        found: u64,
    },

    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{file} line {line}: unknown timezone {name:?}")]
    Timezone { file: String, line: u64, name: String },

    #[error("{file} line {line}: missing column {column}")]
    MissingColumn { file: String, line: u64, column: usize },

    #[error("reading {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
}

impl ConvertError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConvertError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;
