use std::fmt;

use strata_store::StoreError;

use crate::encoding::EncodingError;

#[derive(Debug)]
pub enum DbError {
    /// Fatal configuration problem: unreachable table description or a
    /// value outside the codec's configured bounds. Never retried.
    Config(String),
    /// A failed physical operation. `chunk` carries the zero-based
    /// index of the failing chunk when part of a batch; chunks after
    /// it were not started.
    Backend {
        source: StoreError,
        chunk: Option<usize>,
    },
    /// Malformed filter, sort, or record — surfaced before any backend
    /// call is made.
    Input(String),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::Config(msg) => write!(f, "configuration error: {msg}"),
            DbError::Backend {
                source,
                chunk: Some(index),
            } => write!(f, "backend error in batch chunk {index}: {source}"),
            DbError::Backend {
                source,
                chunk: None,
            } => write!(f, "backend error: {source}"),
            DbError::Input(msg) => write!(f, "invalid input: {msg}"),
        }
    }
}

impl std::error::Error for DbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DbError::Backend { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<StoreError> for DbError {
    fn from(source: StoreError) -> Self {
        DbError::Backend {
            source,
            chunk: None,
        }
    }
}

impl From<EncodingError> for DbError {
    fn from(e: EncodingError) -> Self {
        match e {
            EncodingError::NumericOutOfRange(_) => DbError::Config(e.to_string()),
            EncodingError::Unindexable(_) => DbError::Input(e.to_string()),
        }
    }
}

impl DbError {
    pub(crate) fn in_chunk(source: StoreError, chunk: usize) -> Self {
        DbError::Backend {
            source,
            chunk: Some(chunk),
        }
    }
}
