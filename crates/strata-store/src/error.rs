use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The table description could not be fetched.
    DescribeUnavailable(String),
    /// A batch call exceeded the backend's per-batch item limit.
    BatchTooLarge { given: usize, limit: usize },
    /// Any other failed physical operation.
    Storage(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DescribeUnavailable(msg) => {
                write!(f, "table description unavailable: {msg}")
            }
            StoreError::BatchTooLarge { given, limit } => {
                write!(f, "batch of {given} items exceeds backend limit of {limit}")
            }
            StoreError::Storage(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}
