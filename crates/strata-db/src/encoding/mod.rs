mod composite;
mod numeric;

pub use composite::{SEP, encode_exact, encode_key, encode_prefix, to_index_string};
pub use numeric::encode as encode_numeric;

use std::fmt;

// ── EncodingError ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum EncodingError {
    /// Numeric value outside the codec's exponent/digit bounds.
    NumericOutOfRange(f64),
    /// Value type that cannot participate in an index slot.
    Unindexable(&'static str),
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NumericOutOfRange(n) => {
                write!(f, "numeric value {n} is outside the sortable encoding bounds")
            }
            Self::Unindexable(kind) => write!(f, "{kind} values cannot be indexed"),
        }
    }
}

impl std::error::Error for EncodingError {}
