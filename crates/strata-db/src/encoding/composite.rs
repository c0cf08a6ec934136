use bson::Bson;

use super::EncodingError;
use super::numeric;

/// Separator between an encoded field value and the record id in a
/// physical slot value. Sorts strictly after every character that may
/// legitimately appear in an encoded field value, so all ids for one
/// value sort together, after any longer value sharing the prefix.
pub const SEP: char = '|';

/// Encode a field value into its index-string form.
///
/// Strings pass through unchanged; numerics go through the
/// order-preserving numeric codec; booleans use their literal form
/// (`false` < `true`). Other types cannot live in an index slot.
pub fn to_index_string(value: &Bson) -> Result<String, EncodingError> {
    match value {
        Bson::String(s) => Ok(s.clone()),
        Bson::Int32(n) => numeric::encode(f64::from(*n)),
        Bson::Int64(n) => numeric::encode(*n as f64),
        Bson::Double(n) => numeric::encode(*n),
        Bson::Boolean(b) => Ok(b.to_string()),
        Bson::Array(_) => Err(EncodingError::Unindexable("array")),
        Bson::Document(_) => Err(EncodingError::Unindexable("document")),
        Bson::Null => Err(EncodingError::Unindexable("null")),
        _ => Err(EncodingError::Unindexable("non-scalar")),
    }
}

/// Full slot value written on a record: `value`, separator, id. The id
/// suffix disambiguates equal values and makes the slot usable as a
/// range key.
pub fn encode_key(value: &Bson, id: &str) -> Result<String, EncodingError> {
    let mut out = to_index_string(value)?;
    out.push(SEP);
    out.push_str(id);
    Ok(out)
}

/// Range prefix for exact-match semantics: value plus separator.
///
/// Raw equality against a slot would never match — the stored value
/// always carries the id suffix — and a bare value prefix would also
/// match longer values, so exact match means "begins with value+SEP".
pub fn encode_exact(value: &Bson) -> Result<String, EncodingError> {
    let mut out = to_index_string(value)?;
    out.push(SEP);
    Ok(out)
}

/// Range prefix for genuine begins-with filter semantics: the bare
/// encoded value, no separator.
pub fn encode_prefix(value: &Bson) -> Result<String, EncodingError> {
    to_index_string(value)
}
