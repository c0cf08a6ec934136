use bson::{Bson, Document};

/// Resolve a dotted field path against a record.
///
/// `"user.name"` descends through embedded documents. A path segment
/// that lands on a non-document value resolves to `None`. Field names
/// containing a literal dot cannot be addressed; top-level lookup is
/// tried first so plain names always win.
pub fn lookup_path<'a>(record: &'a Document, path: &str) -> Option<&'a Bson> {
    if let Some(value) = record.get(path) {
        return Some(value);
    }
    let mut segments = path.split('.');
    let mut current = record.get(segments.next()?)?;
    for segment in segments {
        match current {
            Bson::Document(doc) => current = doc.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}
