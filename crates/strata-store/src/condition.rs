use bson::{Bson, Document};

use crate::path::lookup_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOp {
    Eq,
    BeginsWith,
}

/// A range condition on the active key field (the sort key, or the
/// range field of the selected index). Key fields are string-typed in
/// the physical model, so the operand is always a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCondition {
    pub field: String,
    pub op: KeyOp,
    pub value: String,
}

impl KeyCondition {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op: KeyOp::Eq,
            value: value.into(),
        }
    }

    pub fn begins_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op: KeyOp::BeginsWith,
            value: value.into(),
        }
    }

    pub fn matches(&self, record: &Document) -> bool {
        let Some(stored) = lookup_path(record, &self.field).and_then(Bson::as_str) else {
            return false;
        };
        match self.op {
            KeyOp::Eq => stored == self.value,
            KeyOp::BeginsWith => stored.starts_with(&self.value),
        }
    }
}

/// A filter condition evaluated after key-based narrowing. The field
/// may be a dotted path into nested values.
#[derive(Debug, Clone, PartialEq)]
pub enum ResidualCondition {
    Eq(Bson),
    BeginsWith(String),
    In(Vec<Bson>),
}

impl ResidualCondition {
    /// Evaluate against a stored record. A missing path never matches.
    pub fn matches(&self, record: &Document, path: &str) -> bool {
        let Some(stored) = lookup_path(record, path) else {
            return false;
        };
        match self {
            ResidualCondition::Eq(value) => stored == value,
            ResidualCondition::BeginsWith(prefix) => stored
                .as_str()
                .is_some_and(|s| s.starts_with(prefix.as_str())),
            ResidualCondition::In(values) => values.contains(stored),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn residual_eq() {
        let record = doc! { "name": "hello", "age": 30 };
        assert!(ResidualCondition::Eq(Bson::String("hello".into())).matches(&record, "name"));
        assert!(!ResidualCondition::Eq(Bson::String("world".into())).matches(&record, "name"));
        assert!(ResidualCondition::Eq(Bson::Int32(30)).matches(&record, "age"));
    }

    #[test]
    fn residual_begins_with() {
        let record = doc! { "name": "worldAAA" };
        assert!(ResidualCondition::BeginsWith("world".into()).matches(&record, "name"));
        assert!(!ResidualCondition::BeginsWith("xyz".into()).matches(&record, "name"));
    }

    #[test]
    fn residual_begins_with_non_string_never_matches() {
        let record = doc! { "age": 30 };
        assert!(!ResidualCondition::BeginsWith("3".into()).matches(&record, "age"));
    }

    #[test]
    fn residual_in() {
        let record = doc! { "type": "X" };
        let cond = ResidualCondition::In(vec![Bson::String("X".into()), Bson::String("Y".into())]);
        assert!(cond.matches(&record, "type"));
        let cond = ResidualCondition::In(vec![Bson::String("Z".into())]);
        assert!(!cond.matches(&record, "type"));
    }

    #[test]
    fn residual_nested_path() {
        let record = doc! { "user": { "name": "world" } };
        assert!(ResidualCondition::Eq(Bson::String("world".into())).matches(&record, "user.name"));
    }

    #[test]
    fn missing_path_never_matches() {
        let record = doc! { "name": "hello" };
        assert!(!ResidualCondition::Eq(Bson::Null).matches(&record, "missing"));
        assert!(!ResidualCondition::In(vec![Bson::Null]).matches(&record, "missing"));
    }

    #[test]
    fn key_condition_matches() {
        let record = doc! { "id": "rec-1", "_1": "world|rec-1" };
        assert!(KeyCondition::eq("id", "rec-1").matches(&record));
        assert!(!KeyCondition::eq("id", "rec-2").matches(&record));
        assert!(KeyCondition::begins_with("_1", "world|").matches(&record));
        assert!(!KeyCondition::begins_with("_1", "worle").matches(&record));
        assert!(!KeyCondition::eq("_2", "anything").matches(&record));
    }
}
