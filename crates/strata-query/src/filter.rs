use bson::Bson;

/// Trailing marker on a filter key requesting begins-with matching
/// instead of equality: `{ "name%": "wor" }`.
pub const PREFIX_MARKER: char = '%';

/// A filter key split into its bare field name and match mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterKey<'a> {
    pub field: &'a str,
    pub prefix: bool,
}

/// Split the prefix marker off a filter key.
///
/// `"name"` → exact match on `name`; `"name%"` → begins-with on `name`.
/// The marker is only meaningful in trailing position.
pub fn parse_filter_key(key: &str) -> FilterKey<'_> {
    match key.strip_suffix(PREFIX_MARKER) {
        Some(field) => FilterKey {
            field,
            prefix: true,
        },
        None => FilterKey {
            field: key,
            prefix: false,
        },
    }
}

/// Filter values that are treated as absent and dropped before planning.
///
/// Mirrors the physical model, where the empty string cannot be stored
/// as a key value and null participates in no index.
pub fn is_empty_value(value: &Bson) -> bool {
    match value {
        Bson::Null => true,
        Bson::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_key_is_exact() {
        let key = parse_filter_key("name");
        assert_eq!(key.field, "name");
        assert!(!key.prefix);
    }

    #[test]
    fn marker_key_is_prefix() {
        let key = parse_filter_key("name%");
        assert_eq!(key.field, "name");
        assert!(key.prefix);
    }

    #[test]
    fn marker_only_strips_trailing() {
        let key = parse_filter_key("na%me");
        assert_eq!(key.field, "na%me");
        assert!(!key.prefix);
    }

    #[test]
    fn nested_path_with_marker() {
        let key = parse_filter_key("user.name%");
        assert_eq!(key.field, "user.name");
        assert!(key.prefix);
    }

    #[test]
    fn empty_values() {
        assert!(is_empty_value(&Bson::Null));
        assert!(is_empty_value(&Bson::String(String::new())));
        assert!(!is_empty_value(&Bson::String("x".into())));
        assert!(!is_empty_value(&Bson::Int32(0)));
        assert!(!is_empty_value(&Bson::Boolean(false)));
    }
}
