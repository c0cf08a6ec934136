use std::collections::HashSet;

use bson::{Bson, Document};
use strata_query::is_empty_value;
use strata_store::{FieldChange, ID_FIELD, PARTITION_FIELD, SlotBinding, lookup_path};

use crate::encoding;
use crate::error::DbError;

pub(crate) fn record_id(record: &Document) -> Result<&str, DbError> {
    record
        .get(ID_FIELD)
        .and_then(Bson::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| DbError::Input("record is missing a string id".into()))
}

/// Map a logical record into physical form for a whole-record write:
/// every mapped field with a non-null, non-empty value at its (possibly
/// nested) path gets its composite slot value; absent fields get no
/// slot. User fields are carried through unchanged — slot names are
/// reserved, so they never collide.
pub fn prepare_for_write(
    mapping: &[String],
    slots: &[SlotBinding],
    record: &Document,
) -> Result<Document, DbError> {
    let id = record_id(record)?;
    let mut physical = record.clone();
    for (field, slot) in mapping.iter().zip(slots) {
        if let Some(value) = lookup_path(record, field).filter(|v| !is_empty_value(v)) {
            physical.insert(slot.field.clone(), encoding::encode_key(value, id)?);
        } else {
            physical.remove(&slot.field);
        }
    }
    Ok(physical)
}

/// Map a logical record into a partial-update change set.
///
/// Partial updates are additive, so absence must be made explicit: a
/// field carried as null/empty becomes a removal, and every mapped slot
/// whose source value is missing is removed as well (the record may
/// have carried that field before).
pub fn prepare_changes(
    mapping: &[String],
    slots: &[SlotBinding],
    record: &Document,
) -> Result<(String, Vec<(String, FieldChange)>), DbError> {
    let id = record_id(record)?.to_string();
    let mut changes = Vec::new();

    for (field, slot) in mapping.iter().zip(slots) {
        match lookup_path(record, field).filter(|v| !is_empty_value(v)) {
            Some(value) => changes.push((
                slot.field.clone(),
                FieldChange::Set(Bson::String(encoding::encode_key(value, &id)?)),
            )),
            None => changes.push((slot.field.clone(), FieldChange::Remove)),
        }
    }

    for (key, value) in record.iter() {
        if key == PARTITION_FIELD || key == ID_FIELD {
            continue;
        }
        if is_empty_value(value) {
            changes.push((key.clone(), FieldChange::Remove));
        } else {
            changes.push((key.clone(), FieldChange::Set(value.clone())));
        }
    }

    Ok((id, changes))
}

/// Deduplicate batch input by id, first-seen wins.
pub fn dedupe_by_id(records: Vec<Document>) -> Result<Vec<Document>, DbError> {
    let mut seen = HashSet::new();
    let mut deduped = Vec::with_capacity(records.len());
    for record in records {
        let id = record_id(&record)?.to_string();
        if seen.insert(id) {
            deduped.push(record);
        }
    }
    Ok(deduped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn slots() -> Vec<SlotBinding> {
        (1..=5)
            .map(|i| SlotBinding {
                field: format!("_{i}"),
                index: format!("_-_{i}-index"),
            })
            .collect()
    }

    fn mapping(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn slot_values_are_composite_keys() {
        let mapping = mapping(&["name", "age"]);
        let slots = slots();
        let record = doc! { "id": "7", "name": "hello", "age": 30 };
        let physical = prepare_for_write(&mapping, &slots, &record).unwrap();

        assert_eq!(physical.get("_1"), Some(&Bson::String("hello|7".into())));
        let age_slot = physical.get("_2").and_then(Bson::as_str).unwrap();
        assert!(age_slot.ends_with("|7"));
        // User fields carried through.
        assert_eq!(physical.get("name"), Some(&Bson::String("hello".into())));
    }

    #[test]
    fn missing_indexed_field_gets_no_slot() {
        let mapping = mapping(&["name", "age"]);
        let slots = slots();
        let record = doc! { "id": "7", "age": 30 };
        let physical = prepare_for_write(&mapping, &slots, &record).unwrap();
        assert_eq!(physical.get("_1"), None);
        assert!(physical.get("_2").is_some());
    }

    #[test]
    fn empty_string_counts_as_missing() {
        let mapping = mapping(&["name"]);
        let slots = slots();
        let record = doc! { "id": "7", "name": "" };
        let physical = prepare_for_write(&mapping, &slots, &record).unwrap();
        assert_eq!(physical.get("_1"), None);
    }

    #[test]
    fn nested_path_feeds_its_slot() {
        let mapping = mapping(&["user.name"]);
        let slots = slots();
        let record = doc! { "id": "3", "user": { "name": "world" } };
        let physical = prepare_for_write(&mapping, &slots, &record).unwrap();
        assert_eq!(physical.get("_1"), Some(&Bson::String("world|3".into())));
    }

    #[test]
    fn missing_id_is_an_input_error() {
        let mapping = mapping(&["name"]);
        let slots = slots();
        let err = prepare_for_write(&mapping, &slots, &doc! { "name": "x" }).unwrap_err();
        assert!(matches!(err, DbError::Input(_)));
        let err = prepare_for_write(&mapping, &slots, &doc! { "id": 5, "name": "x" }).unwrap_err();
        assert!(matches!(err, DbError::Input(_)));
    }

    #[test]
    fn changes_remove_absent_slots_and_emptied_fields() {
        let mapping = mapping(&["name", "age"]);
        let slots = slots();
        let record = doc! { "id": "7", "name": "hello", "note": Bson::Null };
        let (id, changes) = prepare_change_pairs(&mapping, &slots, &record);

        assert_eq!(id, "7");
        assert!(matches!(
            find(&changes, "_1"),
            Some(FieldChange::Set(Bson::String(s))) if s == "hello|7"
        ));
        // No age on the record: its slot is explicitly removed.
        assert!(matches!(find(&changes, "_2"), Some(FieldChange::Remove)));
        assert!(matches!(find(&changes, "note"), Some(FieldChange::Remove)));
        assert!(matches!(find(&changes, "name"), Some(FieldChange::Set(_))));
        // id and partition are key fields, never part of the change set.
        assert!(find(&changes, "id").is_none());
        assert!(find(&changes, "_").is_none());
    }

    fn prepare_change_pairs(
        mapping: &[String],
        slots: &[SlotBinding],
        record: &Document,
    ) -> (String, Vec<(String, FieldChange)>) {
        prepare_changes(mapping, slots, record).unwrap()
    }

    fn find<'a>(changes: &'a [(String, FieldChange)], field: &str) -> Option<&'a FieldChange> {
        changes.iter().find(|(f, _)| f == field).map(|(_, c)| c)
    }

    #[test]
    fn dedupe_keeps_first_seen() {
        let records = vec![
            doc! { "id": "1", "v": "first" },
            doc! { "id": "2" },
            doc! { "id": "1", "v": "second" },
        ];
        let deduped = dedupe_by_id(records).unwrap();
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].get("v"), Some(&Bson::String("first".into())));
    }
}
