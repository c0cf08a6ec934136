use bson::Document;
use strata_store::{PARTITION_FIELD, SlotBinding};

/// Remove the partition key and every physical slot field from a
/// record — implementation artifacts, never part of the logical
/// schema. Idempotent, and touches nothing but registered slot names.
pub fn strip_control_fields(slots: &[SlotBinding], record: &mut Document) {
    record.remove(PARTITION_FIELD);
    for slot in slots {
        record.remove(&slot.field);
    }
}

/// Deduplicate requested ids, preserving request order.
pub fn dedupe_ids(ids: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{Bson, doc};

    fn slots() -> Vec<SlotBinding> {
        (1..=5)
            .map(|i| SlotBinding {
                field: format!("_{i}"),
                index: format!("_-_{i}-index"),
            })
            .collect()
    }

    #[test]
    fn strips_partition_and_slots() {
        let slots = slots();
        let mut record = doc! {
            "_": "users",
            "id": "1",
            "_1": "hello|1",
            "_2": "30000|1",
            "name": "hello",
        };
        strip_control_fields(&slots, &mut record);
        assert_eq!(record, doc! { "id": "1", "name": "hello" });
    }

    #[test]
    fn strip_is_idempotent() {
        let slots = slots();
        let mut record = doc! { "_": "users", "id": "1", "_1": "x|1", "name": "x" };
        strip_control_fields(&slots, &mut record);
        let once = record.clone();
        strip_control_fields(&slots, &mut record);
        assert_eq!(record, once);
    }

    #[test]
    fn unregistered_lookalike_fields_survive() {
        // Only registered slot names are reserved; a user field that
        // merely resembles one is left alone.
        let slots = slots();
        let mut record = doc! { "id": "1", "_9": "kept", "_1x": "kept" };
        strip_control_fields(&slots, &mut record);
        assert_eq!(record.get("_9"), Some(&Bson::String("kept".into())));
        assert_eq!(record.get("_1x"), Some(&Bson::String("kept".into())));
    }

    #[test]
    fn dedupe_preserves_request_order() {
        let ids: Vec<String> = ["3", "1", "3", "2", "1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(dedupe_ids(&ids), ["3", "1", "2"]);
    }
}
