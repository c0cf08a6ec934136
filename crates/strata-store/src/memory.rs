use std::collections::BTreeMap;
use std::sync::RwLock;

use bson::{Bson, Document};

use crate::backend::{
    Backend, BackendLimits, FieldChange, QueryOutput, QueryRequest, ScanDirection, Select,
    SlotBinding, ID_FIELD, PARTITION_FIELD,
};
use crate::error::StoreError;

const LIMITS: BackendLimits = BackendLimits {
    index_slots: 5,
    write_batch: 25,
    get_batch: 100,
};

/// In-memory model of the physical table, for tests and embedding.
///
/// One partition key, a mandatory `id` sort key, and five slot fields
/// (`_1`..`_5`) each backed by one named index. Rows missing a slot
/// value are invisible to that slot's index. Native order is by the
/// active range key; residual conditions are evaluated before the page
/// limit is applied.
pub struct MemoryBackend {
    rows: RwLock<BTreeMap<(String, String), Document>>,
    slots: Vec<SlotBinding>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        let slots = (1..=LIMITS.index_slots)
            .map(|i| SlotBinding {
                field: format!("_{i}"),
                index: format!("{PARTITION_FIELD}-_{i}-index"),
            })
            .collect();
        Self {
            rows: RwLock::new(BTreeMap::new()),
            slots,
        }
    }

    fn slot_field(&self, index: &str) -> Result<&str, StoreError> {
        self.slots
            .iter()
            .find(|s| s.index == index)
            .map(|s| s.field.as_str())
            .ok_or_else(|| StoreError::Storage(format!("unknown index: {index}")))
    }

    fn guard(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<(String, String), Document>> {
        self.rows.read().unwrap_or_else(|e| e.into_inner())
    }

    fn guard_mut(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<(String, String), Document>> {
        self.rows.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MemoryBackend {
    fn limits(&self) -> BackendLimits {
        LIMITS
    }

    fn describe_table(&self) -> Result<Vec<SlotBinding>, StoreError> {
        Ok(self.slots.clone())
    }

    fn query(&self, request: &QueryRequest) -> Result<QueryOutput, StoreError> {
        let rows = self.guard();

        // Partition equality, in native id order (BTreeMap iteration).
        let mut matched: Vec<&Document> = rows
            .iter()
            .filter(|((partition, _), _)| *partition == request.partition)
            .map(|(_, record)| record)
            .collect();

        // An index only contains rows that carry its range field.
        if let Some(index) = &request.index {
            let field = self.slot_field(index)?.to_string();
            matched.retain(|record| record.get(&field).and_then(Bson::as_str).is_some());
            matched.sort_by(|a, b| {
                let ka = a.get(&field).and_then(Bson::as_str).unwrap_or_default();
                let kb = b.get(&field).and_then(Bson::as_str).unwrap_or_default();
                ka.cmp(kb)
            });
        }

        if let Some(condition) = &request.key_condition {
            matched.retain(|record| condition.matches(record));
        }

        if request.direction == ScanDirection::Reverse {
            matched.reverse();
        }

        matched.retain(|record| {
            request
                .residual
                .iter()
                .all(|(path, condition)| condition.matches(record, path))
        });

        if let Some(limit) = request.limit {
            matched.truncate(limit);
        }

        Ok(match request.select {
            Select::Count => QueryOutput::Count(matched.len()),
            Select::Records => QueryOutput::Records(matched.into_iter().cloned().collect()),
        })
    }

    fn put_update(
        &self,
        partition: &str,
        id: &str,
        changes: Vec<(String, FieldChange)>,
    ) -> Result<Document, StoreError> {
        let mut rows = self.guard_mut();
        let record = rows
            .entry((partition.to_string(), id.to_string()))
            .or_insert_with(|| {
                let mut fresh = Document::new();
                fresh.insert(PARTITION_FIELD, partition);
                fresh.insert(ID_FIELD, id);
                fresh
            });
        for (field, change) in changes {
            match change {
                FieldChange::Set(value) => {
                    record.insert(field, value);
                }
                FieldChange::Remove => {
                    record.remove(&field);
                }
            }
        }
        Ok(record.clone())
    }

    fn delete_point(&self, partition: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let mut rows = self.guard_mut();
        Ok(rows.remove(&(partition.to_string(), id.to_string())))
    }

    fn batch_put(&self, partition: &str, records: Vec<Document>) -> Result<(), StoreError> {
        if records.len() > LIMITS.write_batch {
            return Err(StoreError::BatchTooLarge {
                given: records.len(),
                limit: LIMITS.write_batch,
            });
        }
        let mut rows = self.guard_mut();
        for mut record in records {
            let Some(id) = record.get(ID_FIELD).and_then(Bson::as_str).map(str::to_string) else {
                return Err(StoreError::Storage("record is missing its id key".into()));
            };
            record.insert(PARTITION_FIELD, partition);
            rows.insert((partition.to_string(), id), record);
        }
        Ok(())
    }

    fn batch_get(&self, partition: &str, ids: &[String]) -> Result<Vec<Document>, StoreError> {
        if ids.len() > LIMITS.get_batch {
            return Err(StoreError::BatchTooLarge {
                given: ids.len(),
                limit: LIMITS.get_batch,
            });
        }
        let rows = self.guard();
        Ok(ids
            .iter()
            .filter_map(|id| rows.get(&(partition.to_string(), id.clone())).cloned())
            .collect())
    }
}
