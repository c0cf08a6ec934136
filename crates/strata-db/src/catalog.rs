use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use arc_swap::ArcSwapOption;
use bson::Bson;
use strata_store::{
    Backend, ID_FIELD, KeyCondition, QueryOutput, QueryRequest, ScanDirection, Select, SlotBinding,
};

use crate::error::DbError;

/// Reserved collection holding one record per collection:
/// `{ id: <collection>, indexes: [<field>, ..] }`. The position of a
/// field in the list decides which physical slot carries it.
pub const METADATA_COLLECTION: &str = "_metadata_";

const INDEXES_FIELD: &str = "indexes";

/// Lazily loaded, process-lifetime cache of index metadata.
///
/// Both halves are loaded at most once per key and treated as
/// immutable afterwards — there is no live re-indexing. Duplicate
/// concurrent loads recompute the same derived value and overwrite it,
/// so no further synchronization is needed beyond the container locks.
pub struct Catalog {
    slots: ArcSwapOption<Vec<SlotBinding>>,
    mappings: RwLock<HashMap<String, Arc<Vec<String>>>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            slots: ArcSwapOption::empty(),
            mappings: RwLock::new(HashMap::new()),
        }
    }

    /// Physical slot bindings, sorted by slot field name so slot order
    /// is stable across process restarts.
    pub fn slots<B: Backend>(&self, backend: &B) -> Result<Arc<Vec<SlotBinding>>, DbError> {
        if let Some(slots) = self.slots.load_full() {
            return Ok(slots);
        }
        let mut slots = backend
            .describe_table()
            .map_err(|e| DbError::Config(format!("table description unreachable: {e}")))?;
        slots.sort_by(|a, b| a.field.cmp(&b.field));
        let slots = Arc::new(slots);
        self.slots.store(Some(Arc::clone(&slots)));
        Ok(slots)
    }

    /// Ordered logical field names indexed for a collection.
    ///
    /// The reserved metadata collection and any collection without a
    /// registered record map to the empty list — that is not an error.
    pub fn index_mapping<B: Backend>(
        &self,
        backend: &B,
        collection: &str,
    ) -> Result<Arc<Vec<String>>, DbError> {
        if collection == METADATA_COLLECTION {
            return Ok(Arc::new(Vec::new()));
        }
        if let Some(mapping) = self
            .mappings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(collection)
        {
            return Ok(Arc::clone(mapping));
        }

        let mapping = Arc::new(self.load_mapping(backend, collection)?);
        self.mappings
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(collection.to_string(), Arc::clone(&mapping));
        Ok(mapping)
    }

    /// Bootstrap read: an ordinary point lookup against the metadata
    /// collection.
    fn load_mapping<B: Backend>(
        &self,
        backend: &B,
        collection: &str,
    ) -> Result<Vec<String>, DbError> {
        let request = QueryRequest {
            partition: METADATA_COLLECTION.to_string(),
            key_condition: Some(KeyCondition::eq(ID_FIELD, collection)),
            index: None,
            residual: Vec::new(),
            direction: ScanDirection::Reverse,
            limit: None,
            select: Select::Records,
        };
        let QueryOutput::Records(mut records) = backend.query(&request)? else {
            return Ok(Vec::new());
        };
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let record = records.swap_remove(0);
        let fields = match record.get(INDEXES_FIELD) {
            Some(Bson::Array(items)) => items
                .iter()
                .filter_map(Bson::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };
        Ok(fields)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
