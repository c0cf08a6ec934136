use bson::{Bson, Document};
use serde::{Deserialize, Serialize};

use crate::condition::{KeyCondition, ResidualCondition};
use crate::error::StoreError;

/// Physical partition key field. Holds the collection name.
pub const PARTITION_FIELD: &str = "_";

/// Physical sort key field. Holds the record's unique id.
pub const ID_FIELD: &str = "id";

/// Backend-imposed capability limits.
///
/// These are facts about the physical table model, exposed as named
/// values so an alternate backend with different limits can be
/// substituted without touching the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendLimits {
    /// Maximum number of range-sortable secondary index slots per table.
    pub index_slots: usize,
    /// Maximum items per physical batch-write call.
    pub write_batch: usize,
    /// Maximum keys per physical batch-get call.
    pub get_batch: usize,
}

/// One physical index slot: the range field it sorts on and the
/// identifier used to select it in a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotBinding {
    pub field: String,
    pub index: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    Forward,
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Select {
    Records,
    Count,
}

/// A compiled physical query: partition equality plus at most one key
/// range condition, optionally through a named secondary index, with
/// residual conditions evaluated after key-based narrowing.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub partition: String,
    pub key_condition: Option<KeyCondition>,
    pub index: Option<String>,
    pub residual: Vec<(String, ResidualCondition)>,
    pub direction: ScanDirection,
    pub limit: Option<usize>,
    pub select: Select,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    Records(Vec<Document>),
    Count(usize),
}

/// A single field change in a partial update.
///
/// Partial updates are additive: an omitted field keeps its stored
/// value, so removal must be requested explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Set(Bson),
    Remove,
}

/// Abstract KV-with-range-index backend.
///
/// The physical model: one partition key ([`PARTITION_FIELD`]), one
/// mandatory sort key ([`ID_FIELD`]), and up to
/// [`BackendLimits::index_slots`] additional range-sortable index
/// fields, each usable in only one query at a time and answering only
/// exact-match or begins-with key conditions.
///
/// No call is retried by the adapter layer; errors surface to the
/// caller as-is. Batch calls are not atomic as a unit.
pub trait Backend {
    fn limits(&self) -> BackendLimits;

    /// Table description: the physical range fields and their index
    /// identifiers, in backend-native order.
    fn describe_table(&self) -> Result<Vec<SlotBinding>, StoreError>;

    fn query(&self, request: &QueryRequest) -> Result<QueryOutput, StoreError>;

    /// Apply field changes to one record, creating it if absent.
    /// Returns the record as stored after the update.
    fn put_update(
        &self,
        partition: &str,
        id: &str,
        changes: Vec<(String, FieldChange)>,
    ) -> Result<Document, StoreError>;

    /// Delete one record, returning it as stored before the delete.
    fn delete_point(&self, partition: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Put whole records in one physical batch call. Each record must
    /// carry [`ID_FIELD`]; existing records are replaced entirely.
    fn batch_put(&self, partition: &str, records: Vec<Document>) -> Result<(), StoreError>;

    /// Fetch records by id in one physical batch call. Missing ids are
    /// silently absent from the result.
    fn batch_get(&self, partition: &str, ids: &[String]) -> Result<Vec<Document>, StoreError>;
}
