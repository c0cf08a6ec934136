#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use bson::{Document, doc};
use strata_db::{Datastore, DatastoreConfig, METADATA_COLLECTION};
use strata_store::{
    Backend, BackendLimits, FieldChange, MemoryBackend, QueryOutput, QueryRequest, SlotBinding,
    StoreError,
};

/// Backend wrapper that counts physical calls and can inject failures.
pub struct CountingBackend {
    inner: MemoryBackend,
    queries: AtomicUsize,
    batch_puts: AtomicUsize,
    batch_gets: AtomicUsize,
    pub fail_describe: bool,
    /// Fail every batch_put after this many successful calls.
    pub fail_batch_puts_after: Option<usize>,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self {
            inner: MemoryBackend::new(),
            queries: AtomicUsize::new(0),
            batch_puts: AtomicUsize::new(0),
            batch_gets: AtomicUsize::new(0),
            fail_describe: false,
            fail_batch_puts_after: None,
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn batch_puts(&self) -> usize {
        self.batch_puts.load(Ordering::SeqCst)
    }

    pub fn batch_gets(&self) -> usize {
        self.batch_gets.load(Ordering::SeqCst)
    }

    pub fn reset_counters(&self) {
        self.queries.store(0, Ordering::SeqCst);
        self.batch_puts.store(0, Ordering::SeqCst);
        self.batch_gets.store(0, Ordering::SeqCst);
    }
}

impl Backend for CountingBackend {
    fn limits(&self) -> BackendLimits {
        self.inner.limits()
    }

    fn describe_table(&self) -> Result<Vec<SlotBinding>, StoreError> {
        if self.fail_describe {
            return Err(StoreError::DescribeUnavailable("injected".into()));
        }
        self.inner.describe_table()
    }

    fn query(&self, request: &QueryRequest) -> Result<QueryOutput, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.query(request)
    }

    fn put_update(
        &self,
        partition: &str,
        id: &str,
        changes: Vec<(String, FieldChange)>,
    ) -> Result<Document, StoreError> {
        self.inner.put_update(partition, id, changes)
    }

    fn delete_point(&self, partition: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.inner.delete_point(partition, id)
    }

    fn batch_put(&self, partition: &str, records: Vec<Document>) -> Result<(), StoreError> {
        let done = self.batch_puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_batch_puts_after.is_some_and(|n| done >= n) {
            return Err(StoreError::Storage("injected".into()));
        }
        self.inner.batch_put(partition, records)
    }

    fn batch_get(&self, partition: &str, ids: &[String]) -> Result<Vec<Document>, StoreError> {
        self.batch_gets.fetch_add(1, Ordering::SeqCst);
        self.inner.batch_get(partition, ids)
    }
}

/// Datastore over a counting backend, with the collection mappings the
/// tests rely on registered in the metadata collection.
pub fn datastore() -> Datastore<CountingBackend> {
    datastore_with_limit(Some(10))
}

pub fn datastore_with_limit(page_limit: Option<usize>) -> Datastore<CountingBackend> {
    let ds = Datastore::new(CountingBackend::new(), DatastoreConfig { page_limit });
    ds.batch_write(
        METADATA_COLLECTION,
        vec![
            doc! { "id": "users", "indexes": ["name", "key"] },
            doc! { "id": "groups", "indexes": ["name"] },
            doc! { "id": "memos", "indexes": ["name", "age"] },
            doc! { "id": "memos_query", "indexes": ["user.name"] },
        ],
    )
    .unwrap();
    ds
}

pub fn ids(records: &[Document]) -> Vec<&str> {
    records
        .iter()
        .map(|r| r.get_str("id").expect("record id"))
        .collect()
}
