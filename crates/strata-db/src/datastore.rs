use bson::{Bson, Document, doc};
use serde::{Deserialize, Serialize};
use strata_query::FindOptions;
use strata_store::{Backend, ID_FIELD, QueryOutput, QueryRequest, Select};

use crate::catalog::Catalog;
use crate::error::DbError;
use crate::output;
use crate::planner::Planner;
use crate::write;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatastoreConfig {
    /// Page cap for bounded scans. Takes precedence over a per-query
    /// limit; `None` falls back to the per-query value, then unbounded.
    pub page_limit: Option<usize>,
}

/// The document-query adapter: a rich logical interface over a backend
/// that answers only partition+key range queries through at most one
/// index at a time.
pub struct Datastore<B: Backend> {
    backend: B,
    catalog: Catalog,
    config: DatastoreConfig,
}

impl<B: Backend> Datastore<B> {
    pub fn new(backend: B, config: DatastoreConfig) -> Self {
        Self {
            backend,
            catalog: Catalog::new(),
            config,
        }
    }

    /// Direct access to the underlying backend, for provisioning and
    /// out-of-band metadata writes.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ── Reads ───────────────────────────────────────────────────

    /// Fetch one record by id. Point lookup, never an index scan.
    pub fn read(&self, collection: &str, id: &str) -> Result<Option<Document>, DbError> {
        let records = self.run(collection, &doc! { ID_FIELD: id }, &FindOptions::default())?;
        Ok(records.into_iter().next())
    }

    /// Run a logical query. A filter consisting solely of `id`
    /// short-circuits to point reads: a scalar id yields zero or one
    /// record, an array of ids reads each in turn.
    pub fn query(&self, collection: &str, options: &FindOptions) -> Result<Vec<Document>, DbError> {
        let filter = options.filter.clone().unwrap_or_default();

        if filter.len() == 1 {
            match filter.get(ID_FIELD) {
                Some(Bson::Array(ids)) => {
                    let mut records = Vec::with_capacity(ids.len());
                    for id in ids {
                        let Some(id) = id.as_str() else {
                            return Err(DbError::Input("id filter values must be strings".into()));
                        };
                        if let Some(record) = self.read(collection, id)? {
                            records.push(record);
                        }
                    }
                    return Ok(records);
                }
                Some(value) => {
                    let Some(id) = value.as_str() else {
                        return Err(DbError::Input("id filter value must be a string".into()));
                    };
                    return Ok(self.read(collection, id)?.into_iter().collect());
                }
                None => {}
            }
        }

        self.run(collection, &filter, options)
    }

    /// Count matching records, without a page cap.
    pub fn count(&self, collection: &str, options: &FindOptions) -> Result<usize, DbError> {
        let filter = options.filter.clone().unwrap_or_default();
        let request = self.plan(collection, &filter, options, Select::Count)?;
        match self.backend.query(&request)? {
            QueryOutput::Count(n) => Ok(n),
            QueryOutput::Records(records) => Ok(records.len()),
        }
    }

    // ── Writes ──────────────────────────────────────────────────

    /// Partial update (create-if-absent). Fields carried as null/empty
    /// are removed from storage; index slots are recomputed, including
    /// removals for indexed fields the record no longer carries.
    /// Returns the record as stored after the update, stripped.
    pub fn update(&self, collection: &str, record: &Document) -> Result<Document, DbError> {
        let slots = self.catalog.slots(&self.backend)?;
        let mapping = self.catalog.index_mapping(&self.backend, collection)?;
        let (id, changes) = write::prepare_changes(&mapping, &slots, record)?;
        let mut updated = self.backend.put_update(collection, &id, changes)?;
        output::strip_control_fields(&slots, &mut updated);
        Ok(updated)
    }

    /// Delete one record, returning it as stored before the delete.
    pub fn delete(&self, collection: &str, id: &str) -> Result<Option<Document>, DbError> {
        let slots = self.catalog.slots(&self.backend)?;
        let deleted = self.backend.delete_point(collection, id)?;
        Ok(deleted.map(|mut record| {
            output::strip_control_fields(&slots, &mut record);
            record
        }))
    }

    /// Delete every record in a collection, page by page.
    pub fn delete_all(&self, collection: &str) -> Result<(), DbError> {
        loop {
            let page = self.query(collection, &FindOptions::default())?;
            if page.is_empty() {
                return Ok(());
            }
            for record in &page {
                let id = write::record_id(record)?;
                self.backend.delete_point(collection, id)?;
            }
        }
    }

    /// Whole-record batch write. Input is deduplicated by id
    /// (first-seen wins) and submitted sequentially in chunks of the
    /// backend's write-batch limit. A failing chunk surfaces its index;
    /// later chunks are not started.
    pub fn batch_write(&self, collection: &str, records: Vec<Document>) -> Result<(), DbError> {
        let slots = self.catalog.slots(&self.backend)?;
        let mapping = self.catalog.index_mapping(&self.backend, collection)?;

        let deduped = write::dedupe_by_id(records)?;
        let mut prepared = Vec::with_capacity(deduped.len());
        for record in &deduped {
            prepared.push(write::prepare_for_write(&mapping, &slots, record)?);
        }

        let chunk_size = self.backend.limits().write_batch.max(1);
        for (chunk_index, chunk) in prepared.chunks(chunk_size).enumerate() {
            self.backend
                .batch_put(collection, chunk.to_vec())
                .map_err(|e| DbError::in_chunk(e, chunk_index))?;
        }
        Ok(())
    }

    /// Batch fetch by id. Ids are deduplicated (request order kept) and
    /// fetched sequentially in chunks of the backend's get-batch limit.
    pub fn batch_get(&self, collection: &str, ids: &[String]) -> Result<Vec<Document>, DbError> {
        let slots = self.catalog.slots(&self.backend)?;
        let deduped = output::dedupe_ids(ids);

        let chunk_size = self.backend.limits().get_batch.max(1);
        let mut records = Vec::new();
        for (chunk_index, chunk) in deduped.chunks(chunk_size).enumerate() {
            let fetched = self
                .backend
                .batch_get(collection, chunk)
                .map_err(|e| DbError::in_chunk(e, chunk_index))?;
            records.extend(fetched);
        }

        for record in &mut records {
            output::strip_control_fields(&slots, record);
        }
        Ok(records)
    }

    // ── Plumbing ────────────────────────────────────────────────

    fn plan(
        &self,
        collection: &str,
        filter: &Document,
        options: &FindOptions,
        select: Select,
    ) -> Result<QueryRequest, DbError> {
        let slots = self.catalog.slots(&self.backend)?;
        let mapping = self.catalog.index_mapping(&self.backend, collection)?;
        let page_limit = self.config.page_limit.or(options.limit);
        Planner::new(&mapping, &slots, page_limit).plan(
            collection,
            filter,
            &options.sort,
            select,
        )
    }

    fn run(
        &self,
        collection: &str,
        filter: &Document,
        options: &FindOptions,
    ) -> Result<Vec<Document>, DbError> {
        let slots = self.catalog.slots(&self.backend)?;
        let request = self.plan(collection, filter, options, Select::Records)?;
        let mut records = match self.backend.query(&request)? {
            QueryOutput::Records(records) => records,
            QueryOutput::Count(_) => Vec::new(),
        };
        for record in &mut records {
            output::strip_control_fields(&slots, record);
        }
        Ok(records)
    }
}
