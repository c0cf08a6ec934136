mod catalog;
mod datastore;
mod encoding;
mod error;
mod output;
mod planner;
mod write;

pub use bson::{Bson, Document};
pub use catalog::{Catalog, METADATA_COLLECTION};
pub use datastore::{Datastore, DatastoreConfig};
pub use encoding::{
    EncodingError, SEP, encode_exact, encode_key, encode_numeric, encode_prefix, to_index_string,
};
pub use error::DbError;
pub use output::{dedupe_ids, strip_control_fields};
pub use planner::Planner;
pub use write::{dedupe_by_id, prepare_changes, prepare_for_write};
