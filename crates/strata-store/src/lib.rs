mod backend;
mod condition;
mod error;
mod path;

pub use backend::{
    Backend, BackendLimits, FieldChange, QueryOutput, QueryRequest, ScanDirection, Select,
    SlotBinding, ID_FIELD, PARTITION_FIELD,
};
pub use condition::{KeyCondition, KeyOp, ResidualCondition};
pub use error::StoreError;
pub use path::lookup_path;

#[cfg(feature = "memory")]
mod memory;

#[cfg(feature = "memory")]
pub use memory::MemoryBackend;
