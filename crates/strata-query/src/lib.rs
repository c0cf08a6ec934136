mod filter;
mod find;
mod sort;

pub use filter::{FilterKey, PREFIX_MARKER, is_empty_value, parse_filter_key};
pub use find::FindOptions;
pub use sort::{Sort, SortDirection};
