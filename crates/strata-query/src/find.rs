use bson::Document;
use serde::{Deserialize, Serialize};

use crate::sort::Sort;

/// Options for a logical query against one collection.
///
/// `filter` is an insertion-ordered map from filter key to filter value:
/// a key may carry the trailing prefix marker (begins-with), and an
/// array value requests set-membership. Declaration order matters — it
/// is the planner's tie-break when several filter fields are indexable.
///
/// At most one sort pair is supported; more is a logical input error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindOptions {
    pub filter: Option<Document>,
    pub sort: Vec<Sort>,
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn with_filter(filter: Document) -> Self {
        Self {
            filter: Some(filter),
            ..Default::default()
        }
    }
}
