use bson::{Bson, Document};
use strata_query::{Sort, SortDirection, is_empty_value, parse_filter_key};
use strata_store::{
    ID_FIELD, KeyCondition, QueryRequest, ResidualCondition, ScanDirection, Select, SlotBinding,
};

use crate::encoding;
use crate::error::DbError;

/// A filter entry after rewriting onto the physical model.
enum Entry<'a> {
    /// Mapped onto a physical slot; `encoded` is the begins-with
    /// payload (value+SEP for exact match, bare value for prefix).
    Slot {
        slot: &'a SlotBinding,
        encoded: String,
    },
    /// Left on its original (possibly dotted) field name.
    Plain {
        field: String,
        condition: ResidualCondition,
    },
}

/// Compiles a logical filter/sort request into a physical query.
///
/// Selects at most one secondary index. Policy priority: id lookup,
/// then an index matching the sort field, then the index of the first
/// filter field (in declaration order) that maps to a slot. The
/// declaration-order tie-break is a contract, not an accident.
pub struct Planner<'a> {
    mapping: &'a [String],
    slots: &'a [SlotBinding],
    page_limit: Option<usize>,
}

impl<'a> Planner<'a> {
    pub fn new(
        mapping: &'a [String],
        slots: &'a [SlotBinding],
        page_limit: Option<usize>,
    ) -> Self {
        Self {
            mapping,
            slots,
            page_limit,
        }
    }

    /// Logical field → physical slot, by position in the mapping.
    fn slot_for(&self, field: &str) -> Option<&'a SlotBinding> {
        self.mapping
            .iter()
            .zip(self.slots.iter())
            .find(|(name, _)| name.as_str() == field)
            .map(|(_, slot)| slot)
    }

    pub fn plan(
        &self,
        collection: &str,
        filter: &Document,
        sort: &[Sort],
        select: Select,
    ) -> Result<QueryRequest, DbError> {
        if sort.len() > 1 {
            return Err(DbError::Input(
                "at most one sort field is supported".into(),
            ));
        }

        let mut id_condition: Option<KeyCondition> = None;
        let mut entries: Vec<Entry<'a>> = Vec::new();

        for (key, value) in filter.iter() {
            if is_empty_value(value) {
                continue;
            }
            let parsed = parse_filter_key(key);

            if parsed.field == ID_FIELD {
                if matches!(value, Bson::Array(_)) {
                    return Err(DbError::Input(
                        "set-membership on id is only supported as the sole filter".into(),
                    ));
                }
                let Some(id) = value.as_str() else {
                    return Err(DbError::Input("id filter value must be a string".into()));
                };
                if id_condition.is_some() {
                    return Err(DbError::Input("duplicate id filter".into()));
                }
                id_condition = Some(if parsed.prefix {
                    KeyCondition::begins_with(ID_FIELD, id)
                } else {
                    KeyCondition::eq(ID_FIELD, id)
                });
                continue;
            }

            // Rewrite onto a physical slot: mapped field, scalar value.
            // Array values stay on the logical field — an IN filter
            // cannot use the slot's index.
            if !matches!(value, Bson::Array(_))
                && let Some(slot) = self.slot_for(parsed.field)
            {
                let encoded = if parsed.prefix {
                    encoding::encode_prefix(value)?
                } else {
                    encoding::encode_exact(value)?
                };
                entries.push(Entry::Slot { slot, encoded });
                continue;
            }

            let condition = match value {
                Bson::Array(items) => ResidualCondition::In(items.clone()),
                _ if parsed.prefix => {
                    let Some(s) = value.as_str() else {
                        return Err(DbError::Input(
                            "prefix match requires a string value".into(),
                        ));
                    };
                    ResidualCondition::BeginsWith(s.to_string())
                }
                _ => ResidualCondition::Eq(value.clone()),
            };
            entries.push(Entry::Plain {
                field: parsed.field.to_string(),
                condition,
            });
        }

        // Absent sort defaults to the backend's native descending order.
        let direction = match sort.first() {
            Some(s) if s.direction == SortDirection::Asc => ScanDirection::Forward,
            _ => ScanDirection::Reverse,
        };

        // An id filter takes absolute priority: partition+id point
        // lookup, no secondary index, page limit suppressed.
        if let Some(condition) = id_condition {
            let residual = entries.into_iter().map(Entry::into_residual).collect();
            return Ok(QueryRequest {
                partition: collection.to_string(),
                key_condition: Some(condition),
                index: None,
                residual,
                direction,
                limit: None,
                select,
            });
        }

        // Candidate index: the sort field when it is indexed. A sort on
        // an unindexed field disables index selection entirely — the
        // backend cannot produce that ordering through any slot. With
        // no sort, the first slot-mapped filter entry wins.
        let candidate: Option<&SlotBinding> = match sort.first() {
            Some(s) => self.slot_for(&s.field),
            None => entries.iter().find_map(|entry| match entry {
                Entry::Slot { slot, .. } => Some(*slot),
                Entry::Plain { .. } => None,
            }),
        };

        let mut key_condition = None;
        let mut residual = Vec::new();
        for entry in entries {
            match entry {
                Entry::Slot { slot, encoded }
                    if candidate.is_some_and(|c| c.field == slot.field)
                        && key_condition.is_none() =>
                {
                    key_condition = Some(KeyCondition::begins_with(slot.field.clone(), encoded));
                }
                other => residual.push(other.into_residual()),
            }
        }

        let limit = match select {
            Select::Count => None,
            Select::Records => self.page_limit,
        };

        Ok(QueryRequest {
            partition: collection.to_string(),
            key_condition,
            index: candidate.map(|slot| slot.index.clone()),
            residual,
            direction,
            limit,
            select,
        })
    }
}

impl Entry<'_> {
    /// Demote to a residual condition. Slot entries keep begins-with
    /// semantics against the composite slot value.
    fn into_residual(self) -> (String, ResidualCondition) {
        match self {
            Entry::Slot { slot, encoded } => {
                (slot.field.clone(), ResidualCondition::BeginsWith(encoded))
            }
            Entry::Plain { field, condition } => (field, condition),
        }
    }
}
