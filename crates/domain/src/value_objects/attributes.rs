//! Pass-through attributes.
//!
//! The drawing surface persists more than we model (sizes, colours, ports).
//! Those keys ride along untouched so a save never loses them.

use std::collections::BTreeMap;

use serde_json::Value;

/// Unmodelled attributes of a surface figure, keyed by attribute name.
pub type Attributes = BTreeMap<String, Value>;

/// Keys that carry positional data or the record tag. They belong to the
/// flat diagram record or to a view, never to a model entity.
pub const LAYOUT_KEYS: [&str; 5] = ["type", "x", "y", "vertex", "routingMetaData"];

/// Drop every layout key from a set of pass-through attributes.
pub fn strip_layout_keys(attributes: &mut Attributes) {
    for key in LAYOUT_KEYS {
        attributes.remove(key);
    }
}
