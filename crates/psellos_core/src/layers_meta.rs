//! Optional display metadata for layers (labels, ordering), reconciled
//! against the layers actually present in the data.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::LayerMetaError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerMeta {
    pub id: String,
    #[serde(default)]
    pub order: i64,
    /// Any other display fields, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayersMetaDocument {
    pub layers: Vec<LayerMeta>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerMetaMerge {
    /// Validated entries sorted by `(order, id)`.
    pub document: LayersMetaDocument,
    /// Metadata ids with no matching layer in the data, ascending.
    pub orphaned: Vec<String>,
}

impl LayerMetaMerge {
    pub fn warning(&self) -> Option<String> {
        if self.orphaned.is_empty() {
            return None;
        }
        Some(format!(
            "layer metadata references layers not present in assertions: {}",
            self.orphaned.join(", ")
        ))
    }
}

/// Validate a layer metadata document and return its entries sorted by `(order, id)`.
pub fn parse_layers_meta(doc: &Value) -> Result<Vec<LayerMeta>, LayerMetaError> {
    let entries = doc
        .get("layers")
        .and_then(Value::as_array)
        .ok_or(LayerMetaError::MissingLayers)?;

    let mut seen = BTreeSet::new();
    let mut layers = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let mut fields = entry
            .as_object()
            .cloned()
            .ok_or(LayerMetaError::EntryNotObject { index })?;
        let id = match fields.remove("id") {
            Some(Value::String(id)) => id,
            _ => return Err(LayerMetaError::MissingId { index }),
        };
        if id.is_empty() {
            return Err(LayerMetaError::EmptyId { index });
        }
        if !seen.insert(id.clone()) {
            return Err(LayerMetaError::DuplicateId(id));
        }
        let order = match fields.remove("order") {
            None => 0,
            Some(value) => value
                .as_i64()
                .ok_or_else(|| LayerMetaError::OrderNotInteger { id: id.clone() })?,
        };
        layers.push(LayerMeta {
            id,
            order,
            extra: fields,
        });
    }

    layers.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
    Ok(layers)
}

/// Validate `doc` and report metadata ids that match none of `observed_layers`.
/// Orphaned ids are a warning, not an error.
pub fn merge_layers_meta(
    doc: &Value,
    observed_layers: &[String],
) -> Result<LayerMetaMerge, LayerMetaError> {
    let layers = parse_layers_meta(doc)?;
    let observed: BTreeSet<&str> = observed_layers.iter().map(String::as_str).collect();
    let mut orphaned: Vec<String> = layers
        .iter()
        .filter(|meta| !observed.contains(meta.id.as_str()))
        .map(|meta| meta.id.clone())
        .collect();
    orphaned.sort();

    let merge = LayerMetaMerge {
        document: LayersMetaDocument { layers },
        orphaned,
    };
    if let Some(message) = merge.warning() {
        warn!(orphaned = ?merge.orphaned, "{}", message);
    }
    Ok(merge)
}
