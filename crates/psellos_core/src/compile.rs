use serde_json::{Map, Value};
use tracing::info;

use crate::assertion::{normalize_assertions, Assertion};
use crate::config::LayerConfig;
use crate::error::{CoreError, LayerMetaError};
use crate::index::{build_index, AssertionIndex};
use crate::layers_meta::{merge_layers_meta, LayerMetaMerge};
use crate::stats::LayerStats;

/// Everything derived from one assertion collection.
#[derive(Debug, Clone)]
pub struct CompiledLayers {
    pub assertions: Vec<Assertion>,
    pub index: AssertionIndex,
    pub stats: LayerStats,
    /// Outcome of the metadata merge, when a metadata document was supplied.
    /// A failed merge does not invalidate the other fields.
    pub layers_meta: Option<Result<LayerMetaMerge, LayerMetaError>>,
}

/// Normalize, index and diff `raw` assertions, then merge optional layer metadata.
pub fn compile_layers(
    raw: &[Map<String, Value>],
    layers_meta: Option<&Value>,
    config: &LayerConfig,
) -> Result<CompiledLayers, CoreError> {
    let assertions = normalize_assertions(raw)?;
    let index = build_index(&assertions, config);
    let stats = LayerStats::from_index(&index, config);
    let layers_meta = layers_meta.map(|doc| merge_layers_meta(doc, &index.layers()));

    info!(
        assertions = assertions.len(),
        indexed = index.by_id().len(),
        layers = index.by_layer().len(),
        persons = index.by_participant().len(),
        "compiled layer indices"
    );

    Ok(CompiledLayers {
        assertions,
        index,
        stats,
        layers_meta,
    })
}
