use serde::{Deserialize, Serialize};

pub const CANON_LAYER: &str = "canon";
pub const NO_REL_BUCKET: &str = "(none)";
pub const DEFAULT_TOP_N: usize = 20;

/// Names and limits shared by the layer classifier and the stats engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Layer assigned to assertions without a layer tag; also the diff baseline.
    pub canon_layer: String,
    /// Histogram bucket for assertions without a relation type.
    pub no_rel_bucket: String,
    /// Maximum entries kept in every top-participant ranking.
    pub top_n: usize,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            canon_layer: CANON_LAYER.to_string(),
            no_rel_bucket: NO_REL_BUCKET.to_string(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl LayerConfig {
    pub fn is_canon(&self, layer: &str) -> bool {
        layer == self.canon_layer
    }
}
