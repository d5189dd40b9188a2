//! Layered assertion indexing and layer diff statistics.
//!
//! Assertions are classified into narrative layers, indexed by id, participant
//! and layer, and every non-canon layer is compared against the canon layer.
//! All outputs are ordered deterministically so compiled artifacts can be
//! compared byte for byte across builds.

pub mod assertion;
pub mod compile;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod index;
pub mod layer;
pub mod layers_meta;
pub mod stats;

pub use assertion::{normalize_assertions, Assertion};
pub use compile::{compile_layers, CompiledLayers};
pub use config::{LayerConfig, CANON_LAYER, DEFAULT_TOP_N, NO_REL_BUCKET};
pub use endpoint::EndpointRef;
pub use error::{CoreError, LayerMetaError};
pub use index::{build_index, AssertionIndex, IdList, IndexAccumulator, LayerIds};
pub use layer::classify_layer;
pub use layers_meta::{
    merge_layers_meta, parse_layers_meta, LayerMeta, LayerMetaMerge, LayersMetaDocument,
};
pub use stats::{
    compare_layer, compute_layer_stats, participant_counts, persons_in_layer, rel_histogram,
    top_participants, LayerComparison, LayerStats, PersonCount, RelHistogram,
};
