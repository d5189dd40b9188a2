//! Compiles a prosopographical dataset into static JSON artifacts: normalized
//! assertions, lookup indices, per-layer statistics and a manifest.

pub mod canonical;
pub mod check;
pub mod dataset;
pub mod dist;
pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod settings;

pub use check::{verify_dist, verify_layer_shape, CheckReport};
pub use dataset::{load_dataset, Dataset};
pub use dist::{artifact_path, artifact_values, write_dist, WrittenArtifact};
pub use error::BuildError;
pub use manifest::{
    build_manifest, resolve_person_display_name, spec_version_from_path, Manifest,
    validate_generated_at, ManifestCounts, DEFAULT_SPEC_VERSION,
};
pub use pipeline::{compile_dataset, run_smoke, CompileInput, CompileOutput};
pub use settings::BuildSettings;
