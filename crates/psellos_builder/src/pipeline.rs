use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{info, warn};

use psellos_core::{compile_layers, LayerConfig};

use crate::dataset::{load_dataset, Dataset};
use crate::dist::{artifact_values, write_dist, WrittenArtifact};
use crate::error::BuildError;
use crate::manifest::{
    build_manifest, now_timestamp, spec_version_from_path, validate_generated_at, Manifest,
};
use crate::settings::BuildSettings;

#[derive(Debug, Clone)]
pub struct CompileInput {
    pub input: PathBuf,
    pub dist: PathBuf,
    pub spec: Option<PathBuf>,
    /// Explicit metadata path; otherwise the settings' file name next to `input` is used if present.
    pub layers_meta: Option<PathBuf>,
    pub generated_at: Option<String>,
    pub settings: BuildSettings,
}

#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub manifest: Manifest,
    pub written: Vec<WrittenArtifact>,
    pub warnings: Vec<String>,
}

/// Load, compile and write a dataset.
///
/// A structurally invalid layer metadata document does not stop the other
/// artifacts from being written; the error is returned after writing.
pub fn compile_dataset(input: &CompileInput) -> Result<CompileOutput, BuildError> {
    let config = input.settings.layer_config()?;
    let generated_at = match &input.generated_at {
        Some(value) => validate_generated_at(value)?,
        None => now_timestamp(),
    };
    let dataset = load_dataset(&input.input)?;
    let layers_meta_doc = match resolve_layers_meta_path(input) {
        Some(path) => Some(load_json(&path)?),
        None => None,
    };

    let (mut manifest, artifacts, meta_result) =
        compile_in_memory(&dataset, layers_meta_doc.as_ref(), &config, input, generated_at)?;
    let written = write_dist(&input.dist, &artifacts, &mut manifest)?;

    let mut warnings = Vec::new();
    match meta_result {
        Some(Ok(Some(warning))) => warnings.push(warning),
        Some(Err(err)) => return Err(err),
        _ => {}
    }

    info!(
        dist = %input.dist.display(),
        artifacts = written.len(),
        assertions = manifest.counts.assertions,
        layers = manifest.counts.layers,
        "wrote dist"
    );
    Ok(CompileOutput {
        manifest,
        written,
        warnings,
    })
}

type MetaOutcome = Option<Result<Option<String>, BuildError>>;

fn compile_in_memory(
    dataset: &Dataset,
    layers_meta_doc: Option<&Value>,
    config: &LayerConfig,
    input: &CompileInput,
    generated_at: String,
) -> Result<(Manifest, Vec<(&'static str, Value)>, MetaOutcome), BuildError> {
    let compiled = compile_layers(&dataset.assertions, layers_meta_doc, config)?;
    let manifest = build_manifest(
        dataset,
        compiled.index.by_layer().len(),
        spec_version_from_path(input.spec.as_deref()),
        generated_at,
    )?;
    let artifacts = artifact_values(&compiled)?;

    let meta_outcome = compiled.layers_meta.map(|result| match result {
        Ok(merge) => Ok(merge.warning()),
        Err(err) => {
            warn!(error = %err, "layer metadata rejected; layers_meta artifact skipped");
            Err(BuildError::from(err))
        }
    });
    Ok((manifest, artifacts, meta_outcome))
}

fn resolve_layers_meta_path(input: &CompileInput) -> Option<PathBuf> {
    if let Some(path) = &input.layers_meta {
        return Some(path.clone());
    }
    let candidate = input
        .input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(input.settings.layers_meta_filename());
    candidate.is_file().then_some(candidate)
}

fn load_json(path: &Path) -> Result<Value, BuildError> {
    let bytes = std::fs::read(path)
        .map_err(|err| BuildError::Io(format!("read {}: {}", path.display(), err)))?;
    serde_json::from_slice(&bytes)
        .map_err(|err| BuildError::Json(format!("{}: {}", path.display(), err)))
}

/// Compile into `dist`, or a temporary directory when none is given, and run
/// the layer shape checks on the result. Returns the layers found.
pub fn run_smoke(
    input: &Path,
    dist: Option<&Path>,
    settings: &BuildSettings,
) -> Result<Vec<String>, BuildError> {
    let temp;
    let dist = match dist {
        Some(path) => path.to_path_buf(),
        None => {
            temp = tempfile::tempdir().map_err(|err| BuildError::Io(err.to_string()))?;
            temp.path().to_path_buf()
        }
    };
    compile_dataset(&CompileInput {
        input: input.to_path_buf(),
        dist: dist.clone(),
        spec: None,
        layers_meta: None,
        generated_at: None,
        settings: settings.clone(),
    })?;
    crate::check::verify_layer_shape(&dist)
}
