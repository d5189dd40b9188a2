//! Serialization of compiled artifacts into a `dist/` directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use psellos_core::CompiledLayers;

use crate::canonical::{canonical_json_bytes, pretty_json_bytes, sha256_hex};
use crate::error::BuildError;
use crate::manifest::Manifest;

pub const ASSERTIONS: &str = "assertions";
pub const ASSERTIONS_BY_ID: &str = "assertions_by_id";
pub const ASSERTIONS_BY_PERSON: &str = "assertions_by_person";
pub const ASSERTIONS_BY_LAYER: &str = "assertions_by_layer";
pub const ASSERTIONS_BY_PERSON_BY_LAYER: &str = "assertions_by_person_by_layer";
pub const LAYERS: &str = "layers";
pub const LAYERS_META: &str = "layers_meta";
pub const LAYER_STATS: &str = "layer_stats";
pub const MANIFEST: &str = "manifest";

/// Every artifact a build can produce, manifest included.
pub const KNOWN_ARTIFACTS: [&str; 9] = [
    ASSERTIONS,
    ASSERTIONS_BY_ID,
    ASSERTIONS_BY_PERSON,
    ASSERTIONS_BY_LAYER,
    ASSERTIONS_BY_PERSON_BY_LAYER,
    LAYERS,
    LAYERS_META,
    LAYER_STATS,
    MANIFEST,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifact {
    pub name: String,
    pub path: PathBuf,
    pub sha256: String,
}

pub fn artifact_path(dist: &Path, name: &str) -> PathBuf {
    dist.join(format!("{}.json", name))
}

/// Named JSON values for every artifact derived from `compiled`. `layers_meta`
/// is included only when a metadata merge succeeded.
pub fn artifact_values(compiled: &CompiledLayers) -> Result<Vec<(&'static str, Value)>, BuildError> {
    let mut values = vec![
        (ASSERTIONS, to_value(&compiled.assertions)?),
        (ASSERTIONS_BY_ID, to_value(compiled.index.by_id())?),
        (ASSERTIONS_BY_PERSON, to_value(compiled.index.by_participant())?),
        (ASSERTIONS_BY_LAYER, to_value(compiled.index.by_layer())?),
        (
            ASSERTIONS_BY_PERSON_BY_LAYER,
            to_value(compiled.index.by_participant_by_layer())?,
        ),
        (LAYERS, to_value(&compiled.index.layers())?),
        (LAYER_STATS, to_value(&compiled.stats)?),
    ];
    if let Some(Ok(merge)) = &compiled.layers_meta {
        values.push((LAYERS_META, to_value(&merge.document)?));
    }
    values.sort_by(|a, b| a.0.cmp(b.0));
    Ok(values)
}

/// Write each artifact, record its hash in `manifest`, then write the manifest.
///
/// Known artifacts from an earlier build that are absent from `artifacts` are
/// removed first, so the directory always matches the manifest.
pub fn write_dist(
    dist: &Path,
    artifacts: &[(&'static str, Value)],
    manifest: &mut Manifest,
) -> Result<Vec<WrittenArtifact>, BuildError> {
    fs::create_dir_all(dist)
        .map_err(|err| BuildError::Io(format!("create {}: {}", dist.display(), err)))?;
    remove_stale_artifacts(dist, artifacts)?;

    let mut written = Vec::with_capacity(artifacts.len() + 1);
    for (name, value) in artifacts {
        let sha256 = sha256_hex(&canonical_json_bytes(value)?);
        let path = artifact_path(dist, name);
        write_atomic(&path, &pretty_json_bytes(value)?)?;
        debug!(artifact = %name, sha256 = %sha256, "wrote artifact");
        manifest.artifacts.insert(name.to_string(), sha256.clone());
        written.push(WrittenArtifact {
            name: name.to_string(),
            path,
            sha256,
        });
    }

    let manifest_value = to_value(&*manifest)?;
    let path = artifact_path(dist, MANIFEST);
    write_atomic(&path, &pretty_json_bytes(&manifest_value)?)?;
    written.push(WrittenArtifact {
        name: MANIFEST.to_string(),
        path,
        sha256: sha256_hex(&canonical_json_bytes(&manifest_value)?),
    });
    Ok(written)
}

fn remove_stale_artifacts(dist: &Path, artifacts: &[(&'static str, Value)]) -> Result<(), BuildError> {
    for name in KNOWN_ARTIFACTS {
        if name == MANIFEST || artifacts.iter().any(|(current, _)| *current == name) {
            continue;
        }
        let path = artifact_path(dist, name);
        if path.is_file() {
            fs::remove_file(&path)
                .map_err(|err| BuildError::Io(format!("remove {}: {}", path.display(), err)))?;
            debug!(artifact = %name, "removed stale artifact");
        }
    }
    Ok(())
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, BuildError> {
    serde_json::to_value(value).map_err(|err| BuildError::Json(err.to_string()))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), BuildError> {
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, bytes)
        .map_err(|err| BuildError::Io(format!("write {}: {}", tmp_path.display(), err)))?;
    fs::rename(&tmp_path, path)
        .map_err(|err| BuildError::Io(format!("rename {}: {}", path.display(), err)))?;
    Ok(())
}
