use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dataset::Dataset;
use crate::error::BuildError;

pub const DEFAULT_SPEC_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub spec_version: String,
    pub generated_at: String,
    pub counts: ManifestCounts,
    pub person_index: BTreeMap<String, String>,
    /// Artifact name to sha256 of its canonical JSON bytes; filled in by the dist writer.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub artifacts: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestCounts {
    pub persons: usize,
    pub assertions: usize,
    pub layers: usize,
}

/// Spec version named by the schema file, e.g. `minimal.person-parent.v0.1.json`
/// yields `minimal.person-parent.v0.1`.
pub fn spec_version_from_path(spec_path: Option<&Path>) -> String {
    spec_path
        .and_then(|path| path.file_stem())
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| DEFAULT_SPEC_VERSION.to_string())
}

pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// Accept a caller-supplied `generated_at` only if it is RFC 3339. The text is kept as given.
pub fn validate_generated_at(value: &str) -> Result<String, BuildError> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|_| value.to_string())
        .map_err(|err| BuildError::Settings(format!("generated_at {:?} is not RFC 3339: {}", value, err)))
}

pub fn build_manifest(
    dataset: &Dataset,
    layer_count: usize,
    spec_version: String,
    generated_at: String,
) -> Result<Manifest, BuildError> {
    let mut persons: Vec<&Map<String, Value>> = dataset.persons.iter().collect();
    persons.sort_by(|a, b| Dataset::person_id(a).cmp(Dataset::person_id(b)));

    let mut person_index = BTreeMap::new();
    for person in persons {
        let person_id = Dataset::person_id(person);
        if person_index.contains_key(person_id) {
            return Err(BuildError::DuplicatePerson(person_id.to_string()));
        }
        person_index.insert(
            person_id.to_string(),
            resolve_person_display_name(person, person_id),
        );
    }

    Ok(Manifest {
        spec_version,
        generated_at,
        counts: ManifestCounts {
            persons: dataset.persons.len(),
            assertions: dataset.assertions.len(),
            layers: layer_count,
        },
        person_index,
        artifacts: BTreeMap::new(),
    })
}

/// `name`, then `label`, then the first entry of `names`, then the id itself.
pub fn resolve_person_display_name(person: &Map<String, Value>, person_id: &str) -> String {
    if let Some(name) = person.get("name").and_then(Value::as_str) {
        return name.to_string();
    }
    if let Some(label) = person.get("label").and_then(Value::as_str) {
        return label.to_string();
    }
    let first = person
        .get("names")
        .and_then(Value::as_array)
        .and_then(|names| names.first());
    match first {
        Some(Value::String(name)) => name.clone(),
        Some(Value::Object(entry)) => entry
            .get("value")
            .and_then(Value::as_str)
            .or_else(|| entry.get("name").and_then(Value::as_str))
            .unwrap_or(person_id)
            .to_string(),
        _ => person_id.to_string(),
    }
}
