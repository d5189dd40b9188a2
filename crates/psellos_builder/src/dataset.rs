use std::path::Path;

use serde_json::{Map, Value};

use crate::error::BuildError;

/// A raw dataset: persons and assertions as JSON objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub persons: Vec<Map<String, Value>>,
    pub assertions: Vec<Map<String, Value>>,
}

impl Dataset {
    /// Check the dataset's structure. Missing `persons`/`assertions` arrays are empty.
    pub fn from_value(value: Value) -> Result<Self, BuildError> {
        let Value::Object(mut root) = value else {
            return Err(BuildError::Dataset("dataset must be a JSON object".to_string()));
        };
        let persons = take_objects(&mut root, "persons")?;
        for (idx, person) in persons.iter().enumerate() {
            match person.get("id") {
                Some(Value::String(id)) if !id.is_empty() => {}
                _ => {
                    return Err(BuildError::Dataset(format!(
                        "persons[{}] must have a non-empty string id",
                        idx
                    )))
                }
            }
        }
        let assertions = take_objects(&mut root, "assertions")?;
        Ok(Self {
            persons,
            assertions,
        })
    }

    pub fn person_id(person: &Map<String, Value>) -> &str {
        person.get("id").and_then(Value::as_str).unwrap_or_default()
    }
}

pub fn load_dataset(path: &Path) -> Result<Dataset, BuildError> {
    let bytes = std::fs::read(path)
        .map_err(|err| BuildError::Io(format!("read {}: {}", path.display(), err)))?;
    let value: Value =
        serde_json::from_slice(&bytes).map_err(|err| BuildError::Json(err.to_string()))?;
    Dataset::from_value(value)
}

fn take_objects(
    root: &mut Map<String, Value>,
    key: &str,
) -> Result<Vec<Map<String, Value>>, BuildError> {
    let items = match root.remove(key) {
        None => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(BuildError::Dataset(format!("{} must be an array", key))),
    };
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(BuildError::Dataset(format!("{}[{}] must be an object", key, idx))),
        })
        .collect()
}
