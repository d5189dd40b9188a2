use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::LayerConfig;
use crate::endpoint::EndpointRef;
use crate::error::CoreError;
use crate::layer::{classify_layer, psellos_tag};

pub const SUBJECT_FIELD: &str = "subject";
pub const OBJECT_FIELD: &str = "object";

/// An assertion whose `subject` and `object` (when present) are bare person ids.
///
/// All other fields are carried through verbatim so the normalized record can
/// be published as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assertion {
    fields: Map<String, Value>,
}

impl Assertion {
    /// Normalize one raw assertion object.
    pub fn normalize(raw: &Map<String, Value>) -> Result<Self, CoreError> {
        let mut fields = raw.clone();
        for field in [SUBJECT_FIELD, OBJECT_FIELD] {
            let Some(value) = fields.get_mut(field) else {
                continue;
            };
            let endpoint = EndpointRef::parse(value).ok_or_else(|| CoreError::MalformedEndpoint {
                assertion_id: describe_id(raw),
                field: field.to_string(),
                found: value.to_string(),
            })?;
            *value = Value::String(endpoint.into_id());
        }
        Ok(Self { fields })
    }

    /// The assertion id, when it is a string. Anything else is unindexable.
    pub fn id(&self) -> Option<&str> {
        self.fields.get("id")?.as_str()
    }

    pub fn subject(&self) -> Option<&str> {
        self.fields.get(SUBJECT_FIELD)?.as_str()
    }

    pub fn object(&self) -> Option<&str> {
        self.fields.get(OBJECT_FIELD)?.as_str()
    }

    /// Subject then object, skipping whichever is absent.
    pub fn participants(&self) -> impl Iterator<Item = &str> {
        self.subject().into_iter().chain(self.object())
    }

    pub fn layer<'a>(&'a self, config: &'a LayerConfig) -> &'a str {
        classify_layer(&self.fields, config)
    }

    /// Relation-type tag from `extensions.psellos.rel`.
    pub fn rel(&self) -> Option<&str> {
        psellos_tag(&self.fields, "rel")
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Normalize every assertion, stopping at the first malformed endpoint.
pub fn normalize_assertions(raw: &[Map<String, Value>]) -> Result<Vec<Assertion>, CoreError> {
    raw.iter().map(Assertion::normalize).collect()
}

fn describe_id(raw: &Map<String, Value>) -> String {
    match raw.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => "<missing id>".to_string(),
    }
}
