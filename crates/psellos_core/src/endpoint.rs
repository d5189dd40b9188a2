use serde_json::Value;

/// A reference to a person as it appears in an assertion's `subject` or `object`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointRef {
    DirectId(String),
    ObjectRef { id: String },
}

impl EndpointRef {
    /// Parse a raw endpoint. Returns `None` for any shape other than a bare
    /// string or an object carrying a string or numeric `id`.
    pub fn parse(value: &Value) -> Option<Self> {
        match value {
            Value::String(id) => Some(EndpointRef::DirectId(id.clone())),
            Value::Object(map) => match map.get("id")? {
                Value::String(id) => Some(EndpointRef::ObjectRef { id: id.clone() }),
                Value::Number(num) => Some(EndpointRef::ObjectRef {
                    id: num.to_string(),
                }),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn into_id(self) -> String {
        match self {
            EndpointRef::DirectId(id) => id,
            EndpointRef::ObjectRef { id } => id,
        }
    }
}
