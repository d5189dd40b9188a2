use serde_json::{Map, Value};

use crate::config::LayerConfig;

/// The `extensions.psellos` object of an assertion, if present.
pub fn psellos_extension(fields: &Map<String, Value>) -> Option<&Map<String, Value>> {
    fields
        .get("extensions")?
        .as_object()?
        .get("psellos")?
        .as_object()
}

/// Non-empty string value of `extensions.psellos.<key>`.
pub(crate) fn psellos_tag<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    psellos_extension(fields)?
        .get(key)?
        .as_str()
        .filter(|tag| !tag.is_empty())
}

/// Narrative layer of an assertion. Untagged assertions belong to the canon layer.
pub fn classify_layer<'a>(fields: &'a Map<String, Value>, config: &'a LayerConfig) -> &'a str {
    psellos_tag(fields, "layer").unwrap_or(config.canon_layer.as_str())
}
