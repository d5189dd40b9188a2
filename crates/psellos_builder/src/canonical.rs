use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::BuildError;

// serde_json is built without `preserve_order`, so `Map` is a BTreeMap and
// both writers emit object keys in ascending order at every depth.

/// Compact JSON with sorted object keys.
pub fn canonical_json_bytes(value: &Value) -> Result<Vec<u8>, BuildError> {
    serde_json::to_vec(value).map_err(|err| BuildError::Canonical(err.to_string()))
}

/// Two-space indented JSON with sorted keys and a trailing newline.
pub fn pretty_json_bytes(value: &Value) -> Result<Vec<u8>, BuildError> {
    let mut bytes =
        serde_json::to_vec_pretty(value).map_err(|err| BuildError::Json(err.to_string()))?;
    bytes.push(b'\n');
    Ok(bytes)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_json_is_stable() {
        let value = serde_json::json!({
            "b": 1,
            "a": {
                "d": [3, 2],
                "c": "text"
            }
        });
        let bytes = canonical_json_bytes(&value).expect("canonical bytes");
        let text = String::from_utf8(bytes).expect("utf8");
        assert_eq!(text, "{\"a\":{\"c\":\"text\",\"d\":[3,2]},\"b\":1}");
    }

    #[test]
    fn pretty_json_ends_with_newline() {
        let value = serde_json::json!({"z": [], "a": {"y": 1, "b": 2}});
        let text = String::from_utf8(pretty_json_bytes(&value).expect("pretty")).expect("utf8");
        assert_eq!(
            text,
            "{\n  \"a\": {\n    \"b\": 2,\n    \"y\": 1\n  },\n  \"z\": []\n}\n"
        );
    }

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
