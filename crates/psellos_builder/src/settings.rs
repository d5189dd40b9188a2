use std::path::Path;

use serde::{Deserialize, Serialize};

use psellos_core::LayerConfig;

use crate::error::BuildError;

pub const DEFAULT_LAYERS_META_FILENAME: &str = "layers_meta.json";

/// Build settings loaded from `psellos.toml`.
///
/// ```toml
/// [layers]
/// canon = "canon"
/// no_rel_bucket = "(none)"
/// top_n = 20
///
/// [dist]
/// layers_meta_filename = "layers_meta.json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSettings {
    #[serde(default)]
    pub layers: LayerSettings,
    #[serde(default)]
    pub dist: DistSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerSettings {
    #[serde(default)]
    pub canon: Option<String>,
    #[serde(default)]
    pub no_rel_bucket: Option<String>,
    #[serde(default)]
    pub top_n: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistSettings {
    #[serde(default)]
    pub layers_meta_filename: Option<String>,
}

impl BuildSettings {
    pub fn from_toml(content: &str) -> Result<Self, BuildError> {
        toml::from_str(content).map_err(|e| BuildError::Settings(format!("parse psellos.toml: {e}")))
    }

    /// Load settings from an optional file, then apply CLI overrides.
    pub fn from_file_and_cli(
        path: Option<&Path>,
        canon: Option<String>,
        top_n: Option<usize>,
    ) -> Result<Self, BuildError> {
        let mut settings = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| BuildError::Io(format!("read {}: {e}", path.display())))?;
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };
        if let Some(canon) = canon {
            settings.layers.canon = Some(canon);
        }
        if let Some(top_n) = top_n {
            settings.layers.top_n = Some(top_n);
        }
        Ok(settings)
    }

    pub fn layer_config(&self) -> Result<LayerConfig, BuildError> {
        let mut config = LayerConfig::default();
        if let Some(canon) = &self.layers.canon {
            if canon.is_empty() {
                return Err(BuildError::Settings("layers.canon must not be empty".to_string()));
            }
            config.canon_layer = canon.clone();
        }
        if let Some(bucket) = &self.layers.no_rel_bucket {
            config.no_rel_bucket = bucket.clone();
        }
        if let Some(top_n) = self.layers.top_n {
            if top_n == 0 {
                return Err(BuildError::Settings("layers.top_n must be at least 1".to_string()));
            }
            config.top_n = top_n;
        }
        Ok(config)
    }

    pub fn layers_meta_filename(&self) -> &str {
        self.dist
            .layers_meta_filename
            .as_deref()
            .unwrap_or(DEFAULT_LAYERS_META_FILENAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_settings_use_defaults() {
        let settings = BuildSettings::from_toml("").expect("parse");
        assert_eq!(settings.layer_config().expect("config"), LayerConfig::default());
        assert_eq!(settings.layers_meta_filename(), "layers_meta.json");
    }

    #[test]
    fn parse_full_settings() {
        let settings = BuildSettings::from_toml(
            r#"
[layers]
canon = "baseline"
no_rel_bucket = "untyped"
top_n = 5

[dist]
layers_meta_filename = "meta.json"
"#,
        )
        .expect("parse");
        let config = settings.layer_config().expect("config");
        assert_eq!(config.canon_layer, "baseline");
        assert_eq!(config.no_rel_bucket, "untyped");
        assert_eq!(config.top_n, 5);
        assert_eq!(settings.layers_meta_filename(), "meta.json");
    }

    #[test]
    fn cli_overrides_win() {
        let settings =
            BuildSettings::from_file_and_cli(None, Some("base".to_string()), Some(3)).expect("load");
        let config = settings.layer_config().expect("config");
        assert_eq!(config.canon_layer, "base");
        assert_eq!(config.top_n, 3);
    }

    #[test]
    fn zero_top_n_is_rejected() {
        let settings = BuildSettings::from_toml("[layers]\ntop_n = 0\n").expect("parse");
        assert!(matches!(settings.layer_config(), Err(BuildError::Settings(_))));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(BuildSettings::from_toml("[layers]\ncannon = \"x\"\n").is_err());
    }
}
