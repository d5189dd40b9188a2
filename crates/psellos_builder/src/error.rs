use thiserror::Error;

use psellos_core::{CoreError, LayerMetaError};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("io error: {0}")]
    Io(String),
    #[error("json error: {0}")]
    Json(String),
    #[error("canonical json error: {0}")]
    Canonical(String),
    #[error("dataset error: {0}")]
    Dataset(String),
    #[error("duplicate person id detected: {0}")]
    DuplicatePerson(String),
    #[error("settings error: {0}")]
    Settings(String),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("layer metadata error: {0}")]
    LayerMeta(#[from] LayerMetaError),
    #[error("dist check failed: {0}")]
    Check(String),
}
