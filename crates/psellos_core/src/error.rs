use thiserror::Error;

/// Errors raised while normalizing assertions. Any of these aborts a compile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("unrecognized endpoint shape for {field} of assertion {assertion_id}: {found}")]
    MalformedEndpoint {
        assertion_id: String,
        field: String,
        found: String,
    },
}

/// Structural problems in a layer metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerMetaError {
    #[error("layer metadata must contain a `layers` array")]
    MissingLayers,
    #[error("layer metadata entry {index} must be an object")]
    EntryNotObject { index: usize },
    #[error("layer metadata entry {index} is missing a string `id`")]
    MissingId { index: usize },
    #[error("layer metadata entry {index} has an empty `id`")]
    EmptyId { index: usize },
    #[error("duplicate layer metadata id: {0}")]
    DuplicateId(String),
    #[error("layer metadata `order` for {id} must be an integer")]
    OrderNotInteger { id: String },
}
