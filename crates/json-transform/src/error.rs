use json_transform_selector::ParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// Selector text that does not parse.
    #[error("Invalid selector '{selector}': {source}")]
    Selector {
        selector: String,
        #[source]
        source: ParseError,
    },

    /// Document text that does not parse.
    #[error("Invalid document: {0}")]
    Document(#[from] serde_json::Error),

    /// A selector construct the engine does not implement.
    #[error("Unsupported selector: {0}")]
    UnsupportedSelector(String),

    /// Structural misuse of the tree.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A transformation referenced a child that does not exist.
    #[error("Missing target: {0}")]
    MissingTarget(String),
}

impl TransformError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        TransformError::InvalidOperation(message.into())
    }

    /// Malformed selector or document text.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            TransformError::Selector { .. } | TransformError::Document(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
