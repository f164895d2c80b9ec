//! Error type shared by schemas, definitions and the driver

use thiserror::Error;

/// Result type for definition callbacks and schema checks
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while validating or reconciling an instance
#[derive(Debug, Error)]
pub enum Error {
    #[error("the argument `{0}` is required, but no definition was found")]
    MissingAttribute(String),

    #[error("attribute `{name}` must be {expected}, got {found}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("an argument named `{0}` is not expected here")]
    UnknownAttribute(String),

    #[error("no resource or data source of kind `{0}` is registered")]
    UnknownKind(String),

    #[error("`{kind}` does not support in-place update")]
    UpdateNotSupported { kind: String },

    #[error("changing `{attribute}` requires replacement")]
    RequiresReplacement { attribute: String },

    #[error("remote object not found")]
    NotFound,

    /// A remote call failed; `summary` names the failure category
    #[error("{message}")]
    Remote {
        summary: &'static str,
        message: String,
    },

    #[error("{0}")]
    Invalid(String),
}

impl Error {
    /// Wrap a remote failure
    pub fn remote(summary: &'static str, message: impl Into<String>) -> Self {
        Self::Remote {
            summary,
            message: message.into(),
        }
    }

    /// Short, stable name for this kind of failure
    pub fn summary(&self) -> &'static str {
        match self {
            Self::MissingAttribute(_) => "Missing required attribute",
            Self::TypeMismatch { .. } => "Incorrect attribute value type",
            Self::UnknownAttribute(_) => "Unsupported argument",
            Self::UnknownKind(_) => "Unknown resource kind",
            Self::UpdateNotSupported { .. } => "Update not supported",
            Self::RequiresReplacement { .. } => "Change requires replacement",
            Self::NotFound => "Remote object not found",
            Self::Remote { summary, .. } => summary,
            Self::Invalid(_) => "Invalid configuration",
        }
    }

    /// Whether the remote object is gone
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
