//! Library error type.

use std::path::PathBuf;

use crate::model::ApiItemKind;

/// Errors raised while loading a model or generating pages.
///
/// Everything here is fatal for the run that raised it. Cosmetic problems
/// (an unresolvable `{@link}`) are logged and never become an error.
#[derive(Debug, thiserror::Error)]
pub enum DocumenterError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("the input folder does not exist: {}", .0.display())]
    InputFolderMissing(PathBuf),

    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported API item kind: {0:?}")]
    UnsupportedKind(ApiItemKind),
}

impl DocumenterError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DocumenterError>;
