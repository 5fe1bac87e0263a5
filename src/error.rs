//! Error types for signature formatting and export

use thiserror::Error;

use crate::fields::Field;

/// Result type alias for signature operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or exporting a signature
#[derive(Error, Debug)]
pub enum Error {
    /// Export was requested while required fields are still empty
    #[error("Preencha todos os campos antes de baixar a assinatura. (faltando: {})", field_list(.0))]
    IncompleteFields(Vec<Field>),

    /// A department label outside the official list
    #[error("Unknown department: {0}")]
    InvalidDepartment(String),

    /// Avatar file could not be read or is not an image
    #[error("Invalid avatar: {0}")]
    InvalidAvatar(String),

    /// The rendering surface has no element with the preview id
    #[error("Preview element not found: #{0}")]
    PreviewNotFound(String),

    /// An image referenced by the preview could not be resolved or decoded
    #[error("Failed to load asset: {0}")]
    AssetError(String),

    /// Failed to lay out or rasterize the signature
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Failed to hand the generated image to the download sink
    #[error("Export failed: {0}")]
    ExportError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn field_list(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Whether this error is the blocking "fill every field" alert rather
    /// than an export failure.
    pub fn is_user_alert(&self) -> bool {
        matches!(self, Error::IncompleteFields(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_fields_message_lists_labels() {
        let err = Error::IncompleteFields(vec![Field::Name, Field::Phone]);
        let msg = err.to_string();
        assert!(msg.starts_with("Preencha todos os campos"));
        assert!(msg.contains("Nome Completo, Telefone"));
        assert!(err.is_user_alert());
        assert!(!Error::RenderError("x".into()).is_user_alert());
    }
}
