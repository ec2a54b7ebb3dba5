/// Convenience result type used across Jayverse.
pub type JayverseResult<T> = Result<T, JayverseError>;

/// Top-level error taxonomy used by compositing, export and proxy APIs.
///
/// Every variant carries a human-readable message suitable for showing to the user as-is.
#[derive(thiserror::Error, Debug)]
pub enum JayverseError {
    /// Invalid user-provided parameters, paths or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// A source image, template or logo could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Errors while compositing onto a drawing surface.
    #[error("render error: {0}")]
    Render(String),

    /// Errors while encoding a finished surface (PNG, data URL).
    #[error("export error: {0}")]
    Export(String),

    /// Upload or metadata insert into the gallery store failed.
    #[error("gallery error: {0}")]
    Gallery(String),

    /// Errors talking to the hosted inference endpoints.
    #[error("proxy error: {0}")]
    Proxy(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl JayverseError {
    /// Build a [`JayverseError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`JayverseError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`JayverseError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`JayverseError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`JayverseError::Gallery`] value.
    pub fn gallery(msg: impl Into<String>) -> Self {
        Self::Gallery(msg.into())
    }

    /// Build a [`JayverseError::Proxy`] value.
    pub fn proxy(msg: impl Into<String>) -> Self {
        Self::Proxy(msg.into())
    }

    /// Build a [`JayverseError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
