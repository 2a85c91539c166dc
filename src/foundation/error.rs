/// Convenience result type used across stackshot.
pub type StackshotResult<T> = Result<T, StackshotError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Every variant is locally contained: callers report it through [`StackshotError::user_notice`]
/// and keep running.
#[derive(thiserror::Error, Debug)]
pub enum StackshotError {
    /// Invalid caller-provided data (settings, CLI arguments, layer lookups).
    #[error("validation error: {0}")]
    Validation(String),

    /// A project snapshot was rejected; the store was left untouched.
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// An image could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The raster backend failed to paint a plan.
    #[error("render error: {0}")]
    Render(String),

    /// Export was refused before any raster work.
    #[error("export refused: {0}")]
    ExportRefused(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StackshotError {
    /// Build a [`StackshotError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StackshotError::Snapshot`] value.
    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot(msg.into())
    }

    /// Build a [`StackshotError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`StackshotError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`StackshotError::ExportRefused`] value.
    pub fn export_refused(msg: impl Into<String>) -> Self {
        Self::ExportRefused(msg.into())
    }

    /// Build a [`StackshotError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// The single message shown to the person driving the tool.
    pub fn user_notice(&self) -> String {
        match self {
            Self::Validation(m)
            | Self::Snapshot(m)
            | Self::Decode(m)
            | Self::Render(m)
            | Self::ExportRefused(m)
            | Self::Serde(m) => m.clone(),
            Self::Other(e) => format!("{e:#}"),
        }
    }
}

impl From<serde_json::Error> for StackshotError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
