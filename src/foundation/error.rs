/// Convenience result type used across the compositor.
pub type CaptionResult<T> = Result<T, CaptionError>;

/// Error taxonomy for the editing session. None of these are fatal to the process; each is
/// scoped to the live session.
#[derive(thiserror::Error, Debug)]
pub enum CaptionError {
    /// Invalid configuration, style input or geometry.
    #[error("validation error: {0}")]
    Validation(String),

    /// The background image could not be fetched or decoded.
    #[error("image load error: {0}")]
    ImageLoad(String),

    /// A word could not be measured with the requested font.
    #[error("measurement error: {0}")]
    Measurement(String),

    /// Rasterization failed (surface allocation, paint setup).
    #[error("render error: {0}")]
    Render(String),

    /// The save call was rejected or could not be delivered.
    #[error("export error: {0}")]
    Export(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CaptionError {
    /// Build a [`CaptionError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CaptionError::ImageLoad`] value.
    pub fn image_load(msg: impl Into<String>) -> Self {
        Self::ImageLoad(msg.into())
    }

    /// Build a [`CaptionError::Measurement`] value.
    pub fn measurement(msg: impl Into<String>) -> Self {
        Self::Measurement(msg.into())
    }

    /// Build a [`CaptionError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`CaptionError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
