//! Error types for rendering.

/// Fatal error raised by a processor.
///
/// Unlike validation errors, these abort the render.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProcessorError {
    /// A user-supplied callback returned a value of the wrong shape.
    #[error("Invalid callback return value: expected an object, got {found}")]
    InvalidCallbackReturn {
        /// Description of the returned value, including its type.
        found: String,
    },
}

impl ProcessorError {
    /// Error code for [`ProcessorError::InvalidCallbackReturn`].
    pub const INVALID_CALLBACK_RETURN_VALUE: u32 = 176_201;

    /// Numeric error code.
    #[must_use]
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidCallbackReturn { .. } => Self::INVALID_CALLBACK_RETURN_VALUE,
        }
    }
}

/// Error from rendering a document.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A processor aborted the render.
    #[error("processor failed: {0}")]
    Processor(#[from] ProcessorError),

    /// Reading the source file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
