//! Processor contract and validation results.

use crate::error::ProcessorError;
use crate::placeholder::PlaceholderAllocator;

/// A safeguard step around the markdown conversion.
///
/// The [`Renderer`](crate::Renderer) calls every processor in registration
/// order in three phases:
///
/// 1. [`reset`](Self::reset) to drop state from a previous document
/// 2. [`pre_process`](Self::pre_process) on the markdown, before conversion
/// 3. [`post_process`](Self::post_process) on the converted HTML
///
/// # Example
///
/// ```
/// use mdguard_renderer::{
///     PlaceholderAllocator, Processor, ProcessorError, Renderer, ValidationResults,
/// };
///
/// /// Replaces `(c)` with a copyright sign the converter cannot touch.
/// #[derive(Default)]
/// struct Copyright {
///     placeholder: Option<String>,
///     results: ValidationResults,
/// }
///
/// impl Processor for Copyright {
///     fn reset(&mut self) {
///         self.placeholder = None;
///     }
///
///     fn pre_process(
///         &mut self,
///         content: &str,
///         placeholders: &PlaceholderAllocator,
///     ) -> Result<String, ProcessorError> {
///         let placeholder = placeholders.next();
///         let output = content.replace("(c)", &placeholder);
///         self.placeholder = Some(placeholder);
///         Ok(output)
///     }
///
///     fn post_process(&mut self, html: &mut String) {
///         if let Some(placeholder) = self.placeholder.take() {
///             *html = html.replace(&placeholder, "&copy;");
///         }
///     }
///
///     fn results(&self) -> &ValidationResults {
///         &self.results
///     }
/// }
///
/// let mut renderer = Renderer::new().with_processor(Copyright::default());
/// let output = renderer.render("(c) 2024").unwrap();
/// assert_eq!(output.html, "<p>&copy; 2024</p>\n");
/// ```
pub trait Processor: Send {
    /// Drop all per-document state, including validation results.
    fn reset(&mut self);

    /// Transform markdown before conversion.
    ///
    /// Structural problems are recorded in [`results`](Self::results) and the
    /// content is returned unchanged. An `Err` aborts the render.
    fn pre_process(
        &mut self,
        content: &str,
        placeholders: &PlaceholderAllocator,
    ) -> Result<String, ProcessorError>;

    /// Transform HTML after conversion.
    fn post_process(&mut self, html: &mut String);

    /// Validation results recorded since the last reset.
    fn results(&self) -> &ValidationResults;
}

/// A single validation error reported by a processor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValidationMessage {
    /// Human-readable description.
    pub message: String,
    /// Numeric error code, stable across releases.
    pub code: u32,
}

impl std::fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

/// Collection of validation errors.
///
/// A document is valid when the collection is empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValidationResults {
    messages: Vec<ValidationMessage>,
}

impl ValidationResults {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error.
    pub fn add_error(&mut self, message: impl Into<String>, code: u32) {
        let message = message.into();
        tracing::warn!(code, %message, "Validation error");
        self.messages.push(ValidationMessage { message, code });
    }

    /// Append all messages of another collection.
    pub fn extend(&mut self, other: &Self) {
        self.messages.extend(other.messages.iter().cloned());
    }

    /// Check that no errors were recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.messages.is_empty()
    }

    /// Check whether an error with the given code was recorded.
    #[must_use]
    pub fn contains_code(&self, code: u32) -> bool {
        self.messages.iter().any(|m| m.code == code)
    }

    /// All recorded messages in order.
    #[must_use]
    pub fn messages(&self) -> &[ValidationMessage] {
        &self.messages
    }

    /// Remove all messages.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
