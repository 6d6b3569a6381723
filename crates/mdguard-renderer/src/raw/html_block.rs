//! Raw HTML passthrough between paired delimiters.

use crate::error::ProcessorError;
use crate::placeholder::PlaceholderAllocator;
use crate::processor::{Processor, ValidationResults};

/// Default delimiter around raw HTML blocks.
pub const DEFAULT_DELIMITER: &str = "{html}";

/// Extracts raw HTML between paired delimiters before conversion.
///
/// ```markdown
/// Some text
/// {html}
/// <div>Some HTML</div>
/// {html}
/// More text
/// ```
///
/// Every block becomes its own paragraph-level placeholder. After conversion
/// the `<p>` wrapper the converter put around the placeholder is removed
/// together with it, and the raw content is inserted verbatim.
///
/// An odd number of delimiters is reported as
/// [`UNBALANCED_DELIMITERS`](Self::UNBALANCED_DELIMITERS) and leaves the
/// document untouched.
pub struct HtmlBlockProcessor {
    delimiter: String,
    blocks: Vec<(String, String)>,
    results: ValidationResults,
}

impl Default for HtmlBlockProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlBlockProcessor {
    /// Validation code for an odd number of delimiters.
    pub const UNBALANCED_DELIMITERS: u32 = 167_601;

    /// Create a processor using [`DEFAULT_DELIMITER`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_delimiter(DEFAULT_DELIMITER)
    }

    /// Create a processor with a custom delimiter.
    #[must_use]
    pub fn with_delimiter(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
            blocks: Vec::new(),
            results: ValidationResults::new(),
        }
    }

    /// The delimiter this processor splits on.
    #[must_use]
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }
}

impl Processor for HtmlBlockProcessor {
    fn reset(&mut self) {
        self.blocks.clear();
        self.results.clear();
    }

    fn pre_process(
        &mut self,
        content: &str,
        placeholders: &PlaceholderAllocator,
    ) -> Result<String, ProcessorError> {
        if self.delimiter.is_empty() || !content.contains(&self.delimiter) {
            return Ok(content.to_owned());
        }

        let parts: Vec<&str> = content.split(self.delimiter.as_str()).collect();

        if parts.len().is_multiple_of(2) {
            self.results.add_error(
                format!(
                    "The {} commands are not balanced, there is one too many or not enough.",
                    self.delimiter
                ),
                Self::UNBALANCED_DELIMITERS,
            );
            return Ok(content.to_owned());
        }

        let mut output = String::with_capacity(content.len());
        for (idx, part) in parts.into_iter().enumerate() {
            if idx.is_multiple_of(2) {
                output.push_str(part);
                continue;
            }

            let placeholder = placeholders.next();
            output.push_str("\n\n");
            output.push_str(&placeholder);
            output.push_str("\n\n");
            self.blocks.push((placeholder, part.to_owned()));
        }

        tracing::debug!(count = self.blocks.len(), "Extracted raw HTML blocks");

        Ok(output)
    }

    fn post_process(&mut self, html: &mut String) {
        if self.blocks.is_empty() {
            return;
        }

        for (placeholder, block) in self.blocks.drain(..) {
            *html = html.replace(&format!("<p>{placeholder}</p>"), &block);
        }
    }

    fn results(&self) -> &ValidationResults {
        &self.results
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_no_delimiter_is_noop() {
        let mut processor = HtmlBlockProcessor::new();
        let output = processor
            .pre_process("plain text", &PlaceholderAllocator::new())
            .unwrap();
        assert_eq!(output, "plain text");
        assert!(processor.results().is_valid());
    }

    #[test]
    fn test_extracts_blocks() {
        let mut processor = HtmlBlockProcessor::new();
        let output = processor
            .pre_process("a{html}<b>x</b>{html}c", &PlaceholderAllocator::new())
            .unwrap();
        assert_eq!(output, "a\n\nMDGUARD000000000001X\n\nc");
    }

    #[test]
    fn test_restores_blocks() {
        let mut processor = HtmlBlockProcessor::new();
        let _ = processor
            .pre_process("a{html}<b>x</b>{html}c", &PlaceholderAllocator::new())
            .unwrap();

        let mut html = "<p>a</p>\n<p>MDGUARD000000000001X</p>\n<p>c</p>\n".to_owned();
        processor.post_process(&mut html);
        assert_eq!(html, "<p>a</p>\n<b>x</b>\n<p>c</p>\n");
    }

    #[test]
    fn test_unbalanced() {
        let mut processor = HtmlBlockProcessor::new();
        let input = "a{html}<b>x</b>";
        let output = processor
            .pre_process(input, &PlaceholderAllocator::new())
            .unwrap();

        assert_eq!(output, input);
        assert!(!processor.results().is_valid());
        assert!(
            processor
                .results()
                .contains_code(HtmlBlockProcessor::UNBALANCED_DELIMITERS)
        );
    }

    #[test]
    fn test_custom_delimiter() {
        let mut processor = HtmlBlockProcessor::with_delimiter("%%%");
        assert_eq!(processor.delimiter(), "%%%");
        let output = processor
            .pre_process("%%%<hr>%%%", &PlaceholderAllocator::new())
            .unwrap();
        assert_eq!(output, "\n\nMDGUARD000000000001X\n\n");
    }

    #[test]
    fn test_reset_clears_errors() {
        let mut processor = HtmlBlockProcessor::new();
        let _ = processor
            .pre_process("{html}", &PlaceholderAllocator::new())
            .unwrap();
        assert!(!processor.results().is_valid());
        processor.reset();
        assert!(processor.results().is_valid());
    }
}
