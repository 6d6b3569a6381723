//! Pipeline orchestration: pre-process, convert, post-process.

use std::fmt;
use std::path::Path;

use crate::converter::{CmarkConverter, Converter};
use crate::error::RenderError;
use crate::placeholder::PlaceholderAllocator;
use crate::processor::{Processor, ValidationResults};

/// Stage of the render pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// No render in progress.
    #[default]
    Idle,
    /// Processors transform the markdown.
    PreProcess,
    /// The converter runs.
    Convert,
    /// Processors transform the HTML.
    PostProcess,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::PreProcess => "pre-process",
            Self::Convert => "convert",
            Self::PostProcess => "post-process",
        })
    }
}

/// Result of rendering a document.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RenderOutput {
    /// Converted HTML with all safeguarded content restored.
    pub html: String,
    /// Validation errors of all processors, in processor order.
    pub results: ValidationResults,
}

impl RenderOutput {
    /// Check that no processor reported a validation error.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.results.is_valid()
    }
}

/// Markdown renderer with safeguard processors.
///
/// Processors run in registration order, all pre-processing steps chained
/// before a single conversion, then all post-processing steps.
///
/// # Example
///
/// ```
/// use mdguard_renderer::Renderer;
/// use mdguard_renderer::bundled::ImageCommand;
/// use mdguard_renderer::raw::HtmlBlockProcessor;
///
/// let mut renderer = Renderer::new()
///     .with_processor(HtmlBlockProcessor::new())
///     .with_processor(ImageCommand::new().processor());
///
/// let output = renderer.render("{html}<hr>{html}").unwrap();
/// assert_eq!(output.html, "<hr>\n");
/// assert!(output.is_valid());
///
/// let output = renderer.render("{html}").unwrap();
/// assert!(output.results.contains_code(HtmlBlockProcessor::UNBALANCED_DELIMITERS));
/// ```
pub struct Renderer {
    converter: Box<dyn Converter>,
    processors: Vec<Box<dyn Processor>>,
    placeholders: PlaceholderAllocator,
    results: ValidationResults,
    phase: Phase,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("processors", &self.processors.len())
            .field("placeholders", &self.placeholders)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl Renderer {
    /// Create a renderer with the default converter and the process-wide
    /// placeholder allocator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            converter: Box::new(CmarkConverter::new()),
            processors: Vec::new(),
            placeholders: PlaceholderAllocator::global(),
            results: ValidationResults::new(),
            phase: Phase::Idle,
        }
    }

    /// Replace the markdown converter.
    #[must_use]
    pub fn with_converter(mut self, converter: impl Converter + 'static) -> Self {
        self.converter = Box::new(converter);
        self
    }

    /// Use a specific placeholder allocator.
    #[must_use]
    pub fn with_placeholders(mut self, placeholders: PlaceholderAllocator) -> Self {
        self.placeholders = placeholders;
        self
    }

    /// Append a processor (builder style).
    #[must_use]
    pub fn with_processor(mut self, processor: impl Processor + 'static) -> Self {
        self.add_processor(processor);
        self
    }

    /// Append a processor.
    pub fn add_processor(&mut self, processor: impl Processor + 'static) {
        self.processors.push(Box::new(processor));
    }

    /// Number of registered processors.
    #[must_use]
    pub fn processor_count(&self) -> usize {
        self.processors.len()
    }

    /// Current pipeline stage.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Aggregated validation results of the last render.
    #[must_use]
    pub fn results(&self) -> &ValidationResults {
        &self.results
    }

    /// Check that the last render produced no validation errors.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.results.is_valid()
    }

    /// Render a markdown document.
    ///
    /// Validation errors do not abort the render; they are returned with the
    /// HTML. An error is returned only when a processor fails.
    pub fn render(&mut self, markdown: &str) -> Result<RenderOutput, RenderError> {
        self.results.clear();
        for processor in &mut self.processors {
            processor.reset();
        }

        let result = self.run(markdown);
        self.enter(Phase::Idle);
        let html = result?;

        for processor in &self.processors {
            self.results.extend(processor.results());
        }

        tracing::debug!(
            processors = self.processors.len(),
            errors = self.results.messages().len(),
            "Rendered document"
        );

        Ok(RenderOutput {
            html,
            results: self.results.clone(),
        })
    }

    /// Read and render a markdown file.
    pub fn render_file(&mut self, path: impl AsRef<Path>) -> Result<RenderOutput, RenderError> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "Rendering file");
        let markdown = std::fs::read_to_string(path)?;
        self.render(&markdown)
    }

    fn run(&mut self, markdown: &str) -> Result<String, RenderError> {
        self.enter(Phase::PreProcess);
        let mut content = markdown.to_owned();
        for processor in &mut self.processors {
            content = processor.pre_process(&content, &self.placeholders)?;
        }

        self.enter(Phase::Convert);
        let mut html = self.converter.convert(&content);

        self.enter(Phase::PostProcess);
        for processor in &mut self.processors {
            processor.post_process(&mut html);
        }

        Ok(html)
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!(from = %self.phase, to = %phase, "Render phase");
        self.phase = phase;
    }
}

/// Convert markdown to HTML without any processors.
#[must_use]
pub fn render_markdown(markdown: &str) -> String {
    CmarkConverter::new().convert(markdown)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::ProcessorError;

    /// Records every call into a shared log.
    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        results: ValidationResults,
        fail_with: Option<u32>,
    }

    impl Recorder {
        fn new(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name,
                log: Arc::clone(log),
                results: ValidationResults::new(),
                fail_with: None,
            }
        }

        fn push(&self, event: &str) {
            self.log.lock().unwrap().push(format!("{}:{event}", self.name));
        }
    }

    impl Processor for Recorder {
        fn reset(&mut self) {
            self.push("reset");
            self.results.clear();
        }

        fn pre_process(
            &mut self,
            content: &str,
            _placeholders: &PlaceholderAllocator,
        ) -> Result<String, ProcessorError> {
            self.push("pre");
            if let Some(code) = self.fail_with {
                self.results.add_error(format!("{} failed", self.name), code);
            }
            Ok(format!("{content} {}", self.name))
        }

        fn post_process(&mut self, html: &mut String) {
            self.push("post");
            html.push_str(self.name);
        }

        fn results(&self) -> &ValidationResults {
            &self.results
        }
    }

    #[derive(Default)]
    struct Failing {
        results: ValidationResults,
    }

    impl Processor for Failing {
        fn reset(&mut self) {}

        fn pre_process(
            &mut self,
            _content: &str,
            _placeholders: &PlaceholderAllocator,
        ) -> Result<String, ProcessorError> {
            Err(ProcessorError::InvalidCallbackReturn {
                found: "null".to_owned(),
            })
        }

        fn post_process(&mut self, _html: &mut String) {}

        fn results(&self) -> &ValidationResults {
            &self.results
        }
    }

    #[test]
    fn test_phase_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut renderer = Renderer::new()
            .with_converter(|markdown: &str| format!("<{markdown}>"))
            .with_processor(Recorder::new("a", &log))
            .with_processor(Recorder::new("b", &log));

        let output = renderer.render("doc").unwrap();

        assert_eq!(output.html, "<doc a b>ab");
        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:reset", "b:reset", "a:pre", "b:pre", "a:post", "b:post"]
        );
        assert_eq!(renderer.phase(), Phase::Idle);
    }

    #[test]
    fn test_converter_called_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let log = Arc::new(Mutex::new(Vec::new()));

        let mut renderer = Renderer::new()
            .with_converter(move |markdown: &str| {
                counter.fetch_add(1, Ordering::SeqCst);
                markdown.to_owned()
            })
            .with_processor(Recorder::new("a", &log))
            .with_processor(Recorder::new("b", &log))
            .with_processor(Recorder::new("c", &log));

        let _ = renderer.render("x").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_results_aggregated_and_reset() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut first = Recorder::new("a", &log);
        first.fail_with = Some(1);
        let mut second = Recorder::new("b", &log);
        second.fail_with = Some(2);

        let mut renderer = Renderer::new().with_processor(first).with_processor(second);
        let output = renderer.render("x").unwrap();

        assert!(!output.is_valid());
        assert!(output.results.contains_code(1));
        assert!(output.results.contains_code(2));
        assert_eq!(output.results.messages().len(), 2);

        // A second render starts from a clean slate.
        let output = renderer.render("y").unwrap();
        assert_eq!(output.results.messages().len(), 2);
        assert!(!renderer.is_valid());
    }

    #[test]
    fn test_processor_error_aborts() {
        let mut renderer = Renderer::new().with_processor(Failing::default());
        let err = renderer.render("x").unwrap_err();

        assert!(matches!(
            err,
            RenderError::Processor(ProcessorError::InvalidCallbackReturn { .. })
        ));
        assert_eq!(renderer.phase(), Phase::Idle);
    }

    #[test]
    fn test_no_processors_matches_direct_conversion() {
        let markdown = "# Title\n\nSome *text* with {braces}.";
        let output = Renderer::new().render(markdown).unwrap();
        assert_eq!(output.html, render_markdown(markdown));
        assert!(output.is_valid());
    }

    #[test]
    fn test_private_placeholders() {
        let placeholders = PlaceholderAllocator::new();
        let mut renderer = Renderer::new()
            .with_placeholders(placeholders.clone())
            .with_processor(crate::raw::HtmlBlockProcessor::new());

        let _ = renderer.render("{html}a{html} {html}b{html}").unwrap();
        assert_eq!(placeholders.allocated(), 2);
    }

    #[test]
    fn test_render_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "Hello").unwrap();

        let output = Renderer::new().render_file(&path).unwrap();
        assert_eq!(output.html, "<p>Hello</p>\n");
    }

    #[test]
    fn test_render_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = Renderer::new()
            .render_file(dir.path().join("missing.md"))
            .unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::PreProcess.to_string(), "pre-process");
        assert_eq!(Phase::default(), Phase::Idle);
    }
}
