//! Command-based processor.
//!
//! Detects `{name: attributes}` commands before conversion, hides them behind
//! placeholders and renders them back into the converted HTML.

use std::sync::Arc;

use regex::{Captures, Regex};

use super::{Command, Renderable};
use crate::error::ProcessorError;
use crate::placeholder::PlaceholderAllocator;
use crate::processor::{Processor, ValidationResults};

/// A registered command name with its detection pattern.
struct RegisteredCommand {
    name: String,
    pattern: Regex,
    renderer: Arc<dyn Renderable>,
}

/// Processor for the `{name: attributes}` command syntax.
///
/// Command names are matched case-insensitively. The attribute text runs up
/// to the next closing brace and may span several lines.
///
/// Detection runs once per registered name, in registration order: every
/// occurrence of the first name gets its placeholder before any occurrence of
/// the second name, regardless of where they appear in the document.
///
/// # Example
///
/// ```
/// use mdguard_renderer::command::{AttributeList, CommandProcessor};
/// use mdguard_renderer::{PlaceholderAllocator, Processor};
///
/// let mut processor = CommandProcessor::new().with_command("kbd", |attrs: &AttributeList| {
///     format!("<kbd>{}</kbd>", attrs.first_value().unwrap_or_default())
/// });
///
/// let placeholders = PlaceholderAllocator::new();
/// let markdown = processor.pre_process(r#"Press {kbd: "Ctrl+C"}."#, &placeholders).unwrap();
/// assert_eq!(markdown, "Press MDGUARD000000000001X.");
///
/// let mut html = format!("<p>{markdown}</p>");
/// processor.post_process(&mut html);
/// assert_eq!(html, "<p>Press <kbd>Ctrl+C</kbd>.</p>");
/// ```
#[derive(Default)]
pub struct CommandProcessor {
    commands: Vec<RegisteredCommand>,
    /// Detected commands keyed by placeholder, in allocation order.
    pending: Vec<(String, Command)>,
    results: ValidationResults,
}

impl CommandProcessor {
    /// Create a processor without registered commands.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command.
    ///
    /// Registering a name again replaces its renderer but keeps its original
    /// position in the detection order.
    ///
    /// # Panics
    ///
    /// The name is escaped before it goes into the detection pattern, so
    /// compilation only fails for a name large enough to exceed the regex
    /// size limit (several megabytes). That panics.
    pub fn register<R: Renderable + 'static>(&mut self, name: &str, renderer: R) {
        let renderer: Arc<dyn Renderable> = Arc::new(renderer);

        if let Some(existing) = self.commands.iter_mut().find(|c| c.name == name) {
            existing.renderer = renderer;
            return;
        }

        let pattern = Regex::new(&format!(r"(?i)\{{\s*{}\s*:([^}}]*)\}}", regex::escape(name)))
            .expect("escaped command name is a valid pattern");

        self.commands.push(RegisteredCommand {
            name: name.to_owned(),
            pattern,
            renderer,
        });
    }

    /// Register a command (builder style).
    #[must_use]
    pub fn with_command<R: Renderable + 'static>(mut self, name: &str, renderer: R) -> Self {
        self.register(name, renderer);
        self
    }

    /// Registered command names in detection order.
    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.name.as_str())
    }

    /// Commands detected by the last pre-processing pass and not yet rendered.
    pub fn pending(&self) -> impl Iterator<Item = (&str, &Command)> {
        self.pending.iter().map(|(p, c)| (p.as_str(), c))
    }
}

impl Processor for CommandProcessor {
    fn reset(&mut self) {
        self.pending.clear();
        self.results.clear();
    }

    fn pre_process(
        &mut self,
        content: &str,
        placeholders: &PlaceholderAllocator,
    ) -> Result<String, ProcessorError> {
        let mut content = content.to_owned();

        for registered in &self.commands {
            let pending = &mut self.pending;
            let before = pending.len();

            let replaced = registered.pattern.replace_all(&content, |caps: &Captures| {
                let placeholder = placeholders.next();
                let attributes = caps.get(1).map_or("", |m| m.as_str());
                let command = Command::new(
                    &registered.name,
                    attributes,
                    Arc::clone(&registered.renderer),
                );
                pending.push((placeholder.clone(), command));
                placeholder
            });
            content = replaced.into_owned();

            let detected = pending.len() - before;
            if detected > 0 {
                tracing::debug!(command = %registered.name, count = detected, "Safeguarded commands");
            }
        }

        Ok(content)
    }

    fn post_process(&mut self, html: &mut String) {
        if self.pending.is_empty() {
            return;
        }

        let mut missing = 0_usize;
        for (placeholder, command) in self.pending.drain(..) {
            let rendered = command.render();
            if html.contains(&placeholder) {
                *html = html.replace(&placeholder, &rendered);
            } else {
                missing += 1;
            }
        }

        if missing > 0 {
            tracing::debug!(
                missing,
                "Some command placeholders were not found in the converted HTML"
            );
        }
    }

    fn results(&self) -> &ValidationResults {
        &self.results
    }
}
