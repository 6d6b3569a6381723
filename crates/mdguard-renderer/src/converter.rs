//! Markdown to HTML conversion.
//!
//! The renderer treats conversion as a black box: processors only see the
//! markdown before and the HTML after. Any [`Converter`] can be plugged in;
//! [`CmarkConverter`] is the default.

use std::collections::HashMap;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};

use crate::placeholder::strip_placeholders;

/// Converts a markdown document to HTML.
///
/// Implemented for plain `Fn(&str) -> String` closures.
pub trait Converter: Send {
    /// Convert a complete document.
    fn convert(&self, markdown: &str) -> String;
}

impl<F> Converter for F
where
    F: Fn(&str) -> String + Send,
{
    fn convert(&self, markdown: &str) -> String {
        self(markdown)
    }
}

/// Class of the anchor appended to headings with permalinks enabled.
pub const PERMALINK_CLASS: &str = "permalink";

/// CommonMark converter backed by `pulldown-cmark`.
///
/// GFM extensions and heading ids are enabled by default, permalink anchors
/// are not.
#[derive(Clone, Copy, Debug)]
pub struct CmarkConverter {
    gfm: bool,
    heading_ids: bool,
    permalinks: bool,
}

impl Default for CmarkConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl CmarkConverter {
    /// Create a converter with GFM and heading ids enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gfm: true,
            heading_ids: true,
            permalinks: false,
        }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Enable or disable slug ids on headings.
    #[must_use]
    pub fn with_heading_ids(mut self, enabled: bool) -> Self {
        self.heading_ids = enabled;
        self
    }

    /// Append a `§` permalink anchor to every heading that has an id.
    ///
    /// ```
    /// use mdguard_renderer::{CmarkConverter, Converter};
    ///
    /// let converter = CmarkConverter::new().with_permalinks(true);
    /// assert_eq!(
    ///     converter.convert("# Setup"),
    ///     "<h1 id=\"setup\">Setup<a class=\"permalink\" href=\"#setup\" aria-hidden=\"true\" title=\"Permalink\">§</a></h1>\n"
    /// );
    /// ```
    ///
    /// Has no effect with heading ids disabled.
    #[must_use]
    pub fn with_permalinks(mut self, enabled: bool) -> Self {
        self.permalinks = enabled;
        self
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }
}

impl Converter for CmarkConverter {
    fn convert(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.parser_options());
        let mut output = String::with_capacity(markdown.len() + markdown.len() / 2);

        if self.heading_ids {
            let mut events: Vec<Event<'_>> = parser.collect();
            let anchors = assign_heading_ids(&mut events);
            if self.permalinks {
                events = insert_permalinks(events, anchors);
            }
            html::push_html(&mut output, events.into_iter());
        } else {
            html::push_html(&mut output, parser);
        }

        output
    }
}

/// Set a unique slug id on every heading without one.
///
/// Returns the index of each heading's end event with the id it received.
fn assign_heading_ids(events: &mut [Event<'_>]) -> Vec<(usize, String)> {
    let mut ids = HeadingIds::default();
    let mut open: Option<(usize, String)> = None;
    let mut assigned = Vec::new();
    let mut anchors = Vec::new();

    for (idx, event) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::Heading { id: None, .. }) => open = Some((idx, String::new())),
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buffer)) = &mut open {
                    buffer.push_str(text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((start, text)) = open.take()
                    && let Some(id) = ids.generate(&text)
                {
                    anchors.push((idx, id.clone()));
                    assigned.push((start, id));
                }
            }
            _ => {}
        }
    }

    for (start, new_id) in assigned {
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[start] {
            *id = Some(new_id.into());
        }
    }

    anchors
}

/// Insert a permalink anchor before each given heading end event.
fn insert_permalinks<'a>(
    events: Vec<Event<'a>>,
    anchors: Vec<(usize, String)>,
) -> Vec<Event<'a>> {
    let mut output = Vec::with_capacity(events.len() + anchors.len());
    let mut anchors = anchors.into_iter().peekable();

    for (idx, event) in events.into_iter().enumerate() {
        if let Some((_, id)) = anchors.next_if(|(end, _)| *end == idx) {
            output.push(Event::InlineHtml(CowStr::from(format!(
                r##"<a class="{PERMALINK_CLASS}" href="#{id}" aria-hidden="true" title="Permalink">§</a>"##
            ))));
        }
        output.push(event);
    }

    output
}

#[derive(Default)]
struct HeadingIds {
    counts: HashMap<String, usize>,
}

impl HeadingIds {
    /// Unique id for a heading text, `None` if the text has no slug.
    fn generate(&mut self, text: &str) -> Option<String> {
        let base_id = slugify(&strip_placeholders(text));
        if base_id.is_empty() {
            return None;
        }

        let count = self.counts.entry(base_id.clone()).or_default();
        let id = match *count {
            0 => base_id,
            n => format!("{base_id}-{n}"),
        };
        *count += 1;
        Some(id)
    }
}

/// Convert text to URL-safe slug.
///
/// Converts to lowercase, replaces whitespace/dashes/underscores with single dashes,
/// and removes other non-alphanumeric characters.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true;

    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}
