//! Small HTML building helpers for command renderers.

use std::fmt::Write;

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Builder for a single HTML element.
///
/// Attributes render in insertion order. Values are written as given, so
/// callers escape untrusted text with [`escape_html`] first.
///
/// # Example
///
/// ```
/// use mdguard_renderer::html::HtmlTag;
///
/// let tag = HtmlTag::new("video")
///     .flag("controls")
///     .attr("style", "max-width: 100%")
///     .render("Fallback");
///
/// assert_eq!(tag, r#"<video controls style="max-width: 100%">Fallback</video>"#);
/// ```
#[derive(Clone, Debug)]
pub struct HtmlTag {
    name: &'static str,
    attributes: Vec<(&'static str, Option<String>)>,
}

impl HtmlTag {
    /// Start an element.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attributes: Vec::new(),
        }
    }

    /// Add an attribute. Empty values are skipped.
    #[must_use]
    pub fn attr(self, name: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            return self;
        }
        self.attr_keep_empty(name, value)
    }

    /// Add an attribute even if its value is empty.
    #[must_use]
    pub fn attr_keep_empty(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((name, Some(value.into())));
        self
    }

    /// Add a boolean attribute without value.
    #[must_use]
    pub fn flag(mut self, name: &'static str) -> Self {
        self.attributes.push((name, None));
        self
    }

    /// Render as a self-closing element: `<img .../>`.
    #[must_use]
    pub fn self_closing(&self) -> String {
        let mut out = self.open();
        out.insert(out.len() - 1, '/');
        out
    }

    /// Render only the opening tag: `<source ...>`.
    #[must_use]
    pub fn open(&self) -> String {
        let mut out = String::with_capacity(16 + self.attributes.len() * 16);
        out.push('<');
        out.push_str(self.name);
        for (name, value) in &self.attributes {
            match value {
                Some(value) => write!(out, r#" {name}="{value}""#).unwrap(),
                None => write!(out, " {name}").unwrap(),
            }
        }
        out.push('>');
        out
    }

    /// Render with content and closing tag.
    #[must_use]
    pub fn render(&self, content: &str) -> String {
        format!("{}{content}</{}>", self.open(), self.name)
    }
}
