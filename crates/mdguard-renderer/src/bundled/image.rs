//! `{image: ...}` command.

use crate::command::{AttributeList, CommandProcessor, Renderable};
use crate::html::{HtmlTag, escape_html};

/// Default output when the command names no file.
pub const DEFAULT_MISSING_IMAGE_MESSAGE: &str = "No image file specified";

/// Image command with extended controls.
///
/// ```text
/// {image: "test.jpg" title="Something \"here\"" width="150px" class="className"}
/// ```
///
/// Known attributes are `width`, `height`, `class`, `id`, `title` and `alt`.
/// Anything else is ignored. Sources not starting with `http` are resolved
/// against the base URL.
///
/// # Example
///
/// ```
/// use mdguard_renderer::Renderer;
/// use mdguard_renderer::bundled::ImageCommand;
///
/// let mut renderer = Renderer::new()
///     .with_processor(ImageCommand::new().with_base_url("/media").processor());
///
/// let output = renderer.render(r#"{image: "cat.png" width="40px"}"#).unwrap();
/// assert_eq!(
///     output.html,
///     "<p><img src=\"/media/cat.png\" alt=\"\" style=\"width:40px\"/></p>\n"
/// );
/// ```
#[derive(Clone, Debug)]
pub struct ImageCommand {
    base_url: String,
    missing_message: String,
}

impl Default for ImageCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageCommand {
    /// Command name used in documents.
    pub const NAME: &'static str = "image";

    /// Create the command with base URL `/`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: "/".to_owned(),
            missing_message: DEFAULT_MISSING_IMAGE_MESSAGE.to_owned(),
        }
    }

    /// Set the URL relative image sources resolve against.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the text rendered when no image file is given.
    #[must_use]
    pub fn with_missing_message(mut self, message: impl Into<String>) -> Self {
        self.missing_message = message.into();
        self
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Wrap the command in a processor handling `{image: ...}`.
    #[must_use]
    pub fn processor(self) -> CommandProcessor {
        CommandProcessor::new().with_command(Self::NAME, self)
    }

    fn resolve_source(&self, file: &str) -> String {
        if file.to_lowercase().starts_with("http") {
            file.to_owned()
        } else {
            format!("{}/{file}", self.base_url())
        }
    }
}

impl Renderable for ImageCommand {
    fn render(&self, attributes: &AttributeList) -> String {
        let Some(file) = attributes.first_value() else {
            return self.missing_message.clone();
        };

        let title = escape_html(attributes.value_by_name("title"));
        let alt = match attributes.value_by_name("alt") {
            "" => title.clone(),
            alt => escape_html(alt),
        };

        HtmlTag::new("img")
            .attr("src", escape_html(&self.resolve_source(file)))
            .attr("id", escape_html(attributes.value_by_name("id")))
            .attr("title", title)
            .attr_keep_empty("alt", alt)
            .attr("class", escape_html(attributes.value_by_name("class")))
            .attr("style", escape_html(&size_style(attributes)))
            .self_closing()
    }
}

/// `height:..;width:..` from the size attributes, sorted by property.
fn size_style(attributes: &AttributeList) -> String {
    ["height", "width"]
        .into_iter()
        .filter_map(|prop| {
            attributes
                .get(prop)
                .filter(|v| !v.is_empty())
                .map(|v| format!("{prop}:{v}"))
        })
        .collect::<Vec<_>>()
        .join(";")
}
