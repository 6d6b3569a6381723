//! `{video: ...}` command.

use crate::command::{AttributeList, CommandProcessor, Renderable};
use crate::html::{HtmlTag, escape_html};

const FALLBACK_TEXT: &str = "Your browser does not support the video tag.";

/// Embedded video player.
///
/// ```text
/// {video: "video.mp4"}
/// {video: "https://www.example.com/video.mp4" type="video/mp4"}
/// {video: "video.mp4" unmuted}
/// ```
///
/// Videos start muted unless the `unmuted` property is present. The mime
/// type comes from the `type` attribute or is guessed from the extension.
/// A command without file renders nothing.
#[derive(Clone, Debug)]
pub struct VideoCommand {
    folder_url: String,
}

impl Default for VideoCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoCommand {
    /// Command name used in documents.
    pub const NAME: &'static str = "video";

    /// Create the command with folder URL `/`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            folder_url: "/".to_owned(),
        }
    }

    /// Set the URL relative video files resolve against.
    ///
    /// An empty URL falls back to `/`.
    #[must_use]
    pub fn with_folder_url(mut self, url: impl Into<String>) -> Self {
        self.folder_url = url.into();
        self
    }

    /// Folder URL, `/` if unset.
    #[must_use]
    pub fn folder_url(&self) -> &str {
        if self.folder_url.is_empty() {
            "/"
        } else {
            &self.folder_url
        }
    }

    /// Wrap the command in a processor handling `{video: ...}`.
    #[must_use]
    pub fn processor(self) -> CommandProcessor {
        CommandProcessor::new().with_command(Self::NAME, self)
    }

    fn resolve_source(&self, file: &str) -> String {
        if file.to_lowercase().starts_with("http") {
            file.to_owned()
        } else {
            format!("{}/{file}", self.folder_url().trim_end_matches('/'))
        }
    }
}

impl Renderable for VideoCommand {
    fn render(&self, attributes: &AttributeList) -> String {
        let Some(file) = attributes.first_value() else {
            return String::new();
        };

        let mime_type = match attributes.value_by_name("type") {
            "" => guess_mime_type(file),
            explicit => explicit.to_owned(),
        };

        let source = HtmlTag::new("source")
            .attr("src", escape_html(&self.resolve_source(file)))
            .attr("type", escape_html(&mime_type))
            .open();

        let mut video = HtmlTag::new("video").flag("controls");
        if !attributes.has_property("unmuted") {
            video = video.flag("muted");
        }

        video
            .attr("style", "max-width: 100%")
            .render(&format!("{source}{FALLBACK_TEXT}"))
    }
}

/// Mime type from the file extension, ignoring any query string.
fn guess_mime_type(file: &str) -> String {
    let path = file.split(['?', '#']).next().unwrap_or(file);
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_owned())
        .unwrap_or_default()
}
