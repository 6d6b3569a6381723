//! Command model and render capability.

use std::fmt;
use std::sync::Arc;

use super::AttributeList;

/// Renders a command from its attributes.
///
/// Implemented for any `Fn(&AttributeList) -> String` closure, so simple
/// commands do not need a dedicated type.
///
/// # Example
///
/// ```
/// use mdguard_renderer::command::{AttributeList, Renderable};
///
/// struct Kbd;
///
/// impl Renderable for Kbd {
///     fn render(&self, attributes: &AttributeList) -> String {
///         format!("<kbd>{}</kbd>", attributes.first_value().unwrap_or_default())
///     }
/// }
///
/// let attrs = AttributeList::parse(r#""Ctrl+C""#);
/// assert_eq!(Kbd.render(&attrs), "<kbd>Ctrl+C</kbd>");
///
/// let upper = |attrs: &AttributeList| attrs.value_by_name("text").to_uppercase();
/// assert_eq!(upper.render(&AttributeList::parse(r#"text="hi""#)), "HI");
/// ```
pub trait Renderable: Send + Sync {
    /// Produce the output that replaces the command.
    fn render(&self, attributes: &AttributeList) -> String;
}

impl<F> Renderable for F
where
    F: Fn(&AttributeList) -> String + Send + Sync,
{
    fn render(&self, attributes: &AttributeList) -> String {
        self(attributes)
    }
}

/// One detected occurrence of `{name: attributes}`.
///
/// Rendering consumes the command, so it renders at most once.
pub struct Command {
    name: String,
    attributes: AttributeList,
    renderer: Arc<dyn Renderable>,
}

impl Command {
    /// Create a command, parsing the raw attribute string.
    #[must_use]
    pub fn new(name: &str, attribute_string: &str, renderer: Arc<dyn Renderable>) -> Self {
        Self {
            name: name.to_lowercase(),
            attributes: AttributeList::parse(attribute_string),
            renderer,
        }
    }

    /// Lowercase command name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parsed attributes.
    #[must_use]
    pub fn attributes(&self) -> &AttributeList {
        &self.attributes
    }

    /// Render the command.
    #[must_use]
    pub fn render(self) -> String {
        self.renderer.render(&self.attributes)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}
