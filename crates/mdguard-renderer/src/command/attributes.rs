//! Command attribute parsing.
//!
//! Parses the free-form attribute part of `{name: "value" key="value" flag}`.

/// Stand-in for `\"` while the attribute string is scanned.
///
/// Input that already contains this private-use character gets it turned
/// into a literal quote inside values. Escaping is deliberately not more
/// elaborate than that.
const ESCAPED_QUOTE: char = '\u{E000}';

/// A single parsed attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Attribute {
    /// Bare flag without value: `unmuted`.
    Property(String),
    /// Quoted value without name: `"video.mp4"`.
    Value(String),
    /// Named value: `width="45px"`.
    NamedValue {
        /// Attribute name, case-sensitive as written.
        name: String,
        /// Unquoted value with escaped quotes restored.
        value: String,
    },
}

impl Attribute {
    /// Create a property attribute.
    #[must_use]
    pub fn property(name: impl Into<String>) -> Self {
        Self::Property(name.into())
    }

    /// Create an unnamed value attribute.
    #[must_use]
    pub fn value(value: impl Into<String>) -> Self {
        Self::Value(value.into())
    }

    /// Create a named value attribute.
    #[must_use]
    pub fn named(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::NamedValue {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Name of a property or named value.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Property(name) | Self::NamedValue { name, .. } => Some(name),
            Self::Value(_) => None,
        }
    }

    /// Value of a value or named value.
    #[must_use]
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Self::Value(value) | Self::NamedValue { value, .. } => Some(value),
            Self::Property(_) => None,
        }
    }
}

/// Ordered list of attributes parsed from a command.
///
/// # Example
///
/// ```
/// use mdguard_renderer::command::{Attribute, AttributeList};
///
/// let attrs = AttributeList::parse(r#""test.jpg" width="45px" property class="c""#);
/// assert_eq!(attrs.first_value(), Some("test.jpg"));
/// assert_eq!(attrs.value_by_name("width"), "45px");
/// assert!(attrs.has_property("property"));
/// assert_eq!(attrs.value_by_name("missing"), "");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AttributeList {
    attributes: Vec<Attribute>,
}

impl AttributeList {
    /// Create a list from already parsed attributes.
    #[must_use]
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }

    /// Parse an attribute string.
    ///
    /// Parsing is lenient: an unterminated quote drops the dangling value and
    /// never produces an error.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let escaped = input.trim().replace(r#"\""#, &ESCAPED_QUOTE.to_string());

        let mut attributes = Vec::new();
        let mut in_quotes = false;
        let mut buffer = String::new();
        let mut name = String::new();

        for c in escaped.chars() {
            if c == '"' {
                if in_quotes {
                    let value = restore_quotes(buffer.trim());
                    if !name.is_empty() {
                        attributes.push(Attribute::NamedValue {
                            name: std::mem::take(&mut name),
                            value,
                        });
                    } else if !value.is_empty() {
                        attributes.push(Attribute::Value(value));
                    }
                } else {
                    name = trim_name(&buffer);
                }
                in_quotes = !in_quotes;
                buffer.clear();
                continue;
            }

            if c.is_whitespace() && !in_quotes {
                push_property(&mut attributes, &buffer);
                buffer.clear();
                continue;
            }

            buffer.push(c);
        }

        if !in_quotes {
            push_property(&mut attributes, &buffer);
        }

        Self { attributes }
    }

    /// All attributes in source order.
    #[must_use]
    pub fn all(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Unnamed value attributes in source order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().filter_map(|attr| match attr {
            Attribute::Value(value) => Some(value.as_str()),
            _ => None,
        })
    }

    /// First unnamed value, typically the subject of the command.
    #[must_use]
    pub fn first_value(&self) -> Option<&str> {
        self.values().next()
    }

    /// Value of the first named value called `name` (case-sensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find_map(|attr| match attr {
            Attribute::NamedValue { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// Value of the named value called `name`, or an empty string.
    #[must_use]
    pub fn value_by_name(&self, name: &str) -> &str {
        self.get(name).unwrap_or_default()
    }

    /// Check whether a bare property is present (case-sensitive).
    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.attributes
            .iter()
            .any(|attr| matches!(attr, Attribute::Property(p) if p == name))
    }

    /// Number of parsed attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Check if no attributes were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

fn trim_name(s: &str) -> String {
    restore_quotes(s.trim_matches(|c: char| c.is_whitespace() || c == '='))
}

fn restore_quotes(s: &str) -> String {
    s.replace(ESCAPED_QUOTE, "\"")
}

fn push_property(attributes: &mut Vec<Attribute>, buffer: &str) {
    let name = trim_name(buffer);
    if !name.is_empty() {
        attributes.push(Attribute::Property(name));
    }
}
