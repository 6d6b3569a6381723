//! Custom command syntax: `{name: attributes}`.
//!
//! Commands are detected in the markdown source, replaced by placeholders so
//! the converter cannot escape them, and rendered into the HTML afterwards.
//!
//! # Attribute syntax
//!
//! ```text
//! {image: "photo.jpg" width="150px" title="A \"quoted\" title" lazy}
//!         ^ value     ^ named value                           ^ property
//! ```
//!
//! See [`AttributeList::parse`] for the exact tokenizing rules.

mod attributes;
mod model;
mod processor;

pub use attributes::{Attribute, AttributeList};
pub use model::{Command, Renderable};
pub use processor::CommandProcessor;
