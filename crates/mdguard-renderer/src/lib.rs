//! Markdown renderer that safeguards custom syntax from the converter.
//!
//! Markdown converters escape or mangle anything they do not understand.
//! This crate runs a chain of [`Processor`]s around a single conversion:
//!
//! 1. **Pre-process**: each processor hides its syntax behind opaque
//!    placeholders (or rewrites it into plain markdown).
//! 2. **Convert**: the document is converted to HTML exactly once.
//! 3. **Post-process**: each processor swaps its placeholders for the final
//!    HTML.
//!
//! Bundled processors:
//! - [`command::CommandProcessor`]: `{name: attributes}` commands, with the
//!   ready-made [`bundled::ImageCommand`] and [`bundled::VideoCommand`]
//! - [`raw::HtmlBlockProcessor`]: raw HTML between `{html}` delimiters
//! - [`raw::SiteUrlProcessor`]: `siteurl` links resolved against the site URL
//!
//! Structural problems are collected as [`ValidationResults`] and never abort
//! the render; only a [`ProcessorError`] does.
//!
//! # Example
//!
//! ```
//! use mdguard_renderer::Renderer;
//! use mdguard_renderer::bundled::ImageCommand;
//! use mdguard_renderer::raw::SiteUrlProcessor;
//!
//! let mut renderer = Renderer::new()
//!     .with_processor(ImageCommand::new().processor())
//!     .with_processor(SiteUrlProcessor::new().with_site_url("https://example.com"));
//!
//! let output = renderer
//!     .render("{image: \"logo.png\"} [Home](siteurl)")
//!     .unwrap();
//!
//! assert_eq!(
//!     output.html,
//!     "<p><img src=\"/logo.png\" alt=\"\"/> <a href=\"https://example.com/\">Home</a></p>\n"
//! );
//! assert!(output.is_valid());
//! ```

pub mod bundled;
pub mod command;
mod converter;
mod error;
pub mod html;
mod placeholder;
mod processor;
pub mod raw;
mod renderer;

pub use converter::{CmarkConverter, Converter, PERMALINK_CLASS, slugify};
pub use error::{ProcessorError, RenderError};
pub use placeholder::PlaceholderAllocator;
pub use processor::{Processor, ValidationMessage, ValidationResults};
pub use raw::{HtmlBlockProcessor, SiteUrlProcessor};
pub use renderer::{Phase, RenderOutput, Renderer, render_markdown};
