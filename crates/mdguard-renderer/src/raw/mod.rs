//! Processors working directly on raw markdown syntax.
//!
//! Unlike [`command`](crate::command) processors these do not use the
//! `{name: attributes}` syntax and may rewrite the source in place instead
//! of safeguarding it behind placeholders.

mod html_block;
mod site_url;

pub use html_block::{DEFAULT_DELIMITER, HtmlBlockProcessor};
pub use site_url::{ParamsCallback, SiteUrlProcessor};
