//! Ready-made commands.
//!
//! Each command is a [`Renderable`](crate::command::Renderable) with its own
//! options. [`processor()`](ImageCommand::processor) wraps it in a
//! [`CommandProcessor`](crate::command::CommandProcessor) for the renderer.

mod image;
mod video;

pub use image::{DEFAULT_MISSING_IMAGE_MESSAGE, ImageCommand};
pub use video::VideoCommand;
