//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod render;

use std::io::Read;
use std::path::Path;

use mdguard_config::Config;
use mdguard_renderer::bundled::{ImageCommand, VideoCommand};
use mdguard_renderer::command::CommandProcessor;
use mdguard_renderer::raw::{HtmlBlockProcessor, SiteUrlProcessor};
use mdguard_renderer::{CmarkConverter, Renderer};

pub(crate) use check::CheckArgs;
pub(crate) use render::RenderArgs;

/// Build a renderer with the processors enabled in the configuration.
///
/// Raw HTML blocks are extracted first so their content is never seen by the
/// other processors.
pub(crate) fn build_renderer(config: &Config) -> Renderer {
    let converter = CmarkConverter::new()
        .with_gfm(config.render.gfm)
        .with_heading_ids(config.render.heading_ids)
        .with_permalinks(config.render.permalinks);
    let mut renderer = Renderer::new().with_converter(converter);

    if config.html.enabled {
        renderer.add_processor(HtmlBlockProcessor::with_delimiter(
            config.html.delimiter.as_str(),
        ));
    }

    if config.site_url.enabled {
        renderer.add_processor(
            SiteUrlProcessor::new().with_site_url(config.site_url.base_url.as_str()),
        );
    }

    let mut commands = CommandProcessor::new();
    if config.images.enabled {
        let image = ImageCommand::new()
            .with_base_url(config.images.base_url.as_str())
            .with_missing_message(config.images.missing_message.as_str());
        commands.register(ImageCommand::NAME, image);
    }
    if config.videos.enabled {
        let video = VideoCommand::new().with_folder_url(config.videos.folder_url.as_str());
        commands.register(VideoCommand::NAME, video);
    }
    if commands.command_names().next().is_some() {
        renderer.add_processor(commands);
    }

    tracing::info!(processors = renderer.processor_count(), "Renderer ready");
    renderer
}

/// Read markdown from a file, or from stdin for `-`.
pub(crate) fn read_input(path: &Path) -> std::io::Result<String> {
    if path == Path::new("-") {
        let mut markdown = String::new();
        std::io::stdin().read_to_string(&mut markdown)?;
        return Ok(markdown);
    }
    std::fs::read_to_string(path)
}
