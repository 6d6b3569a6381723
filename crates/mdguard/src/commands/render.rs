//! `mdguard render` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use mdguard_config::{CliSettings, Config};

use super::{build_renderer, read_input};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render (`-` for stdin).
    input: PathBuf,

    /// Path to configuration file (default: auto-discover mdguard.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Site URL for `siteurl` links (overrides config).
    #[arg(long, env = "MDGUARD_SITE_URL")]
    site_url: Option<String>,

    /// Base URL for images (overrides config).
    #[arg(long)]
    image_base_url: Option<String>,

    /// Folder URL for videos (overrides config).
    #[arg(long)]
    video_folder_url: Option<String>,

    /// Fail when the document has validation errors.
    #[arg(long)]
    strict: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if loading, rendering or writing fails, or with
    /// `--strict` if the document has validation errors.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            site_url: self.site_url.clone(),
            image_base_url: self.image_base_url.clone(),
            video_folder_url: self.video_folder_url.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let markdown = read_input(&self.input)?;
        let mut renderer = build_renderer(&config);
        let rendered = renderer.render(&markdown)?;

        if !rendered.is_valid() {
            output.warning(&format!(
                "{} has validation errors:",
                self.input.display()
            ));
            output.validation(&rendered.results);
        }

        match &self.output {
            Some(path) => {
                std::fs::write(path, &rendered.html)?;
                output.success(&format!("Wrote {}", path.display()));
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(rendered.html.as_bytes())?;
                stdout.flush()?;
            }
        }

        if self.strict && !rendered.is_valid() {
            return Err(CliError::Validation(format!(
                "{} validation error(s)",
                rendered.results.messages().len()
            )));
        }

        Ok(())
    }
}
