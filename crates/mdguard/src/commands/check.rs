//! `mdguard check` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use mdguard_config::Config;
use mdguard_renderer::ValidationResults;

use super::{build_renderer, read_input};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Markdown file to check (`-` for stdin).
    input: PathBuf,

    /// Path to configuration file (default: auto-discover mdguard.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails or the document is invalid.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;
        if !self.json {
            output.info(&format!("Checking {}", self.input.display()));
        }

        let markdown = read_input(&self.input)?;
        let mut renderer = build_renderer(&config);
        let results = renderer.render(&markdown)?.results;
        let name = self.input.display().to_string();

        if self.json {
            tracing::debug!(file = %name, "Writing JSON report");
            let report = json_report(&name, &results)?;
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{report}")?;
        } else if results.is_valid() {
            output.success(&format!("{name}: valid"));
        } else {
            output.error(&format!("{name}: invalid"));
            output.validation(&results);
        }

        if results.is_valid() {
            Ok(())
        } else {
            Err(CliError::Validation(format!(
                "{} validation error(s)",
                results.messages().len()
            )))
        }
    }
}

fn json_report(name: &str, results: &ValidationResults) -> Result<String, CliError> {
    let report = serde_json::json!({
        "file": name,
        "valid": results.is_valid(),
        "results": results,
    });
    Ok(serde_json::to_string_pretty(&report)?)
}
