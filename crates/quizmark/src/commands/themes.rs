//! `quizmark themes` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use quizmark_config::Config;
use quizmark_renderer::available_themes;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the themes command.
#[derive(Args)]
pub(crate) struct ThemesArgs {
    /// Path to configuration file (default: auto-discover quizmark.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ThemesArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;

        let themes = available_themes();
        if !themes.contains(&config.highlight.theme.as_str()) {
            output.error(&format!(
                "Configured theme {:?} is not available",
                config.highlight.theme
            ));
        }

        let mut stdout = std::io::stdout().lock();
        for theme in themes {
            writeln!(stdout, "{}", theme_line(theme, &config.highlight.theme))?;
        }
        output.highlight(&format!("Configured theme: {}", config.highlight.theme));
        output.info("Set [highlight] theme in quizmark.toml or pass --theme to change it.");
        Ok(())
    }
}

/// One listing line, marking the configured theme.
fn theme_line(theme: &str, configured: &str) -> String {
    if theme == configured {
        format!("* {theme}")
    } else {
        format!("  {theme}")
    }
}
