//! `quizmark render` command implementation.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use quizmark_config::{CliSettings, Config};
use quizmark_renderer::{MarkdownPipeline, RenderOptions};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render (default: read from stdin).
    input: Option<PathBuf>,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover quizmark.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Highlight theme (overrides config).
    #[arg(long, env = "QUIZMARK_THEME")]
    theme: Option<String>,

    /// Disable math typesetting.
    #[arg(long)]
    no_math: bool,

    /// Disable syntax highlighting.
    #[arg(long)]
    no_highlight: bool,

    /// Disable the copy button on code blocks.
    #[arg(long)]
    no_copy_button: bool,

    /// Use the lighter pipeline without highlighting, copy buttons or math.
    #[arg(long)]
    lite: bool,

    /// Fail with the render error instead of emitting the fallback HTML.
    #[arg(long)]
    strict: bool,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            theme: self.theme.clone(),
            highlight_enabled: self.no_highlight.then_some(false),
            copy_button_enabled: self.no_copy_button.then_some(false),
            math_enabled: self.no_math.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let markdown = match &self.input {
            Some(path) => std::fs::read_to_string(path)?,
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };

        let start = Instant::now();
        let pipeline = MarkdownPipeline::with_options(render_options(&config, self.lite))?;
        let html = render(&pipeline, &markdown, self.strict)?;
        tracing::info!(
            bytes = html.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Rendered markdown"
        );

        if let Some(path) = &self.output {
            std::fs::write(path, &html)?;
            output.success(&format!("Rendered HTML written to {}", path.display()));
        } else {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
        Ok(())
    }
}

/// Build render options from the loaded configuration.
fn render_options(config: &Config, lite: bool) -> RenderOptions {
    let options = RenderOptions {
        hard_breaks: config.render.hard_breaks,
        heading_separators: config.render.heading_separators,
        autolinks: config.render.autolinks,
        math: config.math.enabled,
        highlight: config.highlight.enabled,
        copy_button: config.copy_button.enabled,
        copy_feedback_ms: config.copy_button.feedback_duration_ms,
        default_language: config.highlight.default_language.clone(),
        theme: config.highlight.theme.clone(),
        keep_background: config.highlight.keep_background,
        max_depth: config.render.max_depth,
        fallback_html: config.render.fallback_html.clone(),
    };
    if lite {
        RenderOptions {
            math: false,
            highlight: false,
            copy_button: false,
            ..options
        }
    } else {
        options
    }
}

/// Render `markdown`, surfacing the error in strict mode.
fn render(pipeline: &MarkdownPipeline, markdown: &str, strict: bool) -> Result<String, CliError> {
    if strict {
        Ok(pipeline.try_render(markdown)?)
    } else {
        Ok(pipeline.render(markdown))
    }
}
