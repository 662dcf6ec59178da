// SPDX-License-Identifier: MIT OR Apache-2.0
//! TISFAT Zero editor command line.
//!
//! Opens a project (or creates the default one), optionally renders it for
//! export and optionally writes it back out.

use clap::Parser;
use std::path::{Path, PathBuf};
use tisfat_editor_app::export::DEFAULT_EXPORT_FPS;
use tisfat_editor_app::{Editor, EditorError, EditorSettings, SETTINGS_FILE_NAME};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// TISFAT Zero animation editor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Project file to open (.tzp); a default project is created otherwise
    #[arg(value_name = "PROJECT")]
    project: Option<PathBuf>,

    /// Render every frame at FPS (defaults to 10 when the value is omitted)
    #[arg(long, value_name = "FPS")]
    export: Option<Option<f32>>,

    /// Write the project to PATH after loading
    #[arg(long, value_name = "PATH")]
    save_as: Option<PathBuf>,
}

impl Cli {
    fn export_fps(&self) -> Option<f32> {
        self.export.map(|fps| fps.unwrap_or(DEFAULT_EXPORT_FPS))
    }
}

fn run(cli: Cli) -> Result<(), EditorError> {
    let settings = EditorSettings::load_or_default(Path::new(SETTINGS_FILE_NAME));
    let mut editor = Editor::new(settings);

    if let Some(path) = &cli.project {
        editor.open(path)?;
    }
    let project = editor.timeline().project();
    tracing::info!(
        "{}: {} layers, frames {}..={} at {} fps",
        editor.title(),
        project.layer_count(),
        project.first_time(),
        project.last_time(),
        project.fps
    );

    if let Some(fps) = cli.export_fps() {
        let frames = editor.export_frames(fps)?;
        let shapes: usize = frames.iter().map(|f| f.shapes.len()).sum();
        tracing::info!("Exported {} frames ({shapes} shapes)", frames.len());
    }

    if let Some(path) = &cli.save_as {
        editor.save_as(path)?;
        tracing::info!("{}", editor.title());
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "tisfat_editor_app=debug".parse() {
        env_filter = env_filter.add_directive(directive);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting TISFAT Zero Editor v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli) {
        tracing::error!("Editor failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_parse_args() {
        let cli = Cli::try_parse_from(["tisfat_editor", "walk.tzp", "--export", "24", "--save-as", "out.tzp"]).unwrap();
        assert_eq!(cli.project, Some(PathBuf::from("walk.tzp")));
        assert_eq!(cli.export_fps(), Some(24.0));
        assert_eq!(cli.save_as, Some(PathBuf::from("out.tzp")));

        let cli = Cli::try_parse_from(["tisfat_editor"]).unwrap();
        assert!(cli.project.is_none());
        assert_eq!(cli.export_fps(), None);
    }

    #[test]
    fn test_export_without_value_uses_default_rate() {
        let cli = Cli::try_parse_from(["tisfat_editor", "--export"]).unwrap();
        assert_eq!(cli.export_fps(), Some(DEFAULT_EXPORT_FPS));
    }

    #[test]
    fn test_parse_errors() {
        let kind = |args: &[&str]| Cli::try_parse_from(args).map(|_| ()).unwrap_err().kind();
        assert_eq!(kind(&["tisfat_editor", "--export", "fast"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["tisfat_editor", "a.tzp", "b.tzp"]), ErrorKind::UnknownArgument);
        assert_eq!(kind(&["tisfat_editor", "--verbose"]), ErrorKind::UnknownArgument);
        assert!(Cli::try_parse_from(["tisfat_editor", "--save-as"]).is_err());
    }
}
