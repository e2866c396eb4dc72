//! Subgen - Subtitle Generation Workflow
//!
//! Entry point for the `subgen` command, which transcribes audio and video
//! with whisper and optionally translates the subtitles through ollama.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use subgen::cli::{Args, Commands};
use subgen::config::Config;
use subgen::generator::{GenerateOptions, SubtitleGenerator};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    if let Some(results_dir) = &args.results_dir {
        config.output.results_dir = results_dir.clone();
    }

    match args.command {
        Commands::Transcribe { input, language, save_raw } => {
            info!("Transcribing: {}", input.display());
            let generator = SubtitleGenerator::from_config(&config);
            let transcription = generator.transcribe(&input, language.as_deref(), save_raw).await?;

            println!("Language: {}", transcription.language);
            println!("Segments: {}", transcription.segments.len());
        }
        Commands::Generate { input, options } => {
            info!("Generating subtitles for: {}", input.display());
            let mut generator = SubtitleGenerator::from_config(&config);
            let output = generator.generate(&input, &GenerateOptions::from(options)).await?;

            println!("Subtitles written to {}", output.display());
        }
        Commands::Batch { pattern, options } => {
            info!("Generating subtitles for files matching: {}", pattern);
            let mut generator = SubtitleGenerator::from_config(&config);
            let outputs = generator.generate_all(&pattern, &GenerateOptions::from(options)).await?;

            println!("Wrote {} subtitle files to {}", outputs.len(), generator.results_dir().display());
        }
        Commands::InitConfig { output } => {
            Config::default().save_to_file(&output)?;
            println!("Default configuration written to {}", output.display());
        }
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".subgen").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // One file per day under .subgen/log
    let file_appender = rolling::daily(&log_dir, "subgen.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Dropping the guard would stop the file writer
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("subgen.log").display());

    Ok(())
}
