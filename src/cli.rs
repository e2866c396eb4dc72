use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::generator::GenerateOptions;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for subtitle files and raw transcriptions (overrides config)
    #[arg(long)]
    pub results_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transcribe a file without writing subtitles
    Transcribe {
        /// Input audio or video file
        #[arg(short, long)]
        input: PathBuf,

        /// Source language (ISO 639-1); detected when omitted
        #[arg(short, long)]
        language: Option<String>,

        /// Save the full transcription output as JSON
        #[arg(long)]
        save_raw: bool,
    },

    /// Generate subtitles for a single file
    Generate {
        /// Input audio or video file
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        options: GenerateArgs,
    },

    /// Generate subtitles for every file matching a glob pattern
    Batch {
        /// Glob pattern, e.g. "videos/*.webm"
        #[arg(short, long)]
        pattern: String,

        #[command(flatten)]
        options: GenerateArgs,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Output path
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
}

#[derive(ClapArgs, Debug, Clone)]
pub struct GenerateArgs {
    /// Translate segments into the target language
    #[arg(long)]
    pub translate: bool,

    /// Source language (ISO 639-1); detected when omitted
    #[arg(short, long)]
    pub source_lang: Option<String>,

    /// Target language (ISO 639-1), required with --translate
    #[arg(short, long)]
    pub target_lang: Option<String>,

    /// Save the full transcription output as JSON
    #[arg(long)]
    pub save_raw: bool,
}

impl From<GenerateArgs> for GenerateOptions {
    fn from(args: GenerateArgs) -> Self {
        Self {
            translate: args.translate,
            source_language: args.source_lang,
            target_language: args.target_lang,
            persist_raw: args.save_raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_args_into_options() {
        let args = Args::try_parse_from([
            "subgen", "generate", "-i", "clip.mp4", "--translate", "-s", "ja", "-t", "en", "--save-raw",
        ])
        .unwrap();

        let Commands::Generate { input, options } = args.command else {
            panic!("expected generate command");
        };
        let options = GenerateOptions::from(options);

        assert_eq!(input, PathBuf::from("clip.mp4"));
        assert!(options.translate);
        assert_eq!(options.source_language.as_deref(), Some("ja"));
        assert_eq!(options.target_language.as_deref(), Some("en"));
        assert!(options.persist_raw);
    }

    #[test]
    fn test_batch_defaults() {
        let args = Args::try_parse_from(["subgen", "--results-dir", "out", "batch", "-p", "*.webm"]).unwrap();

        assert_eq!(args.results_dir, Some(PathBuf::from("out")));
        let Commands::Batch { pattern, options } = args.command else {
            panic!("expected batch command");
        };
        assert_eq!(pattern, "*.webm");
        assert!(!options.translate);
        assert!(options.target_lang.is_none());
    }
}
