use std::path::{Path, PathBuf};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::config::Config;
use crate::error::{Result, SubgenError};
use crate::subtitle::{format_time_range, write_srt, SubtitleEntry};
use crate::transcribe::{Transcriber, TranscriptionResult, WhisperCli};
use crate::translate::{OllamaModel, Translator};

/// Per-run switches for `generate` and `generate_all`
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Translate segments into `target_language` before writing
    pub translate: bool,
    /// Spoken language; detected by the engine when `None`
    pub source_language: Option<String>,
    pub target_language: Option<String>,
    /// Keep the raw engine JSON next to the subtitles
    pub persist_raw: bool,
}

/// Transcribe → (translate) → write SRT pipeline
pub struct SubtitleGenerator {
    transcriber: Transcriber,
    translator: Option<Translator>,
}

impl SubtitleGenerator {
    pub fn new(transcriber: Transcriber, translator: Option<Translator>) -> Self {
        Self { transcriber, translator }
    }

    /// Wire the whisper CLI and, when a model is configured, an ollama translator
    pub fn from_config(config: &Config) -> Self {
        let engine = WhisperCli::new(config.transcriber.binary_path.clone());
        let transcriber = Transcriber::new(
            Box::new(engine),
            config.transcriber.model.clone(),
            config.output.results_dir.clone(),
        );

        let translator = config.translate.model.as_ref().map(|model| {
            Translator::new(Box::new(OllamaModel::new(&config.translate)), model.clone())
        });

        Self::new(transcriber, translator)
    }

    pub fn results_dir(&self) -> &Path {
        self.transcriber.results_dir()
    }

    /// Transcribe only, without writing subtitles
    pub async fn transcribe(
        &self,
        path: &Path,
        source_language: Option<&str>,
        persist_raw: bool,
    ) -> Result<TranscriptionResult> {
        self.transcriber.transcribe(path, source_language, persist_raw).await
    }

    /// Generate the subtitle file for one input and return its path
    pub async fn generate(&mut self, path: &Path, options: &GenerateOptions) -> Result<PathBuf> {
        let target_language = if options.translate {
            Some(self.require_translation(options)?)
        } else {
            None
        };

        let transcription = self.transcriber
            .transcribe(path, options.source_language.as_deref(), options.persist_raw)
            .await?;
        let segments = transcription.segments;
        let source_language = options.source_language.clone()
            .unwrap_or(transcription.language);

        let time_ranges = segments
            .iter()
            .map(|s| format_time_range(s.start, s.end))
            .collect::<Result<Vec<_>>>()?;

        let basename = subtitle_basename(path)?;
        let output_language = target_language.as_deref().unwrap_or(&source_language);
        let srt_file = format!("{}.{}.srt", basename, output_language);

        let progress = progress_bar(segments.len() as u64);
        let texts = match (&target_language, self.translator.as_mut()) {
            (Some(target), Some(translator)) => {
                progress.set_message(format!("Generating {}, translated from {}", srt_file, source_language));
                translator.translate_segments(&segments, &source_language, target, &progress).await?
            }
            _ => {
                progress.set_message(format!("Generating {}", srt_file));
                segments.iter().map(|s| {
                    progress.inc(1);
                    s.text.trim().to_string()
                }).collect()
            }
        };
        progress.finish_and_clear();

        let entries = SubtitleEntry::from_pairs(time_ranges.into_iter().zip(texts));
        let output_path = self.results_dir().join(&srt_file);
        write_srt(&output_path, &entries).await?;

        Ok(output_path)
    }

    /// Run `generate` over every file matching `pattern`, stopping at the first error
    pub async fn generate_all(&mut self, pattern: &str, options: &GenerateOptions) -> Result<Vec<PathBuf>> {
        let files = expand_glob(pattern)?;
        let total = files.len();
        let mut written = Vec::with_capacity(total);

        for (num, file) in files.iter().enumerate() {
            info!("[{}/{}] {}", num + 1, total, file.display());
            written.push(self.generate(file, options).await?);
        }

        Ok(written)
    }

    fn require_translation(&self, options: &GenerateOptions) -> Result<String> {
        let target = options.target_language.as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SubgenError::MissingConfig("Target language is required".to_string()))?;

        match &self.translator {
            Some(translator) if !translator.model().trim().is_empty() => {}
            _ => return Err(SubgenError::MissingConfig("Translator model is required".to_string())),
        }

        Ok(target.to_string())
    }
}

/// Files matching a glob pattern in path order; no match is `FileNotFound`
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern)
        .map_err(|e| SubgenError::FileNotFound(format!("{} ({})", pattern, e)))?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| SubgenError::Io(e.into_error()))?;
        if path.is_file() {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(SubgenError::FileNotFound(pattern.to_string()));
    }

    Ok(files)
}

/// File name up to its first dot: `clip.mp4` → `clip`
fn subtitle_basename(path: &Path) -> Result<String> {
    let name = path.file_name()
        .ok_or_else(|| SubgenError::FileNotFound(format!("No file name in input path: {}", path.display())))?
        .to_string_lossy();

    match name.split('.').next() {
        Some(base) if !base.is_empty() => Ok(base.to_string()),
        _ => Ok(path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| name.to_string())),
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::with_template("{msg}: {percent:>3}%|{wide_bar}| {pos}/{len} [{elapsed_precise}<{eta_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}
