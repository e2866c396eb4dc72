// Transcription layer
//
// The speech engine is reached through the `SpeechEngine` trait so the
// pipeline can run against the whisper CLI in production and a scripted
// engine in tests. `Transcriber` owns the fixed decoding configuration,
// timing log and optional raw-output dump.

pub mod common;
pub mod whisper_cli;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

pub use common::*;
pub use whisper_cli::WhisperCli;
use crate::error::{Result, SubgenError};

/// External speech-to-text engine
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Transcribe one file and return the engine's full JSON document
    async fn transcribe(&self, request: &EngineRequest) -> Result<serde_json::Value>;
}

pub struct Transcriber {
    engine: Box<dyn SpeechEngine>,
    model: String,
    options: DecodingOptions,
    results_dir: PathBuf,
}

impl Transcriber {
    pub fn new(engine: Box<dyn SpeechEngine>, model: impl Into<String>, results_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            model: model.into(),
            options: DecodingOptions::default(),
            results_dir: results_dir.into(),
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Transcribe `audio_path`; `source_language = None` lets the engine detect it
    pub async fn transcribe(
        &self,
        audio_path: &Path,
        source_language: Option<&str>,
        persist_raw: bool,
    ) -> Result<TranscriptionResult> {
        if !audio_path.exists() {
            return Err(SubgenError::FileNotFound(audio_path.display().to_string()));
        }

        let filename = audio_path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| audio_path.display().to_string());

        let request = EngineRequest {
            audio_path: audio_path.to_path_buf(),
            model: self.model.clone(),
            language: source_language.map(str::to_string),
            options: self.options.clone(),
        };

        let started = Instant::now();
        let raw = self.engine.transcribe(&request).await?;
        info!("Transcribed {} in {:.1}s", filename, started.elapsed().as_secs_f64());

        if persist_raw {
            save_raw_result(&self.results_dir, audio_path, &raw).await;
        }

        TranscriptionResult::from_raw(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_output() -> serde_json::Value {
        json!({
            "text": " Hello there. General Kenobi.",
            "language": "en",
            "segments": [
                {"id": 0, "start": 0.0, "end": 1.2, "text": " Hello there.", "words": [{"word": " Hello", "start": 0.0, "end": 0.5}]},
                {"id": 1, "start": 1.4, "end": 2.9, "text": " General Kenobi."}
            ]
        })
    }

    #[tokio::test]
    async fn test_missing_file_fails_before_engine() {
        let mut engine = MockSpeechEngine::new();
        engine.expect_transcribe().never();

        let dir = tempfile::tempdir().unwrap();
        let transcriber = Transcriber::new(Box::new(engine), "tiny", dir.path());
        let err = transcriber
            .transcribe(&dir.path().join("missing.wav"), None, false)
            .await
            .unwrap_err();

        assert!(matches!(err, SubgenError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_passes_fixed_decoding_options_and_language() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("clip.wav");
        std::fs::write(&audio, b"RIFF").unwrap();

        let mut engine = MockSpeechEngine::new();
        engine
            .expect_transcribe()
            .withf(|req| {
                req.model == "large-v3"
                    && req.language.as_deref() == Some("ja")
                    && req.options == DecodingOptions::default()
                    && !req.options.condition_on_previous_text
            })
            .times(1)
            .returning(|_| Ok(sample_output()));

        let transcriber = Transcriber::new(Box::new(engine), "large-v3", dir.path().join("results"));
        let result = transcriber.transcribe(&audio, Some("ja"), false).await.unwrap();

        assert_eq!(result.language, "en");
        assert_eq!(result.segments.len(), 2);
        assert!(!dir.path().join("results").exists());
    }

    #[tokio::test]
    async fn test_persist_raw_writes_full_document() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("clip.mp4");
        std::fs::write(&audio, b"").unwrap();

        let mut engine = MockSpeechEngine::new();
        engine.expect_transcribe().times(1).returning(|_| Ok(sample_output()));

        let results = dir.path().join("results");
        let transcriber = Transcriber::new(Box::new(engine), "tiny", &results);
        transcriber.transcribe(&audio, None, true).await.unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(results.join("clip.json")).unwrap()).unwrap();
        assert_eq!(saved, sample_output());
    }

    #[tokio::test]
    async fn test_engine_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("clip.wav");
        std::fs::write(&audio, b"").unwrap();

        let mut engine = MockSpeechEngine::new();
        engine
            .expect_transcribe()
            .returning(|_| Err(SubgenError::Transcriber("model crashed".to_string())));

        let transcriber = Transcriber::new(Box::new(engine), "tiny", dir.path());
        let err = transcriber.transcribe(&audio, None, true).await.unwrap_err();
        assert!(matches!(err, SubgenError::Transcriber(msg) if msg == "model crashed"));
        assert!(!dir.path().join("clip.json").exists());
    }
}
