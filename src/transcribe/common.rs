use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};
use serde_json::ser::PrettyFormatter;
use tracing::{info, warn};

use crate::error::{Result, SubgenError};

/// One timestamped unit of transcribed speech
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: u32,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Language and ordered segments extracted from an engine document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub language: String,
    pub segments: Vec<Segment>,
}

impl TranscriptionResult {
    /// Extract language and segments from the engine's raw JSON, ignoring extra fields
    pub fn from_raw(raw: &serde_json::Value) -> Result<Self> {
        Self::deserialize(raw)
            .map_err(|e| SubgenError::Transcriber(format!("Failed to parse transcription output: {}", e)))
    }
}

/// Decoding parameters handed to the speech engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodingOptions {
    pub temperature: f32,
    /// Step for re-decoding failed windows at higher temperatures; `None` keeps a single pass
    pub temperature_increment_on_fallback: Option<f32>,
    pub logprob_threshold: f32,
    pub no_speech_threshold: f32,
    /// Decode each window independently so early mistakes don't cascade
    pub condition_on_previous_text: bool,
    pub word_timestamps: bool,
    /// Seconds of silence around a suspected hallucination before it is skipped
    pub hallucination_silence_threshold: f32,
}

impl Default for DecodingOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            temperature_increment_on_fallback: None,
            logprob_threshold: -0.04,
            no_speech_threshold: 0.3,
            condition_on_previous_text: false,
            word_timestamps: true,
            hallucination_silence_threshold: 1.0,
        }
    }
}

/// Everything the speech engine needs for one file
#[derive(Debug, Clone, PartialEq)]
pub struct EngineRequest {
    pub audio_path: PathBuf,
    pub model: String,
    /// `None` lets the engine detect the spoken language
    pub language: Option<String>,
    pub options: DecodingOptions,
}

/// Path of the raw dump for `input`: `<results_dir>/<stem>.json`
pub fn raw_result_path(results_dir: &Path, input: &Path) -> Result<PathBuf> {
    let stem = input.file_stem()
        .ok_or_else(|| SubgenError::Transcriber(format!("Invalid input filename: {}", input.display())))?;
    Ok(results_dir.join(format!("{}.json", stem.to_string_lossy())))
}

/// Serialize a JSON document with a 4-space indent; non-ASCII is kept literal
pub fn to_pretty_json(value: &serde_json::Value) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    String::from_utf8(buf)
        .map_err(|e| SubgenError::Transcriber(format!("Transcription output is not UTF-8: {}", e)))
}

/// Persist the raw engine document; failures are logged and swallowed
pub async fn save_raw_result(results_dir: &Path, input: &Path, raw: &serde_json::Value) -> Option<PathBuf> {
    match try_save_raw_result(results_dir, input, raw).await {
        Ok(path) => {
            info!("Transcription output saved to {}", path.display());
            Some(path)
        }
        Err(e) => {
            warn!("Failed to save JSON output: {}", e);
            None
        }
    }
}

async fn try_save_raw_result(results_dir: &Path, input: &Path, raw: &serde_json::Value) -> Result<PathBuf> {
    let path = raw_result_path(results_dir, input)?;
    tokio::fs::create_dir_all(results_dir).await?;
    tokio::fs::write(&path, to_pretty_json(raw)?).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_raw_ignores_extra_fields() {
        let raw = json!({
            "text": " こんにちは 世界",
            "language": "ja",
            "segments": [
                {"id": 0, "seek": 0, "start": 0.0, "end": 1.5, "text": " こんにちは", "avg_logprob": -0.2, "words": []},
                {"id": 1, "seek": 0, "start": 1.5, "end": 2.75, "text": " 世界", "no_speech_prob": 0.01}
            ]
        });

        let result = TranscriptionResult::from_raw(&raw).unwrap();
        assert_eq!(result.language, "ja");
        assert_eq!(result.segments.len(), 2);
        assert_eq!(result.segments[1], Segment { id: 1, start: 1.5, end: 2.75, text: " 世界".to_string() });
    }

    #[test]
    fn test_from_raw_requires_segments() {
        let err = TranscriptionResult::from_raw(&json!({"language": "en"})).unwrap_err();
        assert!(matches!(err, SubgenError::Transcriber(_)));
    }

    #[test]
    fn test_pretty_json_keeps_unicode_and_indent() {
        let out = to_pretty_json(&json!({"text": "日本語"})).unwrap();
        assert_eq!(out, "{\n    \"text\": \"日本語\"\n}");
    }

    #[test]
    fn test_raw_result_path_uses_stem() {
        let path = raw_result_path(Path::new("results"), Path::new("/media/show.ep1.mp4")).unwrap();
        assert_eq!(path, PathBuf::from("results/show.ep1.json"));
    }

    #[tokio::test]
    async fn test_save_raw_result_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results");

        let saved = save_raw_result(&results, Path::new("clip.mp4"), &json!({"language": "en"})).await;
        assert_eq!(saved, Some(results.join("clip.json")));
        assert!(results.join("clip.json").exists());
    }

    #[tokio::test]
    async fn test_save_raw_result_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the results directory should go
        let blocker = dir.path().join("results");
        std::fs::write(&blocker, "").unwrap();

        let saved = save_raw_result(&blocker, Path::new("clip.mp4"), &json!({})).await;
        assert!(saved.is_none());
    }
}
