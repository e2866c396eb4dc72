// Speech engine backed by the whisper command-line tool (openai-whisper and
// compatible front ends that accept the same flags and emit the same JSON).

use async_trait::async_trait;
use std::ffi::OsString;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SubgenError};
use super::{SpeechEngine, common::{DecodingOptions, EngineRequest}};

pub struct WhisperCli {
    binary_path: String,
}

impl WhisperCli {
    pub fn new(binary_path: impl Into<String>) -> Self {
        Self { binary_path: binary_path.into() }
    }

    /// Build the argument list for one transcription run
    fn build_args(request: &EngineRequest, output_dir: &std::path::Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            request.audio_path.clone().into(),
            "--model".into(), request.model.clone().into(),
            "--output_dir".into(), output_dir.into(),
            "--output_format".into(), "json".into(),
            "--verbose".into(), "False".into(),
        ];
        args.extend(Self::decoding_args(&request.options).into_iter().map(OsString::from));

        if let Some(lang) = &request.language {
            args.push("--language".into());
            args.push(lang.into());
        }

        args
    }

    fn decoding_args(options: &DecodingOptions) -> Vec<String> {
        vec![
            "--temperature".to_string(), options.temperature.to_string(),
            "--temperature_increment_on_fallback".to_string(), py_optional(options.temperature_increment_on_fallback),
            "--logprob_threshold".to_string(), options.logprob_threshold.to_string(),
            "--no_speech_threshold".to_string(), options.no_speech_threshold.to_string(),
            "--condition_on_previous_text".to_string(), py_bool(options.condition_on_previous_text).to_string(),
            "--word_timestamps".to_string(), py_bool(options.word_timestamps).to_string(),
            "--hallucination_silence_threshold".to_string(), options.hallucination_silence_threshold.to_string(),
        ]
    }
}

fn py_optional(value: Option<f32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "None".to_string())
}

fn py_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

#[async_trait]
impl SpeechEngine for WhisperCli {
    async fn transcribe(&self, request: &EngineRequest) -> Result<serde_json::Value> {
        // Whisper writes `<stem>.json` into the output directory
        let temp_dir = tempfile::tempdir()
            .map_err(|e| SubgenError::Transcriber(format!("Failed to create temp directory: {}", e)))?;
        let output_dir = temp_dir.path();

        let mut cmd = Command::new(&self.binary_path);
        cmd.args(Self::build_args(request, output_dir));

        debug!("Executing whisper command: {:?}", cmd);

        let output = cmd.output().await
            .map_err(|e| SubgenError::Transcriber(format!("Failed to execute {}: {}", self.binary_path, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubgenError::Transcriber(format!("Whisper failed: {}", stderr)));
        }

        let audio_stem = request.audio_path.file_stem()
            .ok_or_else(|| SubgenError::Transcriber("Invalid audio filename".to_string()))?;
        let json_file = output_dir.join(format!("{}.json", audio_stem.to_string_lossy()));

        let json_content = tokio::fs::read_to_string(&json_file).await
            .map_err(|e| SubgenError::Transcriber(format!("Failed to read whisper output: {}", e)))?;

        serde_json::from_str(&json_content)
            .map_err(|e| SubgenError::Transcriber(format!("Failed to parse whisper JSON: {}", e)))
    }
}
