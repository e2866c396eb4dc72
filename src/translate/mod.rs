// Translation layer
//
// - prompt: rolling context window and the per-segment instruction prompt
// - ollama: `LanguageModel` implementation over the ollama HTTP API
//
// The model is loaded once per `translate_segments` call and released when
// the call ends, whether or not every segment translated.

pub mod prompt;
pub mod ollama;

use async_trait::async_trait;
use indicatif::ProgressBar;
use tracing::{debug, info, warn};

pub use prompt::*;
pub use ollama::OllamaModel;
use crate::error::{Result, SubgenError};
use crate::transcribe::Segment;

/// Chat-style language model client with an explicit load/unload lifecycle
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn load(&mut self, model: &str) -> Result<()>;

    async fn respond(&mut self, prompt: &str) -> Result<String>;

    async fn unload(&mut self) -> Result<()>;
}

pub struct Translator {
    client: Box<dyn LanguageModel>,
    model: String,
}

impl Translator {
    pub fn new(client: Box<dyn LanguageModel>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Translate every segment in order, returning one text per segment
    pub async fn translate_segments(
        &mut self,
        segments: &[Segment],
        source_language: &str,
        target_language: &str,
        progress: &ProgressBar,
    ) -> Result<Vec<String>> {
        if target_language.trim().is_empty() {
            return Err(SubgenError::MissingConfig("Target language is required".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(SubgenError::MissingConfig("Translator model is required".to_string()));
        }

        self.client.load(&self.model).await?;
        info!("Translator model loaded.");

        let translated = self.translate_loaded(segments, source_language, target_language, progress).await;
        let released = self.client.unload().await;

        match (translated, released) {
            (Ok(texts), Ok(())) => Ok(texts),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(unload_err)) => {
                warn!("Failed to unload translator model: {}", unload_err);
                Err(e)
            }
        }
    }

    async fn translate_loaded(
        &mut self,
        segments: &[Segment],
        source_language: &str,
        target_language: &str,
        progress: &ProgressBar,
    ) -> Result<Vec<String>> {
        let mut context = TranslationContext::default();
        let mut texts = Vec::with_capacity(segments.len());

        for (idx, segment) in segments.iter().enumerate() {
            context.look_ahead(segments, idx);

            let prompt = build_translation_prompt(&segment.text, source_language, target_language, &context);
            // No retry or validation: whatever the model returns is the subtitle
            let text = self.client.respond(&prompt).await?.trim().to_string();

            debug!("Segment {}/{}: {} -> {}", idx + 1, segments.len(), segment.text.trim(), text);

            context.advance(&segment.text, &text);
            texts.push(text);
            progress.inc(1);
        }

        Ok(texts)
    }
}
