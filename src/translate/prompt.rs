use crate::transcribe::Segment;

/// Placeholder for context that doesn't exist (before the first or after the last segment)
pub const NOT_AVAILABLE: &str = "N/A";

/// Rolling window of neighbouring text around the segment being translated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationContext {
    pub previous_original: String,
    pub previous_translated: String,
    pub next_original: String,
}

impl Default for TranslationContext {
    fn default() -> Self {
        Self {
            previous_original: NOT_AVAILABLE.to_string(),
            previous_translated: NOT_AVAILABLE.to_string(),
            next_original: NOT_AVAILABLE.to_string(),
        }
    }
}

impl TranslationContext {
    /// Point `next_original` at the segment following `index`
    pub fn look_ahead(&mut self, segments: &[Segment], index: usize) {
        self.next_original = segments
            .get(index + 1)
            .map(|s| s.text.clone())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    }

    /// Record the segment just translated as the new "previous"
    pub fn advance(&mut self, original: &str, translated: &str) {
        self.previous_original = original.to_string();
        self.previous_translated = translated.to_string();
    }
}

/// Build the instruction prompt for one segment (language codes are ISO 639-1)
pub fn build_translation_prompt(
    text: &str,
    source_language: &str,
    target_language: &str,
    context: &TranslationContext,
) -> String {
    format!(
        "You are a professional subtitle translator tasked with translating the [Text to Translate] from `{source}` into natural, fluent `{target}`. (ISO 639-1 language codes)\n\
         \n\
         ## Strict Rules\n\
         1. Input Correction: The [Text to Translate] is from automated AI transcription and may contain inaccuracies or typos. If the text seems nonsensical or grammatically incorrect, infer the intended meaning and translate that corrected version.\n\
         2. Language Requirement: You MUST translate into `{target}`. Returning untranslated or partially translated text is unacceptable.\n\
         3. Tone & Register: Identify and match the speaker's original tone and style (formal, casual, slang, etc.). Use the [Context] segments to maintain continuity across subtitle breaks.\n\
         4. Exception: Keep person names, brand names, and most proper nouns in their original form unless there is a widely-accepted localized version in `{target}`.\n\
         5. Output Format: Return ONLY the translated text with no explanations, notes, pronunciations, or extra quotation marks.\n\
         \n\
         ## Context\n\
         - Previous Segment (Original): {prev_orig}\n\
         - Previous Segment (Translated): {prev_trans}\n\
         - Next Segment (Original): {next_orig}\n\
         \n\
         ## Text to Translate\n\
         {text}\n",
        source = source_language,
        target = target_language,
        prev_orig = context.previous_original,
        prev_trans = context.previous_translated,
        next_orig = context.next_original,
        text = text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(id: u32, text: &str) -> Segment {
        Segment { id, start: id as f64, end: id as f64 + 1.0, text: text.to_string() }
    }

    #[test]
    fn test_context_window_moves_forward() {
        let segments = vec![segment(0, "一"), segment(1, "二"), segment(2, "三")];
        let mut ctx = TranslationContext::default();

        ctx.look_ahead(&segments, 0);
        assert_eq!(ctx.previous_original, NOT_AVAILABLE);
        assert_eq!(ctx.previous_translated, NOT_AVAILABLE);
        assert_eq!(ctx.next_original, "二");

        ctx.advance("一", "one");
        ctx.look_ahead(&segments, 1);
        assert_eq!(ctx.previous_original, "一");
        assert_eq!(ctx.previous_translated, "one");
        assert_eq!(ctx.next_original, "三");

        ctx.advance("二", "two");
        ctx.look_ahead(&segments, 2);
        assert_eq!(ctx.next_original, NOT_AVAILABLE);
    }

    #[test]
    fn test_prompt_embeds_languages_context_and_text() {
        let ctx = TranslationContext {
            previous_original: "おはよう".to_string(),
            previous_translated: "Good morning".to_string(),
            next_original: "またね".to_string(),
        };
        let prompt = build_translation_prompt("元気？", "ja", "en", &ctx);

        assert!(prompt.contains("from `ja` into natural, fluent `en`"));
        assert!(prompt.contains("- Previous Segment (Original): おはよう\n"));
        assert!(prompt.contains("- Previous Segment (Translated): Good morning\n"));
        assert!(prompt.contains("- Next Segment (Original): またね\n"));
        assert!(prompt.ends_with("## Text to Translate\n元気？\n"));
        assert!(prompt.contains("Return ONLY the translated text"));
    }
}
