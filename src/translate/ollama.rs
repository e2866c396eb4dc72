use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::TranslateConfig;
use crate::error::{Result, SubgenError};
use super::LanguageModel;

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<&'a str>,
    stream: bool,
    keep_alive: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Language model served by an ollama instance
pub struct OllamaModel {
    client: Client,
    endpoint: String,
    keep_alive: String,
    loaded: Option<String>,
}

impl OllamaModel {
    pub fn new(config: &TranslateConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            keep_alive: config.keep_alive.clone(),
            loaded: None,
        }
    }

    fn loaded_model(&self) -> Result<&str> {
        self.loaded.as_deref()
            .ok_or_else(|| SubgenError::Translation("No translation model loaded".to_string()))
    }

    async fn generate(&self, request: &GenerateRequest<'_>) -> Result<GenerateResponse> {
        let url = format!("{}/api/generate", self.endpoint);
        debug!("Sending generate request for {} to {}", request.model, url);

        let response = self.client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| SubgenError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SubgenError::Translation(format!(
                "Ollama API error {}: {}", status, error_text
            )));
        }

        response.json().await
            .map_err(|e| SubgenError::Translation(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl LanguageModel for OllamaModel {
    async fn load(&mut self, model: &str) -> Result<()> {
        // A generate call without a prompt only loads the model into memory
        self.generate(&GenerateRequest {
            model,
            prompt: None,
            stream: false,
            keep_alive: serde_json::Value::from(self.keep_alive.as_str()),
        }).await?;

        info!("Ollama model '{}' loaded", model);
        self.loaded = Some(model.to_string());
        Ok(())
    }

    async fn respond(&mut self, prompt: &str) -> Result<String> {
        let model = self.loaded_model()?;
        let reply = self.generate(&GenerateRequest {
            model,
            prompt: Some(prompt),
            stream: false,
            keep_alive: serde_json::Value::from(self.keep_alive.as_str()),
        }).await?;

        debug!("Raw Ollama response: {}", reply.response);
        Ok(reply.response)
    }

    async fn unload(&mut self) -> Result<()> {
        let Some(model) = self.loaded.take() else {
            return Ok(());
        };

        self.generate(&GenerateRequest {
            model: &model,
            prompt: None,
            stream: false,
            keep_alive: serde_json::Value::from(0),
        }).await?;

        info!("Ollama model '{}' unloaded", model);
        Ok(())
    }
}
