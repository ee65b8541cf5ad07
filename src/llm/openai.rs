use std::sync::OnceLock;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::llm::client::Model;
use crate::types::{AppError, Result};
use crate::utils::config::OpenAiSettings;

/// OpenAI chat completion model.
pub struct OpenAi {
    client: Client,
    settings: OnceLock<OpenAiSettings>,
    model: String,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAi {
    /// Create a model using settings from the environment.
    ///
    /// The environment is read on the first request, not here.
    pub fn new(model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client: Client::new(),
            settings: OnceLock::new(),
            model: model.into(),
            temperature,
        }
    }

    pub fn with_settings(settings: OpenAiSettings, model: impl Into<String>, temperature: f32) -> Self {
        let model = Self::new(model, temperature);
        // Freshly created, so the cell is always empty here
        let _ = model.settings.set(settings);
        model
    }

    fn settings(&self) -> &OpenAiSettings {
        self.settings.get_or_init(OpenAiSettings::from_env)
    }

    fn api_key(&self) -> Result<&str> {
        self.settings().api_key.as_deref().ok_or_else(|| {
            AppError::Configuration("OPENAI_API_KEY is not set".to_string())
        })
    }
}

#[async_trait]
impl Model for OpenAi {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    #[instrument(skip(self, system, prompt), fields(model = %self.model))]
    async fn generate(&self, system: &str, prompt: &str) -> Result<String> {
        let api_key = self.api_key()?;
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(self.settings().endpoint("chat/completions"))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::LLM(format!("OpenAI API error: {}", e)))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::LLM("OpenAI rate limited".to_string()));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::LLM(format!("HTTP {}: {}", status, body)));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLM(format!("Invalid OpenAI response: {}", e)))?;

        debug!("Received {} choices", chat.choices.len());
        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::LLM("No response from OpenAI".to_string()))
    }
}
