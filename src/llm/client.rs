//! Model contract and preset selection
//!
//! - [`Model`] - what a language model exposes to the application
//! - [`SimpleModel`] - closed set of named presets
//! - [`ModelSelection`] - either a preset or a caller-supplied model

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{AppError, Result};

/// Generic language model trait for provider abstraction
///
/// All models implement this trait, allowing the application to swap
/// providers without changing orchestration code.
#[async_trait]
pub trait Model: Send + Sync {
    /// Get the model name/identifier
    fn model_name(&self) -> &str;

    /// Sampling temperature this instance was configured with
    fn temperature(&self) -> f32;

    /// One-time setup, run while the application initializes
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    /// Generate a completion for `prompt`, with `system` as the system message
    async fn generate(&self, system: &str, prompt: &str) -> Result<String>;
}

/// Named model presets.
///
/// | Preset | Model id |
/// |--------|----------|
/// | `OpenAiGpt3Turbo` | `gpt-3.5-turbo` |
/// | `OpenAiGpt4` | `gpt-4` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SimpleModel {
    #[default]
    OpenAiGpt3Turbo,
    OpenAiGpt4,
}

impl SimpleModel {
    /// All presets, in declaration order
    pub fn all() -> [SimpleModel; 2] {
        [SimpleModel::OpenAiGpt3Turbo, SimpleModel::OpenAiGpt4]
    }

    /// Provider model id this preset maps to
    pub fn model_id(&self) -> &'static str {
        match self {
            SimpleModel::OpenAiGpt3Turbo => "gpt-3.5-turbo",
            SimpleModel::OpenAiGpt4 => "gpt-4",
        }
    }

    /// Construct a fresh model instance for this preset at `temperature`.
    pub fn resolve(self, temperature: f32) -> Arc<dyn Model> {
        Arc::new(super::openai::OpenAi::new(self.model_id(), temperature))
    }
}

impl FromStr for SimpleModel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gpt-3.5-turbo" | "gpt3" | "open-ai-gpt3-turbo" | "openai-gpt3-turbo" => {
                Ok(Self::OpenAiGpt3Turbo)
            }
            "gpt-4" | "gpt4" | "open-ai-gpt4" | "openai-gpt4" => Ok(Self::OpenAiGpt4),
            _ => Err(AppError::InvalidInput(format!(
                "Unknown model preset: {}. Use: gpt-3.5-turbo, gpt-4",
                s
            ))),
        }
    }
}

impl fmt::Display for SimpleModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.model_id())
    }
}

/// How the application's model was chosen.
///
/// A preset is re-resolved whenever the builder's temperature changes;
/// a custom model is kept exactly as supplied.
#[derive(Clone)]
pub enum ModelSelection {
    Preset(SimpleModel),
    Custom(Arc<dyn Model>),
}

impl ModelSelection {
    /// Wrap a concrete model as a custom selection
    pub fn custom(model: impl Model + 'static) -> Self {
        ModelSelection::Custom(Arc::new(model))
    }

    /// The preset, when this selection is one
    pub fn preset(&self) -> Option<SimpleModel> {
        match self {
            ModelSelection::Preset(preset) => Some(*preset),
            ModelSelection::Custom(_) => None,
        }
    }
}

impl From<SimpleModel> for ModelSelection {
    fn from(preset: SimpleModel) -> Self {
        ModelSelection::Preset(preset)
    }
}

impl From<Arc<dyn Model>> for ModelSelection {
    fn from(model: Arc<dyn Model>) -> Self {
        ModelSelection::Custom(model)
    }
}

impl fmt::Debug for ModelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSelection::Preset(preset) => f.debug_tuple("Preset").field(preset).finish(),
            ModelSelection::Custom(model) => {
                f.debug_tuple("Custom").field(&model.model_name()).finish()
            }
        }
    }
}
