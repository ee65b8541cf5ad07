use std::env;

/// Default base URL for the OpenAI REST API.
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Connection settings shared by the OpenAI chat and embedding clients.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiSettings {
    /// Bearer token. Absent keys surface as a configuration error on the
    /// first request, not at construction time.
    pub api_key: Option<String>,
    pub api_base: String,
}

impl OpenAiSettings {
    pub fn new(api_key: Option<String>, api_base: impl Into<String>) -> Self {
        Self {
            api_key,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Read `OPENAI_API_KEY` and `OPENAI_API_BASE`, loading a `.env` file
    /// first if one exists.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self::new(
            env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            env::var("OPENAI_API_BASE").unwrap_or_else(|_| DEFAULT_OPENAI_API_BASE.to_string()),
        )
    }

    /// Join `path` onto the API base.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self::new(None, DEFAULT_OPENAI_API_BASE)
    }
}
