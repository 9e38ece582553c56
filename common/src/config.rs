use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Bearer token for the completion endpoint. Blank by default; supplied
    /// externally, never acquired here.
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.api_key = key;
        }

        if let Ok(model) = std::env::var("CHATBOX_MODEL") {
            if !model.is_empty() {
                config.model = model;
            }
        }

        if let Ok(endpoint) = std::env::var("CHATBOX_ENDPOINT") {
            if !endpoint.is_empty() {
                config.endpoint = endpoint;
            }
        }

        config
    }
}
