use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{OllaBenchError, Result};

pub const DEFAULT_OLLAMA_HOST: &str = "http://127.0.0.1:11434";

/// Settings file contents. Every field falls back to its default when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OllaBenchSettings {
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

impl OllaBenchSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            OllaBenchError::Settings(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_host")]
    pub host: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
        }
    }
}

fn default_host() -> String {
    DEFAULT_OLLAMA_HOST.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub prompt_tokens: u32,
    pub max_tokens: u32,
    pub num_runs: u32,
    pub stream_max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            prompt_tokens: 128,
            max_tokens: 128,
            num_runs: 3,
            stream_max_tokens: 10_000,
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}
