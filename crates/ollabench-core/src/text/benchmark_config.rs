use serde::{Deserialize, Serialize};

use crate::{OllaBenchError, Result};

/// Parameters of one throughput benchmark session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    pub model: String,
    /// Approximate prompt length in tokens.
    pub prompt_tokens: u32,
    /// Requested generation length (`num_predict`).
    pub max_tokens: u32,
    pub num_runs: u32,
    /// Use the code-generation prompt template instead of word repetition.
    #[serde(default)]
    pub coding_mode: bool,
}

impl BenchmarkConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt_tokens: 128,
            max_tokens: 128,
            num_runs: 3,
            coding_mode: false,
        }
    }

    pub fn with_prompt_tokens(mut self, prompt_tokens: u32) -> Self {
        self.prompt_tokens = prompt_tokens;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_num_runs(mut self, num_runs: u32) -> Self {
        self.num_runs = num_runs;
        self
    }

    pub fn with_coding_mode(mut self, coding_mode: bool) -> Self {
        self.coding_mode = coding_mode;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(OllaBenchError::InvalidConfig("model must not be empty".into()));
        }
        if self.num_runs == 0 {
            return Err(OllaBenchError::InvalidConfig(
                "num_runs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Parameters of a single streaming generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl StreamConfig {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            max_tokens: 10_000,
            temperature: 0.7,
            top_p: 0.9,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_sampling(mut self, temperature: f32, top_p: f32) -> Self {
        self.temperature = temperature;
        self.top_p = top_p;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(OllaBenchError::InvalidConfig("model must not be empty".into()));
        }
        Ok(())
    }
}
