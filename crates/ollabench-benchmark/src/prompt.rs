//! Prompt templates sized to an approximate token count.

use ollabench_core::BenchmarkConfig;

const WORD_PROMPT_PREFIX: &str = "Say the following words: ";
const FILLER_WORD: &str = "test";

const CODING_PROMPT: &str = "You are an expert programmer. Write detailed code for a complex application. \
Include comments, error handling, and documentation. \
Generate production-ready code with the following sections:\n\n";

/// Default prompt for streaming runs.
pub const STREAMING_PROMPT: &str = "You are an expert programmer. Write a complete, production-ready application.

Requirements:
- Full-stack web application
- REST API with Node.js/Express
- PostgreSQL database
- React frontend
- Authentication system
- Real-time notifications
- Unit tests
- Docker deployment

Generate all the code with detailed comments and documentation.";

pub fn build_prompt(config: &BenchmarkConfig) -> String {
    if config.coding_mode {
        return coding_prompt(config.prompt_tokens);
    }
    word_prompt(config.prompt_tokens)
}

/// One filler word per requested token.
pub fn word_prompt(prompt_tokens: u32) -> String {
    let words = vec![FILLER_WORD; prompt_tokens as usize].join(" ");
    format!("{WORD_PROMPT_PREFIX}{words}")
}

/// Coding instructions padded with one blank per requested token.
pub fn coding_prompt(prompt_tokens: u32) -> String {
    let mut prompt = String::with_capacity(CODING_PROMPT.len() + prompt_tokens as usize);
    prompt.push_str(CODING_PROMPT);
    prompt.extend(std::iter::repeat(' ').take(prompt_tokens as usize));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_prompt_repeats_filler() {
        assert_eq!(word_prompt(3), "Say the following words: test test test");
        assert_eq!(
            word_prompt(128)
                .trim_start_matches(WORD_PROMPT_PREFIX)
                .split(' ')
                .count(),
            128
        );
    }

    #[test]
    fn test_word_prompt_zero_tokens() {
        assert_eq!(word_prompt(0), WORD_PROMPT_PREFIX);
    }

    #[test]
    fn test_coding_prompt_padding() {
        let prompt = coding_prompt(10);
        assert!(prompt.starts_with("You are an expert programmer."));
        assert!(prompt.ends_with(&format!("sections:\n\n{}", " ".repeat(10))));
        assert_eq!(prompt.len(), CODING_PROMPT.len() + 10);
    }

    #[test]
    fn test_build_prompt_selects_template() {
        let plain = BenchmarkConfig::new("m").with_prompt_tokens(2);
        assert_eq!(build_prompt(&plain), "Say the following words: test test");

        let coding = plain.with_coding_mode(true);
        assert!(build_prompt(&coding).starts_with("You are an expert programmer."));
    }
}
