//! Runtime configuration loaded from environment variables.
//!
//! - `GEMINI_API_KEY` - Enables model-backed generation. Unset means every
//!   component runs its local heuristic instead.
//! - `GEMINI_MODEL` - Model identifier (default: `gemini-1.5-flash-latest`)
//! - `GEMINI_BASE_URL` - API root (default: the public v1beta endpoint)
//! - `GEMINI_TEMPERATURE` - Sampling temperature (default: `0.1`)
//! - `DOC_ASSISTANT_UPLOAD_DIR` - Where uploaded files are written
//! - `DOC_ASSISTANT_SUMMARY_WORDS` - Summary word cap (default: 150)
//! - `DOC_ASSISTANT_CHALLENGE_COUNT` - Questions per challenge (default: 3)
//! - `DOC_ASSISTANT_MAX_UPLOAD_BYTES` - Upload body limit (default: 20 MiB)
//! - `DOC_ASSISTANT_CORS_ORIGINS` - Allowed origins, comma-separated

use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_SUMMARY_WORDS: usize = 150;
pub const DEFAULT_CHALLENGE_COUNT: usize = 3;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Question keys are `q1..qN` in a sorted map, so N stays single-digit.
const MAX_CHALLENGE_COUNT: usize = 9;

/// Settings for the remote generation backend.
#[derive(Clone, Debug)]
pub struct GenerationConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// `None` when no API key is configured.
    pub generation: Option<GenerationConfig>,
    pub upload_dir: PathBuf,
    pub summary_words: usize,
    pub challenge_count: usize,
    pub max_upload_bytes: usize,
    pub cors_origins: Option<Vec<String>>,
}

impl AppConfig {
    /// Load configuration from the environment (and `.env`, if present).
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Ignoring unreadable .env file: {}", e);
            }
        }

        let generation = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(|api_key| GenerationConfig {
                api_key,
                model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
                base_url: std::env::var("GEMINI_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
                temperature: env_or("GEMINI_TEMPERATURE", 0.1),
            });

        let upload_dir = std::env::var("DOC_ASSISTANT_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_upload_dir());

        let cors_origins = std::env::var("DOC_ASSISTANT_CORS_ORIGINS")
            .ok()
            .map(|s| s.split(',').map(|s| s.trim().to_string()).collect());

        Self {
            generation,
            upload_dir,
            summary_words: env_or("DOC_ASSISTANT_SUMMARY_WORDS", DEFAULT_SUMMARY_WORDS),
            challenge_count: env_or("DOC_ASSISTANT_CHALLENGE_COUNT", DEFAULT_CHALLENGE_COUNT)
                .clamp(1, MAX_CHALLENGE_COUNT),
            max_upload_bytes: env_or("DOC_ASSISTANT_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            cors_origins,
        }
    }

    /// Heuristic-only configuration writing uploads to `upload_dir` (for testing).
    pub fn for_tests(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            generation: None,
            upload_dir: upload_dir.into(),
            summary_words: DEFAULT_SUMMARY_WORDS,
            challenge_count: DEFAULT_CHALLENGE_COUNT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cors_origins: None,
        }
    }

    /// Enable model-backed generation with the default model and endpoint.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.generation = Some(GenerationConfig {
            api_key: key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.1,
        });
        self
    }
}

fn default_upload_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "doc-assistant")
        .map(|dirs| dirs.data_dir().join("uploads"))
        .unwrap_or_else(|| PathBuf::from("data").join("uploads"))
}

fn env_or<T: FromStr + Copy>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value for {}: {:?}, using default", name, raw);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_has_no_generation() {
        let config = AppConfig::for_tests("/tmp/uploads");
        assert!(config.generation.is_none());
        assert_eq!(config.summary_words, 150);
        assert_eq!(config.challenge_count, 3);
    }

    #[test]
    fn with_api_key_enables_generation() {
        let config = AppConfig::for_tests("/tmp/uploads").with_api_key("secret");
        let generation = config.generation.expect("generation configured");
        assert_eq!(generation.api_key, "secret");
        assert_eq!(generation.model, DEFAULT_MODEL);
    }

    #[test]
    fn env_or_falls_back_on_garbage() {
        std::env::set_var("DOC_ASSISTANT_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_or("DOC_ASSISTANT_TEST_GARBAGE", 7usize), 7);
        std::env::remove_var("DOC_ASSISTANT_TEST_GARBAGE");
    }
}
