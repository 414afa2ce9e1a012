use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for the avatar service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub chat: ChatConfig,
    pub image: ImageConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub bind: String,
}

/// Chat-completion provider settings (persona generation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Case text beyond this many bytes is clamped before prompting; the
    /// pipeline reports the truncation in the outcome.
    pub max_input_chars: usize,
    pub timeout_seconds: u64,
}

/// Image-generation provider settings (headshot rendering).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub width: u32,
    pub height: u32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_files: usize,
    pub max_file_bytes: usize,
}

impl Config {
    /// Load configuration from file with environment variable overrides
    /// ALWAYS returns a valid config - never fails
    pub fn load() -> Self {
        // Load environment variables from .env files
        let env_paths = ["../.env", ".env"];

        let mut env_loaded = false;
        for path in &env_paths {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                env_loaded = true;
                break;
            }
        }

        if !env_loaded {
            tracing::warn!(
                "No .env file found in any expected location - continuing with env vars only"
            );
        }

        let config_path =
            env::var("DEPOSIA_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match serde_yaml::from_str::<Config>(&contents) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", config_path);
                        config
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to parse config file {}: {} - using defaults",
                            config_path,
                            e
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            tracing::warn!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        // Apply environment variable overrides
        config.apply_env_overrides();

        // Validate configuration - log warnings but don't fail
        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Server overrides
        if let Ok(name) = env::var("DEPOSIA_SERVER_NAME") {
            self.server.name = name;
        }
        if let Ok(bind) = env::var("DEPOSIA_BIND") {
            self.server.bind = bind;
        }

        // Chat provider overrides
        if let Ok(api_key) = env::var("CHAT_API_KEY").or_else(|_| env::var("OPENAI_API_KEY")) {
            self.chat.api_key = api_key;
        }
        if let Ok(api_url) = env::var("CHAT_API_URL") {
            self.chat.api_url = api_url;
        }
        if let Ok(model) = env::var("CHAT_MODEL") {
            self.chat.model = model;
        }
        if let Ok(max_tokens) = env::var("CHAT_MAX_TOKENS") {
            if let Ok(max) = max_tokens.parse() {
                self.chat.max_tokens = max;
            }
        }
        if let Ok(temperature) = env::var("CHAT_TEMPERATURE") {
            if let Ok(temp) = temperature.parse() {
                self.chat.temperature = temp;
            }
        }
        if let Ok(timeout) = env::var("CHAT_TIMEOUT_SECONDS") {
            if let Ok(secs) = timeout.parse() {
                self.chat.timeout_seconds = secs;
            }
        }

        // Image provider overrides
        if let Ok(api_key) = env::var("IMAGE_API_KEY").or_else(|_| env::var("TOGETHER_API_KEY")) {
            self.image.api_key = api_key;
        }
        if let Ok(api_url) = env::var("IMAGE_API_URL") {
            self.image.api_url = api_url;
        }
        if let Ok(model) = env::var("IMAGE_MODEL") {
            self.image.model = model;
        }
        if let Ok(timeout) = env::var("IMAGE_TIMEOUT_SECONDS") {
            if let Ok(secs) = timeout.parse() {
                self.image.timeout_seconds = secs;
            }
        }

        // Upload overrides
        if let Ok(max_files) = env::var("UPLOAD_MAX_FILES") {
            if let Ok(max) = max_files.parse() {
                self.upload.max_files = max;
            }
        }
        if let Ok(max_bytes) = env::var("UPLOAD_MAX_FILE_BYTES") {
            if let Ok(max) = max_bytes.parse() {
                self.upload.max_file_bytes = max;
            }
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if !(0.0..=2.0).contains(&self.chat.temperature) {
            return Err("Chat temperature must be between 0.0 and 2.0".into());
        }
        if self.chat.max_tokens == 0 {
            return Err("Chat max_tokens cannot be 0".into());
        }
        if self.chat.timeout_seconds == 0 || self.image.timeout_seconds == 0 {
            return Err("Provider timeouts cannot be 0".into());
        }
        if self.upload.max_files == 0 {
            return Err("Upload max_files cannot be 0".into());
        }
        if !self.providers_configured() {
            return Err("CHAT_API_KEY and IMAGE_API_KEY environment variables must be set".into());
        }
        Ok(())
    }

    /// Whether both provider keys are present. Feeds the `/avatar/status`
    /// readiness flag; a server can start without keys but cannot create
    /// avatars.
    pub fn providers_configured(&self) -> bool {
        !self.chat.api_key.is_empty()
            && self.chat.api_key != "PLACEHOLDER_CHAT_API_KEY"
            && !self.image.api_key.is_empty()
            && self.image.api_key != "PLACEHOLDER_IMAGE_API_KEY"
    }

    pub fn chat_timeout(&self) -> Duration {
        Duration::from_secs(self.chat.timeout_seconds)
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image.timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "deposia".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                bind: "127.0.0.1:8000".to_string(),
            },
            chat: ChatConfig {
                api_key: env::var("CHAT_API_KEY")
                    .or_else(|_| env::var("OPENAI_API_KEY"))
                    .unwrap_or_else(|_| {
                        tracing::warn!("CHAT_API_KEY not set, using placeholder");
                        "PLACEHOLDER_CHAT_API_KEY".to_string()
                    }),
                api_url: "https://api.openai.com/v1/chat/completions".to_string(),
                model: "gpt-4o-mini".to_string(),
                max_tokens: 1500,
                temperature: 0.7,
                max_input_chars: 12000,
                timeout_seconds: 60,
            },
            image: ImageConfig {
                api_key: env::var("IMAGE_API_KEY")
                    .or_else(|_| env::var("TOGETHER_API_KEY"))
                    .unwrap_or_else(|_| {
                        tracing::warn!("IMAGE_API_KEY not set, using placeholder");
                        "PLACEHOLDER_IMAGE_API_KEY".to_string()
                    }),
                api_url: "https://api.together.xyz/v1/images/generations".to_string(),
                model: "black-forest-labs/FLUX.1-schnell-Free".to_string(),
                width: 1024,
                height: 1024,
                timeout_seconds: 90,
            },
            upload: UploadConfig {
                max_files: 5,
                max_file_bytes: 10 * 1024 * 1024,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid_apart_from_keys() {
        let mut cfg = Config::default();
        cfg.chat.api_key = "sk-test".to_string();
        cfg.image.api_key = "tg-test".to_string();
        assert!(cfg.validate().is_ok());
        assert!(cfg.providers_configured());
    }

    #[test]
    fn test_placeholder_keys_are_not_ready() {
        let mut cfg = Config::default();
        cfg.chat.api_key = "PLACEHOLDER_CHAT_API_KEY".to_string();
        cfg.image.api_key = "tg-test".to_string();
        assert!(!cfg.providers_configured());
    }

    #[test]
    fn test_yaml_round_trip() {
        let cfg = Config::default();
        let yaml = serde_yaml::to_string(&cfg).expect("config should serialize");
        let parsed: Config = serde_yaml::from_str(&yaml).expect("config should parse");
        assert_eq!(parsed.chat.model, cfg.chat.model);
        assert_eq!(parsed.image.api_url, cfg.image.api_url);
        assert_eq!(parsed.upload.max_files, cfg.upload.max_files);
    }

    #[test]
    fn test_env_override_applies() {
        let mut cfg = Config::default();
        env::set_var("CHAT_MAX_TOKENS", "321");
        cfg.apply_env_overrides();
        env::remove_var("CHAT_MAX_TOKENS");
        assert_eq!(cfg.chat.max_tokens, 321);
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut cfg = Config::default();
        cfg.chat.api_key = "sk-test".to_string();
        cfg.image.api_key = "tg-test".to_string();
        cfg.image.timeout_seconds = 0;
        assert!(cfg.validate().is_err());
    }
}
