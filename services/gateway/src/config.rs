use crate::protocol::AudioEncoding;
use secrecy::SecretString;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

const DEFAULT_AUTH_URL: &str = "https://login.usw2.pure.cloud/oauth/token";
const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub client_id: String,
    pub client_secret: SecretString,
    pub auth_url: String,
    pub ws_url: String,
    pub openai_api_key: Option<SecretString>,
    pub openai_api_base: String,
    pub transcription_model: String,
    pub audio_file_name: String,
    pub chat_model: String,
    pub system_prompt: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub audio_encoding: AudioEncoding,
    pub log_level: Level,
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}

fn or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let client_id = required("GENESYS_CLIENT_ID")?;
        let client_secret = SecretString::from(required("GENESYS_CLIENT_SECRET")?);
        let auth_url = or_default("GENESYS_AUTH_URL", DEFAULT_AUTH_URL);
        let ws_url = required("GENESYS_WS_URL")?;

        // Left optional on purpose: the binary warns when it is missing.
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok().map(SecretString::from);
        let openai_api_base = or_default("OPENAI_API_BASE", DEFAULT_OPENAI_API_BASE);

        let transcription_model = or_default("TRANSCRIPTION_MODEL", "whisper-1");
        let audio_file_name = or_default("AUDIO_FILENAME", "audio.wav");
        let chat_model = or_default("CHAT_MODEL", "gpt-4o");
        let system_prompt = or_default("SYSTEM_PROMPT", DEFAULT_SYSTEM_PROMPT);
        let tts_model = or_default("TTS_MODEL", "tts-1");
        let tts_voice = or_default("TTS_VOICE", "alloy");

        let encoding_str = or_default("AUDIO_ENCODING", "base64");
        let audio_encoding = encoding_str.parse::<AudioEncoding>().map_err(|_| {
            ConfigError::InvalidValue(
                "AUDIO_ENCODING".to_string(),
                format!("'{}' is not one of 'base64', 'latin1'", encoding_str),
            )
        })?;

        let log_level_str = or_default("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            client_id,
            client_secret,
            auth_url,
            ws_url,
            openai_api_key,
            openai_api_base,
            transcription_model,
            audio_file_name,
            chat_model,
            system_prompt,
            tts_model,
            tts_voice,
            audio_encoding,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;
    use std::env;

    const ALL_VARS: &[&str] = &[
        "GENESYS_CLIENT_ID",
        "GENESYS_CLIENT_SECRET",
        "GENESYS_AUTH_URL",
        "GENESYS_WS_URL",
        "OPENAI_API_KEY",
        "OPENAI_API_BASE",
        "TRANSCRIPTION_MODEL",
        "AUDIO_FILENAME",
        "CHAT_MODEL",
        "SYSTEM_PROMPT",
        "TTS_MODEL",
        "TTS_VOICE",
        "AUDIO_ENCODING",
        "RUST_LOG",
    ];

    fn clear_env_vars() {
        for var in ALL_VARS {
            unsafe {
                env::remove_var(var);
            }
        }
    }

    fn set_minimal_env() {
        unsafe {
            env::set_var("GENESYS_CLIENT_ID", "test-client");
            env::set_var("GENESYS_CLIENT_SECRET", "test-secret");
            env::set_var("GENESYS_WS_URL", "wss://audio.example.com/ws");
        }
    }

    #[test]
    fn test_config_error_display() {
        let missing_var = ConfigError::MissingVar("TEST_VAR".to_string());
        assert_eq!(
            format!("{}", missing_var),
            "Missing environment variable: TEST_VAR"
        );

        let invalid_value =
            ConfigError::InvalidValue("TEST_VAR".to_string(), "bad_value".to_string());
        assert_eq!(
            format!("{}", invalid_value),
            "Invalid value for environment variable TEST_VAR: bad_value"
        );
    }

    #[test]
    #[serial]
    fn test_config_from_env_minimal() {
        clear_env_vars();
        set_minimal_env();

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.client_id, "test-client");
        assert_eq!(config.client_secret.expose_secret(), "test-secret");
        assert_eq!(config.auth_url, DEFAULT_AUTH_URL);
        assert_eq!(config.ws_url, "wss://audio.example.com/ws");
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.openai_api_base, DEFAULT_OPENAI_API_BASE);
        assert_eq!(config.transcription_model, "whisper-1");
        assert_eq!(config.audio_file_name, "audio.wav");
        assert_eq!(config.chat_model, "gpt-4o");
        assert_eq!(config.system_prompt, "You are a helpful assistant.");
        assert_eq!(config.tts_model, "tts-1");
        assert_eq!(config.tts_voice, "alloy");
        assert_eq!(config.audio_encoding, AudioEncoding::Base64);
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    #[serial]
    fn test_config_from_env_custom_values() {
        clear_env_vars();
        set_minimal_env();
        unsafe {
            env::set_var("GENESYS_AUTH_URL", "https://login.mypurecloud.com/oauth/token");
            env::set_var("OPENAI_API_KEY", "custom-openai-key");
            env::set_var("OPENAI_API_BASE", "http://localhost:8080/v1");
            env::set_var("CHAT_MODEL", "gpt-4o-mini");
            env::set_var("SYSTEM_PROMPT", "You answer in one sentence.");
            env::set_var("TTS_VOICE", "nova");
            env::set_var("AUDIO_ENCODING", "LATIN1");
            env::set_var("RUST_LOG", "debug");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.auth_url, "https://login.mypurecloud.com/oauth/token");
        assert_eq!(
            config.openai_api_key.as_ref().map(|k| k.expose_secret()),
            Some("custom-openai-key")
        );
        assert_eq!(config.openai_api_base, "http://localhost:8080/v1");
        assert_eq!(config.chat_model, "gpt-4o-mini");
        assert_eq!(config.system_prompt, "You answer in one sentence.");
        assert_eq!(config.tts_voice, "nova");
        assert_eq!(config.audio_encoding, AudioEncoding::Latin1);
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    #[serial]
    fn test_config_missing_client_secret() {
        clear_env_vars();
        set_minimal_env();
        unsafe {
            env::remove_var("GENESYS_CLIENT_SECRET");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(var) => assert_eq!(var, "GENESYS_CLIENT_SECRET"),
            _ => panic!("Expected MissingVar for GENESYS_CLIENT_SECRET"),
        }
    }

    #[test]
    #[serial]
    fn test_config_missing_ws_url() {
        clear_env_vars();
        unsafe {
            env::set_var("GENESYS_CLIENT_ID", "test-client");
            env::set_var("GENESYS_CLIENT_SECRET", "test-secret");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(var) => assert_eq!(var, "GENESYS_WS_URL"),
            _ => panic!("Expected MissingVar for GENESYS_WS_URL"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_audio_encoding() {
        clear_env_vars();
        set_minimal_env();
        unsafe {
            env::set_var("AUDIO_ENCODING", "hex");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "AUDIO_ENCODING"),
            _ => panic!("Expected InvalidValue for AUDIO_ENCODING"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_log_level() {
        clear_env_vars();
        set_minimal_env();
        unsafe {
            env::set_var("RUST_LOG", "not-a-level");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "RUST_LOG"),
            _ => panic!("Expected InvalidValue for RUST_LOG"),
        }
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let config = Config {
            client_id: "id".to_string(),
            client_secret: SecretString::from("super-secret-value".to_string()),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            ws_url: "wss://x".to_string(),
            openai_api_key: Some(SecretString::from("sk-very-secret".to_string())),
            openai_api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            transcription_model: "whisper-1".to_string(),
            audio_file_name: "audio.wav".to_string(),
            chat_model: "gpt-4o".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
            audio_encoding: AudioEncoding::Base64,
            log_level: Level::INFO,
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-value"));
        assert!(!debug.contains("sk-very-secret"));
    }
}
