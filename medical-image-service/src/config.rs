//! Service configuration read from the environment.
//!
//! API keys are required; every other setting has a default matching the
//! public OCR.space, Groq and Google Translate endpoints.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_OCR_ENDPOINT: &str = "https://api.ocr.space/parse/image";
pub const DEFAULT_CHAT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
pub const DEFAULT_CHAT_MODEL: &str = "llama3-70b-8192";
pub const DEFAULT_MAX_INPUT_CHARS: usize = 3000;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct OcrConfig {
    pub endpoint: String,
    pub api_key: String,
    pub language: String,
}

#[derive(Clone)]
pub struct ChatConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct TranslationConfig {
    pub endpoint: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub chat: ChatConfig,
    pub translation: TranslationConfig,
    /// Longest OCR text sent to the model before truncation.
    pub max_input_chars: usize,
    /// `None` leaves outbound requests unbounded.
    pub request_timeout: Option<Duration>,
    /// Send the OCR failure text to the model instead of skipping analysis.
    pub analyze_on_ocr_failure: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let or_default =
            |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 120)?;

        Ok(Self {
            server: ServerConfig {
                host: or_default("HOST", "0.0.0.0"),
                port: parse_or(&lookup, "PORT", 3000)?,
                max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            },
            ocr: OcrConfig {
                endpoint: or_default("OCR_ENDPOINT", DEFAULT_OCR_ENDPOINT),
                api_key: required("OCR_SPACE_API_KEY")?,
                language: or_default("OCR_LANGUAGE", "eng"),
            },
            chat: ChatConfig {
                endpoint: or_default("CHAT_ENDPOINT", DEFAULT_CHAT_ENDPOINT),
                api_key: required("GROQ_API_KEY")?,
                model: or_default("CHAT_MODEL", DEFAULT_CHAT_MODEL),
                max_tokens: parse_or(&lookup, "CHAT_MAX_TOKENS", 1000)?,
                temperature: parse_or(&lookup, "CHAT_TEMPERATURE", 0.7)?,
            },
            translation: TranslationConfig {
                endpoint: or_default("TRANSLATE_ENDPOINT", DEFAULT_TRANSLATE_ENDPOINT),
            },
            max_input_chars: parse_or(&lookup, "MAX_INPUT_CHARS", DEFAULT_MAX_INPUT_CHARS)?,
            request_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            analyze_on_ocr_failure: parse_or(&lookup, "ANALYZE_ON_OCR_FAILURE", false)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        _ => Ok(default),
    }
}

fn redact(secret: &str) -> String {
    if secret.len() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", &secret[..secret.char_indices().nth(4).map_or(0, |(i, _)| i)])
    }
}

impl fmt::Debug for OcrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &redact(&self.api_key))
            .field("language", &self.language)
            .finish()
    }
}

impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| env.get(name).cloned()
    }

    const KEYS: &[(&str, &str)] = &[
        ("OCR_SPACE_API_KEY", "ocr-key-123456"),
        ("GROQ_API_KEY", "gsk_secretsecret"),
    ];

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(KEYS)).unwrap();
        assert_eq!(config.ocr.endpoint, DEFAULT_OCR_ENDPOINT);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.chat.model, "llama3-70b-8192");
        assert_eq!(config.chat.max_tokens, 1000);
        assert!((config.chat.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.max_input_chars, 3000);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(120)));
        assert!(!config.analyze_on_ocr_failure);
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_missing_keys() {
        let err = AppConfig::from_lookup(lookup_from(&[("GROQ_API_KEY", "x")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("OCR_SPACE_API_KEY"));

        let err = AppConfig::from_lookup(lookup_from(&[
            ("OCR_SPACE_API_KEY", "x"),
            ("GROQ_API_KEY", "  "),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("GROQ_API_KEY"));
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let mut pairs = KEYS.to_vec();
        pairs.extend([
            ("PORT", "8080"),
            ("REQUEST_TIMEOUT_SECS", "0"),
            ("ANALYZE_ON_OCR_FAILURE", "true"),
            ("CHAT_MODEL", "llama-3.3-70b-versatile"),
        ]);
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.request_timeout, None);
        assert!(config.analyze_on_ocr_failure);
        assert_eq!(config.chat.model, "llama-3.3-70b-versatile");

        let mut pairs = KEYS.to_vec();
        pairs.push(("CHAT_TEMPERATURE", "warm"));
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "CHAT_TEMPERATURE", .. }));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = AppConfig::from_lookup(lookup_from(KEYS)).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("gsk_secretsecret"));
        assert!(!debug.contains("ocr-key-123456"));
        assert!(debug.contains("gsk_****"));
    }
}
