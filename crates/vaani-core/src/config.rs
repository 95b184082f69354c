use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, VaaniError};
use crate::languages;
use crate::types::{NumeralsFormat, OutputScript, SpeakerGender, TranslationMode};

/// Widget positions accepted by the embed script.
pub const VALID_POSITIONS: &[&str] = &["bottom-right", "bottom-left", "top-right", "top-left"];

/// Top-level configuration for the Vaani backend.
///
/// Loaded from `~/.vaani/config.toml` by default. Each section corresponds to
/// one concern: the HTTP listener, the upstream provider, and the widget
/// defaults handed to every session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaaniConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub widget: WidgetConfig,
}

impl VaaniConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: VaaniConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Check the widget section, collecting every violation.
    pub fn validate(&self) -> Result<()> {
        let errors = self.widget.validation_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(VaaniError::Validation(errors))
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Origins allowed by CORS. Empty means any origin.
    pub allowed_origins: Vec<String>,
    /// Request body limit, sized for audio uploads.
    pub max_upload_bytes: usize,
    /// Widget sessions idle this long are dropped. 0 keeps them until the
    /// widget deletes them.
    pub session_idle_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            log_level: "info".to_string(),
            allowed_origins: Vec::new(),
            max_upload_bytes: 10 * 1024 * 1024,
            session_idle_secs: 30 * 60,
        }
    }
}

/// Upstream AI provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    /// Subscription key injected as `api-subscription-key`. Usually supplied
    /// through `SARVAM_API_KEY` rather than the file.
    pub api_key: String,
    pub timeout_secs: u64,
    pub chat_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Longer TTS input is truncated with a trailing ellipsis.
    pub tts_max_chars: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.sarvam.ai".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
            chat_model: "sarvam-m".to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            tts_max_chars: 2500,
        }
    }
}

impl ProviderConfig {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Widget defaults served to the embed script and used by sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub position: String,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    pub enable_voice: bool,
    /// System prompt seeded at index 0 of every conversation.
    pub context: String,
    /// Languages offered in the selector; the first is the initial language.
    pub languages: Vec<String>,
    pub auto_open: bool,
    pub show_welcome_message: bool,
    pub max_messages: u32,
    pub placeholder: String,
    /// Re-translate the conversation when the user switches language.
    pub enable_auto_translation: bool,
    #[serde(default)]
    pub translation: TranslationConfig,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            position: "bottom-right".to_string(),
            theme: ThemeConfig::default(),
            agent: AgentConfig::default(),
            enable_voice: true,
            context: "You are a helpful AI assistant. Please provide clear, accurate, and helpful responses to user questions.".to_string(),
            languages: ["en", "hi", "ta", "te", "bn"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            auto_open: false,
            show_welcome_message: true,
            max_messages: 50,
            placeholder: "Type your message...".to_string(),
            enable_auto_translation: true,
            translation: TranslationConfig::default(),
        }
    }
}

impl WidgetConfig {
    /// Language a new session starts in.
    pub fn initial_language(&self) -> &str {
        self.languages.first().map(String::as_str).unwrap_or("en")
    }

    /// All violations, in a stable order. Empty when valid.
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !VALID_POSITIONS.contains(&self.position.as_str()) {
            errors.push(format!(
                "Invalid position: {}. Must be one of: {}",
                self.position,
                VALID_POSITIONS.join(", ")
            ));
        }

        let colors = [
            ("primaryColor", &self.theme.primary_color, "#4F46E5"),
            ("background", &self.theme.background, "#ffffff"),
            ("text", &self.theme.text, "#111827"),
        ];
        for (field, value, example) in colors {
            if !is_hex_color(value) {
                errors.push(format!(
                    "Invalid {}: must be a valid hex color (e.g., {})",
                    field, example
                ));
            }
        }

        let invalid: Vec<&str> = self
            .languages
            .iter()
            .map(String::as_str)
            .filter(|code| !languages::is_supported(code))
            .collect();
        if !invalid.is_empty() {
            let supported: Vec<&str> = languages::SUPPORTED_LANGUAGES
                .iter()
                .map(|l| l.code.as_ref())
                .collect();
            errors.push(format!(
                "Invalid languages: {}. Supported: {}",
                invalid.join(", "),
                supported.join(", ")
            ));
        }

        if !(1..=1000).contains(&self.max_messages) {
            errors.push("maxMessages must be between 1 and 1000".to_string());
        }

        errors
    }
}

/// `#RRGGBB`, case-insensitive.
pub fn is_hex_color(value: &str) -> bool {
    static HEX: OnceLock<Regex> = OnceLock::new();
    HEX.get_or_init(|| Regex::new(r"(?i)^#[0-9a-f]{6}$").expect("Invalid hex color regex"))
        .is_match(value)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub primary_color: String,
    pub background: String,
    pub text: String,
    pub font: String,
    pub border_radius: String,
    pub shadow: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            primary_color: "#4F46E5".to_string(),
            background: "#ffffff".to_string(),
            text: "#1f2937".to_string(),
            font: "Inter, system-ui, sans-serif".to_string(),
            border_radius: "16px".to_string(),
            shadow: "0 8px 32px rgba(0, 0, 0, 0.12)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub name: String,
    pub avatar: String,
    pub greeting: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "HelperBot".to_string(),
            avatar: String::new(),
            greeting: "Hello! How can I help you today?".to_string(),
        }
    }
}

/// Options sent with every switch-triggered translation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Provider model; the default favours broad language coverage.
    pub model: String,
    pub mode: TranslationMode,
    pub enable_preprocessing: bool,
    pub numerals_format: NumeralsFormat,
    pub output_script: Option<OutputScript>,
    pub speaker_gender: Option<SpeakerGender>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            model: "sarvam-translate:v1".to_string(),
            mode: TranslationMode::Formal,
            enable_preprocessing: true,
            numerals_format: NumeralsFormat::International,
            output_script: None,
            speaker_gender: None,
        }
    }
}
