use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default)]
    pub progression: ProgressionSettings,
    #[serde(default = "default_gifts")]
    pub gifts: Vec<GiftConfig>,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            matching: MatchingSettings::default(),
            chat: ChatSettings::default(),
            progression: ProgressionSettings::default(),
            gifts: default_gifts(),
            logging: LoggingSettings::default(),
        }
    }
}

/// One entry of the purchasable gift catalog
#[derive(Debug, Clone, Deserialize)]
pub struct GiftConfig {
    pub id: String,
    pub label: String,
    pub emoji: String,
    pub cost: u32,
}

/// The storefront the app ships with: Rose 10, Teddy 50, Diamond 100
fn default_gifts() -> Vec<GiftConfig> {
    vec![
        GiftConfig {
            id: "rose".to_string(),
            label: "Rose".to_string(),
            emoji: "🌹".to_string(),
            cost: 10,
        },
        GiftConfig {
            id: "bear".to_string(),
            label: "Teddy".to_string(),
            emoji: "🧸".to_string(),
            cost: 50,
        },
        GiftConfig {
            id: "diamond".to_string(),
            label: "Diamond".to_string(),
            emoji: "💎".to_string(),
            cost: 100,
        },
    ]
}

/// Match-trigger policy selection
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    /// "probability" or "every_nth"
    #[serde(default = "default_policy")]
    pub policy: String,
    #[serde(default = "default_probability")]
    pub probability: f64,
    #[serde(default = "default_every_nth")]
    pub every_nth: u32,
    /// Fixed session seed; omitted means seed from entropy
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            probability: default_probability(),
            every_nth: default_every_nth(),
            seed: None,
        }
    }
}

fn default_policy() -> String { "probability".to_string() }
fn default_probability() -> f64 { 0.3 }
fn default_every_nth() -> u32 { 2 }

/// Bot-response delays per trigger kind, in milliseconds
#[derive(Debug, Clone, Deserialize)]
pub struct ChatSettings {
    #[serde(default = "default_text_typing_ms")]
    pub text_typing_ms: u64,
    #[serde(default = "default_text_reply_ms")]
    pub text_reply_ms: u64,
    #[serde(default = "default_invite_typing_ms")]
    pub invite_typing_ms: u64,
    #[serde(default = "default_invite_reply_ms")]
    pub invite_reply_ms: u64,
    #[serde(default = "default_gift_typing_ms")]
    pub gift_typing_ms: u64,
    #[serde(default = "default_gift_reply_ms")]
    pub gift_reply_ms: u64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            text_typing_ms: default_text_typing_ms(),
            text_reply_ms: default_text_reply_ms(),
            invite_typing_ms: default_invite_typing_ms(),
            invite_reply_ms: default_invite_reply_ms(),
            gift_typing_ms: default_gift_typing_ms(),
            gift_reply_ms: default_gift_reply_ms(),
        }
    }
}

fn default_text_typing_ms() -> u64 { 1000 }
fn default_text_reply_ms() -> u64 { 2500 }
fn default_invite_typing_ms() -> u64 { 1000 }
fn default_invite_reply_ms() -> u64 { 3000 }
fn default_gift_typing_ms() -> u64 { 800 }
fn default_gift_reply_ms() -> u64 { 2000 }

/// Progression amounts
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressionSettings {
    #[serde(default = "default_daily_bonus_xp")]
    pub daily_bonus_xp: u64,
}

impl Default for ProgressionSettings {
    fn default() -> Self {
        Self {
            daily_bonus_xp: default_daily_bonus_xp(),
        }
    }
}

fn default_daily_bonus_xp() -> u64 { 50 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with LUMINA_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., LUMINA_MATCHING__PROBABILITY -> matching.probability
            .add_source(
                Environment::with_prefix("LUMINA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("LUMINA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matching() {
        let matching = MatchingSettings::default();
        assert_eq!(matching.policy, "probability");
        assert_eq!(matching.probability, 0.3);
        assert_eq!(matching.every_nth, 2);
        assert!(matching.seed.is_none());
    }

    #[test]
    fn test_default_chat_delays() {
        let chat = ChatSettings::default();
        assert_eq!(chat.text_typing_ms, 1000);
        assert_eq!(chat.text_reply_ms, 2500);
        assert_eq!(chat.invite_reply_ms, 3000);
        assert_eq!(chat.gift_typing_ms, 800);
    }

    #[test]
    fn test_default_gift_catalog() {
        let gifts = default_gifts();
        assert_eq!(gifts.len(), 3);
        assert_eq!(gifts[0].cost, 10);
        assert_eq!(gifts[2].id, "diamond");
        assert_eq!(gifts[2].cost, 100);
        assert_eq!(Settings::default().gifts.len(), 3);
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }
}
