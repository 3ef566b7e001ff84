//! Bot configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DISCORD_BOT_TOKEN` - Bot token used for REST calls
//! - `DISCORD_APPLICATION_ID` - Application snowflake (interaction webhooks)
//! - `DISCORD_PUBLIC_KEY` - Hex-encoded Ed25519 key for request verification
//! - `DISCORD_GUILD_ID` - Guild the bot manages
//! - `AUDIT_CHANNEL_ID` - Channel receiving audit notifications
//! - `ELEVATED_ROLE_IDS` - Comma-separated roles allowed to open the wizard
//!
//! ## Optional
//! - `BOT_HOST` - Bind address (default: 127.0.0.1)
//! - `BOT_PORT` - Listen port (default: 3002)
//! - `DISCORD_API_BASE` - REST base URL (default: <https://discord.com/api/v10>)
//! - `PRESS_TIMEOUT_SECS` - Upper bound on a role button press (default: 20)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use ed25519_dalek::VerifyingKey;
use rolebutton_core::{ApplicationId, ChannelId, GuildId, RoleId};
use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Discord credentials and guild
    pub discord: DiscordConfig,
    /// Channel receiving audit notifications
    pub audit_channel_id: ChannelId,
    /// Roles whose holders may manage buttons
    pub elevated_role_ids: Vec<RoleId>,
    /// Upper bound on handling one role button press
    pub press_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
}

/// Discord application configuration.
///
/// Implements `Debug` manually to redact the bot token.
#[derive(Clone)]
pub struct DiscordConfig {
    /// REST API base URL, without a trailing slash
    pub api_base: String,
    /// Bot token
    pub bot_token: SecretString,
    /// Application ID
    pub application_id: ApplicationId,
    /// Key Discord signs interaction requests with
    pub public_key: VerifyingKey,
    /// Guild the bot manages
    pub guild_id: GuildId,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("api_base", &self.api_base)
            .field("bot_token", &"[REDACTED]")
            .field("application_id", &self.application_id)
            .field("public_key", &hex::encode(self.public_key.as_bytes()))
            .field("guild_id", &self.guild_id)
            .finish()
    }
}

impl BotConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the bot token looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("BOT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("BOT_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("BOT_PORT", "3002")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("BOT_PORT".to_string(), e.to_string()))?;

        let discord = DiscordConfig::from_env()?;
        let audit_channel_id = get_snowflake("AUDIT_CHANNEL_ID")?.into();
        let elevated_role_ids =
            parse_role_list(&get_required_env("ELEVATED_ROLE_IDS")?, "ELEVATED_ROLE_IDS")?;

        let press_timeout = Duration::from_secs(get_number("PRESS_TIMEOUT_SECS", 20)?);

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            discord,
            audit_channel_id,
            elevated_role_ids,
            press_timeout,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl DiscordConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_base = get_env_or_default("DISCORD_API_BASE", DEFAULT_API_BASE)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_base,
            bot_token: get_validated_secret("DISCORD_BOT_TOKEN")?,
            application_id: get_snowflake("DISCORD_APPLICATION_ID")?.into(),
            public_key: parse_public_key(&get_required_env("DISCORD_PUBLIC_KEY")?)?,
            guild_id: get_snowflake("DISCORD_GUILD_ID")?.into(),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a required snowflake ID.
fn get_snowflake(key: &str) -> Result<u64, ConfigError> {
    get_required_env(key)?
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get an optional positive number with a default.
fn get_number(key: &str, default: u64) -> Result<u64, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        )),
        Ok(value) => Ok(value),
        Err(e) => Err(ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}

/// Parse a comma-separated list of role IDs. At least one is required.
fn parse_role_list(raw: &str, key: &str) -> Result<Vec<RoleId>, ConfigError> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<RoleId>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), format!("{s:?}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if ids.is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "at least one role ID is required".to_string(),
        ));
    }
    Ok(ids)
}

/// Parse the hex-encoded application public key.
fn parse_public_key(raw: &str) -> Result<VerifyingKey, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("DISCORD_PUBLIC_KEY".into(), reason);

    let bytes = hex::decode(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    let bytes: [u8; 32] = bytes
        .try_into()
        .map_err(|b: Vec<u8>| invalid(format!("expected 32 bytes, got {}", b.len())))?;
    VerifyingKey::from_bytes(&bytes).map_err(|e| invalid(e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Copy the token from the developer portal."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ed25519_dalek::SigningKey;

    use super::*;

    fn test_key() -> VerifyingKey {
        SigningKey::from_bytes(&[7; 32]).verifying_key()
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-bot-token-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength(&"a".repeat(70), "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_token_shape() {
        let token = "MTE1Mzc5NDIzMTQzODE2ODA5NQ.GhJk3L.q8Vw2Zr9xYt4nB6mP1sD0fA7cE5uI3oK";
        assert!(validate_secret_strength(token, "TEST_VAR").is_ok());
    }

    #[test]
    fn test_parse_role_list() {
        let ids = parse_role_list(" 1, 22 ,333,", "TEST_VAR").unwrap();
        assert_eq!(ids, vec![RoleId::new(1), RoleId::new(22), RoleId::new(333)]);
    }

    #[test]
    fn test_parse_role_list_rejects_empty_and_garbage() {
        assert!(matches!(
            parse_role_list(" , ", "TEST_VAR"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            parse_role_list("12,mods", "TEST_VAR"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_parse_public_key() {
        let key = test_key();
        let parsed = parse_public_key(&hex::encode(key.as_bytes())).unwrap();
        assert_eq!(parsed, key);

        assert!(parse_public_key("abcd").is_err());
        assert!(parse_public_key("not hex").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = BotConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3002,
            discord: DiscordConfig {
                api_base: DEFAULT_API_BASE.to_string(),
                bot_token: SecretString::from("token"),
                application_id: ApplicationId::new(1),
                public_key: test_key(),
                guild_id: GuildId::new(2),
            },
            audit_channel_id: ChannelId::new(3),
            elevated_role_ids: vec![RoleId::new(4)],
            press_timeout: Duration::from_secs(20),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3002);
    }

    #[test]
    fn test_discord_config_debug_redacts_token() {
        let config = DiscordConfig {
            api_base: DEFAULT_API_BASE.to_string(),
            bot_token: SecretString::from("super_secret_bot_token"),
            application_id: ApplicationId::new(1),
            public_key: test_key(),
            guild_id: GuildId::new(2),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("discord.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_bot_token"));
    }
}
