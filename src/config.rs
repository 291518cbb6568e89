use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::event::DEFAULT_SUBSCRIBER_BUFFER;

pub const DEFAULT_BOT_USER_ID: &str = "bot_user";

/// Configuration for the simulated participant
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Participant id the bot authors messages as
    pub user_id: String,
    /// Lower bound of the randomized reply delay
    pub min_delay: Duration,
    /// Upper bound of the randomized reply delay
    pub max_delay: Duration,
    /// Whether the bot goes online, reads and types around its reply
    pub announce_activity: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_BOT_USER_ID.to_string(),
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(4),
            announce_activity: true,
        }
    }
}

impl BotConfig {
    /// Builds a config with the given delay window, swapping inverted bounds
    pub fn with_delay(mut self, min_delay: Duration, max_delay: Duration) -> Self {
        if min_delay > max_delay {
            warn!(
                min_delay_ms = min_delay.as_millis() as u64,
                max_delay_ms = max_delay.as_millis() as u64,
                "Bot delay bounds inverted, swapping"
            );
            self.min_delay = max_delay;
            self.max_delay = min_delay;
        } else {
            self.min_delay = min_delay;
            self.max_delay = max_delay;
        }
        self
    }

    pub fn with_announce_activity(mut self, announce_activity: bool) -> Self {
        self.announce_activity = announce_activity;
        self
    }
}

/// Configuration injected into the dispatcher
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Events buffered per subscriber before it is dropped as too slow
    pub subscriber_buffer: usize,
    pub bot: BotConfig,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            subscriber_buffer: DEFAULT_SUBSCRIBER_BUFFER,
            bot: BotConfig::default(),
        }
    }
}

/// Process configuration read from the environment at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub hub: HubConfig,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = BotConfig::default();

        let bot = BotConfig {
            user_id: std::env::var("CHATHUB_BOT_USER_ID")
                .ok()
                .filter(|id| !id.trim().is_empty())
                .unwrap_or(defaults.user_id),
            announce_activity: env_or("CHATHUB_BOT_ANNOUNCE_ACTIVITY", defaults.announce_activity),
            ..BotConfig::default()
        }
        .with_delay(
            Duration::from_millis(env_or(
                "CHATHUB_BOT_MIN_DELAY_MS",
                defaults.min_delay.as_millis() as u64,
            )),
            Duration::from_millis(env_or(
                "CHATHUB_BOT_MAX_DELAY_MS",
                defaults.max_delay.as_millis() as u64,
            )),
        );

        Self {
            bind_addr: std::env::var("CHATHUB_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            hub: HubConfig {
                subscriber_buffer: env_or("CHATHUB_SUBSCRIBER_BUFFER", DEFAULT_SUBSCRIBER_BUFFER),
                bot,
            },
        }
    }
}

/// Reads and parses an environment variable, falling back to `default`
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key = key, value = %raw, "Ignoring unparsable environment value");
            default
        }),
        Err(_) => default,
    }
}
