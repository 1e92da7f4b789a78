//! Runtime configuration read from environment variables.
//!
//! - `CODEPAD_API_BASE_URL`: project backend base URL (default: "http://localhost:5000")
//! - `CODEPAD_EXECUTE_URL`: execution service endpoint (default: public piston)
//! - `CODEPAD_SETTINGS_PATH`: token/theme settings file (default: "codepad-settings.json")
//! - `CODEPAD_COMPILE_DELAY_MS`: cosmetic compile delay (default: 500)
//! - `CODEPAD_DISPLAY_MS`: how long a finished run stays visible (default: 2000)

use std::path::PathBuf;
use std::time::Duration;

use codepad_client::DEFAULT_EXECUTE_URL;

use crate::state_machine::RunTiming;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_SETTINGS_PATH: &str = "codepad-settings.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub execute_url: String,
    pub settings_path: PathBuf,
    pub timing: RunTiming,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            execute_url: DEFAULT_EXECUTE_URL.to_string(),
            settings_path: PathBuf::from(DEFAULT_SETTINGS_PATH),
            timing: RunTiming::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Unparseable
    /// durations are logged and replaced by their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = ClientConfig::default();
        ClientConfig {
            api_base_url: lookup("CODEPAD_API_BASE_URL").unwrap_or(defaults.api_base_url),
            execute_url: lookup("CODEPAD_EXECUTE_URL").unwrap_or(defaults.execute_url),
            settings_path: lookup("CODEPAD_SETTINGS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.settings_path),
            timing: RunTiming {
                compile_delay: millis(
                    &lookup,
                    "CODEPAD_COMPILE_DELAY_MS",
                    defaults.timing.compile_delay,
                ),
                display_duration: millis(
                    &lookup,
                    "CODEPAD_DISPLAY_MS",
                    defaults.timing.display_duration,
                ),
            },
        }
    }
}

fn millis(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: Duration) -> Duration {
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(err) => {
                tracing::warn!(key, value = %raw, error = %err, "ignoring invalid duration");
                default
            }
        },
    }
}
