//! Settings loaded from environment variables.

use std::time::Duration;

use crate::subscriptions::IdentityProvider;

const DEFAULT_UPDATE_CHECK_INTERVAL_MS: u64 = 2000;

/// Runtime configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Default avatar URL (from CORTEX_TREE_URL)
    pub avatar_url: Option<String>,
    /// API key for authentication (from CORTEX_TREE_API_KEY)
    pub api_key: Option<String>,
    /// Poll period in milliseconds (from CORTEX_TREE_UPDATE_CHECK_INTERVAL)
    pub update_check_interval_ms: u64,
    /// E-mail claim of the signed-in user (from CORTEX_TREE_EMAIL)
    pub email: Option<String>,
}

impl Settings {
    /// Load settings from environment variables.
    pub fn from_env() -> Self {
        let update_check_interval_ms = std::env::var("CORTEX_TREE_UPDATE_CHECK_INTERVAL")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_UPDATE_CHECK_INTERVAL_MS);

        Self {
            avatar_url: std::env::var("CORTEX_TREE_URL").ok(),
            api_key: std::env::var("CORTEX_TREE_API_KEY").ok(),
            update_check_interval_ms,
            email: std::env::var("CORTEX_TREE_EMAIL").ok(),
        }
    }

    pub fn update_check_interval(&self) -> Duration {
        Duration::from_millis(self.update_check_interval_ms)
    }
}

impl IdentityProvider for Settings {
    fn email(&self) -> Option<String> {
        self.email.clone()
    }
}
