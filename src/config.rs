use anyhow::{Context, Result};
use serde::Deserialize;

const CONFIG_FILE: &str = "behance_sync";
const ENV_PREFIX: &str = "BEHANCE_SYNC";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Runtime settings: `behance_sync.toml` (optional), then `BEHANCE_SYNC_*` env vars.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_profile_url")]
    pub profile_url: String,
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    /// Image used when a project has no cover.
    #[serde(default = "default_placeholder_image")]
    pub placeholder_image: String,
    #[serde(default = "default_author_id")]
    pub author_id: String,
    /// Per-request timeout. Unset means the client default.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_profile_url() -> String {
    "https://www.behance.net/".into()
}

fn default_db_path() -> String {
    "data/portfolio.sqlite".into()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".into()
}

fn default_placeholder_image() -> String {
    "/images/placeholder.jpg".into()
}

fn default_author_id() -> String {
    "admin".into()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            profile_url: default_profile_url(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            placeholder_image: default_placeholder_image(),
            author_id: default_author_id(),
            request_timeout_secs: None,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Invalid settings")
    }
}
