#[cfg(feature = "cli")]
pub mod cli;
pub mod google;
pub mod toml_config;

use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extensions, validate_loopback_url, validate_non_empty_string, validate_path,
    validate_range, validate_required_field, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";
pub const DEFAULT_SPOTIFY_REDIRECT_URI: &str = "http://localhost:8888/callback";
pub const DEFAULT_YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_YOUTUBE_CLIENT_SECRETS: &str = "client_secret.json";
pub const DEFAULT_YOUTUBE_REDIRECT_PORT: u16 = 5555;
pub const DEFAULT_DELAY_MS: u64 = 1000;
const MAX_DELAY_MS: u64 = 60_000;

/// Everything a run needs, built once at startup and handed to the clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub spotify: SpotifyConfig,
    pub youtube: YoutubeConfig,
    pub transfer: TransferSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    /// Pre-issued bearer token; skips the browser flow when set.
    pub access_token: Option<String>,
    pub api_base: String,
    pub accounts_base: String,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: DEFAULT_SPOTIFY_REDIRECT_URI.to_string(),
            access_token: None,
            api_base: DEFAULT_SPOTIFY_API_BASE.to_string(),
            accounts_base: DEFAULT_SPOTIFY_ACCOUNTS_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeConfig {
    pub client_secrets: String,
    pub redirect_port: u16,
    pub access_token: Option<String>,
    pub api_base: String,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            client_secrets: DEFAULT_YOUTUBE_CLIENT_SECRETS.to_string(),
            redirect_port: DEFAULT_YOUTUBE_REDIRECT_PORT,
            access_token: None,
            api_base: DEFAULT_YOUTUBE_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferSettings {
    /// Pause after every per-track attempt.
    pub delay_ms: u64,
    /// Walk every page instead of only the first one on both services.
    pub follow_pagination: bool,
    pub description: String,
    pub report: Option<String>,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
            follow_pagination: false,
            description: String::new(),
            report: None,
        }
    }
}

impl TransferSettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        // Spotify
        validate_url("spotify.api_base", &self.spotify.api_base)?;
        if self.spotify.access_token.is_none() {
            let client_id = validate_required_field("spotify.client_id", &self.spotify.client_id)?;
            validate_non_empty_string("spotify.client_id", client_id)?;
            let client_secret =
                validate_required_field("spotify.client_secret", &self.spotify.client_secret)?;
            validate_non_empty_string("spotify.client_secret", client_secret)?;
            validate_url("spotify.accounts_base", &self.spotify.accounts_base)?;
            validate_loopback_url("spotify.redirect_uri", &self.spotify.redirect_uri)?;
        }

        // YouTube
        validate_url("youtube.api_base", &self.youtube.api_base)?;
        if self.youtube.access_token.is_none() {
            validate_path("youtube.client_secrets", &self.youtube.client_secrets)?;
            validate_file_extensions(
                "youtube.client_secrets",
                std::slice::from_ref(&self.youtube.client_secrets),
                &["json"],
            )?;
            validate_range("youtube.redirect_port", self.youtube.redirect_port, 1, u16::MAX)?;
        }

        // 傳輸設定
        validate_range("transfer.delay_ms", self.transfer.delay_ms, 0, MAX_DELAY_MS)?;
        if let Some(report) = &self.transfer.report {
            validate_path("transfer.report", report)?;
            if std::path::Path::new(report).extension().is_some() {
                validate_file_extensions("transfer.report", std::slice::from_ref(report), &["csv"])?;
            }
        }

        Ok(())
    }
}
