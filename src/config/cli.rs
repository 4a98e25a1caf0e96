use crate::config::AppConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Clone, Parser)]
#[command(name = "playlist-bridge")]
#[command(about = "Copy a Spotify playlist into a private YouTube playlist")]
pub struct CliConfig {
    /// Spotify playlist link; prompted for on stdin when omitted
    #[arg(long)]
    pub playlist: Option<String>,

    /// Optional TOML file; flags given here take precedence over it
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, env = "SPOTIPY_CLIENT_ID")]
    pub spotify_client_id: Option<String>,

    #[arg(long, env = "SPOTIPY_CLIENT_SECRET", hide_env_values = true)]
    pub spotify_client_secret: Option<String>,

    #[arg(long, env = "SPOTIPY_REDIRECT_URI")]
    pub spotify_redirect_uri: Option<String>,

    #[arg(long, env = "SPOTIFY_ACCESS_TOKEN", hide_env_values = true)]
    pub spotify_access_token: Option<String>,

    #[arg(long, hide = true)]
    pub spotify_api_base: Option<String>,

    /// Google OAuth client file
    #[arg(long)]
    pub youtube_client_secrets: Option<String>,

    #[arg(long)]
    pub youtube_redirect_port: Option<u16>,

    #[arg(long, env = "YOUTUBE_ACCESS_TOKEN", hide_env_values = true)]
    pub youtube_access_token: Option<String>,

    #[arg(long, hide = true)]
    pub youtube_api_base: Option<String>,

    /// Pause between tracks in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Read every page of source tracks and destination playlists
    #[arg(long)]
    pub all_pages: bool,

    /// Description for a newly created YouTube playlist
    #[arg(long)]
    pub description: Option<String>,

    /// Write a CSV of per-track outcomes (file or directory)
    #[arg(long)]
    pub report: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// 合併設定檔與命令列參數
    pub fn to_app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        override_opt(&mut config.spotify.client_id, &self.spotify_client_id);
        override_opt(&mut config.spotify.client_secret, &self.spotify_client_secret);
        override_opt(&mut config.spotify.access_token, &self.spotify_access_token);
        override_value(&mut config.spotify.redirect_uri, &self.spotify_redirect_uri);
        override_value(&mut config.spotify.api_base, &self.spotify_api_base);

        override_value(&mut config.youtube.client_secrets, &self.youtube_client_secrets);
        override_value(&mut config.youtube.redirect_port, &self.youtube_redirect_port);
        override_opt(&mut config.youtube.access_token, &self.youtube_access_token);
        override_value(&mut config.youtube.api_base, &self.youtube_api_base);

        override_value(&mut config.transfer.delay_ms, &self.delay_ms);
        override_value(&mut config.transfer.description, &self.description);
        override_opt(&mut config.transfer.report, &self.report);
        if self.all_pages {
            config.transfer.follow_pagination = true;
        }

        Ok(config)
    }
}

/// Load `KEY=value` pairs from a `.env` file into the process environment so
/// the `env` fallbacks above can see them. Variables already set win.
/// Without a path the file is looked up from the working directory upwards.
pub fn load_env_file(path: Option<&Path>) -> Option<PathBuf> {
    match path {
        Some(path) => dotenvy::from_path(path).ok().map(|_| path.to_path_buf()),
        None => dotenvy::dotenv().ok(),
    }
}

// 憑證不寫進日誌
fn redact(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "<redacted>")
}

impl fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliConfig")
            .field("playlist", &self.playlist)
            .field("config", &self.config)
            .field("spotify_client_id", &self.spotify_client_id)
            .field("spotify_client_secret", &redact(&self.spotify_client_secret))
            .field("spotify_redirect_uri", &self.spotify_redirect_uri)
            .field("spotify_access_token", &redact(&self.spotify_access_token))
            .field("spotify_api_base", &self.spotify_api_base)
            .field("youtube_client_secrets", &self.youtube_client_secrets)
            .field("youtube_redirect_port", &self.youtube_redirect_port)
            .field("youtube_access_token", &redact(&self.youtube_access_token))
            .field("youtube_api_base", &self.youtube_api_base)
            .field("delay_ms", &self.delay_ms)
            .field("all_pages", &self.all_pages)
            .field("description", &self.description)
            .field("report", &self.report)
            .field("verbose", &self.verbose)
            .finish()
    }
}

fn override_opt<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        target.clone_from(value);
    }
}

fn override_value<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *target = v.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_flags_override_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            b"[spotify]\nclient_id = \"file-id\"\n[transfer]\ndelay_ms = 300\n",
        )
        .unwrap();

        let cli = CliConfig::parse_from([
            "playlist-bridge",
            "--config",
            file.path().to_str().unwrap(),
            "--delay-ms",
            "0",
            "--all-pages",
            "--youtube-redirect-port",
            "7000",
        ]);

        let config = cli.to_app_config().unwrap();
        assert_eq!(config.transfer.delay_ms, 0);
        assert!(config.transfer.follow_pagination);
        assert_eq!(config.youtube.redirect_port, 7000);
        assert_eq!(config.youtube.client_secrets, "client_secret.json");
    }

    #[test]
    fn test_playlist_flag() {
        let cli = CliConfig::parse_from([
            "playlist-bridge",
            "--playlist",
            "https://open.spotify.com/playlist/abc",
            "--report",
            "out.csv",
        ]);
        assert_eq!(
            cli.playlist.as_deref(),
            Some("https://open.spotify.com/playlist/abc")
        );
        assert_eq!(cli.to_app_config().unwrap().transfer.report.as_deref(), Some("out.csv"));
    }

    #[test]
    fn test_debug_hides_credentials() {
        let cli = CliConfig::parse_from([
            "playlist-bridge",
            "--spotify-client-id",
            "public-id",
            "--spotify-client-secret",
            "sp-secret-value",
            "--spotify-access-token",
            "sp-token-value",
            "--youtube-access-token",
            "yt-token-value",
        ]);

        let printed = format!("{:?}", cli);
        assert!(printed.contains("public-id"));
        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains("sp-secret-value"));
        assert!(!printed.contains("sp-token-value"));
        assert!(!printed.contains("yt-token-value"));
    }

    #[test]
    fn test_env_file_feeds_env_fallbacks() {
        let dir = tempfile::tempdir().unwrap();
        let env_path = dir.path().join(".env");
        std::fs::write(
            &env_path,
            "SPOTIPY_CLIENT_SECRET=secret-from-dotenv\nSPOTIPY_REDIRECT_URI=http://127.0.0.1:9090/callback\n",
        )
        .unwrap();

        assert_eq!(load_env_file(Some(&env_path)), Some(env_path.clone()));
        let config = CliConfig::parse_from(["playlist-bridge"]).to_app_config().unwrap();

        std::env::remove_var("SPOTIPY_CLIENT_SECRET");
        std::env::remove_var("SPOTIPY_REDIRECT_URI");

        assert_eq!(config.spotify.client_secret.as_deref(), Some("secret-from-dotenv"));
        assert_eq!(config.spotify.redirect_uri, "http://127.0.0.1:9090/callback");
        assert_eq!(load_env_file(Some(&dir.path().join("missing.env"))), None);
    }
}
