use crate::config::AppConfig;
use crate::utils::error::{Result, TransferError};
use regex::Regex;
use std::path::Path;

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TransferError::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content);
        let config = toml::from_str(&processed_content)?;
        Ok(config)
    }
}

/// 替換環境變數 (例如 ${SPOTIPY_CLIENT_ID})
///
/// Unknown variables are left as written so the validation step can point at them.
fn substitute_env_vars(content: &str) -> String {
    let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[spotify]
client_id = "abc"
client_secret = "def"
redirect_uri = "http://localhost:9090/callback"

[youtube]
client_secrets = "secrets/google.json"
redirect_port = 6000

[transfer]
delay_ms = 250
follow_pagination = true
description = "Copied from Spotify"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.spotify.client_id.as_deref(), Some("abc"));
        assert_eq!(config.spotify.redirect_uri, "http://localhost:9090/callback");
        assert_eq!(config.spotify.api_base, crate::config::DEFAULT_SPOTIFY_API_BASE);
        assert_eq!(config.youtube.client_secrets, "secrets/google.json");
        assert_eq!(config.youtube.redirect_port, 6000);
        assert_eq!(config.transfer.delay_ms, 250);
        assert!(config.transfer.follow_pagination);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.youtube.redirect_port, 5555);
        assert_eq!(config.transfer.delay_ms, 1000);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PLAYLIST_BRIDGE_TEST_CLIENT_ID", "from-env");

        let toml_content = r#"
[spotify]
client_id = "${PLAYLIST_BRIDGE_TEST_CLIENT_ID}"
client_secret = "${PLAYLIST_BRIDGE_TEST_UNSET_SECRET}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.spotify.client_id.as_deref(), Some("from-env"));
        assert_eq!(
            config.spotify.client_secret.as_deref(),
            Some("${PLAYLIST_BRIDGE_TEST_UNSET_SECRET}")
        );

        std::env::remove_var("PLAYLIST_BRIDGE_TEST_CLIENT_ID");
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let result = AppConfig::from_toml_str("[transfer]\ndelay_ms = \"soon\"");
        assert!(matches!(result, Err(TransferError::Toml(_))));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[youtube]\naccess_token = \"ya29.token\"\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.youtube.access_token.as_deref(), Some("ya29.token"));
    }
}
