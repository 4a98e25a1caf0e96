use crate::utils::error::{Result, TransferError};
use serde::Deserialize;
use std::path::Path;

const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth client downloaded from the Google Cloud console (`client_secret.json`).
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Deserialize)]
struct SecretsFile {
    installed: Option<GoogleClientSecrets>,
    web: Option<GoogleClientSecrets>,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

impl GoogleClientSecrets {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TransferError::Config {
            message: format!("cannot read client secrets {}: {}", path.display(), e),
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: SecretsFile = serde_json::from_str(content)?;
        file.installed
            .or(file.web)
            .ok_or_else(|| TransferError::config("client secrets contain neither 'installed' nor 'web'"))
    }
}
