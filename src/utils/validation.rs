use crate::utils::error::{Result, TransferError};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(TransferError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(TransferError::InvalidConfigValue {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(TransferError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// Loopback redirects must point at this machine with an explicit port.
pub fn validate_loopback_url(field_name: &str, url_str: &str) -> Result<()> {
    validate_url(field_name, url_str)?;

    let url = Url::parse(url_str).map_err(|e| TransferError::InvalidConfigValue {
        field: field_name.to_string(),
        value: url_str.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })?;

    match url.host_str() {
        Some("localhost") | Some("127.0.0.1") | Some("[::1]") => {}
        _ => {
            return Err(TransferError::InvalidConfigValue {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: "Redirect URI must point at localhost".to_string(),
            })
        }
    }

    if url.port_or_known_default().is_none() {
        return Err(TransferError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "Redirect URI needs a port".to_string(),
        });
    }

    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(TransferError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(TransferError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        if let Some(extension) = std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            if !allowed_set.contains(extension) {
                return Err(TransferError::InvalidConfigValue {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
        } else {
            return Err(TransferError::InvalidConfigValue {
                field: field_name.to_string(),
                value: file.clone(),
                reason: "File has no extension or invalid filename".to_string(),
            });
        }
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| TransferError::MissingConfig {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TransferError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(TransferError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("spotify.api_base", "https://api.spotify.com/v1").is_ok());
        assert!(validate_url("spotify.api_base", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("spotify.api_base", "").is_err());
        assert!(validate_url("spotify.api_base", "invalid-url").is_err());
        assert!(validate_url("spotify.api_base", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_loopback_url() {
        assert!(validate_loopback_url("redirect_uri", "http://localhost:8888/callback").is_ok());
        assert!(validate_loopback_url("redirect_uri", "http://127.0.0.1:5555/").is_ok());
        assert!(validate_loopback_url("redirect_uri", "https://example.com/callback").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("youtube.redirect_port", 5555u16, 1, u16::MAX).is_ok());
        assert!(validate_range("youtube.redirect_port", 0u16, 1, u16::MAX).is_err());
        assert!(validate_range("transfer.delay_ms", 120_001u64, 0, 120_000).is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        let files = vec!["client_secret.json".to_string()];
        assert!(validate_file_extensions("youtube.client_secrets", &files, &["json"]).is_ok());

        let invalid_files = vec!["report.txt".to_string()];
        assert!(validate_file_extensions("transfer.report", &invalid_files, &["csv"]).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("id".to_string());
        let missing: Option<String> = None;
        assert_eq!(
            validate_required_field("spotify.client_id", &present).unwrap(),
            "id"
        );
        assert!(matches!(
            validate_required_field("spotify.client_id", &missing),
            Err(TransferError::MissingConfig { .. })
        ));
        assert!(validate_non_empty_string("spotify.client_id", "   ").is_err());
    }
}
