use crate::domain::model::TransferReport;
use std::fmt;
use thiserror::Error;

/// Remote service an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Spotify,
    YouTube,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Spotify => write!(f, "Spotify"),
            Service::YouTube => write!(f, "YouTube"),
        }
    }
}

/// HTTP statuses that stop the per-track loop: 429, 503 and 403.
pub const HALTING_STATUSES: [u16; 3] = [429, 503, 403];

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("{service} authentication failed: {message}")]
    Authentication { service: Service, message: String },

    #[error("{service} resource not found: {resource}")]
    NotFound { service: Service, resource: String },

    #[error("{service} API error (HTTP {status}): {message}")]
    Api {
        service: Service,
        status: u16,
        reason: Option<String>,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid playlist link '{link}': {reason}")]
    InvalidPlaylistLink { link: String, reason: String },

    #[error("Transfer interrupted by user")]
    Interrupted,

    /// A fatal per-track failure; `report` holds the tracks handled before it.
    #[error("{source}")]
    Incomplete {
        report: Box<TransferReport>,
        source: Box<TransferError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    NotFound,
    RateLimit,
    Quota,
    Api,
    Network,
    Configuration,
    Io,
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TransferError {
    pub fn config(message: impl Into<String>) -> Self {
        TransferError::Config {
            message: message.into(),
        }
    }

    /// The underlying failure, unwrapped from [`TransferError::Incomplete`].
    pub fn root(&self) -> &TransferError {
        match self {
            TransferError::Incomplete { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self.root() {
            TransferError::Api { status, .. } => Some(*status),
            TransferError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Rate-limited, unavailable or forbidden: the per-track loop stops here.
    pub fn is_halting(&self) -> bool {
        matches!(self.root(), TransferError::Api { status, .. } if HALTING_STATUSES.contains(status))
    }

    pub fn is_quota_exceeded(&self) -> bool {
        match self.root() {
            TransferError::Api {
                status: 403,
                reason,
                message,
                ..
            } => {
                reason.as_deref() == Some("quotaExceeded") || message.contains("quotaExceeded")
            }
            _ => false,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self.root() {
            TransferError::Authentication { .. } => ErrorCategory::Authentication,
            TransferError::NotFound { .. } => ErrorCategory::NotFound,
            e if e.is_quota_exceeded() => ErrorCategory::Quota,
            e if e.is_halting() => ErrorCategory::RateLimit,
            TransferError::Api { .. } => ErrorCategory::Api,
            TransferError::Http(_) => ErrorCategory::Network,
            TransferError::Io(_) | TransferError::Csv(_) => ErrorCategory::Io,
            TransferError::Serialization(_) => ErrorCategory::Api,
            TransferError::Toml(_)
            | TransferError::Config { .. }
            | TransferError::MissingConfig { .. }
            | TransferError::InvalidConfigValue { .. }
            | TransferError::InvalidPlaylistLink { .. } => ErrorCategory::Configuration,
            TransferError::Interrupted => ErrorCategory::Interrupted,
            TransferError::Incomplete { source, .. } => source.category(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Interrupted => ErrorSeverity::Low,
            ErrorCategory::RateLimit | ErrorCategory::Quota | ErrorCategory::Network => {
                ErrorSeverity::Medium
            }
            ErrorCategory::NotFound | ErrorCategory::Api | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::Authentication | ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.root() {
            e if e.is_quota_exceeded() => {
                "You have exceeded your YouTube quota. Please try again later.".to_string()
            }
            TransferError::Authentication { service, .. } => {
                format!("Could not authenticate with {}.", service)
            }
            TransferError::NotFound { service, resource } => {
                format!("{} could not find {}.", service, resource)
            }
            TransferError::Interrupted => "Transfer interrupted. Goodbye!".to_string(),
            e @ (TransferError::Api { .. } | TransferError::Http(_)) => {
                format!("The transfer process encountered an error.\nError detail:\n{}", e)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Authentication => {
                "Check your client id, client secret and redirect URI, then sign in again"
            }
            ErrorCategory::NotFound => {
                "Make sure the playlist link is correct and the playlist is visible to your account"
            }
            ErrorCategory::Quota => "Wait for the daily YouTube quota to reset before retrying",
            ErrorCategory::RateLimit => {
                "Wait a few minutes and rerun; tracks already added will be added again"
            }
            ErrorCategory::Api | ErrorCategory::Network => {
                "Check your network connection and rerun the transfer"
            }
            ErrorCategory::Configuration => "Review the command line flags and configuration file",
            ErrorCategory::Io => "Check file permissions and available disk space",
            ErrorCategory::Interrupted => "Rerun the transfer when ready",
        }
    }
}

pub type Result<T> = std::result::Result<T, TransferError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16, reason: Option<&str>) -> TransferError {
        TransferError::Api {
            service: Service::YouTube,
            status,
            reason: reason.map(str::to_string),
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_halting_statuses() {
        assert!(api_error(429, None).is_halting());
        assert!(api_error(503, None).is_halting());
        assert!(api_error(403, Some("forbidden")).is_halting());
        assert!(!api_error(500, None).is_halting());
        assert!(!api_error(400, None).is_halting());
    }

    #[test]
    fn test_quota_exceeded_detection() {
        let quota = api_error(403, Some("quotaExceeded"));
        assert!(quota.is_quota_exceeded());
        assert_eq!(quota.category(), ErrorCategory::Quota);
        assert!(quota.user_friendly_message().contains("quota"));

        assert!(!api_error(403, Some("forbidden")).is_quota_exceeded());
        assert!(!api_error(429, Some("quotaExceeded")).is_quota_exceeded());
    }

    #[test]
    fn test_category_and_severity() {
        let auth = TransferError::Authentication {
            service: Service::Spotify,
            message: "invalid_client".to_string(),
        };
        assert_eq!(auth.category(), ErrorCategory::Authentication);
        assert_eq!(auth.severity(), ErrorSeverity::Critical);

        assert_eq!(api_error(429, None).category(), ErrorCategory::RateLimit);
        assert_eq!(api_error(500, None).severity(), ErrorSeverity::High);
        assert_eq!(TransferError::Interrupted.severity(), ErrorSeverity::Low);
        assert_eq!(
            TransferError::config("bad").category(),
            ErrorCategory::Configuration
        );
    }

    #[test]
    fn test_generic_api_message_surfaces_detail() {
        let message = api_error(500, None).user_friendly_message();
        assert!(message.contains("encountered an error"));
        assert!(message.contains("HTTP 500"));
    }

    #[test]
    fn test_incomplete_delegates_to_cause() {
        use crate::domain::model::PlaylistRef;

        let err = TransferError::Incomplete {
            report: Box::new(TransferReport {
                source_title: "Road Trip".to_string(),
                destination: PlaylistRef {
                    id: "PL1".to_string(),
                    title: "Road Trip".to_string(),
                },
                created_playlist: false,
                entries: Vec::new(),
                halted: None,
            }),
            source: Box::new(api_error(500, None)),
        };

        assert_eq!(err.status(), Some(500));
        assert!(!err.is_halting());
        assert_eq!(err.category(), ErrorCategory::Api);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.to_string().contains("HTTP 500"));
        assert!(err.user_friendly_message().contains("encountered an error"));
    }
}
