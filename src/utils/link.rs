use crate::utils::error::{Result, TransferError};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

fn playlist_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9]+$").expect("valid playlist id regex"))
}

/// 從播放清單連結取出 ID
///
/// Accepts `https://open.spotify.com/playlist/<id>?si=...`, `spotify:playlist:<id>`
/// or the bare id. The id is the last path segment with the query string dropped.
pub fn parse_playlist_id(link: &str) -> Result<String> {
    let trimmed = link.trim();
    if trimmed.is_empty() {
        return Err(invalid(link, "link is empty"));
    }

    let candidate = if let Some(rest) = trimmed.strip_prefix("spotify:playlist:") {
        rest.to_string()
    } else if let Ok(url) = Url::parse(trimmed) {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(link, "unsupported link scheme"));
        }
        url.path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string)
            .ok_or_else(|| invalid(link, "link has no playlist segment"))?
    } else {
        let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
        last.split('?').next().unwrap_or(last).to_string()
    };

    if !playlist_id_pattern().is_match(&candidate) {
        return Err(invalid(link, "playlist id must be alphanumeric"));
    }

    Ok(candidate)
}

fn invalid(link: &str, reason: &str) -> TransferError {
    TransferError::InvalidPlaylistLink {
        link: link.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_share_link() {
        let id =
            parse_playlist_id("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=abc123")
                .unwrap();
        assert_eq!(id, "37i9dQZF1DXcBWIGoYBM5M");
    }

    #[test]
    fn test_parse_uri_and_bare_id() {
        assert_eq!(
            parse_playlist_id("spotify:playlist:37i9dQZF1DXcBWIGoYBM5M").unwrap(),
            "37i9dQZF1DXcBWIGoYBM5M"
        );
        assert_eq!(parse_playlist_id("  roadtrip42 \n").unwrap(), "roadtrip42");
    }

    #[test]
    fn test_parse_trailing_slash() {
        assert_eq!(
            parse_playlist_id("https://open.spotify.com/playlist/abc123/").unwrap(),
            "abc123"
        );
    }

    #[test]
    fn test_reject_invalid_links() {
        assert!(parse_playlist_id("").is_err());
        assert!(parse_playlist_id("https://open.spotify.com/").is_err());
        assert!(parse_playlist_id("ftp://open.spotify.com/playlist/abc").is_err());
        assert!(parse_playlist_id("not a link!").is_err());
    }
}
