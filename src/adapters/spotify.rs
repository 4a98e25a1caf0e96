use crate::adapters::oauth::{AuthorizationCodeFlow, StaticToken};
use crate::config::SpotifyConfig;
use crate::domain::model::Track;
use crate::domain::ports::{Authenticator, SourceService};
use crate::utils::error::{Result, Service, TransferError};
use crate::utils::validation::validate_required_field;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const SPOTIFY_SCOPES: [&str; 2] = ["playlist-read-private", "playlist-read-collaborative"];

const TRACK_FIELDS: &str = "items(track(name,artists(name))),next";

#[derive(Debug, Deserialize)]
struct PlaylistName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TracksPage {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    track: Option<TrackObject>,
}

#[derive(Debug, Deserialize)]
struct TrackObject {
    #[serde(default)]
    name: String,
    #[serde(default)]
    artists: Vec<ArtistObject>,
}

#[derive(Debug, Deserialize)]
struct ArtistObject {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Reads playlists from the Spotify Web API.
pub struct SpotifyClient {
    http: Client,
    api_base: String,
    authenticator: Box<dyn Authenticator>,
    token: Option<String>,
    follow_pagination: bool,
}

impl SpotifyClient {
    pub fn new(api_base: impl Into<String>, authenticator: Box<dyn Authenticator>) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            authenticator,
            token: None,
            follow_pagination: false,
        }
    }

    /// Static token when one is configured, otherwise the browser flow.
    pub fn from_config(config: &SpotifyConfig) -> Result<Self> {
        let authenticator: Box<dyn Authenticator> = match &config.access_token {
            Some(token) => Box::new(StaticToken::new(token.clone())),
            None => {
                let client_id = validate_required_field("spotify.client_id", &config.client_id)?;
                let client_secret =
                    validate_required_field("spotify.client_secret", &config.client_secret)?;
                let accounts = config.accounts_base.trim_end_matches('/');
                Box::new(
                    AuthorizationCodeFlow::new(
                        Service::Spotify,
                        client_id.clone(),
                        client_secret.clone(),
                        format!("{}/authorize", accounts),
                        format!("{}/api/token", accounts),
                        config.redirect_uri.clone(),
                    )
                    .with_scopes(SPOTIFY_SCOPES),
                )
            }
        };
        Ok(Self::new(config.api_base.clone(), authenticator))
    }

    pub fn with_pagination(mut self, follow_pagination: bool) -> Self {
        self.follow_pagination = follow_pagination;
        self
    }

    fn bearer(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| TransferError::Authentication {
                service: Service::Spotify,
                message: "client used before authenticate()".to_string(),
            })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        resource: &str,
    ) -> Result<T> {
        tracing::debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .bearer_auth(self.bearer()?)
            .query(query)
            .send()
            .await?;

        let response = check_response(response, resource).await?;
        Ok(response.json::<T>().await?)
    }
}

async fn check_response(response: Response, resource: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);

    Err(match status {
        StatusCode::UNAUTHORIZED => TransferError::Authentication {
            service: Service::Spotify,
            message,
        },
        StatusCode::NOT_FOUND => TransferError::NotFound {
            service: Service::Spotify,
            resource: resource.to_string(),
        },
        _ => TransferError::Api {
            service: Service::Spotify,
            status: status.as_u16(),
            reason: None,
            message,
        },
    })
}

fn to_tracks(page: TracksPage, tracks: &mut Vec<Track>) {
    for item in page.items {
        match item.track {
            Some(track) => {
                let artist = track
                    .artists
                    .into_iter()
                    .next()
                    .map(|a| a.name)
                    .unwrap_or_default();
                tracks.push(Track::new(track.name, artist));
            }
            None => tracing::warn!("Skipping unavailable playlist entry"),
        }
    }
}

#[async_trait]
impl SourceService for SpotifyClient {
    async fn authenticate(&mut self) -> Result<()> {
        let token = self.authenticator.access_token().await?;
        self.token = Some(token);
        Ok(())
    }

    async fn playlist_title(&self, playlist_id: &str) -> Result<String> {
        let url = format!("{}/playlists/{}", self.api_base, playlist_id);
        let resource = format!("playlist {}", playlist_id);
        let playlist: PlaylistName = self.get_json(&url, &[("fields", "name")], &resource).await?;
        Ok(playlist.name)
    }

    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>> {
        let url = format!("{}/playlists/{}/tracks", self.api_base, playlist_id);
        let resource = format!("playlist {}", playlist_id);

        let mut tracks = Vec::new();
        let page: TracksPage = self
            .get_json(&url, &[("fields", TRACK_FIELDS)], &resource)
            .await?;
        let mut next = page.next.clone();
        to_tracks(page, &mut tracks);

        while self.follow_pagination {
            let Some(next_url) = next.take() else { break };
            let page: TracksPage = self.get_json(&next_url, &[], &resource).await?;
            next = page.next.clone();
            to_tracks(page, &mut tracks);
        }

        if !self.follow_pagination && next.is_some() {
            tracing::warn!(
                "Playlist has more tracks than the first page; only {} will be transferred (use --all-pages)",
                tracks.len()
            );
        }

        Ok(tracks)
    }
}
