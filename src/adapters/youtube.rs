use crate::adapters::oauth::{AuthorizationCodeFlow, StaticToken};
use crate::config::google::GoogleClientSecrets;
use crate::config::YoutubeConfig;
use crate::domain::ports::{Authenticator, DestinationService};
use crate::utils::error::{Result, Service, TransferError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

pub const YOUTUBE_SCOPES: [&str; 1] = ["https://www.googleapis.com/auth/youtube"];

/// Largest page the playlists endpoint hands out.
const PLAYLIST_PAGE_SIZE: &str = "50";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistListResponse {
    #[serde(default)]
    items: Vec<PlaylistResource>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistResource {
    id: String,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: SearchResultId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InsertedResource {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<GoogleErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    reason: Option<String>,
}

/// Writes playlists through the YouTube Data API v3.
pub struct YoutubeClient {
    http: Client,
    api_base: String,
    authenticator: Box<dyn Authenticator>,
    token: Option<String>,
    follow_pagination: bool,
}

impl YoutubeClient {
    pub fn new(api_base: impl Into<String>, authenticator: Box<dyn Authenticator>) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            authenticator,
            token: None,
            follow_pagination: false,
        }
    }

    /// Static token when one is configured, otherwise the installed-app flow
    /// described by `client_secret.json`.
    pub fn from_config(config: &YoutubeConfig) -> Result<Self> {
        let authenticator: Box<dyn Authenticator> = match &config.access_token {
            Some(token) => Box::new(StaticToken::new(token.clone())),
            None => {
                let secrets = GoogleClientSecrets::from_file(&config.client_secrets)?;
                Box::new(
                    AuthorizationCodeFlow::new(
                        Service::YouTube,
                        secrets.client_id,
                        secrets.client_secret,
                        secrets.auth_uri,
                        secrets.token_uri,
                        format!("http://localhost:{}/", config.redirect_port),
                    )
                    .with_scopes(YOUTUBE_SCOPES),
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
                service: Service::YouTube,
                message: "client used before authenticate()".to_string(),
            })
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.api_base, resource)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, resource: &str) -> Result<T> {
        let response = request.bearer_auth(self.bearer()?).send().await?;
        let response = check_response(response, resource).await?;
        Ok(response.json::<T>().await?)
    }

    async fn list_playlists(&self, page_token: Option<&str>) -> Result<PlaylistListResponse> {
        let mut query = vec![
            ("part", "snippet"),
            ("mine", "true"),
            ("maxResults", PLAYLIST_PAGE_SIZE),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let request = self.http.get(self.url("playlists")).query(&query);
        self.send(request, "playlists").await
    }
}

async fn check_response(response: Response, resource: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let (message, reason) = match serde_json::from_str::<GoogleErrorEnvelope>(&body) {
        Ok(envelope) => {
            let reason = envelope.error.errors.into_iter().find_map(|d| d.reason);
            (envelope.error.message, reason)
        }
        Err(_) => (body, None),
    };

    Err(match status {
        StatusCode::UNAUTHORIZED => TransferError::Authentication {
            service: Service::YouTube,
            message,
        },
        StatusCode::NOT_FOUND => TransferError::NotFound {
            service: Service::YouTube,
            resource: resource.to_string(),
        },
        _ => TransferError::Api {
            service: Service::YouTube,
            status: status.as_u16(),
            reason,
            message,
        },
    })
}

#[async_trait]
impl DestinationService for YoutubeClient {
    async fn authenticate(&mut self) -> Result<()> {
        let token = self.authenticator.access_token().await?;
        self.token = Some(token);
        Ok(())
    }

    async fn find_playlist_by_title(&self, title: &str) -> Result<Option<String>> {
        let mut page_token: Option<String> = None;

        loop {
            let page = self.list_playlists(page_token.as_deref()).await?;
            if let Some(found) = page.items.into_iter().find(|p| p.snippet.title == title) {
                return Ok(Some(found.id));
            }

            match page.next_page_token {
                Some(token) if self.follow_pagination => page_token = Some(token),
                Some(_) => {
                    tracing::debug!("Only the first {} playlists were checked", PLAYLIST_PAGE_SIZE);
                    return Ok(None);
                }
                None => return Ok(None),
            }
        }
    }

    async fn create_playlist(&self, title: &str, description: &str) -> Result<String> {
        let body = json!({
            "snippet": {
                "title": title,
                "description": description
            },
            "status": {
                "privacyStatus": "private"
            }
        });

        let request = self
            .http
            .post(self.url("playlists"))
            .query(&[("part", "snippet,status")])
            .json(&body);
        let created: InsertedResource = self.send(request, "playlists").await?;
        Ok(created.id)
    }

    async fn search_top_result(&self, query: &str) -> Result<Option<String>> {
        let request = self.http.get(self.url("search")).query(&[
            ("part", "snippet"),
            ("maxResults", "1"),
            ("type", "video"),
            ("q", query),
        ]);
        let response: SearchListResponse = self.send(request, "search").await?;
        Ok(response.items.into_iter().next().and_then(|r| r.id.video_id))
    }

    async fn insert_playlist_item(&self, playlist_id: &str, video_id: &str) -> Result<()> {
        let body = json!({
            "snippet": {
                "playlistId": playlist_id,
                "resourceId": {
                    "kind": "youtube#video",
                    "videoId": video_id
                }
            }
        });

        let request = self
            .http
            .post(self.url("playlistItems"))
            .query(&[("part", "snippet")])
            .json(&body);
        let _: InsertedResource = self.send(request, "playlistItems").await?;
        Ok(())
    }
}
