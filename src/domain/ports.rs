use crate::domain::model::Track;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Capability to obtain a bearer token for one service.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// Music-streaming side: where tracks are read from.
#[async_trait]
pub trait SourceService: Send + Sync {
    async fn authenticate(&mut self) -> Result<()>;
    async fn playlist_title(&self, playlist_id: &str) -> Result<String>;
    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>>;
}

/// Video-hosting side: where the playlist is rebuilt.
#[async_trait]
pub trait DestinationService: Send + Sync {
    async fn authenticate(&mut self) -> Result<()>;
    async fn find_playlist_by_title(&self, title: &str) -> Result<Option<String>>;
    async fn create_playlist(&self, title: &str, description: &str) -> Result<String>;
    async fn search_top_result(&self, query: &str) -> Result<Option<String>>;
    async fn insert_playlist_item(&self, playlist_id: &str, video_id: &str) -> Result<()>;
}
