// Adapters layer: concrete implementations of the domain ports for the remote services.

pub mod oauth;
pub mod spotify;
pub mod youtube;

pub use oauth::{AuthorizationCodeFlow, StaticToken};
pub use spotify::SpotifyClient;
pub use youtube::YoutubeClient;
