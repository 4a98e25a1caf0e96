pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{SpotifyClient, StaticToken, YoutubeClient};
pub use config::AppConfig;
pub use core::transfer::{TransferOptions, TransferOrchestrator};
pub use domain::model::{PlaylistRef, Track, TrackOutcome, TransferReport};
pub use utils::error::{Result, TransferError};
