pub mod report;
pub mod transfer;

pub use crate::domain::model::{PlaylistRef, Track, TrackOutcome, TransferReport};
pub use crate::domain::ports::{Authenticator, DestinationService, SourceService};
pub use crate::utils::error::Result;
