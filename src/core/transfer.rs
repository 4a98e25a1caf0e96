use crate::config::TransferSettings;
use crate::domain::model::{HaltReason, PlaylistRef, Track, TrackOutcome, TransferReport};
use crate::domain::ports::{DestinationService, SourceService};
use crate::utils::error::{Result, TransferError};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TransferOptions {
    /// Pause after each track, found or not.
    pub delay: Duration,
    /// Description used only when the destination playlist is created.
    pub description: String,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            description: String::new(),
        }
    }
}

impl From<&TransferSettings> for TransferOptions {
    fn from(settings: &TransferSettings) -> Self {
        Self {
            delay: settings.delay(),
            description: settings.description.clone(),
        }
    }
}

enum TrackStep {
    Done(TrackOutcome),
    Halt(TransferError),
}

/// Why the per-track loop stopped early.
enum LoopStop {
    Halted(HaltReason),
    Failed(TransferError),
}

/// Copies one source playlist into the destination service, track by track.
pub struct TransferOrchestrator<S: SourceService, D: DestinationService> {
    source: S,
    destination: D,
    options: TransferOptions,
}

impl<S: SourceService, D: DestinationService> TransferOrchestrator<S, D> {
    pub fn new(source: S, destination: D, options: TransferOptions) -> Self {
        Self {
            source,
            destination,
            options,
        }
    }

    pub async fn run(&mut self, playlist_id: &str) -> Result<TransferReport> {
        // Source
        self.source.authenticate().await?;
        let source_title = self.source.playlist_title(playlist_id).await?;
        tracing::info!("Retrieving tracks of Spotify playlist ▶️{}▶️", source_title);
        let tracks = self.source.playlist_tracks(playlist_id).await?;
        tracing::info!("📋 {} tracks retrieved", tracks.len());
        for track in &tracks {
            tracing::debug!("  🎵 {}", track);
        }

        // Destination
        self.destination.authenticate().await?;
        let (destination, created_playlist) = self.resolve_destination(&source_title).await?;

        let (entries, stop) = self.transfer_tracks(&destination.id, tracks).await;

        let mut report = TransferReport {
            source_title,
            destination,
            created_playlist,
            entries,
            halted: None,
        };
        match stop {
            None => {}
            Some(LoopStop::Halted(reason)) => report.halted = Some(reason),
            Some(LoopStop::Failed(err)) => {
                return Err(TransferError::Incomplete {
                    report: Box::new(report),
                    source: Box::new(err),
                });
            }
        }

        if report.is_complete() {
            tracing::info!(
                "🎉 Playlist transferred: {} added, {} not found",
                report.inserted(),
                report.not_found()
            );
        }

        Ok(report)
    }

    async fn resolve_destination(&self, title: &str) -> Result<(PlaylistRef, bool)> {
        tracing::info!("🔍 Checking if YouTube playlist already exists...");
        if let Some(id) = self.destination.find_playlist_by_title(title).await? {
            tracing::info!("⚠️ Playlist '{}' already exists on YouTube, reusing it", title);
            return Ok((
                PlaylistRef {
                    id,
                    title: title.to_string(),
                },
                false,
            ));
        }

        tracing::info!("🆕 Creating new YouTube playlist: {}", title);
        let id = self
            .destination
            .create_playlist(title, &self.options.description)
            .await?;
        tracing::info!("✅ Created YouTube playlist '{}' with ID: {}", title, id);

        Ok((
            PlaylistRef {
                id,
                title: title.to_string(),
            },
            true,
        ))
    }

    async fn transfer_tracks(
        &self,
        playlist_id: &str,
        tracks: Vec<Track>,
    ) -> (Vec<(Track, TrackOutcome)>, Option<LoopStop>) {
        let total = tracks.len();
        let mut entries = Vec::with_capacity(total);
        let mut stop = None;

        tracing::info!("🎶 Adding tracks to YouTube playlist...");

        for (index, track) in tracks.into_iter().enumerate() {
            if stop.is_some() {
                entries.push((track, TrackOutcome::Skipped));
                continue;
            }

            match self.transfer_one(playlist_id, &track, index + 1, total).await {
                Ok(TrackStep::Done(outcome)) => {
                    entries.push((track, outcome));
                    if !self.options.delay.is_zero() {
                        tokio::time::sleep(self.options.delay).await;
                    }
                }
                Ok(TrackStep::Halt(err)) => {
                    tracing::warn!(
                        "⏳ Rate limit exceeded or service unavailable. Halting the process: {}",
                        err
                    );
                    stop = Some(LoopStop::Halted(HaltReason {
                        track_index: index,
                        status: err.status().unwrap_or_default(),
                        message: err.to_string(),
                    }));
                    entries.push((track, TrackOutcome::Skipped));
                }
                Err(err) => {
                    tracing::error!("⛔️ Stopping at track {}/{}: {}", index + 1, total, err);
                    stop = Some(LoopStop::Failed(err));
                    entries.push((track, TrackOutcome::Skipped));
                }
            }
        }

        (entries, stop)
    }

    /// Search then insert. Halting statuses are handed back, anything else propagates.
    async fn transfer_one(
        &self,
        playlist_id: &str,
        track: &Track,
        position: usize,
        total: usize,
    ) -> Result<TrackStep> {
        let query = track.query();
        tracing::info!("🔎 [{}/{}] Searching for track: {}", position, total, query);

        let video_id = match self.destination.search_top_result(&query).await {
            Ok(Some(video_id)) => video_id,
            Ok(None) => {
                tracing::warn!("❌ Could not find a video for track: '{}'", query);
                return Ok(TrackStep::Done(TrackOutcome::NotFound));
            }
            Err(e) if e.is_halting() => return Ok(TrackStep::Halt(e)),
            Err(e) => return Err(e),
        };

        match self
            .destination
            .insert_playlist_item(playlist_id, &video_id)
            .await
        {
            Ok(()) => {
                tracing::info!("✅ Added track '{}' to playlist.", query);
                Ok(TrackStep::Done(TrackOutcome::Inserted { video_id }))
            }
            Err(e) if e.is_halting() => Ok(TrackStep::Halt(e)),
            Err(e) => Err(e),
        }
    }
}
