use std::fmt;

/// A song to look up on the destination service: title plus primary artist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub title: String,
    pub artist: String,
}

impl Track {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }

    /// Search query sent to the destination: `"<title> <artist>"`.
    pub fn query(&self) -> String {
        format!("{} {}", self.title, self.artist)
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.query())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRef {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    Inserted { video_id: String },
    NotFound,
    /// Never attempted because the run halted earlier.
    Skipped,
}

impl TrackOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            TrackOutcome::Inserted { .. } => "inserted",
            TrackOutcome::NotFound => "not_found",
            TrackOutcome::Skipped => "skipped",
        }
    }

    pub fn video_id(&self) -> Option<&str> {
        match self {
            TrackOutcome::Inserted { video_id } => Some(video_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HaltReason {
    /// Zero-based position of the track whose request was refused.
    pub track_index: usize,
    pub status: u16,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct TransferReport {
    pub source_title: String,
    pub destination: PlaylistRef,
    pub created_playlist: bool,
    pub entries: Vec<(Track, TrackOutcome)>,
    pub halted: Option<HaltReason>,
}

impl TransferReport {
    pub fn inserted(&self) -> usize {
        self.count(|o| matches!(o, TrackOutcome::Inserted { .. }))
    }

    pub fn not_found(&self) -> usize {
        self.count(|o| matches!(o, TrackOutcome::NotFound))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, TrackOutcome::Skipped))
    }

    pub fn is_complete(&self) -> bool {
        self.halted.is_none()
    }

    fn count(&self, pred: impl Fn(&TrackOutcome) -> bool) -> usize {
        self.entries.iter().filter(|(_, o)| pred(o)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_query() {
        let track = Track::new("Yellow", "Coldplay");
        assert_eq!(track.query(), "Yellow Coldplay");
        assert_eq!(track.to_string(), "Yellow Coldplay");
    }

    #[test]
    fn test_report_counters() {
        let report = TransferReport {
            source_title: "Road Trip".to_string(),
            destination: PlaylistRef {
                id: "PL1".to_string(),
                title: "Road Trip".to_string(),
            },
            created_playlist: true,
            entries: vec![
                (
                    Track::new("Yellow", "Coldplay"),
                    TrackOutcome::Inserted {
                        video_id: "v1".to_string(),
                    },
                ),
                (Track::new("Africa", "Toto"), TrackOutcome::NotFound),
                (Track::new("Hurt", "Johnny Cash"), TrackOutcome::Skipped),
            ],
            halted: Some(HaltReason {
                track_index: 2,
                status: 429,
                message: "rate limited".to_string(),
            }),
        };

        assert_eq!(report.inserted(), 1);
        assert_eq!(report.not_found(), 1);
        assert_eq!(report.skipped(), 1);
        assert!(!report.is_complete());
        assert_eq!(report.entries[0].1.video_id(), Some("v1"));
    }
}
