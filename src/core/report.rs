use crate::domain::model::TransferReport;
use crate::utils::error::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    position: usize,
    title: &'a str,
    artist: &'a str,
    query: String,
    outcome: &'static str,
    video_id: Option<&'a str>,
}

/// 將每首歌的結果寫成 CSV
///
/// A path without an extension is treated as a directory and gets a
/// timestamped `transfer-YYYYmmdd-HHMMSS.csv` inside it. Returns the file written.
pub fn write_csv(report: &TransferReport, path: &str) -> Result<PathBuf> {
    let target = resolve_target(Path::new(path));
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    tracing::debug!("Writing transfer report to {}", target.display());
    let mut writer = csv::Writer::from_path(&target)?;
    for (index, (track, outcome)) in report.entries.iter().enumerate() {
        writer.serialize(ReportRow {
            position: index + 1,
            title: &track.title,
            artist: &track.artist,
            query: track.query(),
            outcome: outcome.label(),
            video_id: outcome.video_id(),
        })?;
    }
    writer.flush()?;

    Ok(target)
}

fn resolve_target(path: &Path) -> PathBuf {
    if path.is_dir() || path.extension().is_none() {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        path.join(format!("transfer-{}.csv", stamp))
    } else {
        path.to_path_buf()
    }
}
