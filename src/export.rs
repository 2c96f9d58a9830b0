use crate::models::StoryRecord;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use directories::UserDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Configured directory, else the user's downloads folder, else the working directory.
pub fn export_dir(configured: Option<&Path>) -> PathBuf {
    if let Some(dir) = configured {
        return dir.to_path_buf();
    }
    UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `story_20240131_174502.txt`, or `story_3_20240131_174502.txt` for a history entry.
pub fn file_name(history_idx: Option<usize>, at: DateTime<Local>) -> String {
    let stamp = at.format("%Y%m%d_%H%M%S");
    match history_idx {
        Some(idx) => format!("story_{}_{}.txt", idx, stamp),
        None => format!("story_{}.txt", stamp),
    }
}

/// Writes the story text, and nothing else, as a plain text file.
pub fn save_story(dir: &Path, record: &StoryRecord, history_idx: Option<usize>) -> Result<PathBuf> {
    // create the export directory if it doesn't exist yet
    fs::create_dir_all(dir)
        .with_context(|| format!("Could not create export directory {}", dir.display()))?;

    let path = dir.join(file_name(history_idx, Local::now()));
    fs::write(&path, &record.story)
        .with_context(|| format!("Could not write {}", path.display()))?;

    info!(path = %path.display(), bytes = record.story.len(), "story exported");
    Ok(path)
}
