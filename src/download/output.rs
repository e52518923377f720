//! Locating the file yt-dlp produced.
//!
//! yt-dlp is handed an `<id>.%(ext)s` template, so the final extension is
//! only known after it exits (post-processing may also rename the file).
//! Discovery therefore scans the output directory for `<id>.*`.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::download::error::DownloadError;

/// Suffixes of intermediate artifacts yt-dlp leaves behind or is still writing.
const PARTIAL_SUFFIXES: &[&str] = &[".part", ".ytdl", ".temp", ".tmp"];

/// A finished file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
}

/// True for `<id>.f137.mp4`-style per-format downloads that precede a merge,
/// and for `.part`/`.ytdl`/temp leftovers.
fn is_intermediate(file_name: &str, file_id: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    if PARTIAL_SUFFIXES.iter().any(|s| lower.ends_with(s)) || lower.contains(".part-frag") {
        return true;
    }

    let Some(rest) = file_name.strip_prefix(file_id).and_then(|r| r.strip_prefix('.')) else {
        return false;
    };
    let mut parts = rest.split('.');
    match (parts.next(), parts.next()) {
        (Some(first), Some(_)) => first
            .strip_prefix('f')
            .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())),
        _ => false,
    }
}

/// Finds the file produced for `file_id` inside `dir`.
///
/// When several candidates exist the most recently modified one wins.
pub async fn find_produced_file(dir: &Path, file_id: &str) -> Result<ProducedFile, DownloadError> {
    let prefix = format!("{}.", file_id);

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| DownloadError::Storage(format!("Failed to read download dir {}: {}", dir.display(), e)))?;

    let mut best: Option<(SystemTime, ProducedFile)> = None;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| DownloadError::Storage(format!("Failed to list download dir {}: {}", dir.display(), e)))?
    {
        let file_name = entry.file_name().to_string_lossy().to_string();
        if !file_name.starts_with(&prefix) || is_intermediate(&file_name, file_id) {
            continue;
        }

        let Ok(meta) = entry.metadata().await else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }

        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let candidate = ProducedFile {
            path: entry.path(),
            file_name,
            size: meta.len(),
        };

        match &best {
            Some((best_time, _)) if *best_time > modified => {}
            _ => best = Some((modified, candidate)),
        }
    }

    match best {
        Some((_, file)) => {
            log::debug!("Produced file for {}: {}", file_id, file.path.display());
            Ok(file)
        }
        None => {
            log::error!("No output file for {} in {}", file_id, dir.display());
            Err(DownloadError::FileNotFound("Downloaded file not found".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const ID: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";

    #[test]
    fn test_is_intermediate() {
        assert!(is_intermediate(&format!("{}.mp3.part", ID), ID));
        assert!(is_intermediate(&format!("{}.webm.ytdl", ID), ID));
        assert!(is_intermediate(&format!("{}.f137.mp4", ID), ID));
        assert!(is_intermediate(&format!("{}.f251.webm", ID), ID));
        assert!(is_intermediate(&format!("{}.mp4.temp", ID), ID));
        assert!(!is_intermediate(&format!("{}.mp3", ID), ID));
        assert!(!is_intermediate(&format!("{}.mp4", ID), ID));
        assert!(!is_intermediate(&format!("{}.flac", ID), ID));
    }

    #[tokio::test]
    async fn test_finds_final_file_and_skips_partials() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(format!("{}.mp3", ID)), b"ID3data").unwrap();
        std::fs::write(dir.path().join(format!("{}.webm.part", ID)), b"partial").unwrap();
        std::fs::write(dir.path().join(format!("{}.f251.webm", ID)), b"fragment").unwrap();
        std::fs::write(dir.path().join("other.mp3"), b"other").unwrap();

        let file = find_produced_file(dir.path(), ID).await.unwrap();
        assert_eq!(file.file_name, format!("{}.mp3", ID));
        assert_eq!(file.size, 7);
    }

    fn set_mtime(path: &Path, time: SystemTime) {
        std::fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    #[tokio::test]
    async fn test_newest_final_file_wins() {
        let dir = tempdir().unwrap();
        let now = SystemTime::now();
        let older = dir.path().join(format!("{}.webm", ID));
        let newer = dir.path().join(format!("{}.mp3", ID));
        std::fs::write(&older, b"webm").unwrap();
        std::fs::write(&newer, b"mp3!!").unwrap();
        set_mtime(&older, now - std::time::Duration::from_secs(120));
        set_mtime(&newer, now);

        let file = find_produced_file(dir.path(), ID).await.unwrap();
        assert_eq!(file.file_name, format!("{}.mp3", ID));
        assert_eq!(file.size, 5);

        // flip the ages: the other file must win now
        set_mtime(&older, now + std::time::Duration::from_secs(60));
        let file = find_produced_file(dir.path(), ID).await.unwrap();
        assert_eq!(file.file_name, format!("{}.webm", ID));
    }

    #[tokio::test]
    async fn test_not_found() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(format!("{}.mp4.part", ID)), b"partial").unwrap();

        let err = find_produced_file(dir.path(), ID).await.unwrap_err();
        assert!(matches!(err, DownloadError::FileNotFound(_)));
        assert_eq!(err.to_string(), "Downloaded file not found");
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = find_produced_file(&missing, ID).await.unwrap_err();
        assert!(matches!(err, DownloadError::Storage(_)));
        assert!(err.to_string().contains("Failed to read download dir"));
    }
}
