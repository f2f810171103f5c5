//! M3U playlist file I/O
//!
//! The persisted playlist format is a plain text file starting with
//! `#EXTM3U`, followed by one track path per line. On load, comment
//! lines (starting with `#`) and blank lines are ignored, and paths that
//! do not exist on disk are silently dropped. The playback core never
//! reads or writes playlists itself; the host calls this module and
//! feeds the result into the controller.

use crate::utils::error::Result;
use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const M3U_HEADER: &str = "#EXTM3U";

/// Load track paths from an M3U file
///
/// # Returns
///
/// The paths that exist on disk, in file order. Missing files, comments
/// and blank lines are skipped.
pub fn load(path: &Path) -> Result<Vec<PathBuf>> {
    let contents = fs::read_to_string(path)?;

    let mut tracks = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let track = PathBuf::from(line);
        if track.exists() {
            tracks.push(track);
        } else {
            debug!("Dropping missing playlist entry: {}", line);
        }
    }

    info!("Loaded {} tracks from {}", tracks.len(), path.display());
    Ok(tracks)
}

/// Save track paths to an M3U file
pub fn save(path: &Path, tracks: &[PathBuf]) -> Result<()> {
    let mut file = fs::File::create(path)?;
    writeln!(file, "{}", M3U_HEADER)?;
    for track in tracks {
        writeln!(file, "{}", track.display())?;
    }
    info!("Saved {} tracks to {}", tracks.len(), path.display());
    Ok(())
}
