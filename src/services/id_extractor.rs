//! Encora id extraction from media paths and sidecar marker files
//!
//! A recording can be tagged three ways, tried in order (first match wins):
//! - a `{e-12345}` marker anywhere in the path (case-insensitive)
//! - a `.encora-12345` marker file next to the media file
//! - a `.encora-id` file whose content is the id

use std::fs;
use std::path::Path;

use regex::Regex;
use tracing::debug;

/// Extract the Encora recording id for a media path, if any.
///
/// Returns `None` when no marker is present; that is not an error, it
/// signals that the local NFO fallback should be used.
pub fn extract_recording_id(path: &str) -> Option<String> {
    let marker_re = Regex::new(r"(?i)\{e-(\d+)\}").unwrap();
    if let Some(caps) = marker_re.captures(path) {
        let id = caps.get(1).unwrap().as_str().to_string();
        debug!(path = %path, id = %id, "Found Encora id marker in path");
        return Some(id);
    }

    let directory = Path::new(path).parent()?;

    // .encora-<id> marker file, first directory-listing match wins
    let sidecar_re = Regex::new(r"(?i)^\.encora-(\d+)").unwrap();
    if let Ok(entries) = fs::read_dir(directory) {
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(caps) = sidecar_re.captures(name) {
                let id = caps.get(1).unwrap().as_str().to_string();
                debug!(file = %name, id = %id, "Found Encora id marker file");
                return Some(id);
            }
        }
    }

    // .encora-id file carrying the id as plain text
    let id_file = directory.join(".encora-id");
    if id_file.is_file()
        && let Ok(content) = fs::read_to_string(&id_file)
    {
        let id = content.trim();
        if !id.is_empty() {
            debug!(id = %id, "Found Encora id in .encora-id file");
            return Some(id.to_string());
        }
    }

    debug!(path = %path, "No Encora id found");
    None
}
