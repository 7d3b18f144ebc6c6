//! Best-effort thumbnail extraction
//!
//! Shells out to ffmpeg to grab a single frame from the media file and write
//! it as `thumb.png` next to it. Failures are reported to the caller, which
//! logs and swallows them; thumbnail generation never affects the resolved
//! metadata.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use regex::Regex;
use tokio::process::Command;
use tracing::debug;

/// Fixed name of the generated thumbnail in the media directory
pub const THUMB_FILE_NAME: &str = "thumb.png";

/// Produces a thumbnail image at a fixed name in the media directory
#[async_trait]
pub trait Thumbnailer: Send + Sync {
    async fn generate(&self, media_path: &Path, dir: &Path) -> Result<()>;
}

/// Extracts a frame from the media file with the ffmpeg CLI
pub struct FfmpegThumbnailer {
    ffmpeg_path: String,
}

impl FfmpegThumbnailer {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    /// Determine the media duration by parsing ffmpeg's stderr banner
    async fn probe_duration(&self, media_path: &Path) -> Option<Duration> {
        let output = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(media_path)
            .arg("-hide_banner")
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .ok()?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let duration_re = Regex::new(r"Duration: (\d+):(\d+):(\d+)\.(\d+)").unwrap();
        let caps = duration_re.captures(&stderr)?;
        let hours: u64 = caps[1].parse().ok()?;
        let minutes: u64 = caps[2].parse().ok()?;
        let seconds: u64 = caps[3].parse().ok()?;
        Some(Duration::from_secs(hours * 3600 + minutes * 60 + seconds))
    }
}

impl Default for FfmpegThumbnailer {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl Thumbnailer for FfmpegThumbnailer {
    async fn generate(&self, media_path: &Path, dir: &Path) -> Result<()> {
        let thumb_path = dir.join(THUMB_FILE_NAME);
        if thumb_path.exists() {
            return Ok(());
        }

        // Seek somewhere between 15% and 60% of the runtime; assume half an
        // hour when probing fails
        let duration = self
            .probe_duration(media_path)
            .await
            .unwrap_or(Duration::from_secs(30 * 60));
        let fraction: f64 = rand::thread_rng().gen_range(0.15..0.60);
        let seek_secs = (duration.as_secs_f64() * fraction) as u64;
        let seek = format!(
            "{:02}:{:02}:{:02}",
            seek_secs / 3600,
            (seek_secs % 3600) / 60,
            seek_secs % 60
        );

        debug!(
            path = %media_path.display(),
            seek = %seek,
            "Extracting thumbnail from media file"
        );

        // Write to a temp name and rename so a failed run leaves nothing at
        // the final path
        let tmp_path = temp_path(&thumb_path);
        let status = Command::new(&self.ffmpeg_path)
            .arg("-ss")
            .arg(&seek)
            .arg("-i")
            .arg(media_path)
            .args(["-frames:v", "1", "-vf", "scale=1920:1080", "-y"])
            .arg(&tmp_path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .context("Failed to run ffmpeg")?;

        if !status.success() {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            anyhow::bail!("ffmpeg exited with {}", status);
        }

        tokio::fs::rename(&tmp_path, &thumb_path)
            .await
            .context("Failed to move thumbnail into place")?;
        Ok(())
    }
}

/// Dot-prefixed sibling of the final path. The `.png` suffix stays last so
/// ffmpeg picks the output format from it.
fn temp_path(final_path: &Path) -> PathBuf {
    let stem = final_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("thumb");
    final_path.with_file_name(format!(".{}.tmp.png", stem))
}

/// No-op generator for tests and hosts that extract thumbnails themselves
pub struct NoopThumbnailer;

#[async_trait]
impl Thumbnailer for NoopThumbnailer {
    async fn generate(&self, _media_path: &Path, _dir: &Path) -> Result<()> {
        Ok(())
    }
}
