//! Metadata resolution orchestrator
//!
//! Sequences id extraction, the Encora fetch, the NFO fallback, StageMedia
//! enrichment, subtitle and poster downloads, title formatting and field
//! derivation into one [`ResolvedMetadata`] per media path. Every failure
//! mode degrades to a narrower successful result or an empty unsuccessful
//! one; [`MetadataService::resolve`] never returns an error.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Datelike;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ResolverConfig;
use crate::models::ResolvedMetadata;

use super::derive;
use super::encora::{self, EncoraCastMember, EncoraClient, EncoraRecording};
use super::id_extractor::extract_recording_id;
use super::nfo;
use super::stagemedia::{self, StageMediaClient, StageMediaPerformer};
use super::thumbs::{FfmpegThumbnailer, Thumbnailer};
use super::title::format_title;

/// Metadata resolution service: one instance serves any number of
/// independent resolutions
pub struct MetadataService {
    encora: EncoraClient,
    stagemedia: StageMediaClient,
    config: ResolverConfig,
    thumbnailer: Arc<dyn Thumbnailer>,
}

impl MetadataService {
    /// Create a service against the production endpoints
    pub fn new(config: ResolverConfig) -> Self {
        let encora = EncoraClient::new(encora::DEFAULT_BASE_URL, &config.encora_api_key);
        let stagemedia =
            StageMediaClient::new(stagemedia::DEFAULT_BASE_URL, &config.stagemedia_api_key);
        Self::with_clients(config, encora, stagemedia, Arc::new(FfmpegThumbnailer::default()))
    }

    /// Create a service with explicit clients and thumbnailer (tests,
    /// self-hosted mirrors)
    pub fn with_clients(
        config: ResolverConfig,
        encora: EncoraClient,
        stagemedia: StageMediaClient,
        thumbnailer: Arc<dyn Thumbnailer>,
    ) -> Self {
        Self {
            encora,
            stagemedia,
            config,
            thumbnailer,
        }
    }

    /// Resolve metadata for one media file.
    ///
    /// Always returns a [`ResolvedMetadata`]; `has_metadata` is false when
    /// every source came up empty. Cancelling the token aborts in-flight
    /// network calls and skips the remaining stages.
    pub async fn resolve(&self, media_path: &str, cancel: &CancellationToken) -> ResolvedMetadata {
        if media_path.trim().is_empty() {
            debug!("No media path provided, skipping metadata resolution");
            return ResolvedMetadata::empty();
        }
        if self.config.encora_api_key.trim().is_empty() {
            info!(path = %media_path, "No Encora API key configured, skipping metadata resolution");
            return ResolvedMetadata::empty();
        }
        if cancel.is_cancelled() {
            return ResolvedMetadata::empty();
        }

        let result = match extract_recording_id(media_path) {
            Some(id) => {
                let fetched = tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!(path = %media_path, "Resolution cancelled");
                        return ResolvedMetadata::empty();
                    }
                    fetched = self.encora.get_recording(&id) => fetched,
                };
                match fetched {
                    Ok(recording) => self.resolve_remote(&id, recording, media_path, cancel).await,
                    Err(err) => {
                        info!(
                            id = %id,
                            error = %err,
                            "Encora fetch failed, falling back to NFO sidecar"
                        );
                        self.resolve_local(media_path).await
                    }
                }
            }
            None => {
                debug!(path = %media_path, "No Encora id found, falling back to NFO sidecar");
                self.resolve_local(media_path).await
            }
        };

        // Thumbnail generation is best-effort on every path and never
        // alters the result
        if !cancel.is_cancelled()
            && let Some(dir) = Path::new(media_path).parent()
            && let Err(err) = self.thumbnailer.generate(Path::new(media_path), dir).await
        {
            warn!(error = %err, path = %media_path, "Thumbnail generation failed");
        }

        result
    }

    /// Assemble the result from a successfully fetched recording
    async fn resolve_remote(
        &self,
        id: &str,
        recording: EncoraRecording,
        media_path: &str,
        cancel: &CancellationToken,
    ) -> ResolvedMetadata {
        info!(id = %id, show = ?recording.show, "Fetched recording from Encora");
        let media_dir = Path::new(media_path).parent();

        // StageMedia enrichment is non-fatal: the recording fetch already
        // succeeded, so failures here never trigger the NFO fallback
        let mut headshots: Vec<StageMediaPerformer> = Vec::new();
        let mut poster_url: Option<String> = None;
        let show_id = recording.metadata.as_ref().map(|m| m.show_id).unwrap_or(0);
        if !self.config.stagemedia_api_key.trim().is_empty()
            && show_id > 0
            && !cancel.is_cancelled()
        {
            let actor_ids = actor_ids_csv(recording.cast.as_deref().unwrap_or_default());
            let images = tokio::select! {
                _ = cancel.cancelled() => None,
                images = self.stagemedia.get_images(show_id, &actor_ids) => Some(images),
            };
            match images {
                Some(Ok(images)) => {
                    poster_url = images.posters.first().cloned();
                    headshots = images.performers;

                    if let (Some(dir), Some(url)) = (media_dir, poster_url.as_deref()) {
                        let poster_path = dir.join("folder.jpg");
                        if !poster_path.exists()
                            && let Err(err) = self.download_poster(url, &poster_path).await
                        {
                            warn!(show_id, error = %err, "Could not download StageMedia poster");
                        }
                    }
                }
                Some(Err(err)) => {
                    warn!(show_id, error = %err, "Could not fetch StageMedia images");
                }
                None => debug!(show_id, "Resolution cancelled during image fetch"),
            }
        }

        // Subtitles are equally non-fatal
        let mut subtitle_files = Vec::new();
        let has_subtitles = recording
            .metadata
            .as_ref()
            .map(|m| m.has_subtitles)
            .unwrap_or(false);
        if has_subtitles
            && !cancel.is_cancelled()
            && let Some(dir) = media_dir
        {
            match self.download_subtitles(id, media_path, dir, cancel).await {
                Ok(paths) => subtitle_files = paths,
                Err(err) => warn!(id = %id, error = %err, "Could not download subtitles"),
            }
        }

        let premiere_date = recording
            .date
            .as_ref()
            .and_then(|d| d.full_date.as_deref())
            .and_then(derive::parse_full_date);

        let mut provider_ids = std::collections::HashMap::new();
        provider_ids.insert("EncoraRecordingId".to_string(), id.to_string());
        if show_id > 0 {
            provider_ids.insert("StageMediaShowId".to_string(), show_id.to_string());
        }

        ResolvedMetadata {
            title: Some(format_title(
                &self.config.title_format,
                &recording,
                media_path,
                &self.config.date_replace_char,
            )),
            overview: Some(derive::build_description(&recording)),
            premiere_date,
            production_year: premiere_date.map(|d| d.year()),
            original_title: recording.show.clone(),
            sort_title: recording.show.clone(),
            homepage: Some(self.encora.recording_homepage(id)),
            genres: recording
                .metadata
                .as_ref()
                .map(derive::derive_genres)
                .unwrap_or_default(),
            studio: recording
                .metadata
                .as_ref()
                .and_then(|m| m.venue.clone())
                .filter(|v| !v.trim().is_empty()),
            official_rating: derive::derive_rating(recording.nft.as_ref()),
            people: derive::map_cast(
                recording.cast.as_deref().unwrap_or_default(),
                &headshots,
                recording.master.as_deref(),
                self.config.add_master_director,
            ),
            subtitle_files,
            poster_url,
            provider_ids,
            has_metadata: true,
        }
    }

    /// Fallback to the NFO sidecar; a missing or malformed descriptor yields
    /// the empty unsuccessful result
    async fn resolve_local(&self, media_path: &str) -> ResolvedMetadata {
        match nfo::read_nfo(media_path).await {
            Some(meta) => {
                info!(path = %media_path, "Resolved metadata from NFO sidecar");
                meta
            }
            None => {
                debug!(path = %media_path, "No usable NFO sidecar found");
                ResolvedMetadata::empty()
            }
        }
    }

    /// List and download the subtitle assets for a recording.
    ///
    /// Downloads run concurrently; each failed asset is logged and skipped,
    /// successful ones are kept.
    async fn download_subtitles(
        &self,
        id: &str,
        media_path: &str,
        dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<Vec<PathBuf>> {
        let subtitles = self.encora.get_subtitles(id).await?;
        let base = Path::new(media_path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("movie")
            .to_string();

        let downloads = subtitles.iter().filter_map(|sub| {
            let url = sub.url.as_deref().filter(|u| !u.trim().is_empty())?;
            let file_type = sub.file_type.as_deref().filter(|t| !t.trim().is_empty())?;
            let dest = dir.join(format!(
                "{}.{}.{}",
                base,
                language_code(sub.language.as_deref()),
                file_type.to_lowercase()
            ));
            Some(async move {
                let bytes = self.encora.download(url).await?;
                write_atomic(&dest, &bytes).await?;
                Ok::<_, anyhow::Error>(dest)
            })
        });

        let results = tokio::select! {
            _ = cancel.cancelled() => return Ok(Vec::new()),
            results = join_all(downloads) => results,
        };

        let mut paths = Vec::new();
        for result in results {
            match result {
                Ok(path) => {
                    debug!(path = %path.display(), "Wrote subtitle file");
                    paths.push(path);
                }
                Err(err) => warn!(id = %id, error = %err, "Subtitle download failed"),
            }
        }
        Ok(paths)
    }

    async fn download_poster(&self, url: &str, dest: &Path) -> Result<()> {
        let bytes = self.stagemedia.download(url).await?;
        write_atomic(dest, &bytes).await?;
        info!(path = %dest.display(), "Wrote poster image");
        Ok(())
    }
}

/// Comma-joined performer ids in cast order; the companion client
/// substitutes a placeholder when this is empty
fn actor_ids_csv(cast: &[EncoraCastMember]) -> String {
    cast.iter()
        .filter_map(|member| member.performer.as_ref())
        .map(|performer| performer.id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Two-letter lower-case language code, defaulting to "en"
fn language_code(language: Option<&str>) -> String {
    match language {
        Some(lang) if lang.chars().count() >= 2 => {
            lang.chars().take(2).collect::<String>().to_lowercase()
        }
        _ => "en".to_string(),
    }
}

/// Write to a temp name in the same directory, then rename, so cancellation
/// or a failed download never leaves a partial file at the final path
async fn write_atomic(dest: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = dest
        .file_name()
        .and_then(|n| n.to_str())
        .context("Invalid destination file name")?;
    let tmp = dest.with_file_name(format!(".{}.tmp", file_name));

    tokio::fs::write(&tmp, bytes)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, dest)
        .await
        .with_context(|| format!("Failed to move {} into place", dest.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::encora::EncoraPerformer;

    #[test]
    fn test_actor_ids_csv_in_cast_order() {
        let cast = vec![
            EncoraCastMember {
                performer: Some(EncoraPerformer {
                    id: 30,
                    ..Default::default()
                }),
                ..Default::default()
            },
            EncoraCastMember::default(),
            EncoraCastMember {
                performer: Some(EncoraPerformer {
                    id: 10,
                    ..Default::default()
                }),
                ..Default::default()
            },
        ];
        assert_eq!(actor_ids_csv(&cast), "30,10");
        assert_eq!(actor_ids_csv(&[]), "");
    }

    #[test]
    fn test_language_code() {
        assert_eq!(language_code(Some("English")), "en");
        assert_eq!(language_code(Some("DE")), "de");
        assert_eq!(language_code(Some("f")), "en");
        assert_eq!(language_code(None), "en");
    }

    #[tokio::test]
    async fn test_write_atomic_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("Show.en.srt");
        write_atomic(&dest, b"1\n00:00:01,000 --> 00:00:02,000\nHi\n")
            .await
            .unwrap();

        assert!(dest.is_file());
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
