//! NFO sidecar fallback reader
//!
//! Parses a `movie.nfo` (or `<basename>.nfo`) descriptor co-located with the
//! media file into the common metadata shape. Used when the path carries no
//! recording id or the remote lookup fails.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::{debug, warn};

use crate::models::{PersonInfo, PersonKind, ResolvedMetadata};

/// Locate the sidecar descriptor for a media path: `movie.nfo` in the media
/// directory, else `<basename>.nfo`
fn sidecar_path(media_path: &str) -> Option<PathBuf> {
    let dir = Path::new(media_path).parent()?;

    let generic = dir.join("movie.nfo");
    if generic.is_file() {
        return Some(generic);
    }

    let stem = Path::new(media_path).file_stem()?.to_str()?;
    let named = dir.join(format!("{}.nfo", stem));
    named.is_file().then_some(named)
}

/// Read and parse the NFO sidecar for a media path.
///
/// `None` means no usable descriptor: both candidate files are missing, the
/// file is unreadable, or the root element is not `movie`. The caller turns
/// that into the empty unsuccessful result.
pub async fn read_nfo(media_path: &str) -> Option<ResolvedMetadata> {
    let path = sidecar_path(media_path)?;
    debug!(path = %path.display(), "Reading NFO sidecar");

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Could not read NFO sidecar");
            return None;
        }
    };

    parse_nfo(&content)
}

#[derive(Default)]
struct ActorBuilder {
    name: Option<String>,
    role: Option<String>,
    thumb: Option<String>,
}

/// Parse NFO XML content into the common metadata shape
pub fn parse_nfo(content: &str) -> Option<ResolvedMetadata> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut meta = ResolvedMetadata::default();
    let mut premiered: Option<String> = None;
    let mut releasedate: Option<String> = None;
    let mut year: Option<String> = None;

    let mut saw_root = false;
    let mut depth = 0usize;
    let mut current_tag = String::new();
    let mut actor_tag = String::new();
    let mut in_poster_thumb = false;
    let mut actor: Option<ActorBuilder> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_lowercase();
                if depth == 0 {
                    // Any root other than <movie> means this is not a usable
                    // descriptor
                    if tag != "movie" {
                        return None;
                    }
                    saw_root = true;
                } else if depth == 1 {
                    current_tag = tag.clone();
                    match tag.as_str() {
                        "actor" => actor = Some(ActorBuilder::default()),
                        "thumb" => {
                            let aspect = e
                                .try_get_attribute("aspect")
                                .ok()
                                .flatten()
                                .and_then(|a| a.unescape_value().ok());
                            in_poster_thumb = aspect.as_deref() == Some("poster");
                        }
                        _ => {}
                    }
                } else if depth == 2 && actor.is_some() {
                    actor_tag = tag;
                }
                depth += 1;
            }
            Ok(Event::End(ref e)) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_lowercase();
                depth = depth.saturating_sub(1);
                if depth == 1 {
                    if tag == "actor"
                        && let Some(builder) = actor.take()
                        && let Some(name) = builder.name.filter(|n| !n.trim().is_empty())
                    {
                        meta.people.push(PersonInfo {
                            name,
                            role: builder.role,
                            image_url: builder.thumb,
                            kind: PersonKind::Actor,
                        });
                    }
                    in_poster_thumb = false;
                    current_tag.clear();
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if depth == 2 {
                    match current_tag.as_str() {
                        "title" => meta.title = Some(text),
                        "plot" => meta.overview = Some(text),
                        "originaltitle" => meta.original_title = Some(text),
                        "sorttitle" => meta.sort_title = Some(text),
                        "premiered" => premiered = Some(text),
                        "releasedate" => releasedate = Some(text),
                        "year" => year = Some(text),
                        "studio" => {
                            if !text.trim().is_empty() {
                                meta.studio = Some(text);
                            }
                        }
                        "genre" => {
                            if !text.trim().is_empty() {
                                meta.genres.push(text);
                            }
                        }
                        // Any present certification marks the recording NFT;
                        // last one wins
                        "certification" => {
                            if !text.trim().is_empty() {
                                meta.official_rating = Some("NFT".to_string());
                            }
                        }
                        "thumb" => {
                            if in_poster_thumb && meta.poster_url.is_none() {
                                meta.poster_url = Some(text);
                            }
                        }
                        _ => {}
                    }
                } else if depth == 3
                    && let Some(ref mut builder) = actor
                {
                    match actor_tag.as_str() {
                        "name" => builder.name = Some(text),
                        "role" => builder.role = Some(text),
                        "thumb" => builder.thumb = Some(text),
                        _ => {}
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                warn!(error = %err, "Error parsing NFO XML");
                break;
            }
            _ => {}
        }
    }

    if !saw_root {
        return None;
    }

    meta.premiere_date = premiered
        .as_deref()
        .and_then(parse_nfo_date)
        .or_else(|| releasedate.as_deref().and_then(parse_nfo_date));
    meta.production_year = year.and_then(|y| y.trim().parse().ok());
    meta.has_metadata = true;
    Some(meta)
}

// Writers emit either a plain date or a full timestamp
fn parse_nfo_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().or_else(|| {
        chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
            .ok()
            .map(|dt| dt.date())
    })
}
