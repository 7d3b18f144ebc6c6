//! Derivation of structured output fields from a fetched recording
//!
//! Pure helpers: cast mapping, genre tags, NFT rating, description assembly.

use chrono::{NaiveDate, NaiveDateTime, Utc};

use crate::models::{PersonInfo, PersonKind};

use super::encora::{EncoraCastMember, EncoraNft, EncoraRecording, ShowMetadata};
use super::stagemedia::StageMediaPerformer;

/// Master values that are capture methods rather than people; these never
/// become a director entry
const MASTER_DIRECTOR_EXCLUDED: &[&str] = &["pro-shot", "house-cam", "press-reel", "soundboard"];

/// Fallback description when every source field is blank
pub const DEFAULT_DESCRIPTION: &str = "Fetched from Encora.it";

/// Map cast entries to actor persons, attaching StageMedia headshots by
/// performer id, and optionally append the master as a director.
pub fn map_cast(
    cast: &[EncoraCastMember],
    headshots: &[StageMediaPerformer],
    master: Option<&str>,
    add_master_director: bool,
) -> Vec<PersonInfo> {
    let mut people = Vec::new();

    for member in cast {
        let Some(name) = member
            .performer
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .filter(|n| !n.trim().is_empty())
        else {
            continue;
        };

        let character = member.character.as_ref().and_then(|c| c.name.clone());
        let role = match member
            .status
            .as_ref()
            .and_then(|s| s.abbreviation.as_deref())
            .filter(|a| !a.is_empty())
        {
            Some(abbreviation) => Some(format!(
                "{} {}",
                abbreviation,
                character.as_deref().unwrap_or_default()
            )),
            None => character,
        };

        let performer_id = member.performer.as_ref().map(|p| p.id).unwrap_or(0);
        let image_url = if performer_id > 0 {
            headshots
                .iter()
                .find(|h| h.id == performer_id)
                .and_then(|h| h.url.clone())
        } else {
            None
        };

        people.push(PersonInfo {
            name: name.to_string(),
            role,
            image_url,
            kind: PersonKind::Actor,
        });
    }

    if add_master_director
        && let Some(master) = master.filter(|m| !m.trim().is_empty())
    {
        let normalized = master.trim().to_lowercase();
        if !MASTER_DIRECTOR_EXCLUDED.contains(&normalized.as_str()) {
            people.push(PersonInfo {
                name: master.to_string(),
                role: Some("Director".to_string()),
                image_url: None,
                kind: PersonKind::Director,
            });
        }
    }

    people
}

/// Derive genre tags from the show metadata block
pub fn derive_genres(metadata: &ShowMetadata) -> Vec<String> {
    let mut genres = Vec::new();

    if let Some(recording_type) = non_blank(metadata.recording_type.as_deref()) {
        genres.push(title_case(recording_type));
    }
    if let Some(amount) = non_blank(metadata.amount_recorded.as_deref()) {
        genres.push(title_case(amount));
    }
    if metadata.boot_camp_recommended {
        genres.push("Boot Camp".to_string());
    }
    if metadata.has_subtitles {
        genres.push("Subtitled".to_string());
    }
    if metadata.is_concert {
        genres.push("Concert".to_string());
    }

    genres
}

/// Derive the content rating from the NFT marker.
///
/// Forever-NFT recordings rate "NFT Forever"; a parseable expiry strictly in
/// the future rates "NFT"; anything else clears the rating, overriding any
/// value a certification marker might have set.
pub fn derive_rating(nft: Option<&EncoraNft>) -> Option<String> {
    let nft = nft?;

    if nft.nft_forever {
        return Some("NFT Forever".to_string());
    }

    if let Some(date) = non_blank(nft.nft_date.as_deref())
        && let Some(expiry) = parse_expiry(date)
        && expiry > Utc::now().naive_utc()
    {
        return Some("NFT".to_string());
    }

    None
}

/// Assemble the item description: show description as the base, with master
/// and general notes appended as labeled sections. Blank falls back to the
/// fixed default.
pub fn build_description(recording: &EncoraRecording) -> String {
    let mut description = recording
        .metadata
        .as_ref()
        .and_then(|m| m.show_description.clone())
        .unwrap_or_default();

    if let Some(master_notes) = non_blank(recording.master_notes.as_deref()) {
        description.push_str(&format!("\n\nMaster Notes: \n{}", master_notes));
    }
    if let Some(notes) = non_blank(recording.notes.as_deref()) {
        description.push_str(&format!("\n\nGeneral Notes: \n{}", notes));
    }

    let description = description.trim_start_matches('\n').trim();
    if description.is_empty() {
        DEFAULT_DESCRIPTION.to_string()
    } else {
        description.to_string()
    }
}

/// Parse a recording's full date, `None` when not a calendar date
pub fn parse_full_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Uppercase the first letter of each whitespace-separated word
pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_expiry(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
