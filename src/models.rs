//! Output types produced by the resolution pipeline

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of a resolved person entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonKind {
    Actor,
    Director,
}

/// A resolved cast or crew member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonInfo {
    pub name: String,
    pub role: Option<String>,
    pub image_url: Option<String>,
    pub kind: PersonKind,
}

/// The final result of one metadata resolution.
///
/// Every field may be absent: missing source data degrades to an empty or
/// omitted value, never to a fabricated one. `has_metadata` distinguishes a
/// successful (possibly narrow) resolution from the empty fallback-exhausted
/// result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolvedMetadata {
    pub title: Option<String>,
    pub overview: Option<String>,
    pub premiere_date: Option<NaiveDate>,
    pub production_year: Option<i32>,
    pub original_title: Option<String>,
    pub sort_title: Option<String>,
    pub homepage: Option<String>,
    pub genres: Vec<String>,
    pub studio: Option<String>,
    pub official_rating: Option<String>,
    pub people: Vec<PersonInfo>,
    pub subtitle_files: Vec<PathBuf>,
    pub poster_url: Option<String>,
    pub provider_ids: HashMap<String, String>,
    pub has_metadata: bool,
}

impl ResolvedMetadata {
    /// The empty, unsuccessful result every failure mode degrades to
    pub fn empty() -> Self {
        Self::default()
    }
}
