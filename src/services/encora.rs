//! Encora API client for stage-recording metadata
//!
//! Base URL: https://encora.it — every call carries a bearer token.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FetchError;

/// Production endpoint of the Encora API
pub const DEFAULT_BASE_URL: &str = "https://encora.it";

const USER_AGENT: &str = concat!("playbill/", env!("CARGO_PKG_VERSION"));

/// Encora API client
pub struct EncoraClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// A recording from Encora's recording API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoraRecording {
    pub id: i64,
    pub show: Option<String>,
    pub tour: Option<String>,
    pub date: Option<EncoraDate>,
    pub master: Option<String>,
    pub nft: Option<EncoraNft>,
    pub cast: Option<Vec<EncoraCastMember>>,
    pub notes: Option<String>,
    pub master_notes: Option<String>,
    pub release_format: Option<String>,
    pub metadata: Option<ShowMetadata>,
}

/// Date information for a recording. `full_date` is always a full
/// `YYYY-MM-DD` string; the `*_known` flags say which components are real.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoraDate {
    pub full_date: Option<String>,
    pub month_known: bool,
    pub day_known: bool,
    pub date_variant: Option<String>,
    pub time: Option<String>,
}

/// NFT rights marker on a recording (trading status, not blockchain)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoraNft {
    pub nft_date: Option<String>,
    pub nft_forever: bool,
}

/// A cast entry pairing a performer with a character
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoraCastMember {
    pub performer: Option<EncoraPerformer>,
    pub character: Option<EncoraCharacter>,
    pub status: Option<EncoraCastStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoraPerformer {
    pub id: i64,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoraCharacter {
    pub id: i64,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub url: Option<String>,
    pub order: i64,
}

/// Cast status such as understudy or alternate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoraCastStatus {
    pub label: Option<String>,
    pub abbreviation: Option<String>,
}

/// Show-level metadata block attached to a recording
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowMetadata {
    pub show_id: i64,
    pub is_opening: bool,
    pub is_closing: bool,
    pub is_preview: bool,
    pub is_concert: bool,
    pub is_nfs: bool,
    pub venue: Option<String>,
    pub city: Option<String>,
    pub media_type: Option<String>,
    pub recording_type: Option<String>,
    pub amount_recorded: Option<String>,
    pub gifting_status: Option<String>,
    pub limited_status: Option<String>,
    pub boot_camp_recommended: bool,
    pub has_screenshots: bool,
    pub has_subtitles: bool,
    pub owners_count: i64,
    pub wanters_count: i64,
    pub show_description: Option<String>,
}

/// A subtitle asset listed for a recording
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoraSubtitle {
    pub recording_id: i64,
    pub language: Option<String>,
    pub author: Option<String>,
    pub file_type: Option<String>,
    pub url: Option<String>,
}

impl EncoraClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Public page for a recording, used as the homepage of the resolved item
    pub fn recording_homepage(&self, id: &str) -> String {
        format!("{}/recordings/{}", self.base_url, id)
    }

    /// Fetch a recording by id
    pub async fn get_recording(&self, id: &str) -> Result<EncoraRecording, FetchError> {
        debug!(id = %id, "Fetching recording from Encora");

        let url = format!("{}/api/recording/{}", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let recording: EncoraRecording = response.json().await.map_err(FetchError::Decode)?;
        Ok(recording)
    }

    /// List the subtitle assets available for a recording
    pub async fn get_subtitles(&self, id: &str) -> Result<Vec<EncoraSubtitle>, FetchError> {
        debug!(id = %id, "Fetching subtitle listing from Encora");

        let url = format!("{}/api/recording/{}/subtitles", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let subtitles: Vec<EncoraSubtitle> = response.json().await.map_err(FetchError::Decode)?;
        debug!(id = %id, count = subtitles.len(), "Encora returned subtitle assets");
        Ok(subtitles)
    }

    /// Download an asset (subtitle file) by absolute URL
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_deserializes_with_missing_fields() {
        let recording: EncoraRecording =
            serde_json::from_str(r#"{"id": 4821, "show": "Wicked"}"#).unwrap();
        assert_eq!(recording.id, 4821);
        assert_eq!(recording.show.as_deref(), Some("Wicked"));
        assert!(recording.date.is_none());
        assert!(recording.cast.is_none());
        assert!(recording.metadata.is_none());
    }

    #[test]
    fn test_nested_cast_deserializes() {
        let json = r#"{
            "id": 1,
            "cast": [{
                "performer": {"id": 10, "name": "Idina Menzel"},
                "character": {"id": 20, "name": "Elphaba", "order": 1},
                "status": {"label": "Understudy", "abbreviation": "u/s"}
            }]
        }"#;
        let recording: EncoraRecording = serde_json::from_str(json).unwrap();
        let cast = recording.cast.unwrap();
        assert_eq!(cast.len(), 1);
        assert_eq!(
            cast[0].performer.as_ref().unwrap().name.as_deref(),
            Some("Idina Menzel")
        );
        assert_eq!(
            cast[0].status.as_ref().unwrap().abbreviation.as_deref(),
            Some("u/s")
        );
    }

    #[test]
    fn test_homepage_url() {
        let client = EncoraClient::new(DEFAULT_BASE_URL, "key");
        assert_eq!(
            client.recording_homepage("4821"),
            "https://encora.it/recordings/4821"
        );
    }
}
