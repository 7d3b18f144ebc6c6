//! StageMedia API client for poster art and performer headshots
//!
//! Companion service to Encora, keyed by the same show and performer ids.
//! Base URL: https://stagemedia.me

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FetchError;

/// Production endpoint of the StageMedia API
pub const DEFAULT_BASE_URL: &str = "https://stagemedia.me";

const USER_AGENT: &str = concat!("playbill/", env!("CARGO_PKG_VERSION"));

/// StageMedia API client
pub struct StageMediaClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// Image set for a show: poster URLs plus per-performer headshots
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StageMediaImages {
    pub posters: Vec<String>,
    pub performers: Vec<StageMediaPerformer>,
}

/// A performer headshot, keyed by the Encora performer id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StageMediaPerformer {
    pub id: i64,
    pub url: Option<String>,
}

impl StageMediaClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Fetch the image set for a show.
    ///
    /// `actor_ids` is the comma-joined performer id list in cast order; when
    /// it is empty a placeholder id is substituted so the query stays
    /// well-formed.
    pub async fn get_images(
        &self,
        show_id: i64,
        actor_ids: &str,
    ) -> Result<StageMediaImages, FetchError> {
        let actor_ids = if actor_ids.is_empty() { "1" } else { actor_ids };
        debug!(show_id, actor_ids = %actor_ids, "Fetching StageMedia images");

        let url = format!(
            "{}/api/images?show_id={}&actor_ids={}",
            self.base_url, show_id, actor_ids
        );
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

        let images: StageMediaImages = response.json().await.map_err(FetchError::Decode)?;
        debug!(
            show_id,
            posters = images.posters.len(),
            performers = images.performers.len(),
            "StageMedia returned images"
        );
        Ok(images)
    }

    /// Download an image (poster) by absolute URL
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
    fn test_images_deserialize_with_missing_fields() {
        let images: StageMediaImages = serde_json::from_str("{}").unwrap();
        assert!(images.posters.is_empty());
        assert!(images.performers.is_empty());

        let images: StageMediaImages = serde_json::from_str(
            r#"{"posters": ["https://stagemedia.me/p/1.jpg"], "performers": [{"id": 10, "url": "https://stagemedia.me/h/10.jpg"}]}"#,
        )
        .unwrap();
        assert_eq!(images.posters.len(), 1);
        assert_eq!(images.performers[0].id, 10);
    }
}
