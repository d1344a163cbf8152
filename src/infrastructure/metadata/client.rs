use std::time::Duration;

use alloy_primitives::Address;
use reqwest::Client;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::infrastructure::metadata::error::MetadataError;

/// Off-chain ad offer document, as published at the offer's metadata URL
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub terms: Option<String>,
    #[serde(rename = "externalURL", default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub valid_from: Option<u64>,
    #[serde(default)]
    pub valid_to: Option<u64>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub creator: Option<CreatorDocument>,
    #[serde(default)]
    pub token_metadata: Option<TokenDocument>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorDocument {
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "imageURL", default)]
    pub image_url: Option<String>,
    #[serde(rename = "externalURL", default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "imageURL", default)]
    pub image_url: Option<String>,
    #[serde(rename = "externalURL", default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeDocument>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDocument {
    #[serde(default)]
    pub trait_type: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// HTTP client for off-chain metadata documents
pub struct MetadataClient {
    client: Client,
}

impl std::fmt::Debug for MetadataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataClient").finish_non_exhaustive()
    }
}

impl MetadataClient {
    /// Create a new metadata client
    pub fn new(config: &AppConfig) -> Result<Self, MetadataError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.metadata.timeout_secs))
            .connect_timeout(Duration::from_secs(config.metadata.connect_timeout_secs))
            .build()
            .map_err(|e| {
                MetadataError::ResponseError(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(MetadataClient { client })
    }

    /// Fetch and parse an offer document. Any failure is returned to the
    /// caller to log; nothing here ever reaches the ingestion path.
    pub async fn fetch_offer_document(&self, url: &str) -> Result<OfferDocument, MetadataError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::ResponseError(format!(
                "Metadata endpoint returned status {} for {}",
                status, url
            )));
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| MetadataError::ParseError(e.to_string()))
    }
}
