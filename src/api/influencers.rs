use anyhow::{Context, Result};
use serde::Serialize;

use super::ApiClient;
use crate::types::{Influencer, Owner};

/// Creation payload. The handle is chosen here and immutable afterwards.
#[derive(Debug, Serialize)]
pub struct NewInfluencer {
    pub eldorado_username: String,
    pub first_name: String,
    pub owner: Owner,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiktok_username: Option<String>,
}

/// Partial update; absent fields are left untouched by the backend.
#[derive(Debug, Default, Serialize)]
pub struct InfluencerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ApiClient {
    pub fn list_influencers(&self, limit: u32) -> Result<Vec<Influencer>> {
        let data = self.fetch_list("influencers", "/influencers/", limit)?;
        serde_json::from_str(&data).context("Failed to parse influencer list")
    }

    pub fn get_influencer(&self, handle: &str) -> Result<Influencer> {
        let data = self.get(&format!("/influencers/{handle}"), &[])?;
        serde_json::from_str(&data).context("Failed to parse influencer")
    }

    pub fn create_influencer(&self, new: &NewInfluencer) -> Result<Influencer> {
        let body = serde_json::to_string(new)?;
        let data = self
            .post("/influencers/", &body)
            .context("Failed to create influencer")?;
        self.invalidate_cache("influencers");
        serde_json::from_str(&data).context("Failed to parse created influencer")
    }

    pub fn update_influencer(&self, handle: &str, update: &InfluencerUpdate) -> Result<Influencer> {
        let body = serde_json::to_string(update)?;
        let data = self
            .put(&format!("/influencers/{handle}"), &body)
            .with_context(|| format!("Failed to update influencer '{handle}'"))?;
        self.invalidate_cache("influencers");
        serde_json::from_str(&data).context("Failed to parse updated influencer")
    }

    pub fn delete_influencer(&self, handle: &str) -> Result<()> {
        self.delete(&format!("/influencers/{handle}"))
            .with_context(|| format!("Failed to delete influencer '{handle}'"))?;
        self.invalidate_cache("influencers");
        Ok(())
    }

    /// Resolve and store the numeric TikTok id for a handle. Returns the
    /// backend's status message.
    pub fn sync_tiktok_id(&self, handle: &str) -> Result<String> {
        let data = self
            .post(&format!("/influencers/{handle}/sync-tiktok-id"), "{}")
            .with_context(|| format!("Failed to sync TikTok id for '{handle}'"))?;
        let value: serde_json::Value = serde_json::from_str(&data)?;
        Ok(value
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("TikTok id synced")
            .to_string())
    }
}
