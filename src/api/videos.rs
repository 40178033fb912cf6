use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::ApiClient;
use crate::types::Video;

/// Outcome of one influencer's video sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSummary {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub videos_processed: u64,
    #[serde(default)]
    pub new_videos: u64,
    #[serde(default)]
    pub updated_videos: u64,
    #[serde(default)]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub is_influencer_video: Option<bool>,
    #[serde(default)]
    pub eldorado_username: Option<String>,
    #[serde(default)]
    pub transcription: Option<String>,
    #[serde(default)]
    pub video_info: Option<Video>,
}

impl ApiClient {
    pub fn list_videos(&self, limit: u32) -> Result<Vec<Video>> {
        let data = self.fetch_list("videos", "/videos/", limit)?;
        serde_json::from_str(&data).context("Failed to parse video list")
    }

    pub fn sync_influencer_videos(&self, handle: &str) -> Result<SyncSummary> {
        let data = self
            .post(&format!("/videos/sync/{handle}"), "{}")
            .with_context(|| format!("Failed to sync videos for '{handle}'"))?;
        self.invalidate_cache("videos");
        serde_json::from_str(&data).context("Failed to parse sync result")
    }

    pub fn sync_all_videos(&self) -> Result<Vec<SyncSummary>> {
        let data = self
            .post("/videos/sync/all", "{}")
            .context("Failed to sync videos")?;
        self.invalidate_cache("videos");
        serde_json::from_str(&data).context("Failed to parse sync results")
    }

    /// Trigger a transcription on the backend. This call blocks for as long
    /// as the download + transcription takes; progress display around it is
    /// the caller's concern.
    pub fn transcribe(&self, tiktok_url: &str) -> Result<TranscriptionResult> {
        let body = serde_json::json!({ "tiktok_url": tiktok_url }).to_string();
        let data = self
            .post("/videos/transcribe", &body)
            .context("Failed to reach the transcription endpoint")?;
        serde_json::from_str(&data).context("Transcription response is not valid JSON")
    }
}
