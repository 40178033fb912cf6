use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ApiClient;

/// Server-side aggregate counters for the unfiltered dashboard view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_influencers: u64,
    pub total_videos: u64,
    #[serde(default)]
    pub total_views: u64,
    #[serde(default)]
    pub total_likes: u64,
    #[serde(default)]
    pub avg_engagement_rate: f64,
    #[serde(default)]
    pub videos_this_month: u64,
    #[serde(default)]
    pub active_influencers_this_month: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopVideo {
    pub eldorado_username: String,
    #[serde(default)]
    pub tiktok_username: String,
    pub tiktok_video_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub metric_value: u64,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl TopVideo {
    pub fn tiktok_url(&self) -> String {
        let username = if self.tiktok_username.is_empty() {
            &self.eldorado_username
        } else {
            &self.tiktok_username
        };
        format!(
            "https://www.tiktok.com/@{}/video/{}",
            username, self.tiktok_video_id
        )
    }
}

/// Per-influencer lifetime stats computed by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfluencerStats {
    pub eldorado_username: String,
    #[serde(default)]
    pub total_videos: u64,
    #[serde(default)]
    pub avg_likes: f64,
    #[serde(default)]
    pub avg_views: f64,
    #[serde(default)]
    pub best_performance: u64,
    #[serde(default)]
    pub last_video_date: Option<DateTime<Utc>>,
}

impl ApiClient {
    pub fn dashboard_stats(&self) -> Result<DashboardStats> {
        let data = self
            .get("/analytics/dashboard", &[])
            .context("Failed to fetch dashboard stats")?;
        serde_json::from_str(&data).context("Failed to parse dashboard stats")
    }

    pub fn top_videos(&self, metric: &str, limit: u32) -> Result<Vec<TopVideo>> {
        let data = self
            .get(
                &format!("/analytics/top-videos/{metric}"),
                &[("limit", limit.to_string())],
            )
            .with_context(|| format!("Failed to fetch top videos by {metric}"))?;
        serde_json::from_str(&data).context("Failed to parse top videos")
    }

    pub fn influencer_stats(&self, handle: &str) -> Result<InfluencerStats> {
        let data = self
            .get(&format!("/analytics/influencer/{handle}"), &[])
            .with_context(|| format!("Failed to fetch stats for '{handle}'"))?;
        serde_json::from_str(&data).context("Failed to parse influencer stats")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_stats_default_optional_counters() {
        let raw = r#"{"total_influencers": 12, "total_videos": 340}"#;
        let stats: DashboardStats = serde_json::from_str(raw).unwrap();
        assert_eq!(stats.total_influencers, 12);
        assert_eq!(stats.total_views, 0);
        assert_eq!(stats.avg_engagement_rate, 0.0);
    }

    #[test]
    fn top_video_url_prefers_tiktok_username() {
        let v = TopVideo {
            eldorado_username: "maria".to_string(),
            tiktok_username: "maria.oficial".to_string(),
            tiktok_video_id: "7301".to_string(),
            description: String::new(),
            metric_value: 0,
            published_at: None,
        };
        assert_eq!(
            v.tiktok_url(),
            "https://www.tiktok.com/@maria.oficial/video/7301"
        );
    }
}
