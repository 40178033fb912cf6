use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Campaign managers an influencer can be assigned to. The backend stores
/// these lowercase; the set is fixed by the owner enum on the server side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Owner {
    Alejandra,
    Alessandro,
    Bianca,
    Camilo,
    Jesus,
    Julia,
    Samuel,
}

impl Owner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Owner::Alejandra => "alejandra",
            Owner::Alessandro => "alessandro",
            Owner::Bianca => "bianca",
            Owner::Camilo => "camilo",
            Owner::Jesus => "jesus",
            Owner::Julia => "julia",
            Owner::Samuel => "samuel",
        }
    }
}

/// Countries the campaign operates in. Influencer country is free text on
/// the backend, so filtering stays case-insensitive against this set.
pub const COUNTRIES: &[&str] = &[
    "Argentina", "Bolivia", "Brasil", "Colombia", "Panama", "Peru",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Influencer {
    pub eldorado_username: String,
    pub first_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    pub owner: Owner,
    #[serde(default)]
    pub tiktok_username: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_status() -> String {
    "active".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub tiktok_video_id: String,
    pub eldorado_username: String,
    #[serde(default)]
    pub tiktok_username: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub share_count: u64,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Video {
    /// Publish timestamp, falling back to the creation timestamp.
    /// None means the record cannot be placed on a timeline at all.
    pub fn effective_date(&self) -> Option<DateTime<Utc>> {
        self.published_at.or(self.created_at)
    }
}

/// One filter set as held by a view. Empty dimensions mean "no restriction";
/// active dimensions combine with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    /// Selected influencer handles, insertion order preserved.
    pub influencers: Vec<String>,
    /// Selected countries, compared case-insensitively.
    pub countries: Vec<String>,
    /// Inclusive start of the date range.
    pub from: Option<NaiveDate>,
    /// Inclusive end of the date range, extended to end-of-day.
    pub to: Option<NaiveDate>,
}

impl FilterState {
    pub fn has_date_filter(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.influencers.is_empty() && self.countries.is_empty() && !self.has_date_filter()
    }
}

/// Summed metrics over a set of videos. Recomputed from scratch on every
/// filter change; never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VideoTotals {
    pub videos: u64,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
}

impl VideoTotals {
    /// Fold a single video into the running sums.
    /// Used by both the aggregation loop and the total-row computation.
    pub fn accumulate(&mut self, video: &Video) {
        self.videos += 1;
        self.views += video.view_count;
        self.likes += video.like_count;
        self.comments += video.comment_count;
        self.shares += video.share_count;
    }

    pub fn accumulate_from(&mut self, other: &VideoTotals) {
        self.videos += other.videos;
        self.views += other.views;
        self.likes += other.likes;
        self.comments += other.comments;
        self.shares += other.shares;
    }

    /// `(likes + comments + shares) / views * 100`, defined as 0 when there
    /// are no views so the rate can never be NaN.
    pub fn engagement_rate(&self) -> f64 {
        if self.views == 0 {
            return 0.0;
        }
        let interactions = self.likes + self.comments + self.shares;
        interactions as f64 / self.views as f64 * 100.0
    }
}

/// Per-influencer sums over a filtered video set, used for rankings and
/// the comparison chart.
#[derive(Debug, Clone)]
pub struct InfluencerTotals {
    pub eldorado_username: String,
    pub first_name: String,
    pub totals: VideoTotals,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engagement_rate_is_zero_without_views() {
        let totals = VideoTotals {
            videos: 3,
            views: 0,
            likes: 50,
            comments: 10,
            shares: 5,
        };
        assert_eq!(totals.engagement_rate(), 0.0);
    }

    #[test]
    fn engagement_rate_counts_all_interactions() {
        let totals = VideoTotals {
            videos: 1,
            views: 1000,
            likes: 80,
            comments: 15,
            shares: 5,
        };
        assert_eq!(totals.engagement_rate(), 10.0);
    }

    #[test]
    fn video_missing_counts_deserialize_to_zero() {
        let raw = r#"{
            "tiktok_video_id": "7301",
            "eldorado_username": "maria",
            "published_at": "2024-01-05T12:00:00Z"
        }"#;
        let video: Video = serde_json::from_str(raw).unwrap();
        assert_eq!(video.view_count, 0);
        assert_eq!(video.like_count, 0);
        assert_eq!(video.comment_count, 0);
        assert_eq!(video.share_count, 0);
        assert!(video.created_at.is_none());
    }

    #[test]
    fn effective_date_falls_back_to_created_at() {
        let raw = r#"{
            "tiktok_video_id": "7302",
            "eldorado_username": "maria",
            "created_at": "2024-02-01T00:00:00Z"
        }"#;
        let video: Video = serde_json::from_str(raw).unwrap();
        assert_eq!(video.effective_date(), video.created_at);
    }

    #[test]
    fn owner_deserializes_lowercase() {
        let owner: Owner = serde_json::from_str("\"camilo\"").unwrap();
        assert_eq!(owner, Owner::Camilo);
        assert_eq!(owner.as_str(), "camilo");
    }
}
