use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::types::{FilterState, Influencer, Video};

/// Handle → influencer index used to resolve a video's country.
pub type InfluencerLookup<'a> = HashMap<&'a str, &'a Influencer>;

pub fn influencer_lookup(influencers: &[Influencer]) -> InfluencerLookup<'_> {
    influencers
        .iter()
        .map(|i| (i.eldorado_username.as_str(), i))
        .collect()
}

fn country_matches(country: Option<&str>, selected: &[String]) -> bool {
    let Some(country) = country else {
        // No country on record: an active country filter excludes it.
        return false;
    };
    let needle = country.to_lowercase();
    selected.iter().any(|s| s.to_lowercase() == needle)
}

/// Inclusive range check with the end bound extended to end-of-day.
/// A record with no resolvable date never passes an active date filter.
fn date_in_range(date: Option<DateTime<Utc>>, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    if from.is_none() && to.is_none() {
        return true;
    }
    let Some(date) = date else {
        return false;
    };
    let date = date.naive_utc();
    if let Some(from) = from {
        if date < from.and_hms_opt(0, 0, 0).unwrap() {
            return false;
        }
    }
    if let Some(to) = to {
        if date > to.and_hms_milli_opt(23, 59, 59, 999).unwrap() {
            return false;
        }
    }
    true
}

/// Test one video against every active filter dimension.
pub fn video_matches(video: &Video, filters: &FilterState, lookup: &InfluencerLookup) -> bool {
    if !filters.influencers.is_empty()
        && !filters.influencers.iter().any(|h| *h == video.eldorado_username)
    {
        return false;
    }

    if !filters.countries.is_empty() {
        let country = lookup
            .get(video.eldorado_username.as_str())
            .and_then(|i| i.country.as_deref());
        if !country_matches(country, &filters.countries) {
            return false;
        }
    }

    date_in_range(video.effective_date(), filters.from, filters.to)
}

/// Test one influencer against the selection and country dimensions.
/// The date dimension is applied separately via `filter_influencers`,
/// since it depends on the influencer's videos rather than the record itself.
pub fn influencer_matches(influencer: &Influencer, filters: &FilterState) -> bool {
    if !filters.influencers.is_empty()
        && !filters
            .influencers
            .iter()
            .any(|h| *h == influencer.eldorado_username)
    {
        return false;
    }

    if !filters.countries.is_empty()
        && !country_matches(influencer.country.as_deref(), &filters.countries)
    {
        return false;
    }

    true
}

pub fn filter_videos(videos: &[Video], filters: &FilterState, lookup: &InfluencerLookup) -> Vec<Video> {
    videos
        .iter()
        .filter(|v| video_matches(v, filters, lookup))
        .cloned()
        .collect()
}

/// Narrow the influencer list. When a date filter is active, an influencer
/// additionally needs at least one video in the already-filtered video set.
pub fn filter_influencers(
    influencers: &[Influencer],
    filters: &FilterState,
    filtered_videos: &[Video],
) -> Vec<Influencer> {
    influencers
        .iter()
        .filter(|i| influencer_matches(i, filters))
        .filter(|i| {
            !filters.has_date_filter()
                || filtered_videos
                    .iter()
                    .any(|v| v.eldorado_username == i.eldorado_username)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Owner;
    use chrono::TimeZone;

    fn influencer(handle: &str, country: Option<&str>) -> Influencer {
        Influencer {
            eldorado_username: handle.to_string(),
            first_name: handle.to_string(),
            phone: None,
            country: country.map(str::to_string),
            owner: Owner::Julia,
            tiktok_username: None,
            status: "active".to_string(),
            created_at: None,
        }
    }

    fn video(id: &str, handle: &str, published: Option<&str>) -> Video {
        Video {
            tiktok_video_id: id.to_string(),
            eldorado_username: handle.to_string(),
            tiktok_username: String::new(),
            description: String::new(),
            view_count: 100,
            like_count: 10,
            comment_count: 1,
            share_count: 1,
            published_at: published.map(|p| format!("{p}T12:00:00Z").parse().unwrap()),
            created_at: None,
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn empty_filters_pass_everything() {
        let influencers = vec![influencer("a", Some("Brasil"))];
        let videos = vec![video("1", "a", Some("2024-01-05")), video("2", "b", None)];
        let lookup = influencer_lookup(&influencers);
        let filtered = filter_videos(&videos, &FilterState::default(), &lookup);
        assert_eq!(filtered.len(), videos.len());
    }

    #[test]
    fn country_filter_is_case_insensitive() {
        let influencers = vec![influencer("a", Some("brasil"))];
        let videos = vec![video("1", "a", Some("2024-01-05"))];
        let lookup = influencer_lookup(&influencers);
        let filters = FilterState {
            countries: vec!["Brasil".to_string()],
            ..Default::default()
        };
        assert_eq!(filter_videos(&videos, &filters, &lookup).len(), 1);
    }

    #[test]
    fn unresolved_influencer_fails_country_filter() {
        let influencers = vec![influencer("a", Some("Brasil"))];
        let videos = vec![video("1", "ghost", Some("2024-01-05"))];
        let lookup = influencer_lookup(&influencers);
        let filters = FilterState {
            countries: vec!["Brasil".to_string()],
            ..Default::default()
        };
        assert!(filter_videos(&videos, &filters, &lookup).is_empty());
    }

    #[test]
    fn influencer_without_country_fails_country_filter() {
        let influencers = vec![influencer("a", None)];
        let videos = vec![video("1", "a", Some("2024-01-05"))];
        let lookup = influencer_lookup(&influencers);
        let filters = FilterState {
            countries: vec!["Peru".to_string()],
            ..Default::default()
        };
        assert!(filter_videos(&videos, &filters, &lookup).is_empty());
    }

    #[test]
    fn end_bound_covers_the_whole_day() {
        let influencers = vec![influencer("a", None)];
        let lookup = influencer_lookup(&influencers);
        let mut v = video("1", "a", None);
        v.published_at = Some(Utc.with_ymd_and_hms(2024, 1, 31, 23, 30, 0).unwrap());
        let filters = FilterState {
            from: Some(date("2024-01-01")),
            to: Some(date("2024-01-31")),
            ..Default::default()
        };
        assert!(video_matches(&v, &filters, &lookup));
    }

    #[test]
    fn undated_video_fails_active_date_filter() {
        let influencers = vec![influencer("a", None)];
        let lookup = influencer_lookup(&influencers);
        let v = video("1", "a", None);
        let filters = FilterState {
            from: Some(date("2024-01-01")),
            ..Default::default()
        };
        assert!(!video_matches(&v, &filters, &lookup));
        assert!(video_matches(&v, &FilterState::default(), &lookup));
    }

    #[test]
    fn date_window_selects_only_in_range() {
        let influencers = vec![influencer("a", None), influencer("b", None)];
        let lookup = influencer_lookup(&influencers);
        let videos = vec![
            video("1", "a", Some("2024-01-05")),
            video("2", "b", Some("2024-02-10")),
        ];
        let filters = FilterState {
            from: Some(date("2024-01-01")),
            to: Some(date("2024-01-31")),
            ..Default::default()
        };
        let filtered = filter_videos(&videos, &filters, &lookup);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].tiktok_video_id, "1");
    }

    #[test]
    fn filtering_is_idempotent() {
        let influencers = vec![influencer("a", Some("Peru")), influencer("b", Some("Brasil"))];
        let lookup = influencer_lookup(&influencers);
        let videos = vec![
            video("1", "a", Some("2024-01-05")),
            video("2", "b", Some("2024-02-10")),
        ];
        let filters = FilterState {
            countries: vec!["Peru".to_string()],
            from: Some(date("2024-01-01")),
            ..Default::default()
        };
        let once = filter_videos(&videos, &filters, &lookup);
        let twice = filter_videos(&once, &filters, &lookup);
        assert_eq!(once.len(), twice.len());
        assert_eq!(
            once.iter().map(|v| &v.tiktok_video_id).collect::<Vec<_>>(),
            twice.iter().map(|v| &v.tiktok_video_id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn date_filter_drops_influencers_without_activity() {
        let influencers = vec![influencer("a", None), influencer("b", None)];
        let lookup = influencer_lookup(&influencers);
        let videos = vec![video("1", "a", Some("2024-01-05"))];
        let filters = FilterState {
            from: Some(date("2024-01-01")),
            to: Some(date("2024-01-31")),
            ..Default::default()
        };
        let filtered_videos = filter_videos(&videos, &filters, &lookup);
        let filtered = filter_influencers(&influencers, &filters, &filtered_videos);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].eldorado_username, "a");
    }
}
