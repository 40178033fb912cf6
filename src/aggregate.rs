use std::collections::HashMap;

use crate::cli::GroupBy;
use crate::filter::InfluencerLookup;
use crate::types::{Influencer, InfluencerTotals, Video, VideoTotals};

/// Capitalize a free-text country name for display: "brasil" → "Brasil".
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Fixed monthly bucket window, first half of the calendar year.
pub const MONTH_LABELS: [&str; 6] = ["Jan", "Fev", "Mar", "Abr", "Mai", "Jun"];

pub fn totals(videos: &[Video]) -> VideoTotals {
    let mut totals = VideoTotals::default();
    for v in videos {
        totals.accumulate(v);
    }
    totals
}

/// The single video with the most views. First occurrence wins on ties, so
/// the result is deterministic for a given input order.
pub fn top_video(videos: &[Video]) -> Option<&Video> {
    let mut best: Option<&Video> = None;
    for v in videos {
        match best {
            Some(b) if v.view_count <= b.view_count => {}
            _ => best = Some(v),
        }
    }
    best
}

/// One totals entry per influencer, in source order. Influencers with no
/// videos in the filtered set get zeroed totals rather than being dropped.
pub fn influencer_totals(influencers: &[Influencer], videos: &[Video]) -> Vec<InfluencerTotals> {
    let mut by_handle: HashMap<&str, VideoTotals> = HashMap::new();
    for v in videos {
        by_handle
            .entry(v.eldorado_username.as_str())
            .or_default()
            .accumulate(v);
    }

    influencers
        .iter()
        .map(|i| InfluencerTotals {
            eldorado_username: i.eldorado_username.clone(),
            first_name: i.first_name.clone(),
            totals: by_handle
                .get(i.eldorado_username.as_str())
                .copied()
                .unwrap_or_default(),
        })
        .collect()
}

/// Top-N influencers by total views over the filtered video set. The sort is
/// stable, so equal totals keep their source-collection order.
pub fn rank_influencers(
    influencers: &[Influencer],
    videos: &[Video],
    limit: Option<usize>,
) -> Vec<InfluencerTotals> {
    let mut ranked = influencer_totals(influencers, videos);
    ranked.sort_by(|a, b| b.totals.views.cmp(&a.totals.views));
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked
}

/// Per-month sums over the fixed January–June window. Videos outside the
/// window (or with no resolvable date) are dropped from this aggregation
/// only; they still count everywhere else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyTotals {
    pub views: [u64; 6],
    pub likes: [u64; 6],
    pub videos: [u64; 6],
}

pub fn monthly_totals(videos: &[Video]) -> MonthlyTotals {
    use chrono::Datelike;

    let mut monthly = MonthlyTotals::default();
    for v in videos {
        let Some(date) = v.effective_date() else {
            continue;
        };
        let month = date.month0() as usize;
        if month < MONTH_LABELS.len() {
            monthly.views[month] += v.view_count;
            monthly.likes[month] += v.like_count;
            monthly.videos[month] += 1;
        }
    }
    monthly
}

/// Totals for the videos whose effective date falls in one calendar month.
pub fn month_totals(videos: &[Video], year: i32, month: u32) -> VideoTotals {
    use chrono::Datelike;

    let mut totals = VideoTotals::default();
    for v in videos {
        let Some(date) = v.effective_date() else {
            continue;
        };
        if date.year() == year && date.month() == month {
            totals.accumulate(v);
        }
    }
    totals
}

/// Period-over-period growth in percent. Zero when there is no previous
/// value to compare against, never Infinity or NaN.
pub fn growth_rate(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

/// The calendar month before (year, month), wrapping January back to the
/// previous December.
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Stacked time series: one dense row of per-day sums per group, aligned to
/// the sorted union of all days present in the filtered set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaySeries {
    /// Sorted ISO day keys shared by every group row.
    pub days: Vec<String>,
    /// (group label, per-day view sums), groups in first-seen order.
    pub groups: Vec<(String, Vec<u64>)>,
}

/// Group filtered videos by country or influencer and accumulate view sums
/// per (group, day). Videos with no resolvable date are dropped from this
/// aggregation. Missing days are filled with explicit zeros so every row
/// has the same length as the day axis.
pub fn views_by_group_day(
    videos: &[Video],
    lookup: &InfluencerLookup,
    group_by: GroupBy,
) -> DaySeries {
    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, HashMap<String, u64>> = HashMap::new();
    let mut days: Vec<String> = Vec::new();

    for v in videos {
        let Some(date) = v.effective_date() else {
            continue;
        };
        let day = date.format("%Y-%m-%d").to_string();

        let influencer = lookup.get(v.eldorado_username.as_str());
        let group = match group_by {
            GroupBy::Country => influencer
                .and_then(|i| i.country.as_deref())
                .map(capitalize)
                .unwrap_or_else(|| "Outros".to_string()),
            GroupBy::Influencer => influencer
                .map(|i| i.first_name.clone())
                .unwrap_or_else(|| v.eldorado_username.clone()),
        };

        if !sums.contains_key(&group) {
            order.push(group.clone());
        }
        *sums.entry(group).or_default().entry(day.clone()).or_insert(0) += v.view_count;

        if !days.contains(&day) {
            days.push(day);
        }
    }

    days.sort();

    let groups = order
        .into_iter()
        .map(|group| {
            let per_day = &sums[&group];
            let values = days
                .iter()
                .map(|d| per_day.get(d).copied().unwrap_or(0))
                .collect();
            (group, values)
        })
        .collect();

    DaySeries { days, groups }
}

/// Influencer count per owner, owners in first-seen order, labels
/// capitalized for display.
pub fn owner_distribution(influencers: &[Influencer]) -> Vec<(String, u64)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, u64> = HashMap::new();

    for i in influencers {
        let owner = capitalize(i.owner.as_str());
        if !counts.contains_key(&owner) {
            order.push(owner.clone());
        }
        *counts.entry(owner).or_insert(0) += 1;
    }

    order.into_iter().map(|o| (o.clone(), counts[&o])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::influencer_lookup;
    use crate::types::Owner;

    fn influencer(handle: &str, name: &str, country: Option<&str>, owner: Owner) -> Influencer {
        Influencer {
            eldorado_username: handle.to_string(),
            first_name: name.to_string(),
            phone: None,
            country: country.map(str::to_string),
            owner,
            tiktok_username: None,
            status: "active".to_string(),
            created_at: None,
        }
    }

    fn video(handle: &str, views: u64, likes: u64, published: Option<&str>) -> Video {
        Video {
            tiktok_video_id: format!("{handle}-{views}"),
            eldorado_username: handle.to_string(),
            tiktok_username: String::new(),
            description: String::new(),
            view_count: views,
            like_count: likes,
            comment_count: 0,
            share_count: 0,
            published_at: published.map(|p| format!("{p}T12:00:00Z").parse().unwrap()),
            created_at: None,
        }
    }

    #[test]
    fn totals_fold_all_metrics() {
        let videos = vec![
            video("a", 1_000_000, 10_000, Some("2024-01-05")),
            video("b", 500_000, 5_000, Some("2024-02-10")),
        ];
        let t = totals(&videos);
        assert_eq!(t.videos, 2);
        assert_eq!(t.views, 1_500_000);
        assert_eq!(t.likes, 15_000);
    }

    #[test]
    fn top_video_first_occurrence_wins_on_tie() {
        let videos = vec![
            video("a", 500, 0, None),
            video("b", 500, 0, None),
            video("c", 100, 0, None),
        ];
        let top = top_video(&videos).unwrap();
        assert_eq!(top.eldorado_username, "a");
    }

    #[test]
    fn ranking_is_stable_for_equal_views() {
        let influencers = vec![
            influencer("a", "Ana", None, Owner::Julia),
            influencer("b", "Bea", None, Owner::Julia),
        ];
        let videos = vec![video("a", 100, 0, None), video("b", 100, 0, None)];
        let ranked = rank_influencers(&influencers, &videos, Some(10));
        assert_eq!(ranked[0].eldorado_username, "a");
        assert_eq!(ranked[1].eldorado_username, "b");
    }

    #[test]
    fn ranking_sorts_descending_and_truncates() {
        let influencers = vec![
            influencer("a", "Ana", None, Owner::Julia),
            influencer("b", "Bea", None, Owner::Julia),
            influencer("c", "Cao", None, Owner::Julia),
        ];
        let videos = vec![
            video("a", 10, 0, None),
            video("b", 300, 0, None),
            video("c", 200, 0, None),
        ];
        let ranked = rank_influencers(&influencers, &videos, Some(2));
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].eldorado_username, "b");
        assert_eq!(ranked[1].eldorado_username, "c");
    }

    #[test]
    fn monthly_buckets_drop_out_of_window_records() {
        let videos = vec![
            video("a", 100, 10, Some("2024-01-05")),
            video("a", 200, 20, Some("2024-06-15")),
            video("a", 400, 40, Some("2024-09-01")),
            video("a", 800, 80, None),
        ];
        let monthly = monthly_totals(&videos);
        assert_eq!(monthly.views[0], 100);
        assert_eq!(monthly.views[5], 200);
        assert_eq!(monthly.views.iter().sum::<u64>(), 300);
        assert_eq!(monthly.videos.iter().sum::<u64>(), 2);
    }

    #[test]
    fn growth_from_zero_previous_is_zero() {
        assert_eq!(growth_rate(100.0, 0.0), 0.0);
        assert_eq!(growth_rate(150.0, 100.0), 50.0);
        assert_eq!(growth_rate(50.0, 100.0), -50.0);
    }

    #[test]
    fn previous_month_wraps_year_boundary() {
        assert_eq!(previous_month(2024, 1), (2023, 12));
        assert_eq!(previous_month(2024, 7), (2024, 6));
    }

    #[test]
    fn month_totals_pick_one_calendar_month() {
        let videos = vec![
            video("a", 100, 0, Some("2024-01-05")),
            video("a", 200, 0, Some("2024-01-20")),
            video("a", 400, 0, Some("2023-01-05")),
            video("a", 800, 0, None),
        ];
        let totals = month_totals(&videos, 2024, 1);
        assert_eq!(totals.videos, 2);
        assert_eq!(totals.views, 300);
    }

    #[test]
    fn group_day_series_are_dense() {
        let influencers = vec![
            influencer("a", "Ana", Some("brasil"), Owner::Julia),
            influencer("b", "Bea", Some("Peru"), Owner::Julia),
        ];
        let lookup = influencer_lookup(&influencers);
        let videos = vec![
            video("a", 100, 0, Some("2024-03-01")),
            video("b", 200, 0, Some("2024-03-02")),
        ];
        let series = views_by_group_day(&videos, &lookup, GroupBy::Country);
        assert_eq!(series.days, vec!["2024-03-01", "2024-03-02"]);
        assert_eq!(series.groups.len(), 2);
        assert_eq!(series.groups[0], ("Brasil".to_string(), vec![100, 0]));
        assert_eq!(series.groups[1], ("Peru".to_string(), vec![0, 200]));
    }

    #[test]
    fn unresolved_country_lands_in_catch_all_group() {
        let influencers = vec![influencer("a", "Ana", None, Owner::Julia)];
        let lookup = influencer_lookup(&influencers);
        let videos = vec![
            video("a", 100, 0, Some("2024-03-01")),
            video("ghost", 50, 0, Some("2024-03-01")),
        ];
        let series = views_by_group_day(&videos, &lookup, GroupBy::Country);
        assert_eq!(series.groups.len(), 1);
        assert_eq!(series.groups[0], ("Outros".to_string(), vec![150]));
    }

    #[test]
    fn influencer_grouping_falls_back_to_handle() {
        let influencers = vec![influencer("a", "Ana", None, Owner::Julia)];
        let lookup = influencer_lookup(&influencers);
        let videos = vec![
            video("a", 100, 0, Some("2024-03-01")),
            video("ghost", 50, 0, Some("2024-03-01")),
        ];
        let series = views_by_group_day(&videos, &lookup, GroupBy::Influencer);
        let labels: Vec<&str> = series.groups.iter().map(|(g, _)| g.as_str()).collect();
        assert_eq!(labels, vec!["Ana", "ghost"]);
    }

    #[test]
    fn owner_distribution_counts_in_first_seen_order() {
        let influencers = vec![
            influencer("a", "Ana", None, Owner::Julia),
            influencer("b", "Bea", None, Owner::Camilo),
            influencer("c", "Cao", None, Owner::Julia),
        ];
        let dist = owner_distribution(&influencers);
        assert_eq!(
            dist,
            vec![("Julia".to_string(), 2), ("Camilo".to_string(), 1)]
        );
    }
}
