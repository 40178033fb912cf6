use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};

use crate::api::TopVideo;
use crate::chart::ChartData;
use crate::filter::InfluencerLookup;
use crate::types::{Influencer, InfluencerTotals, Video, VideoTotals};

/// Abbreviate a count for display: 1_500_000 → "1.5M", 2_500 → "2.5K",
/// 999 → "999". Total over all inputs; zero falls through to the plain
/// branch.
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

pub fn format_rate(rate: f64) -> String {
    format!("{rate:.2}%")
}

/// Trim long free text (video descriptions) to one table cell.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

fn column_header(col: &str) -> &str {
    match col {
        "rank" => "#",
        "influencer" => "Influencer",
        "handle" => "Handle",
        "videos" => "Vídeos",
        "views" => "Views",
        "likes" => "Likes",
        "engagement" => "Engajamento",
        "country" => "País",
        "owner" => "Responsável",
        other => other,
    }
}

fn ranking_cell(col: &str, rank: &str, entry: &InfluencerTotals, lookup: &InfluencerLookup) -> Cell {
    let influencer = lookup.get(entry.eldorado_username.as_str());
    match col {
        "rank" => Cell::new(rank),
        "influencer" => Cell::new(&entry.first_name),
        "handle" => Cell::new(format!("@{}", entry.eldorado_username)),
        "videos" => Cell::new(entry.totals.videos),
        "views" => Cell::new(format_count(entry.totals.views)),
        "likes" => Cell::new(format_count(entry.totals.likes)),
        "engagement" => Cell::new(format_rate(entry.totals.engagement_rate())),
        "country" => Cell::new(
            influencer
                .and_then(|i| i.country.as_deref())
                .unwrap_or(""),
        ),
        "owner" => Cell::new(influencer.map(|i| i.owner.as_str()).unwrap_or("")),
        _ => Cell::new(""),
    }
}

pub fn print_ranking(ranked: &[InfluencerTotals], lookup: &InfluencerLookup, columns: &[String]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(columns.iter().map(|c| Cell::new(column_header(c))));

    let mut totals = VideoTotals::default();

    for (i, entry) in ranked.iter().enumerate() {
        let rank = (i + 1).to_string();
        table.add_row(columns.iter().map(|c| ranking_cell(c, &rank, entry, lookup)));
        totals.accumulate_from(&entry.totals);
    }

    let total_row = InfluencerTotals {
        eldorado_username: String::new(),
        first_name: String::new(),
        totals,
    };
    table.add_row(
        columns
            .iter()
            .map(|c| ranking_cell(c, "TOTAL", &total_row, lookup)),
    );

    println!("{table}");
}

pub fn print_influencers(influencers: &[Influencer]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header([
        "Influencer",
        "Handle",
        "País",
        "Responsável",
        "Telefone",
        "Status",
    ]);

    for i in influencers {
        table.add_row([
            Cell::new(&i.first_name),
            Cell::new(format!("@{}", i.eldorado_username)),
            Cell::new(i.country.as_deref().unwrap_or("")),
            Cell::new(i.owner.as_str()),
            Cell::new(i.phone.as_deref().unwrap_or("")),
            Cell::new(&i.status),
        ]);
    }

    println!("{table}");
}

pub fn print_videos(videos: &[Video]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header([
        "Handle",
        "Vídeo",
        "Descrição",
        "Views",
        "Likes",
        "Comentários",
        "Shares",
        "Publicado",
    ]);

    for v in videos {
        table.add_row([
            Cell::new(format!("@{}", v.eldorado_username)),
            Cell::new(&v.tiktok_video_id),
            Cell::new(truncate(&v.description, 40)),
            Cell::new(format_count(v.view_count)),
            Cell::new(format_count(v.like_count)),
            Cell::new(format_count(v.comment_count)),
            Cell::new(format_count(v.share_count)),
            Cell::new(
                v.effective_date()
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ),
        ]);
    }

    println!("{table}");
}

pub fn print_top_videos(videos: &[TopVideo], metric_header: &str) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header([
        Cell::new("#"),
        Cell::new("Handle"),
        Cell::new("Descrição"),
        Cell::new(metric_header),
        Cell::new("Publicado"),
    ]);

    for (i, v) in videos.iter().enumerate() {
        table.add_row([
            Cell::new(i + 1),
            Cell::new(format!("@{}", v.eldorado_username)),
            Cell::new(truncate(&v.description, 40)),
            Cell::new(format_count(v.metric_value)),
            Cell::new(
                v.published_at
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ),
        ]);
    }

    println!("{table}");
}

/// Two-column label/value table for stat summaries (dashboard, analytics).
pub fn print_stats(rows: &[(String, String)]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    for (label, value) in rows {
        table.add_row([Cell::new(label), Cell::new(value)]);
    }

    println!("{table}");
}

pub fn ranking_json(ranked: &[InfluencerTotals], lookup: &InfluencerLookup) -> serde_json::Value {
    let entries: Vec<serde_json::Value> = ranked
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let influencer = lookup.get(entry.eldorado_username.as_str());
            serde_json::json!({
                "rank": i + 1,
                "eldorado_username": entry.eldorado_username,
                "first_name": entry.first_name,
                "country": influencer.and_then(|inf| inf.country.as_deref()),
                "owner": influencer.map(|inf| inf.owner.as_str()),
                "videos": entry.totals.videos,
                "views": entry.totals.views,
                "likes": entry.totals.likes,
                "engagement_rate": entry.totals.engagement_rate(),
            })
        })
        .collect();
    serde_json::Value::Array(entries)
}

pub fn chart_json(chart: &ChartData) -> serde_json::Value {
    let datasets: Vec<serde_json::Value> = chart
        .datasets
        .iter()
        .map(|ds| {
            serde_json::json!({
                "label": ds.label,
                "color": format!("rgb({}, {}, {})", ds.color.0, ds.color.1, ds.color.2),
                "data": ds.values,
            })
        })
        .collect();

    serde_json::json!({
        "title": chart.title,
        "labels": chart.labels,
        "datasets": datasets,
    })
}

pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).expect("JSON serialization failed")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_formatting_branches() {
        assert_eq!(format_count(1_500_000), "1.5M");
        assert_eq!(format_count(1_000_000), "1.0M");
        assert_eq!(format_count(2_500), "2.5K");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(0), "0");
    }

    #[test]
    fn truncate_preserves_short_text() {
        assert_eq!(truncate("curto", 40), "curto");
        let long = "x".repeat(50);
        let cut = truncate(&long, 40);
        assert!(cut.chars().count() <= 40);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn chart_json_carries_rgb_colors() {
        let chart = ChartData {
            title: "t".to_string(),
            labels: vec!["a".to_string()],
            datasets: vec![crate::chart::Dataset {
                label: "s".to_string(),
                color: (54, 162, 235),
                values: vec![1.0],
            }],
        };
        let json = chart_json(&chart);
        assert_eq!(json["datasets"][0]["color"], "rgb(54, 162, 235)");
        assert_eq!(json["labels"][0], "a");
    }
}
