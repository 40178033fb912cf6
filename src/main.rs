mod aggregate;
mod api;
mod chart;
mod cli;
mod config;
mod filter;
mod output;
mod transcribe;
mod types;

use anyhow::{bail, Result};
use chrono::Datelike;
use clap::Parser;

use api::ApiClient;
use cli::{ChartView, Cli, Command, GroupBy, InfluencerAction, OutputFormat, TopMetric};
use types::{FilterState, Influencer, Video, COUNTRIES};

const DEFAULT_INFLUENCER_LIMIT: u32 = 1000;
const DEFAULT_VIDEO_LIMIT: u32 = 10_000;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config();

    let api_url = cli
        .api_url
        .clone()
        .or(config.api_url)
        .unwrap_or_else(|| api::DEFAULT_API_URL.to_string());
    let client = ApiClient::new(&api_url, cli.offline);

    let influencer_limit = cli
        .limit
        .or(config.influencer_limit)
        .unwrap_or(DEFAULT_INFLUENCER_LIMIT);
    let video_limit = cli.limit.or(config.video_limit).unwrap_or(DEFAULT_VIDEO_LIMIT);

    match cli.effective_command() {
        Command::Dashboard => run_dashboard(&cli, &client, video_limit),
        Command::Analytics { all } => {
            run_analytics(&cli, &client, influencer_limit, video_limit, all)
        }
        Command::Chart { view, group_by } => {
            run_chart(&cli, &client, influencer_limit, video_limit, view, group_by)
        }
        Command::Influencers { action } => {
            run_influencers(&cli, &client, influencer_limit, video_limit, &action)
        }
        Command::Videos => run_videos(&cli, &client, influencer_limit, video_limit),
        Command::Top { metric, count } => run_top(&cli, &client, metric, count),
        Command::Sync { handle, all } => run_sync(&client, handle.as_deref(), all),
        Command::Transcribe { url } => run_transcribe(&cli, &client, &url),
    }
}

/// Fetch both collections and narrow them to the current filter state.
/// Filtering is recomputed in full on every invocation; nothing is cached
/// across runs beyond the raw API responses.
fn load_filtered(
    cli: &Cli,
    client: &ApiClient,
    influencer_limit: u32,
    video_limit: u32,
) -> Result<(Vec<Influencer>, Vec<Video>, Vec<Influencer>, Vec<Video>, FilterState)> {
    let influencers = client.list_influencers(influencer_limit)?;
    let videos = client.list_videos(video_limit)?;

    let filters = cli.filter_state();
    let lookup = filter::influencer_lookup(&influencers);
    let filtered_videos = filter::filter_videos(&videos, &filters, &lookup);
    let filtered_influencers = filter::filter_influencers(&influencers, &filters, &filtered_videos);

    Ok((influencers, videos, filtered_influencers, filtered_videos, filters))
}

fn run_dashboard(cli: &Cli, client: &ApiClient, video_limit: u32) -> Result<()> {
    let stats = client.dashboard_stats()?;
    let videos = client.list_videos(video_limit)?;

    let today = chrono::Local::now().date_naive();
    let current = aggregate::month_totals(&videos, today.year(), today.month());
    let (prev_year, prev_month) = aggregate::previous_month(today.year(), today.month());
    let previous = aggregate::month_totals(&videos, prev_year, prev_month);

    let video_growth = aggregate::growth_rate(current.videos as f64, previous.videos as f64);
    let view_growth = aggregate::growth_rate(current.views as f64, previous.views as f64);

    if cli.format == OutputFormat::Json {
        let mut json = serde_json::to_value(&stats)?;
        json["video_growth_rate"] = serde_json::json!(video_growth);
        json["view_growth_rate"] = serde_json::json!(view_growth);
        output::print_json(&json);
        return Ok(());
    }

    let rows = vec![
        (
            "Total Influencers".to_string(),
            stats.total_influencers.to_string(),
        ),
        ("Total Vídeos".to_string(), stats.total_videos.to_string()),
        (
            "Total Views".to_string(),
            output::format_count(stats.total_views),
        ),
        (
            "Total Likes".to_string(),
            output::format_count(stats.total_likes),
        ),
        (
            "Engagement Rate".to_string(),
            output::format_rate(stats.avg_engagement_rate),
        ),
        (
            "Vídeos este mês".to_string(),
            format!("{} ({:+.1}% vs mês anterior)", stats.videos_this_month, video_growth),
        ),
        (
            "Views este mês".to_string(),
            format!(
                "{} ({:+.1}% vs mês anterior)",
                output::format_count(current.views),
                view_growth
            ),
        ),
        (
            "Influencers ativos este mês".to_string(),
            stats.active_influencers_this_month.to_string(),
        ),
    ];
    output::print_stats(&rows);

    Ok(())
}

fn run_analytics(
    cli: &Cli,
    client: &ApiClient,
    influencer_limit: u32,
    video_limit: u32,
    all: bool,
) -> Result<()> {
    let (influencers, _videos, filtered_influencers, filtered_videos, filters) =
        load_filtered(cli, client, influencer_limit, video_limit)?;

    if !cli.cli {
        eprintln!(
            "Found {} influencers and {} videos{}.",
            filtered_influencers.len(),
            filtered_videos.len(),
            if filters.is_empty() { "" } else { " (filtered)" }
        );
    }

    let totals = aggregate::totals(&filtered_videos);
    let limit = if all { None } else { Some(10) };
    let ranked = aggregate::rank_influencers(&filtered_influencers, &filtered_videos, limit);
    let lookup = filter::influencer_lookup(&influencers);

    if cli.format == OutputFormat::Json {
        let top = aggregate::top_video(&filtered_videos);
        output::print_json(&serde_json::json!({
            "total_influencers": filtered_influencers.len(),
            "total_videos": totals.videos,
            "total_views": totals.views,
            "total_likes": totals.likes,
            "avg_engagement_rate": totals.engagement_rate(),
            "top_video": top.map(|v| serde_json::json!({
                "tiktok_video_id": v.tiktok_video_id,
                "eldorado_username": v.eldorado_username,
                "view_count": v.view_count,
                "description": v.description,
            })),
            "ranking": output::ranking_json(&ranked, &lookup),
        }));
        return Ok(());
    }

    let mut rows = vec![
        (
            "Influencers".to_string(),
            filtered_influencers.len().to_string(),
        ),
        ("Total Vídeos".to_string(), totals.videos.to_string()),
        ("Total Views".to_string(), output::format_count(totals.views)),
        ("Total Likes".to_string(), output::format_count(totals.likes)),
        (
            "Engagement Rate".to_string(),
            output::format_rate(totals.engagement_rate()),
        ),
    ];
    if let Some(top) = aggregate::top_video(&filtered_videos) {
        rows.push((
            "Top Vídeo".to_string(),
            format!(
                "@{} — {} views",
                top.eldorado_username,
                output::format_count(top.view_count)
            ),
        ));
    }
    output::print_stats(&rows);

    let columns = cli::resolve_columns(cli.columns.clone());
    output::print_ranking(&ranked, &lookup, &columns);

    Ok(())
}

fn run_chart(
    cli: &Cli,
    client: &ApiClient,
    influencer_limit: u32,
    video_limit: u32,
    view: ChartView,
    group_by: GroupBy,
) -> Result<()> {
    let (influencers, _videos, filtered_influencers, filtered_videos, filters) =
        load_filtered(cli, client, influencer_limit, video_limit)?;
    let lookup = filter::influencer_lookup(&influencers);

    let chart_data = match view {
        ChartView::Views => {
            let series = aggregate::views_by_group_day(&filtered_videos, &lookup, group_by);
            chart::build_views_by_day(&series, group_by)
        }
        ChartView::Monthly => chart::build_monthly(&aggregate::monthly_totals(&filtered_videos)),
        ChartView::Owners => {
            chart::build_owner_distribution(&aggregate::owner_distribution(&filtered_influencers))
        }
        ChartView::Compare => {
            if filters.influencers.len() < 2 {
                bail!("Select at least two influencers to compare (repeat --influencer)");
            }
            // Selection order, not ranking order
            let selected: Vec<Influencer> = filters
                .influencers
                .iter()
                .filter_map(|handle| {
                    let found = influencers
                        .iter()
                        .find(|i| i.eldorado_username == *handle)
                        .cloned();
                    if found.is_none() {
                        eprintln!("Warning: unknown influencer '@{handle}' skipped");
                    }
                    found
                })
                .collect();
            let totals = aggregate::influencer_totals(&selected, &filtered_videos);
            chart::build_comparison(&totals)
        }
    };

    if cli.format == OutputFormat::Json {
        output::print_json(&output::chart_json(&chart_data));
        return Ok(());
    }

    chart::render(&chart_data)
}

/// Field-level validation for influencer create/update input. Returns every
/// problem found so the user can fix them in one pass; nothing is sent to
/// the backend unless this comes back empty.
fn validate_influencer_fields(
    handle: Option<&str>,
    name: Option<&str>,
    country: Option<&str>,
    phone: Option<&str>,
) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(handle) = handle {
        if handle.trim().is_empty() {
            errors.push("handle: must not be empty".to_string());
        } else if handle.contains(char::is_whitespace) || handle.starts_with('@') {
            errors.push("handle: no spaces or leading '@'".to_string());
        }
    }

    if let Some(name) = name {
        if name.trim().is_empty() {
            errors.push("name: must not be empty".to_string());
        }
    }

    if let Some(country) = country {
        if !COUNTRIES.iter().any(|c| c.eq_ignore_ascii_case(country)) {
            errors.push(format!(
                "country: '{}' is not one of {}",
                country,
                COUNTRIES.join(", ")
            ));
        }
    }

    if let Some(phone) = phone {
        let digits = phone.chars().filter(char::is_ascii_digit).count();
        let shape_ok = phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'));
        if digits < 7 || !shape_ok {
            errors.push("phone: expected at least 7 digits (with optional + - ( ) separators)".to_string());
        }
    }

    errors
}

fn report_validation_errors(errors: &[String]) -> Result<()> {
    for error in errors {
        eprintln!("  - {error}");
    }
    bail!("Validation failed; nothing was saved")
}

fn run_influencers(
    cli: &Cli,
    client: &ApiClient,
    influencer_limit: u32,
    video_limit: u32,
    action: &InfluencerAction,
) -> Result<()> {
    match action {
        InfluencerAction::List => {
            let (_influencers, _videos, filtered_influencers, _filtered_videos, _filters) =
                load_filtered(cli, client, influencer_limit, video_limit)?;
            if cli.format == OutputFormat::Json {
                output::print_json(&serde_json::to_value(&filtered_influencers)?);
            } else {
                output::print_influencers(&filtered_influencers);
            }
            Ok(())
        }
        InfluencerAction::Add {
            handle,
            name,
            owner,
            country,
            phone,
            tiktok,
        } => {
            let errors = validate_influencer_fields(
                Some(handle),
                Some(name),
                country.as_deref(),
                phone.as_deref(),
            );
            if !errors.is_empty() {
                return report_validation_errors(&errors);
            }

            let created = client.create_influencer(&api::influencers::NewInfluencer {
                eldorado_username: handle.clone(),
                first_name: name.clone(),
                owner: *owner,
                country: country.clone(),
                phone: phone.clone(),
                tiktok_username: tiktok.clone(),
            })?;
            println!("Created @{}", created.eldorado_username);
            Ok(())
        }
        InfluencerAction::Update {
            handle,
            name,
            owner,
            country,
            phone,
        } => {
            if name.is_none() && owner.is_none() && country.is_none() && phone.is_none() {
                bail!("Nothing to update; pass at least one of --name, --owner, --country, --phone");
            }
            let errors =
                validate_influencer_fields(None, name.as_deref(), country.as_deref(), phone.as_deref());
            if !errors.is_empty() {
                return report_validation_errors(&errors);
            }

            let updated = client.update_influencer(
                handle,
                &api::influencers::InfluencerUpdate {
                    first_name: name.clone(),
                    owner: *owner,
                    country: country.clone(),
                    phone: phone.clone(),
                },
            )?;
            println!("Updated @{}", updated.eldorado_username);
            Ok(())
        }
        InfluencerAction::Remove { handle } => {
            client.delete_influencer(handle)?;
            println!("Deleted @{handle}");
            Ok(())
        }
        InfluencerAction::SyncId { handle } => {
            let message = client.sync_tiktok_id(handle)?;
            println!("{message}");
            Ok(())
        }
        InfluencerAction::Stats { handle } => {
            let stats = client.influencer_stats(handle)?;
            if cli.format == OutputFormat::Json {
                output::print_json(&serde_json::to_value(&stats)?);
                return Ok(());
            }
            let rows = vec![
                ("Handle".to_string(), format!("@{}", stats.eldorado_username)),
                ("Total Vídeos".to_string(), stats.total_videos.to_string()),
                ("Média de Views".to_string(), format!("{:.0}", stats.avg_views)),
                ("Média de Likes".to_string(), format!("{:.0}", stats.avg_likes)),
                (
                    "Melhor Performance".to_string(),
                    output::format_count(stats.best_performance),
                ),
                (
                    "Último Vídeo".to_string(),
                    stats
                        .last_video_date
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_default(),
                ),
            ];
            output::print_stats(&rows);
            Ok(())
        }
    }
}

fn run_videos(cli: &Cli, client: &ApiClient, influencer_limit: u32, video_limit: u32) -> Result<()> {
    let (_influencers, _videos, _filtered_influencers, filtered_videos, _filters) =
        load_filtered(cli, client, influencer_limit, video_limit)?;

    if cli.format == OutputFormat::Json {
        output::print_json(&serde_json::to_value(&filtered_videos)?);
    } else {
        output::print_videos(&filtered_videos);
    }
    Ok(())
}

fn run_top(cli: &Cli, client: &ApiClient, metric: TopMetric, count: u32) -> Result<()> {
    let videos = client.top_videos(metric.as_str(), count)?;

    if cli.format == OutputFormat::Json {
        let entries: Vec<serde_json::Value> = videos
            .iter()
            .map(|v| {
                serde_json::json!({
                    "eldorado_username": v.eldorado_username,
                    "tiktok_username": v.tiktok_username,
                    "tiktok_video_id": v.tiktok_video_id,
                    "description": v.description,
                    "metric_value": v.metric_value,
                    "published_at": v.published_at,
                    "url": v.tiktok_url(),
                })
            })
            .collect();
        output::print_json(&serde_json::Value::Array(entries));
        return Ok(());
    }

    let header = match metric {
        TopMetric::Views => "Views",
        TopMetric::Likes => "Likes",
        TopMetric::Engagement => "Engajamento",
    };
    output::print_top_videos(&videos, header);
    Ok(())
}

fn run_sync(client: &ApiClient, handle: Option<&str>, all: bool) -> Result<()> {
    let summaries = match (handle, all) {
        (Some(handle), false) => vec![client.sync_influencer_videos(handle)?],
        (None, true) => client.sync_all_videos()?,
        (Some(_), true) => bail!("Pass either a handle or --all, not both"),
        (None, false) => bail!("Pass an influencer handle, or --all to sync everyone"),
    };

    for summary in &summaries {
        let mark = if summary.success { "✓" } else { "✗" };
        println!(
            "{mark} {} — processed {}, new {}, updated {}",
            summary.message, summary.videos_processed, summary.new_videos, summary.updated_videos
        );
        for error in &summary.errors {
            eprintln!("    {error}");
        }
    }

    let failed = summaries.iter().filter(|s| !s.success).count();
    if failed > 0 {
        bail!("{failed} sync(s) failed");
    }
    Ok(())
}

fn run_transcribe(cli: &Cli, client: &ApiClient, url: &str) -> Result<()> {
    let result = transcribe::run(client, url, cli.cli)?;

    if cli.format == OutputFormat::Json {
        output::print_json(&serde_json::to_value(&result)?);
        return Ok(());
    }

    if !result.success {
        bail!("{}", result.message);
    }

    println!("{}", result.message);
    if let Some(handle) = &result.eldorado_username {
        println!("Influencer: @{handle}");
    }
    if let Some(video) = &result.video_info {
        println!(
            "Vídeo: {} — {} views, {} likes",
            video.tiktok_video_id,
            output::format_count(video.view_count),
            output::format_count(video.like_count)
        );
    }
    if let Some(transcription) = &result.transcription {
        println!("\n{transcription}");
    }

    Ok(())
}
