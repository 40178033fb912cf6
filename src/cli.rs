use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::types::{FilterState, Owner};

#[derive(Parser, Debug)]
#[command(
    name = "eldo",
    about = "Influencer and video performance tracker for El Dorado campaigns"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Start date filter (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub from: Option<NaiveDate>,

    /// End date filter (YYYY-MM-DD), inclusive
    #[arg(long, global = true)]
    pub to: Option<NaiveDate>,

    /// Filter by influencer handle (repeatable)
    #[arg(long = "influencer", global = true)]
    pub influencers: Vec<String>,

    /// Filter by country (repeatable, case-insensitive)
    #[arg(long = "country", global = true)]
    pub countries: Vec<String>,

    /// Output format: table (default), json
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Use cached API responses only, don't fetch
    #[arg(long, global = true)]
    pub offline: bool,

    /// Max records to request from listing endpoints
    #[arg(long, global = true)]
    pub limit: Option<u32>,

    /// Columns to display (comma-separated).
    /// Use +col to add, -col to remove from defaults, or plain names to replace.
    /// Available: rank,influencer,handle,videos,views,likes,engagement,country,owner
    #[arg(long, global = true, value_delimiter = ',', allow_hyphen_values = true)]
    pub columns: Option<Vec<String>>,

    /// Backend API base URL (overrides config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Suppress progress output (for scripting)
    #[arg(long, global = true)]
    pub cli: bool,
}

pub const DEFAULT_COLUMNS: &[&str] = &[
    "rank",
    "influencer",
    "handle",
    "videos",
    "views",
    "likes",
    "country",
];

/// Resolve `--columns` into a final list.
/// - No flag → defaults
/// - All prefixed with +/- → modify defaults (e.g. `+owner,-rank`)
/// - Plain names → explicit replacement (e.g. `handle,views,likes`)
pub fn resolve_columns(raw: Option<Vec<String>>) -> Vec<String> {
    let Some(raw) = raw else {
        return DEFAULT_COLUMNS.iter().map(|s| s.to_string()).collect();
    };

    let is_modifier = raw.iter().all(|c| c.starts_with('+') || c.starts_with('-'));

    if !is_modifier {
        return raw;
    }

    let mut cols: Vec<String> = DEFAULT_COLUMNS.iter().map(|s| s.to_string()).collect();
    for entry in &raw {
        if let Some(name) = entry.strip_prefix('+') {
            if !cols.iter().any(|c| c == name) {
                cols.push(name.to_string());
            }
        } else if let Some(name) = entry.strip_prefix('-') {
            cols.retain(|c| c != name);
        }
    }
    cols
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Backend dashboard counters plus month-over-month growth (default)
    Dashboard,
    /// Filtered summary stats and influencer ranking
    Analytics {
        /// Show every influencer instead of the top 10
        #[arg(long)]
        all: bool,
    },
    /// Render a chart in the terminal
    Chart {
        /// Which chart to draw
        #[arg(default_value = "views")]
        view: ChartView,
        /// Grouping for the views-by-day chart
        #[arg(long, default_value = "country")]
        group_by: GroupBy,
    },
    /// Manage influencer records
    Influencers {
        #[command(subcommand)]
        action: InfluencerAction,
    },
    /// List videos matching the current filters
    Videos,
    /// Top videos by metric, ranked by the backend
    Top {
        /// Metric to rank by
        #[arg(default_value = "views")]
        metric: TopMetric,
        /// Number of videos to show (1-100)
        #[arg(long, default_value = "10")]
        count: u32,
    },
    /// Pull fresh video metrics from TikTok
    Sync {
        /// Influencer handle to sync
        handle: Option<String>,
        /// Sync every influencer
        #[arg(long)]
        all: bool,
    },
    /// Transcribe a TikTok video by URL
    Transcribe {
        /// Full TikTok video URL
        url: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum InfluencerAction {
    /// List influencers matching the current filters
    List,
    /// Register a new influencer
    Add {
        /// Unique El Dorado handle (immutable after creation)
        handle: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Campaign owner
        #[arg(long)]
        owner: Owner,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// TikTok username, if different from the handle
        #[arg(long)]
        tiktok: Option<String>,
    },
    /// Update an influencer in place (the handle cannot change)
    Update {
        handle: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        owner: Option<Owner>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Delete an influencer by handle
    Remove { handle: String },
    /// Resolve and store the TikTok id for a handle
    SyncId { handle: String },
    /// Lifetime stats for one influencer, computed by the backend
    Stats { handle: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq)]
pub enum ChartView {
    /// Stacked views per day, grouped by country or influencer
    Views,
    /// Views and likes per month, first half of the year
    Monthly,
    /// Influencer count per campaign owner
    Owners,
    /// Side-by-side totals for the selected influencers
    Compare,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq)]
pub enum GroupBy {
    Country,
    Influencer,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq)]
pub enum TopMetric {
    Views,
    Likes,
    Engagement,
}

impl TopMetric {
    /// Path segment of the backend ranking endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            TopMetric::Views => "views",
            TopMetric::Likes => "likes",
            TopMetric::Engagement => "engagement",
        }
    }
}

#[derive(ValueEnum, Debug, Clone, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl Cli {
    pub fn effective_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Dashboard)
    }

    /// Collect the global filter flags into one value object.
    pub fn filter_state(&self) -> FilterState {
        FilterState {
            influencers: self.influencers.clone(),
            countries: self.countries.clone(),
            from: self.from,
            to: self.to,
        }
    }
}
