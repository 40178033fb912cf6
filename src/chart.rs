use std::io::stdout;

use anyhow::Result;
use chrono::NaiveDate;
use crossterm::execute;
use ratatui::{
    backend::CrosstermBackend,
    style::{Color, Style},
    widgets::{Bar, BarChart, BarGroup, Block},
    Terminal, TerminalOptions, Viewport,
};

use crate::aggregate::{DaySeries, MonthlyTotals, MONTH_LABELS};
use crate::cli::GroupBy;
use crate::output::format_count;
use crate::types::InfluencerTotals;

/// RGB triple; mapped to a terminal color at render time and to an
/// `rgb(...)` string in JSON output.
pub type Rgb = (u8, u8, u8);

/// Cycling palette for index-keyed groups (influencers, owners).
pub const PALETTE: [Rgb; 8] = [
    (255, 99, 132),
    (54, 162, 235),
    (255, 205, 86),
    (75, 192, 192),
    (153, 102, 255),
    (255, 159, 64),
    (199, 199, 199),
    (83, 102, 255),
];

pub fn palette_color(index: usize) -> Rgb {
    PALETTE[index % PALETTE.len()]
}

/// Fixed per-country colors; unknown countries share the catch-all gray.
pub fn country_color(country: &str) -> Rgb {
    match country {
        "Argentina" => (75, 192, 192),
        "Bolivia" => (255, 159, 64),
        "Brasil" => (54, 162, 235),
        "Colombia" => (255, 205, 86),
        "Panama" => (153, 102, 255),
        "Peru" => (255, 99, 132),
        _ => (128, 128, 128),
    }
}

/// Label/series bundle directly consumable by the bar renderer and the
/// JSON output mode. Every dataset has the same length as `labels`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub color: Rgb,
    pub values: Vec<f64>,
}

/// Shorten an ISO day key for axis labels: "2024-03-01" → "01/03".
fn day_label(iso: &str) -> String {
    match iso.parse::<NaiveDate>() {
        Ok(d) => d.format("%d/%m").to_string(),
        Err(_) => iso.to_string(),
    }
}

/// Stacked views-per-day chart, one dataset per country or influencer.
pub fn build_views_by_day(series: &DaySeries, group_by: GroupBy) -> ChartData {
    let datasets = series
        .groups
        .iter()
        .enumerate()
        .map(|(i, (group, values))| Dataset {
            label: group.clone(),
            color: match group_by {
                GroupBy::Country => country_color(group),
                GroupBy::Influencer => palette_color(i),
            },
            values: values.iter().map(|&v| v as f64).collect(),
        })
        .collect();

    ChartData {
        title: match group_by {
            GroupBy::Country => "Views por dia — por país".to_string(),
            GroupBy::Influencer => "Views por dia — por influencer".to_string(),
        },
        labels: series.days.iter().map(|d| day_label(d)).collect(),
        datasets,
    }
}

/// Views (in millions) and likes (in thousands) over the fixed monthly
/// window, one decimal of precision each.
pub fn build_monthly(monthly: &MonthlyTotals) -> ChartData {
    let scale = |v: u64, div: f64| (v as f64 / div * 10.0).round() / 10.0;

    ChartData {
        title: "Performance por mês".to_string(),
        labels: MONTH_LABELS.iter().map(|m| m.to_string()).collect(),
        datasets: vec![
            Dataset {
                label: "Views (M)".to_string(),
                color: (75, 192, 192),
                values: monthly.views.iter().map(|&v| scale(v, 1_000_000.0)).collect(),
            },
            Dataset {
                label: "Likes (K)".to_string(),
                color: (255, 99, 132),
                values: monthly.likes.iter().map(|&v| scale(v, 1_000.0)).collect(),
            },
        ],
    }
}

/// Influencer count per campaign owner. Single dataset; the renderer
/// cycles the palette per bar.
pub fn build_owner_distribution(distribution: &[(String, u64)]) -> ChartData {
    ChartData {
        title: "Distribuição por responsável".to_string(),
        labels: distribution.iter().map(|(o, _)| o.clone()).collect(),
        datasets: vec![Dataset {
            label: "Influencers".to_string(),
            color: palette_color(0),
            values: distribution.iter().map(|&(_, n)| n as f64).collect(),
        }],
    }
}

/// Side-by-side view totals for the selected influencers, in selection
/// order.
pub fn build_comparison(totals: &[InfluencerTotals]) -> ChartData {
    ChartData {
        title: format!("Comparação de influencers ({})", totals.len()),
        labels: totals.iter().map(|t| t.first_name.clone()).collect(),
        datasets: vec![Dataset {
            label: "Views".to_string(),
            color: palette_color(0),
            values: totals.iter().map(|t| t.totals.views as f64).collect(),
        }],
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Bars scale to integer heights. When any value carries a fraction
/// (the M/K-scaled monthly series), everything in the chart is scaled by
/// 10 so one decimal of resolution survives; proportions are unchanged.
fn bar_scale(chart: &ChartData) -> f64 {
    let fractional = chart
        .datasets
        .iter()
        .flat_map(|d| d.values.iter())
        .any(|v| v.fract() != 0.0);
    if fractional {
        10.0
    } else {
        1.0
    }
}

fn bar_text(value: f64) -> String {
    if value.fract() == 0.0 {
        format_count(value as u64)
    } else {
        format!("{value:.1}")
    }
}

/// Draw the chart inline below the cursor, one bar group per label.
/// Single-dataset charts cycle the palette per bar; multi-dataset charts
/// keep one color per series.
pub fn render(chart: &ChartData) -> Result<()> {
    if chart.labels.is_empty() {
        eprintln!("No data points to display.");
        return Ok(());
    }

    let scale = bar_scale(chart);
    let per_bar_palette = chart.datasets.len() == 1;

    let mut widget = BarChart::default()
        .block(Block::bordered().title(chart.title.clone()))
        .bar_width(5)
        .bar_gap(1)
        .group_gap(2)
        .value_style(Style::default().fg(Color::White))
        .label_style(Style::default().fg(Color::DarkGray));

    for (i, label) in chart.labels.iter().enumerate() {
        let bars: Vec<Bar> = chart
            .datasets
            .iter()
            .map(|ds| {
                let value = ds.values[i];
                let color = if per_bar_palette {
                    palette_color(i)
                } else {
                    ds.color
                };
                Bar::default()
                    .value((value * scale).round() as u64)
                    .text_value(bar_text(value))
                    .style(Style::default().fg(to_color(color)))
            })
            .collect();
        widget = widget.data(BarGroup::default().label(label.clone().into()).bars(&bars));
    }

    let chart_height: u16 = 17; // 15 for bars + 2 for border

    let mut terminal = Terminal::with_options(
        CrosstermBackend::new(stdout()),
        TerminalOptions {
            viewport: Viewport::Inline(chart_height),
        },
    )?;

    terminal.draw(|frame| {
        frame.render_widget(widget, frame.area());
    })?;

    // Move cursor below the chart
    execute!(stdout(), crossterm::cursor::MoveDown(1))?;

    Ok(())
}
