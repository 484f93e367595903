//! Dashboard HTML page handler.
//!
//! Serves a self-contained HTML page with inline CSS/JS showing the current
//! filter window, tag-group aggregates, content performance, and the daily
//! overview series. Chart-heavy clients use the RPC API instead; this page
//! is the built-in read-only view.

use crate::analytics;
use crate::routes::AppState;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use std::sync::Arc;
use tiktok_analytics_types::{ContentRecord, MetricVisibility, OverviewRecord};

/// How many rows of each table the page shows.
const MAX_TABLE_ROWS: usize = 25;

/// The overview table's metric columns, honoring the session visibility
/// toggles. The Date column is always present.
fn overview_columns(
    visibility: &MetricVisibility,
) -> Vec<(&'static str, fn(&OverviewRecord) -> i64)> {
    let mut columns: Vec<(&'static str, fn(&OverviewRecord) -> i64)> = Vec::new();
    if visibility.video_views {
        columns.push(("Video Views", |r| r.video_views));
    }
    if visibility.profile_views {
        columns.push(("Profile Views", |r| r.profile_views));
    }
    if visibility.likes {
        columns.push(("Likes", |r| r.likes));
    }
    if visibility.comments {
        columns.push(("Comments", |r| r.comments));
    }
    if visibility.shares {
        columns.push(("Shares", |r| r.shares));
    }
    columns
}

pub async fn dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let filters = state.store.filter_state();
    let overview_all = state.store.overview_snapshot();
    let content_all = state.store.content_snapshot();
    let combinations = state.store.combinations();

    let overview = analytics::filter_overview(&overview_all, &filters.date_range);
    let content =
        analytics::filter_content(&content_all, &filters.date_range, &filters.views_range);
    let aggregates = analytics::group_aggregates(&content, &combinations);

    let uptime = state.start_time.elapsed().as_secs();

    let stats_html = format!(
        r#"<div class="stats">
            <div class="stat"><span class="val">{}</span><span class="lbl">Videos</span></div>
            <div class="stat"><span class="val">{}</span><span class="lbl">Videos in Range</span></div>
            <div class="stat"><span class="val">{}</span><span class="lbl">Overview Days</span></div>
            <div class="stat"><span class="val">{}</span><span class="lbl">Days in Range</span></div>
            <div class="stat"><span class="val">{}</span><span class="lbl">Combinations</span></div>
        </div>"#,
        content_all.len(),
        content.len(),
        overview_all.len(),
        overview.len(),
        combinations.len(),
    );

    let mut aggregate_rows = String::new();
    for agg in &aggregates {
        aggregate_rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.2}%</td><td>{:.2}%</td><td>{}</td></tr>\n",
            agg.combination_id,
            escape_html(&agg.combination_label),
            agg.video_count,
            agg.average_watch_time_percentage,
            agg.average_engagement_percentage,
            agg.total_new_followers,
        ));
    }
    if aggregate_rows.is_empty() {
        aggregate_rows = "<tr><td colspan=\"6\">No active combinations.</td></tr>".to_string();
    }

    // Top videos by views within the current filter window.
    let mut top_content: Vec<&ContentRecord> = content.iter().collect();
    top_content.sort_by(|a, b| b.total_views.cmp(&a.total_views));

    let mut content_rows = String::new();
    for record in top_content.iter().take(MAX_TABLE_ROWS) {
        let metrics = analytics::content_metrics(record);
        let day = record
            .post_day
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let tags = [record.tags1.as_str(), record.tags2.as_str()]
            .iter()
            .filter(|t| !t.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        content_rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.2}%</td><td>{:.2}%</td><td>{}</td><td>{}</td></tr>\n",
            day,
            escape_html(&truncate(&record.video_title, 60)),
            record.total_views,
            metrics.engagement_percentage,
            metrics.watch_time_percentage,
            record.new_followers,
            escape_html(&tags),
        ));
    }
    if content_rows.is_empty() {
        content_rows = "<tr><td colspan=\"7\">No videos in the current range.</td></tr>".to_string();
    }

    let visibility = state.store.metric_visibility();
    let columns = overview_columns(&visibility);

    let mut overview_header = "<th>Date</th>".to_string();
    for (name, _) in &columns {
        overview_header.push_str(&format!("<th>{}</th>", name));
    }

    let mut overview_rows = String::new();
    for record in overview.iter().rev().take(MAX_TABLE_ROWS) {
        let day = record
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let mut cells = format!("<td>{}</td>", day);
        for (_, value) in &columns {
            cells.push_str(&format!("<td>{}</td>", value(record)));
        }
        overview_rows.push_str(&format!("<tr>{}</tr>\n", cells));
    }
    if overview_rows.is_empty() {
        overview_rows = format!(
            "<tr><td colspan=\"{}\">No overview data in the current range.</td></tr>",
            columns.len() + 1
        );
    }

    let uptime_str = format_uptime(uptime);

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>TikTok Analytics Dashboard</title>
<style>
  * {{ margin: 0; padding: 0; box-sizing: border-box; }}
  body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #0f1117; color: #e0e0e0; padding: 20px; }}
  h1 {{ color: #58a6ff; margin-bottom: 8px; }}
  .meta {{ color: #8b949e; font-size: 0.85em; margin-bottom: 20px; }}
  .stats {{ display: flex; gap: 16px; margin-bottom: 24px; flex-wrap: wrap; }}
  .stat {{ background: #161b22; border: 1px solid #30363d; border-radius: 8px; padding: 16px 24px; text-align: center; min-width: 120px; }}
  .stat .val {{ display: block; font-size: 2em; font-weight: bold; color: #58a6ff; }}
  .stat .lbl {{ display: block; font-size: 0.85em; color: #8b949e; margin-top: 4px; }}
  table {{ width: 100%; border-collapse: collapse; margin-bottom: 24px; }}
  th {{ background: #161b22; color: #8b949e; text-align: left; padding: 8px 12px; font-size: 0.85em; text-transform: uppercase; border-bottom: 1px solid #30363d; }}
  td {{ padding: 8px 12px; border-bottom: 1px solid #21262d; font-size: 0.9em; }}
  tr:hover {{ background: #161b22; }}
  h2 {{ color: #c9d1d9; margin-bottom: 12px; font-size: 1.1em; }}
  .section {{ margin-bottom: 28px; }}
</style>
</head>
<body>
  <h1>TikTok Analytics</h1>
  <p class="meta">Uptime: {uptime_str} &middot; Dates: {date_start} to {date_end} &middot; Views: {views_min} to {views_max}</p>

  {stats_html}

  <div class="section">
    <h2>Tag Combination Aggregates</h2>
    <table>
      <thead><tr><th>ID</th><th>Combination</th><th>Videos</th><th>Avg Watch Time</th><th>Avg Engagement</th><th>New Followers</th></tr></thead>
      <tbody>{aggregate_rows}</tbody>
    </table>
  </div>

  <div class="section">
    <h2>Content Performance (top {max_rows} by views)</h2>
    <table>
      <thead><tr><th>Post Day</th><th>Title</th><th>Views</th><th>Engagement</th><th>Watch Time</th><th>New Followers</th><th>Tags</th></tr></thead>
      <tbody>{content_rows}</tbody>
    </table>
  </div>

  <div class="section">
    <h2>Daily Overview (most recent first)</h2>
    <table>
      <thead><tr>{overview_header}</tr></thead>
      <tbody>{overview_rows}</tbody>
    </table>
  </div>

  <script>
    // Auto-refresh every 30 seconds
    setTimeout(() => location.reload(), 30000);
  </script>
</body>
</html>"#,
        uptime_str = uptime_str,
        date_start = filters.date_range.start,
        date_end = filters.date_range.end,
        views_min = filters.views_range.min,
        views_max = filters.views_range.max,
        stats_html = stats_html,
        aggregate_rows = aggregate_rows,
        content_rows = content_rows,
        overview_header = overview_header,
        overview_rows = overview_rows,
        max_rows = MAX_TABLE_ROWS,
    );

    ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let short: String = text.chars().take(max_chars).collect();
        format!("{}...", short)
    } else {
        text.to_string()
    }
}

fn format_uptime(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_columns_honor_visibility() {
        let mut visibility = MetricVisibility::default();
        assert_eq!(overview_columns(&visibility).len(), 5);

        visibility.likes = false;
        visibility.shares = false;
        let names: Vec<&str> = overview_columns(&visibility)
            .iter()
            .map(|(name, _)| *name)
            .collect();
        assert_eq!(names, vec!["Video Views", "Profile Views", "Comments"]);
    }

    #[test]
    fn test_overview_column_accessors() {
        let record = OverviewRecord {
            date: None,
            video_views: 10,
            profile_views: 20,
            likes: 30,
            comments: 40,
            shares: 50,
        };
        let columns = overview_columns(&MetricVisibility::default());
        let values: Vec<i64> = columns.iter().map(|(_, value)| value(&record)).collect();
        assert_eq!(values, vec![10, 20, 30, 40, 50]);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b & c > d"), "a &lt; b &amp; c &gt; d");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcde...");
        // Multi-byte characters must not be split.
        assert_eq!(truncate("víd", 2), "ví...");
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(5), "5s");
        assert_eq!(format_uptime(65), "1m 5s");
        assert_eq!(format_uptime(3665), "1h 1m 5s");
    }
}
