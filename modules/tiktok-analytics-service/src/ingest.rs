//! CSV ingestion — record parsers and date normalization.
//!
//! Loads the two TikTok exports (Overview.csv, Content.csv) into typed
//! records. Parsing is best-effort: a malformed field defaults to zero or
//! empty, a malformed row affects only itself, and a missing file leaves
//! the collection empty. Failures are logged, never raised.

use chrono::NaiveDate;
use csv::StringRecord;
use std::path::Path;
use tiktok_analytics_types::{ContentRecord, OverviewRecord};

// =====================================================
// Date Normalization
// =====================================================

/// Parse a `dd/MM/yy` source date. Two-digit years are always `2000 + yy` —
/// a fixed rule, so this does not use chrono's `%y` (which windows 69–99
/// into the 1900s). Returns `None` on any unparseable input.
pub fn parse_source_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.trim().split('/');
    let day: u32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let year_raw: i32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let year = if year_raw < 100 { 2000 + year_raw } else { year_raw };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a canonical `yyyy-MM-dd` date.
pub fn parse_canonical(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// Render a date in the canonical `yyyy-MM-dd` form.
pub fn to_canonical(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// =====================================================
// Field Parsing
// =====================================================

/// Strip thousands separators and parse an integer count. `"1,234,567"`
/// becomes 1234567; anything unparseable degrades to 0.
fn parse_count(raw: &str) -> i64 {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return 0;
    }
    match cleaned.parse() {
        Ok(n) => n,
        Err(_) => {
            log::debug!("[TIKTOK_ANALYTICS] Unparseable count '{}', defaulting to 0", raw);
            0
        }
    }
}

/// Strip thousands separators and a trailing `%`, then parse a float.
/// `"12.3%"` becomes 12.3; anything unparseable degrades to 0.0.
fn parse_metric(raw: &str) -> f64 {
    let cleaned: String = raw
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() {
        return 0.0;
    }
    match cleaned.parse() {
        Ok(v) => v,
        Err(_) => {
            log::debug!("[TIKTOK_ANALYTICS] Unparseable metric '{}', defaulting to 0", raw);
            0.0
        }
    }
}

/// Look up a field by header name. Missing columns read as "".
fn field<'a>(headers: &StringRecord, record: &'a StringRecord, name: &str) -> &'a str {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .and_then(|idx| record.get(idx))
        .unwrap_or("")
}

// =====================================================
// Record Parsers
// =====================================================

/// Parse one Overview.csv row. The `Date` column is already canonical
/// `yyyy-MM-dd`; an unparseable date is kept as `None` and logged.
pub fn parse_overview_row(headers: &StringRecord, record: &StringRecord) -> OverviewRecord {
    let raw_date = field(headers, record, "Date");
    let date = parse_canonical(raw_date);
    if date.is_none() && !raw_date.trim().is_empty() {
        log::warn!("[TIKTOK_ANALYTICS] Unparseable overview date '{}'", raw_date);
    }

    OverviewRecord {
        date,
        video_views: parse_count(field(headers, record, "Video Views")),
        profile_views: parse_count(field(headers, record, "Profile Views")),
        likes: parse_count(field(headers, record, "Likes")),
        comments: parse_count(field(headers, record, "Comments")),
        shares: parse_count(field(headers, record, "Shares")),
    }
}

/// Parse one Content.csv row. `Post day` arrives as `dd/MM/yy` and is
/// normalized to a calendar date; tags are lowercased and trimmed so
/// downstream matching is case/whitespace-insensitive.
pub fn parse_content_row(headers: &StringRecord, record: &StringRecord) -> ContentRecord {
    let raw_day = field(headers, record, "Post day");
    let post_day = parse_source_date(raw_day);
    if post_day.is_none() && !raw_day.trim().is_empty() {
        log::warn!("[TIKTOK_ANALYTICS] Unparseable post day '{}'", raw_day);
    }

    ContentRecord {
        post_day,
        video_title: field(headers, record, "Video title").trim().to_string(),
        total_video_time: parse_metric(field(headers, record, "Total video time")),
        total_views: parse_count(field(headers, record, "Total views")),
        total_likes: parse_count(field(headers, record, "Total likes")),
        total_comments: parse_count(field(headers, record, "Total comments")),
        total_shares: parse_count(field(headers, record, "Total shares")),
        total_saves: parse_count(field(headers, record, "Total saves")),
        avg_watch_time: parse_metric(field(headers, record, "Avg watch time")),
        full_watch_percentage: parse_metric(field(headers, record, "Full watch percentage")),
        new_followers: parse_count(field(headers, record, "New followers")),
        tags1: field(headers, record, "Tags1").trim().to_lowercase(),
        tags2: field(headers, record, "Tags2").trim().to_lowercase(),
    }
}

// =====================================================
// File Loading
// =====================================================

/// Load Overview.csv. A missing or unreadable file yields an empty
/// collection; unreadable rows are skipped, everything else is kept.
pub fn load_overview_csv(path: &Path) -> Vec<OverviewRecord> {
    read_rows(path, "overview", parse_overview_row)
}

/// Load Content.csv with the same degradation policy.
pub fn load_content_csv(path: &Path) -> Vec<ContentRecord> {
    read_rows(path, "content", parse_content_row)
}

fn read_rows<T>(
    path: &Path,
    label: &str,
    parse: fn(&StringRecord, &StringRecord) -> T,
) -> Vec<T> {
    let mut reader = match csv::ReaderBuilder::new().flexible(true).from_path(path) {
        Ok(r) => r,
        Err(e) => {
            log::error!(
                "[TIKTOK_ANALYTICS] Failed to open {} csv {}: {}",
                label,
                path.display(),
                e
            );
            return Vec::new();
        }
    };

    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(e) => {
            log::error!("[TIKTOK_ANALYTICS] Failed to read {} headers: {}", label, e);
            return Vec::new();
        }
    };

    let mut out = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => out.push(parse(&headers, &record)),
            Err(e) => {
                log::debug!("[TIKTOK_ANALYTICS] Skipping unreadable {} row: {}", label, e);
            }
        }
    }

    log::info!(
        "[TIKTOK_ANALYTICS] Loaded {} {} records from {}",
        out.len(),
        label,
        path.display()
    );
    out
}
