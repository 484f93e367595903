//! Shared types for the TikTok analytics service and its RPC clients.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =====================================================
// Domain Types
// =====================================================

/// One day of profile-level metrics from the Overview export.
///
/// `date` is `None` when the source text could not be parsed; such records
/// are kept in the collection but excluded by date-range filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewRecord {
    pub date: Option<NaiveDate>,
    pub video_views: i64,
    pub profile_views: i64,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
}

/// One video from the Content export. Immutable after load.
///
/// Tag fields are lowercased and trimmed at ingest; an empty string means
/// the slot was blank in the export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    pub post_day: Option<NaiveDate>,
    pub video_title: String,
    /// Video duration in seconds.
    pub total_video_time: f64,
    pub total_views: i64,
    pub total_likes: i64,
    pub total_comments: i64,
    pub total_shares: i64,
    pub total_saves: i64,
    /// Average watch time in seconds.
    pub avg_watch_time: f64,
    /// 0–100, already stripped of the trailing `%`.
    pub full_watch_percentage: f64,
    pub new_followers: i64,
    pub tags1: String,
    pub tags2: String,
}

/// A user-defined conjunctive (AND) query over a video's two tag slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagCombination {
    pub id: i64,
    pub tags: Vec<String>,
    /// Human-readable join of the tags, e.g. "marvel + dc".
    pub label: String,
}

/// Per-record metrics derived at query time, never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContentMetrics {
    pub engagement_percentage: f64,
    pub watch_time_percentage: f64,
}

/// A content record paired with its derived metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecordWithMetrics {
    #[serde(flatten)]
    pub record: ContentRecord,
    pub metrics: ContentMetrics,
}

/// Aggregates for one tag combination over the filtered content set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupAggregate {
    pub combination_id: i64,
    pub combination_label: String,
    pub average_watch_time_percentage: f64,
    pub total_new_followers: i64,
    pub average_engagement_percentage: f64,
    pub video_count: i64,
}

// =====================================================
// Filter / Session State Types
// =====================================================

/// Inclusive calendar-date window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Inclusive view-count window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewsRange {
    pub min: i64,
    pub max: i64,
}

/// The active filter inputs driving every derived view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub date_range: DateRange,
    pub views_range: ViewsRange,
}

/// Which overview series the trend chart should draw.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MetricVisibility {
    pub video_views: bool,
    pub profile_views: bool,
    pub likes: bool,
    pub comments: bool,
    pub shares: bool,
}

impl Default for MetricVisibility {
    fn default() -> Self {
        Self {
            video_views: true,
            profile_views: true,
            likes: true,
            comments: true,
            shares: true,
        }
    }
}

// =====================================================
// RPC Request Types
// =====================================================

/// Partial filter update — omitted ranges keep their current value.
#[derive(Debug, Serialize, Deserialize)]
pub struct SetFiltersRequest {
    pub date_range: Option<DateRange>,
    pub views_range: Option<ViewsRange>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddCombinationRequest {
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveCombinationRequest {
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleMetricRequest {
    pub metric: String,
}

// =====================================================
// RPC Response Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> RpcResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

// =====================================================
// Service Status
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub running: bool,
    pub uptime_secs: u64,
    pub overview_loaded: bool,
    pub content_loaded: bool,
    pub overview_records: i64,
    pub content_records: i64,
    pub active_combinations: i64,
    pub filter_state: FilterState,
}
