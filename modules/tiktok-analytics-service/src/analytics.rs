//! Analytics processing — derived metrics, range filtering, tag grouping.
//!
//! Everything here is a pure function over record slices: filters and
//! aggregates are recomputed from the current snapshot on every query and
//! never mutate their inputs.

use std::collections::HashSet;
use tiktok_analytics_types::{
    ContentMetrics, ContentRecord, DateRange, GroupAggregate, OverviewRecord, TagCombination,
    ViewsRange,
};

// =====================================================
// Derived Metric Calculators
// =====================================================

/// Engagement as a percentage of views:
/// `(likes + comments + shares + saves) / views * 100`.
/// Defined as 0.0 when the record has no views, so charts never see a
/// non-finite value.
pub fn engagement_percentage(record: &ContentRecord) -> f64 {
    if record.total_views <= 0 {
        return 0.0;
    }
    let interactions =
        record.total_likes + record.total_comments + record.total_shares + record.total_saves;
    interactions as f64 / record.total_views as f64 * 100.0
}

/// Average watch time as a percentage of video duration:
/// `avg_watch_time / total_video_time * 100`. Defined as 0.0 for
/// zero-duration records.
pub fn watch_time_percentage(record: &ContentRecord) -> f64 {
    if record.total_video_time <= 0.0 {
        return 0.0;
    }
    record.avg_watch_time / record.total_video_time * 100.0
}

/// Both derived metrics for one record.
pub fn content_metrics(record: &ContentRecord) -> ContentMetrics {
    ContentMetrics {
        engagement_percentage: engagement_percentage(record),
        watch_time_percentage: watch_time_percentage(record),
    }
}

// =====================================================
// Range Filter Engine
// =====================================================

/// Keep overview records whose date falls within the window, inclusive at
/// both bounds. Records with an unparsed date are excluded, not errors.
pub fn filter_overview(records: &[OverviewRecord], range: &DateRange) -> Vec<OverviewRecord> {
    records
        .iter()
        .filter(|r| match r.date {
            Some(d) => d >= range.start && d <= range.end,
            None => false,
        })
        .cloned()
        .collect()
}

/// Keep content records inside both the date window and the views window,
/// all bounds inclusive. Records with an unparsed post day are excluded.
pub fn filter_content(
    records: &[ContentRecord],
    date_range: &DateRange,
    views_range: &ViewsRange,
) -> Vec<ContentRecord> {
    records
        .iter()
        .filter(|r| {
            let in_dates = match r.post_day {
                Some(d) => d >= date_range.start && d <= date_range.end,
                None => false,
            };
            in_dates && r.total_views >= views_range.min && r.total_views <= views_range.max
        })
        .cloned()
        .collect()
}

// =====================================================
// Tag Grouping Engine
// =====================================================

/// The non-empty, normalized tag set of a record. Tags were lowercased and
/// trimmed at ingest; blank slots contribute nothing.
fn record_tag_set(record: &ContentRecord) -> HashSet<&str> {
    [record.tags1.as_str(), record.tags2.as_str()]
        .into_iter()
        .filter(|t| !t.is_empty())
        .collect()
}

/// AND semantics: every tag of the combination must be present on the
/// record. A record tagged `marvel + anime` does not match `[marvel, dc]`.
pub fn matches_combination(record: &ContentRecord, combination: &TagCombination) -> bool {
    let tags = record_tag_set(record);
    combination.tags.iter().all(|t| tags.contains(t.as_str()))
}

/// Compute aggregates for each active combination over the (already
/// filtered) content set. Combinations are evaluated independently — a
/// record may contribute to several groups or to none. Empty groups yield
/// all-zero aggregates, never division errors.
pub fn group_aggregates(
    records: &[ContentRecord],
    combinations: &[TagCombination],
) -> Vec<GroupAggregate> {
    combinations
        .iter()
        .map(|combination| {
            let matching: Vec<&ContentRecord> = records
                .iter()
                .filter(|r| matches_combination(r, combination))
                .collect();

            let count = matching.len();
            let total_new_followers: i64 = matching.iter().map(|r| r.new_followers).sum();

            let (avg_watch, avg_engagement) = if count > 0 {
                let watch_sum: f64 = matching.iter().map(|r| watch_time_percentage(r)).sum();
                let engagement_sum: f64 =
                    matching.iter().map(|r| engagement_percentage(r)).sum();
                (watch_sum / count as f64, engagement_sum / count as f64)
            } else {
                (0.0, 0.0)
            };

            GroupAggregate {
                combination_id: combination.id,
                combination_label: combination.label.clone(),
                average_watch_time_percentage: avg_watch,
                total_new_followers,
                average_engagement_percentage: avg_engagement,
                video_count: count as i64,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn content(post_day: Option<NaiveDate>, views: i64, tags1: &str, tags2: &str) -> ContentRecord {
        ContentRecord {
            post_day,
            video_title: "video".to_string(),
            total_video_time: 30.0,
            total_views: views,
            total_likes: 100,
            total_comments: 10,
            total_shares: 5,
            total_saves: 5,
            avg_watch_time: 15.0,
            full_watch_percentage: 20.0,
            new_followers: 7,
            tags1: tags1.to_string(),
            tags2: tags2.to_string(),
        }
    }

    fn overview(d: Option<NaiveDate>) -> OverviewRecord {
        OverviewRecord {
            date: d,
            video_views: 1,
            profile_views: 1,
            likes: 1,
            comments: 1,
            shares: 1,
        }
    }

    fn combination(id: i64, tags: &[&str]) -> TagCombination {
        TagCombination {
            id,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            label: tags.join(" + "),
        }
    }

    #[test]
    fn test_engagement_percentage_basic() {
        // (100 + 10 + 5 + 5) / 1000 * 100 = 12.0
        let rec = content(None, 1000, "", "");
        assert_eq!(engagement_percentage(&rec), 12.0);
    }

    #[test]
    fn test_engagement_zero_views_is_zero() {
        let rec = content(None, 0, "", "");
        let value = engagement_percentage(&rec);
        assert_eq!(value, 0.0);
        assert!(value.is_finite());
    }

    #[test]
    fn test_watch_time_percentage_basic() {
        // 15 / 30 * 100 = 50.0
        let rec = content(None, 1000, "", "");
        assert_eq!(watch_time_percentage(&rec), 50.0);
    }

    #[test]
    fn test_watch_time_zero_duration_is_zero() {
        let mut rec = content(None, 1000, "", "");
        rec.total_video_time = 0.0;
        assert_eq!(watch_time_percentage(&rec), 0.0);
    }

    #[test]
    fn test_overview_filter_inclusive_bounds() {
        let range = DateRange {
            start: date(2024, 9, 9),
            end: date(2024, 12, 26),
        };
        let records = vec![
            overview(Some(date(2024, 9, 8))),   // just before
            overview(Some(date(2024, 9, 9))),   // exactly start
            overview(Some(date(2024, 10, 1))),  // inside
            overview(Some(date(2024, 12, 26))), // exactly end
            overview(Some(date(2024, 12, 27))), // just after
            overview(None),                     // unparsed
        ];
        let filtered = filter_overview(&records, &range);
        assert_eq!(filtered.len(), 3);
        assert_eq!(filtered[0].date, Some(date(2024, 9, 9)));
        assert_eq!(filtered[2].date, Some(date(2024, 12, 26)));
    }

    #[test]
    fn test_content_filter_combines_date_and_views() {
        let date_range = DateRange {
            start: date(2024, 1, 1),
            end: date(2024, 12, 31),
        };
        let views_range = ViewsRange { min: 100, max: 1000 };
        let records = vec![
            content(Some(date(2024, 6, 1)), 100, "", ""),  // exactly min
            content(Some(date(2024, 6, 1)), 1000, "", ""), // exactly max
            content(Some(date(2024, 6, 1)), 99, "", ""),   // below min
            content(Some(date(2024, 6, 1)), 1001, "", ""), // above max
            content(Some(date(2023, 6, 1)), 500, "", ""),  // out of date range
            content(None, 500, "", ""),                    // unparsed date
        ];
        let filtered = filter_content(&records, &date_range, &views_range);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let range = DateRange {
            start: date(2024, 1, 1),
            end: date(2024, 12, 31),
        };
        let views = ViewsRange { min: 0, max: 1_500_000 };
        let records = vec![
            content(Some(date(2024, 3, 1)), 500, "", ""),
            content(Some(date(2025, 3, 1)), 500, "", ""),
        ];
        let once = filter_content(&records, &range, &views);
        let twice = filter_content(&once, &range, &views);
        assert_eq!(once.len(), twice.len());
        assert_eq!(once.len(), 1);
    }

    #[test]
    fn test_grouping_requires_all_tags() {
        let combo = combination(1, &["marvel", "dc"]);
        let both = content(None, 1000, "marvel", "dc");
        let one = content(None, 1000, "marvel", "anime");
        let neither = content(None, 1000, "games", "");
        assert!(matches_combination(&both, &combo));
        assert!(!matches_combination(&one, &combo));
        assert!(!matches_combination(&neither, &combo));
    }

    #[test]
    fn test_grouping_order_of_slots_is_irrelevant() {
        let combo = combination(1, &["marvel", "dc"]);
        let swapped = content(None, 1000, "dc", "marvel");
        assert!(matches_combination(&swapped, &combo));
    }

    #[test]
    fn test_record_can_match_multiple_combinations() {
        let records = vec![content(None, 1000, "marvel", "dc")];
        let combos = vec![combination(1, &["marvel"]), combination(2, &["dc"])];
        let aggregates = group_aggregates(&records, &combos);
        assert_eq!(aggregates[0].video_count, 1);
        assert_eq!(aggregates[1].video_count, 1);
    }

    #[test]
    fn test_empty_group_yields_zero_aggregates() {
        let records = vec![content(None, 1000, "games", "")];
        let combos = vec![combination(1, &["mitologia"])];
        let aggregates = group_aggregates(&records, &combos);
        assert_eq!(aggregates.len(), 1);
        let agg = &aggregates[0];
        assert_eq!(agg.video_count, 0);
        assert_eq!(agg.average_watch_time_percentage, 0.0);
        assert_eq!(agg.average_engagement_percentage, 0.0);
        assert_eq!(agg.total_new_followers, 0);
    }

    #[test]
    fn test_group_aggregate_values() {
        // Two matching videos: watch-time 50% each, engagement 12% and 6%,
        // 7 new followers each.
        let mut second = content(None, 2000, "marvel", "");
        second.avg_watch_time = 15.0; // still 50% of 30s
        let records = vec![content(None, 1000, "marvel", "dc"), second];
        let combos = vec![combination(1, &["marvel"])];

        let aggregates = group_aggregates(&records, &combos);
        let agg = &aggregates[0];
        assert_eq!(agg.video_count, 2);
        assert_eq!(agg.total_new_followers, 14);
        assert_eq!(agg.average_watch_time_percentage, 50.0);
        assert_eq!(agg.average_engagement_percentage, (12.0 + 6.0) / 2.0);
        assert_eq!(agg.combination_label, "marvel");
    }

    #[test]
    fn test_blank_tag_slots_do_not_match_empty_string() {
        // A combination tag can never be the empty string by construction,
        // but blank record slots must not count as a tag either.
        let rec = content(None, 1000, "", "");
        let combo = combination(1, &["marvel"]);
        assert!(!matches_combination(&rec, &combo));
    }
}
