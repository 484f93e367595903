//! In-memory store for loaded collections and session state.
//!
//! Holds the two record collections plus the user-driven session state
//! (filter ranges, tag combinations, metric visibility). Collections are
//! written once by the loaders and read as snapshots; session state is
//! mutated only through explicit setters. Nothing is persisted.

use chrono::NaiveDate;
use std::sync::Mutex;
use tiktok_analytics_types::{
    ContentRecord, DateRange, FilterState, MetricVisibility, OverviewRecord, SetFiltersRequest,
    TagCombination, ViewsRange,
};

/// Default filter window matching the source exports. The literals are
/// known-valid calendar dates.
fn default_filter_state() -> FilterState {
    FilterState {
        date_range: DateRange {
            start: NaiveDate::from_ymd_opt(2024, 9, 9).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 12, 26).unwrap(),
        },
        views_range: ViewsRange {
            min: 0,
            max: 1_500_000,
        },
    }
}

pub struct Store {
    /// `None` until the loader has run; `Some` afterwards, possibly empty.
    overview: Mutex<Option<Vec<OverviewRecord>>>,
    content: Mutex<Option<Vec<ContentRecord>>>,
    filters: Mutex<FilterState>,
    combinations: Mutex<Vec<TagCombination>>,
    visibility: Mutex<MetricVisibility>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            overview: Mutex::new(None),
            content: Mutex::new(None),
            filters: Mutex::new(default_filter_state()),
            // Seed one combination so the dashboard has a group to show.
            combinations: Mutex::new(vec![TagCombination {
                id: 1,
                tags: vec!["marvel".to_string(), "dc".to_string()],
                label: "marvel + dc".to_string(),
            }]),
            visibility: Mutex::new(MetricVisibility::default()),
        }
    }

    // =====================================================
    // Collections
    // =====================================================

    pub fn set_overview(&self, records: Vec<OverviewRecord>) {
        *self.overview.lock().unwrap() = Some(records);
    }

    pub fn set_content(&self, records: Vec<ContentRecord>) {
        *self.content.lock().unwrap() = Some(records);
    }

    /// Snapshot of the overview collection; empty while the load is pending.
    pub fn overview_snapshot(&self) -> Vec<OverviewRecord> {
        self.overview.lock().unwrap().clone().unwrap_or_default()
    }

    pub fn content_snapshot(&self) -> Vec<ContentRecord> {
        self.content.lock().unwrap().clone().unwrap_or_default()
    }

    pub fn overview_loaded(&self) -> bool {
        self.overview.lock().unwrap().is_some()
    }

    pub fn content_loaded(&self) -> bool {
        self.content.lock().unwrap().is_some()
    }

    // =====================================================
    // Filter State
    // =====================================================

    pub fn filter_state(&self) -> FilterState {
        *self.filters.lock().unwrap()
    }

    /// Apply a partial filter update. Omitted ranges keep their current
    /// value; inverted ranges are rejected.
    pub fn set_filters(&self, req: &SetFiltersRequest) -> Result<FilterState, String> {
        if let Some(range) = &req.date_range {
            if range.start > range.end {
                return Err(format!(
                    "Invalid date range: {} is after {}",
                    range.start, range.end
                ));
            }
        }
        if let Some(range) = &req.views_range {
            if range.min > range.max {
                return Err(format!(
                    "Invalid views range: min {} exceeds max {}",
                    range.min, range.max
                ));
            }
        }

        let mut filters = self.filters.lock().unwrap();
        if let Some(range) = req.date_range {
            filters.date_range = range;
        }
        if let Some(range) = req.views_range {
            filters.views_range = range;
        }
        Ok(*filters)
    }

    // =====================================================
    // Tag Combinations
    // =====================================================

    pub fn combinations(&self) -> Vec<TagCombination> {
        self.combinations.lock().unwrap().clone()
    }

    /// Add a combination. Tags are lowercased and trimmed; blank entries are
    /// dropped and an all-blank selection is rejected. The new id is
    /// `max(existing, 0) + 1` — ids are not reissued while a larger one is
    /// still active.
    pub fn add_combination(&self, tags: &[String]) -> Result<TagCombination, String> {
        let normalized: Vec<String> = tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if normalized.is_empty() {
            return Err("At least one tag is required".to_string());
        }

        let mut combinations = self.combinations.lock().unwrap();
        let next_id = combinations.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let combination = TagCombination {
            id: next_id,
            label: normalized.join(" + "),
            tags: normalized,
        };
        combinations.push(combination.clone());
        log::info!(
            "[TIKTOK_ANALYTICS] Added combination #{} ({})",
            combination.id,
            combination.label
        );
        Ok(combination)
    }

    pub fn remove_combination(&self, id: i64) -> bool {
        let mut combinations = self.combinations.lock().unwrap();
        let before = combinations.len();
        combinations.retain(|c| c.id != id);
        combinations.len() < before
    }

    // =====================================================
    // Metric Visibility
    // =====================================================

    pub fn metric_visibility(&self) -> MetricVisibility {
        *self.visibility.lock().unwrap()
    }

    /// Flip one overview series on or off. Unknown metric names are
    /// rejected so a typo in a client does not silently no-op.
    pub fn toggle_metric(&self, metric: &str) -> Result<MetricVisibility, String> {
        let mut visibility = self.visibility.lock().unwrap();
        match metric {
            "video_views" => visibility.video_views = !visibility.video_views,
            "profile_views" => visibility.profile_views = !visibility.profile_views,
            "likes" => visibility.likes = !visibility.likes,
            "comments" => visibility.comments = !visibility.comments,
            "shares" => visibility.shares = !visibility.shares,
            other => return Err(format!("Unknown metric '{}'", other)),
        }
        Ok(*visibility)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let store = Store::new();
        let filters = store.filter_state();
        assert_eq!(filters.date_range.start.to_string(), "2024-09-09");
        assert_eq!(filters.date_range.end.to_string(), "2024-12-26");
        assert_eq!(filters.views_range.min, 0);
        assert_eq!(filters.views_range.max, 1_500_000);

        let combos = store.combinations();
        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].id, 1);
        assert_eq!(combos[0].label, "marvel + dc");

        assert!(!store.overview_loaded());
        assert!(store.overview_snapshot().is_empty());
    }

    #[test]
    fn test_combination_ids_are_max_plus_one() {
        let store = Store::new(); // seeded with id 1
        let second = store.add_combination(&["anime".to_string()]).unwrap();
        assert_eq!(second.id, 2);
        let third = store.add_combination(&["games".to_string()]).unwrap();
        assert_eq!(third.id, 3);

        // Existing ids {1, 3}: the next id is 4, not the freed 2.
        assert!(store.remove_combination(2));
        let fourth = store.add_combination(&["filme".to_string()]).unwrap();
        assert_eq!(fourth.id, 4);
    }

    #[test]
    fn test_add_combination_normalizes_tags() {
        let store = Store::new();
        let combo = store
            .add_combination(&[" Marvel ".to_string(), "DC".to_string(), "  ".to_string()])
            .unwrap();
        assert_eq!(combo.tags, vec!["marvel", "dc"]);
        assert_eq!(combo.label, "marvel + dc");
    }

    #[test]
    fn test_add_combination_rejects_empty_selection() {
        let store = Store::new();
        assert!(store.add_combination(&[]).is_err());
        assert!(store.add_combination(&["   ".to_string()]).is_err());
    }

    #[test]
    fn test_remove_combination_reports_missing() {
        let store = Store::new();
        assert!(store.remove_combination(1));
        assert!(!store.remove_combination(1));
    }

    #[test]
    fn test_set_filters_partial_update() {
        let store = Store::new();
        let updated = store
            .set_filters(&SetFiltersRequest {
                date_range: None,
                views_range: Some(ViewsRange { min: 10, max: 20 }),
            })
            .unwrap();
        assert_eq!(updated.views_range.min, 10);
        // Date range untouched.
        assert_eq!(updated.date_range.start.to_string(), "2024-09-09");
    }

    #[test]
    fn test_set_filters_rejects_inverted_ranges() {
        let store = Store::new();
        let before = store.filter_state();
        let result = store.set_filters(&SetFiltersRequest {
            date_range: None,
            views_range: Some(ViewsRange { min: 100, max: 10 }),
        });
        assert!(result.is_err());
        assert_eq!(store.filter_state(), before);
    }

    #[test]
    fn test_toggle_metric() {
        let store = Store::new();
        let visibility = store.toggle_metric("likes").unwrap();
        assert!(!visibility.likes);
        let visibility = store.toggle_metric("likes").unwrap();
        assert!(visibility.likes);
        assert!(store.toggle_metric("watch_time").is_err());
    }
}
