//! Filter, sort and paginate the project store.
//!
//! [`derive`] is the single source of the rows the table shows and the markers
//! the map plots. It always starts from the full store, so filters never
//! accumulate across recomputes.

use std::cmp::Ordering;

use crate::models::{Project, ProjectStatus};

/// Status chip selection in the dashboard header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Pending,
    Completed,
    Cancelled,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 5] = [
        StatusFilter::All,
        StatusFilter::Active,
        StatusFilter::Pending,
        StatusFilter::Completed,
        StatusFilter::Cancelled,
    ];

    pub fn matches(&self, status: ProjectStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == ProjectStatus::Active,
            StatusFilter::Pending => status == ProjectStatus::Pending,
            StatusFilter::Completed => status == ProjectStatus::Completed,
            StatusFilter::Cancelled => status == ProjectStatus::Cancelled,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Active => "Active",
            StatusFilter::Pending => "Pending",
            StatusFilter::Completed => "Completed",
            StatusFilter::Cancelled => "Cancelled",
        }
    }

    pub fn next(&self) -> Self {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Any project field can be the sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    ProjectName,
    Latitude,
    Longitude,
    Status,
    LastUpdated,
    Description,
    Budget,
    Category,
}

impl SortKey {
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Id => "Id",
            SortKey::ProjectName => "Project Name",
            SortKey::Latitude => "Latitude",
            SortKey::Longitude => "Longitude",
            SortKey::Status => "Status",
            SortKey::LastUpdated => "Last Updated",
            SortKey::Description => "Description",
            SortKey::Budget => "Budget",
            SortKey::Category => "Category",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// Inputs of the pipeline. Every mutator that changes which rows match
/// rewinds pagination to the first page.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    pub search_text: String,
    pub status_filter: StatusFilter,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
    pub pages: usize,
    pub page_size: usize,
}

impl QueryState {
    pub fn new(page_size: usize) -> Self {
        Self {
            search_text: String::new(),
            status_filter: StatusFilter::All,
            sort_key: SortKey::LastUpdated,
            sort_direction: SortDirection::Descending,
            pages: 1,
            page_size,
        }
    }

    pub fn visible_count(&self) -> usize {
        self.pages.saturating_mul(self.page_size)
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
        self.pages = 1;
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.status_filter = filter;
        self.pages = 1;
    }

    /// Header click: the current column flips direction, a new column starts ascending.
    pub fn sort_by(&mut self, key: SortKey) {
        if self.sort_key == key {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_key = key;
            self.sort_direction = SortDirection::Ascending;
        }
        self.pages = 1;
    }

    pub fn load_more(&mut self) {
        self.pages = self.pages.saturating_add(1);
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DerivedView {
    /// First `visible_count` matches, in sort order.
    pub visible: Vec<Project>,
    /// Matches before the pagination slice.
    pub filtered_len: usize,
    pub has_more: bool,
}

impl DerivedView {
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.visible.iter().position(|p| p.id == id)
    }
}

enum SortValue<'a> {
    Text(&'a str),
    Number(f64),
    Missing,
}

fn sort_value(project: &Project, key: SortKey) -> SortValue<'_> {
    match key {
        SortKey::Id => SortValue::Text(&project.id),
        SortKey::ProjectName => SortValue::Text(&project.project_name),
        SortKey::Latitude => SortValue::Number(project.latitude),
        SortKey::Longitude => SortValue::Number(project.longitude),
        SortKey::Status => SortValue::Text(project.status.as_str()),
        SortKey::LastUpdated => SortValue::Number(project.last_updated as f64),
        SortKey::Description => project
            .description
            .as_deref()
            .map_or(SortValue::Missing, SortValue::Text),
        SortKey::Budget => SortValue::Number(project.budget_or_zero()),
        SortKey::Category => project
            .category
            .as_deref()
            .map_or(SortValue::Missing, SortValue::Text),
    }
}

// Missing on either side, NaN, and mixed kinds all compare equal.
fn compare_values(a: &SortValue<'_>, b: &SortValue<'_>) -> Ordering {
    match (a, b) {
        (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
        (SortValue::Number(a), SortValue::Number(b)) => {
            a.partial_cmp(b).unwrap_or(Ordering::Equal)
        }
        _ => Ordering::Equal,
    }
}

pub fn compare_projects(a: &Project, b: &Project, key: SortKey, direction: SortDirection) -> Ordering {
    let ordering = compare_values(&sort_value(a, key), &sort_value(b, key));
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

pub fn matches_search(project: &Project, needle_lower: &str) -> bool {
    if needle_lower.is_empty() {
        return true;
    }
    project.project_name.to_lowercase().contains(needle_lower)
        || project
            .category
            .as_ref()
            .is_some_and(|c| c.to_lowercase().contains(needle_lower))
}

/// Search filter, status filter, then a stable sort. No pagination.
pub fn filter_and_sort<'a>(projects: &'a [Project], state: &QueryState) -> Vec<&'a Project> {
    let needle = state.search_text.to_lowercase();

    let mut filtered: Vec<&Project> = projects
        .iter()
        .filter(|p| matches_search(p, &needle))
        .filter(|p| state.status_filter.matches(p.status))
        .collect();

    if has_total_order(&filtered, state.sort_key) {
        // sort_by is stable, ties keep store order
        filtered.sort_by(|a, b| compare_projects(a, b, state.sort_key, state.sort_direction));
    } else {
        insertion_sort(&mut filtered, |a, b| {
            compare_projects(a, b, state.sort_key, state.sort_direction)
        });
    }
    filtered
}

// Absent values and NaN tie with everything, which is not a total order.
fn has_total_order(projects: &[&Project], key: SortKey) -> bool {
    projects.iter().all(|p| match sort_value(p, key) {
        SortValue::Text(_) => true,
        SortValue::Number(n) => !n.is_nan(),
        SortValue::Missing => false,
    })
}

/// Stable, and never panics on a comparator that is not transitive. Every
/// adjacent pair of the result is ordered under `compare`.
fn insertion_sort<T, F>(items: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && compare(&items[j - 1], &items[j]) == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}

pub fn derive(projects: &[Project], state: &QueryState) -> DerivedView {
    let filtered = filter_and_sort(projects, state);
    let filtered_len = filtered.len();
    let visible_count = state.visible_count();

    DerivedView {
        visible: filtered.into_iter().take(visible_count).cloned().collect(),
        filtered_len,
        has_more: visible_count < filtered_len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str, name: &str, status: ProjectStatus, updated: i64) -> Project {
        Project {
            id: id.to_string(),
            project_name: name.to_string(),
            latitude: 40.0,
            longitude: -100.0,
            status,
            last_updated: updated,
            description: None,
            budget: None,
            category: None,
        }
    }

    fn lake_and_river() -> Vec<Project> {
        vec![
            project("a", "Lake Rd", ProjectStatus::Active, 100),
            project("b", "River Ln", ProjectStatus::Pending, 200),
        ]
    }

    fn ids(view: &DerivedView) -> Vec<&str> {
        view.visible.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn status_filter_keeps_only_matching_projects() {
        let mut state = QueryState::new(50);
        state.set_status_filter(StatusFilter::Active);
        let view = derive(&lake_and_river(), &state);
        assert_eq!(ids(&view), vec!["a"]);
        assert!(!view.has_more);
    }

    #[test]
    fn default_state_sorts_by_last_updated_descending() {
        let view = derive(&lake_and_river(), &QueryState::new(50));
        assert_eq!(ids(&view), vec!["b", "a"]);
    }

    #[test]
    fn load_more_reveals_the_next_page() {
        let store = lake_and_river();
        let mut state = QueryState::new(1);
        let view = derive(&store, &state);
        assert_eq!(view.visible.len(), 1);
        assert!(view.has_more);

        state.load_more();
        let view = derive(&store, &state);
        assert_eq!(view.visible.len(), 2);
        assert!(!view.has_more);
    }

    #[test]
    fn search_matches_name_or_category_case_insensitively() {
        let mut store = lake_and_river();
        store[1].category = Some("Waterways".to_string());
        let mut state = QueryState::new(50);

        state.set_search("LAKE");
        assert_eq!(ids(&derive(&store, &state)), vec!["a"]);

        state.set_search("waterWAYS");
        assert_eq!(ids(&derive(&store, &state)), vec!["b"]);

        state.set_search("nothing");
        assert!(derive(&store, &state).visible.is_empty());
    }

    #[test]
    fn unknown_status_only_matches_all() {
        let store = vec![project("x", "X", ProjectStatus::Unknown, 1)];
        let mut state = QueryState::new(50);
        assert_eq!(derive(&store, &state).visible.len(), 1);
        for filter in &StatusFilter::ALL[1..] {
            state.set_status_filter(*filter);
            assert!(derive(&store, &state).visible.is_empty());
        }
    }

    #[test]
    fn ties_preserve_store_order() {
        let store = vec![
            project("1", "Same", ProjectStatus::Active, 5),
            project("2", "Same", ProjectStatus::Active, 5),
            project("3", "Same", ProjectStatus::Active, 5),
        ];
        let mut state = QueryState::new(50);
        assert_eq!(ids(&derive(&store, &state)), vec!["1", "2", "3"]);

        state.sort_by(SortKey::ProjectName);
        assert_eq!(ids(&derive(&store, &state)), vec!["1", "2", "3"]);
    }

    #[test]
    fn sparse_optional_values_keep_adjacent_pairs_ordered() {
        let store: Vec<Project> = (0..40)
            .map(|i| {
                let mut p = project(&format!("{:02}", i), "P", ProjectStatus::Active, i);
                if i % 3 != 0 {
                    p.category = Some(format!("cat-{}", (i * 7) % 11));
                }
                p
            })
            .collect();

        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            let mut state = QueryState::new(100);
            state.sort_key = SortKey::Category;
            state.sort_direction = direction;
            let sorted = filter_and_sort(&store, &state);
            assert_eq!(sorted.len(), store.len());
            for pair in sorted.windows(2) {
                assert_ne!(
                    compare_projects(pair[0], pair[1], SortKey::Category, direction),
                    Ordering::Greater
                );
            }
        }
    }

    #[test]
    fn missing_value_ties_keep_input_order() {
        let mut store = vec![
            project("1", "One", ProjectStatus::Active, 1),
            project("2", "Two", ProjectStatus::Active, 2),
        ];
        store[1].category = Some("a".to_string());
        let mut state = QueryState::new(50);
        state.sort_by(SortKey::Category);
        assert_eq!(ids(&derive(&store, &state)), vec!["1", "2"]);
        state.sort_by(SortKey::Category);
        assert_eq!(ids(&derive(&store, &state)), vec!["1", "2"]);
    }

    #[test]
    fn absent_budget_sorts_as_zero() {
        let mut store = vec![
            project("1", "One", ProjectStatus::Active, 1),
            project("2", "Two", ProjectStatus::Active, 2),
            project("3", "Three", ProjectStatus::Active, 3),
        ];
        store[0].budget = Some(500.0);
        store[2].budget = Some(-10.0);

        let mut state = QueryState::new(50);
        state.sort_by(SortKey::Budget);
        assert_eq!(ids(&derive(&store, &state)), vec!["3", "2", "1"]);
    }

    #[test]
    fn nan_coordinates_do_not_panic() {
        let mut store = lake_and_river();
        store[0].latitude = f64::NAN;
        let mut state = QueryState::new(50);
        state.sort_by(SortKey::Latitude);
        assert_eq!(derive(&store, &state).visible.len(), 2);
    }

    #[test]
    fn sort_by_toggles_the_current_column_and_resets_new_ones() {
        let mut state = QueryState::new(50);
        state.sort_by(SortKey::LastUpdated);
        assert_eq!(state.sort_direction, SortDirection::Ascending);
        state.sort_by(SortKey::LastUpdated);
        assert_eq!(state.sort_direction, SortDirection::Descending);

        state.sort_by(SortKey::Budget);
        assert_eq!(state.sort_key, SortKey::Budget);
        assert_eq!(state.sort_direction, SortDirection::Ascending);
    }

    #[test]
    fn changing_filters_rewinds_pagination() {
        let mut state = QueryState::new(10);
        state.load_more();
        state.load_more();
        assert_eq!(state.visible_count(), 30);

        state.set_search("x");
        assert_eq!(state.pages, 1);

        state.load_more();
        state.set_status_filter(StatusFilter::Pending);
        assert_eq!(state.pages, 1);

        state.load_more();
        state.sort_by(SortKey::Status);
        assert_eq!(state.pages, 1);
    }

    #[test]
    fn status_sorts_by_name() {
        let store = vec![
            project("p", "P", ProjectStatus::Pending, 1),
            project("a", "A", ProjectStatus::Active, 1),
            project("c", "C", ProjectStatus::Completed, 1),
            project("x", "X", ProjectStatus::Cancelled, 1),
        ];
        let mut state = QueryState::new(50);
        state.sort_by(SortKey::Status);
        assert_eq!(ids(&derive(&store, &state)), vec!["a", "x", "c", "p"]);
    }

    #[test]
    fn filter_cycle_wraps_both_ways() {
        assert_eq!(StatusFilter::Cancelled.next(), StatusFilter::All);
        assert_eq!(StatusFilter::All.previous(), StatusFilter::Cancelled);
        assert_eq!(StatusFilter::All.next(), StatusFilter::Active);
    }
}
