use tracing::{debug, info, warn};

use crate::error::{DashboardError, Result};
use crate::models::Project;
use crate::query::{self, DerivedView, QueryState, SortKey, StatusFilter};
use crate::selection::Selection;

/// Owner of the query inputs and the selection.
///
/// Views read from it and return intents; every mutating call recomputes
/// the derived view so the table and the map always see the same list.
pub struct Dashboard {
    projects: Vec<Project>,
    query: QueryState,
    selection: Selection,
    view: DerivedView,
}

impl Dashboard {
    pub fn new(projects: Vec<Project>, page_size: usize) -> Self {
        let mut dashboard = Self {
            projects,
            query: QueryState::new(page_size),
            selection: Selection::new(),
            view: DerivedView::default(),
        };
        dashboard.recompute();
        dashboard
    }

    pub fn total_projects(&self) -> usize {
        self.projects.len()
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn view(&self) -> &DerivedView {
        &self.view
    }

    /// Row of the selected project in the visible slice, if it is on screen.
    pub fn selected_visible_index(&self) -> Option<usize> {
        self.selection.id().and_then(|id| self.view.position(id))
    }

    pub fn set_search(&mut self, text: &str) {
        if self.query.search_text == text {
            return;
        }
        self.query.set_search(text);
        self.recompute();
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.query.set_status_filter(filter);
        self.recompute();
    }

    pub fn cycle_status_filter(&mut self, forward: bool) {
        let filter = if forward {
            self.query.status_filter.next()
        } else {
            self.query.status_filter.previous()
        };
        self.set_status_filter(filter);
    }

    pub fn sort_by(&mut self, key: SortKey) {
        self.query.sort_by(key);
        self.recompute();
    }

    /// Returns false when every match is already visible.
    pub fn load_more(&mut self) -> bool {
        if !self.view.has_more {
            return false;
        }
        self.query.load_more();
        self.recompute();
        true
    }

    /// Shared by table rows and map markers.
    pub fn select_project(&mut self, project: Project) -> Result<()> {
        if !self.projects.iter().any(|p| p.id == project.id) {
            warn!(id = %project.id, "rejected selection of a project outside the store");
            return Err(DashboardError::UnknownProject(project.id));
        }
        info!(id = %project.id, name = %project.project_name, "project selected");
        self.selection.select(project);
        Ok(())
    }

    pub fn recompute(&mut self) {
        self.view = query::derive(&self.projects, &self.query);
        debug!(
            filtered = self.view.filtered_len,
            visible = self.view.visible.len(),
            has_more = self.view.has_more,
            "derived view recomputed"
        );
    }
}
