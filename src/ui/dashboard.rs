use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tracing::warn;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::dashboard::Dashboard;
use crate::models::{Project, User};
use crate::ui::components::text_input::TextInputState;
use crate::ui::header::render_header;
use crate::ui::map::{self, render_map, MapIntent, MapViewState};
use crate::ui::table::{self, render_table, TableIntent, TableViewState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Table,
    Map,
}

pub enum DashboardAction {
    SignOut,
    Exit,
}

/// The dashboard screen: the controller plus the view-local bits (cursor,
/// camera, search box, focus).
pub struct DashboardScreenState {
    dashboard: Dashboard,
    user: User,
    search: TextInputState,
    table: TableViewState,
    map: MapViewState,
    focus: Focus,
}

impl DashboardScreenState {
    pub fn new(user: User, projects: Vec<Project>, page_size: usize) -> Self {
        Self {
            dashboard: Dashboard::new(projects, page_size),
            user,
            search: TextInputState::new(),
            table: TableViewState::new(),
            map: MapViewState::new(),
            focus: Focus::Table,
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn map(&self) -> &MapViewState {
        &self.map
    }

    pub fn table(&self) -> &TableViewState {
        &self.table
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Table => Focus::Map,
            Focus::Map => Focus::Table,
        };
    }

    /// Selection entry point for both views.
    pub fn select_project(&mut self, project: Project) {
        if let Err(err) = self.dashboard.select_project(project) {
            warn!(error = %err, "selection ignored");
            return;
        }
        self.after_change();
    }

    pub fn apply_table_intent(&mut self, intent: TableIntent) {
        match intent {
            TableIntent::Sort(key) => self.dashboard.sort_by(key),
            TableIntent::LoadMore => {
                self.dashboard.load_more();
            }
            TableIntent::Select(project) => return self.select_project(project),
        }
        self.after_change();
    }

    pub fn apply_map_intent(&mut self, intent: MapIntent) {
        match intent {
            MapIntent::Select(project) => self.select_project(project),
        }
    }

    /// Handles one key. Returns an action when the screen should be left.
    pub fn handle_key(&mut self, key: KeyCode) -> Option<DashboardAction> {
        if self.search.editing {
            match key {
                KeyCode::Enter | KeyCode::Esc => self.search.toggle_editing(),
                code => {
                    if self.search.handle_input(code) {
                        self.dashboard.set_search(&self.search.value);
                        self.after_change();
                    }
                }
            }
            return None;
        }

        match key {
            KeyCode::Char('q') | KeyCode::Esc => return Some(DashboardAction::Exit),
            KeyCode::Char('o') => return Some(DashboardAction::SignOut),
            KeyCode::Char('/') => self.search.toggle_editing(),
            KeyCode::Tab => self.toggle_focus(),
            KeyCode::Char('f') => {
                self.dashboard.cycle_status_filter(true);
                self.after_change();
            }
            KeyCode::Char('F') => {
                self.dashboard.cycle_status_filter(false);
                self.after_change();
            }
            code => match self.focus {
                Focus::Table => {
                    if let Some(intent) = table::handle_key(&mut self.table, code, self.dashboard.view()) {
                        self.apply_table_intent(intent);
                    }
                }
                Focus::Map => {
                    if let Some(intent) = map::handle_key(&mut self.map, code, &self.dashboard.view().visible) {
                        self.apply_map_intent(intent);
                    }
                }
            },
        }
        None
    }

    /// Advances time-based view state.
    pub fn tick(&mut self) {
        self.map.tick();
    }

    // Views react to the new derived list and selection.
    fn after_change(&mut self) {
        self.table.clamp(self.dashboard.view().visible.len());
        if let Some(index) = self.dashboard.selected_visible_index() {
            self.table.follow(index);
        }
        self.map.sync_selection(self.dashboard.selection().project());
    }
}

pub fn render_dashboard<B: Backend>(frame: &mut Frame<B>, state: &mut DashboardScreenState) {
    let size = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(4),
                Constraint::Min(5),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(size);

    render_header(
        frame,
        chunks[0],
        &state.search,
        state.dashboard.query().status_filter,
        state.dashboard.total_projects(),
        &state.user.name,
    );

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(chunks[1]);

    render_table(
        frame,
        panes[0],
        &mut state.table,
        state.dashboard.view(),
        state.dashboard.query(),
        state.dashboard.selection(),
        state.focus == Focus::Table,
    );

    render_map(
        frame,
        panes[1],
        &state.map,
        &state.dashboard.view().visible,
        state.dashboard.selection(),
        state.focus == Focus::Map,
    );

    let help_text = if state.search.editing {
        "Type to search name or category | Enter/Esc - Done".to_string()
    } else {
        let pane_help = match state.focus {
            Focus::Table => "Up/Down - Move | Enter - Select | N/T/U/B - Sort | L - Load more",
            Focus::Map => "Arrows - Pan | +/- - Zoom | [ ] - Marker | Enter - Select | 0 - Reset",
        };
        format!("{} | / - Search | F - Status | Tab - Switch pane | O - Sign out | Q - Quit", pane_help)
    };

    let help = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(help, chunks[2]);
}

/// Waits up to `tick_rate` for a key. Without one the screen just ticks.
pub fn handle_input(state: &mut DashboardScreenState, tick_rate: Duration) -> Result<Option<DashboardAction>> {
    if event::poll(tick_rate)? {
        if let Event::Key(key) = event::read()? {
            return Ok(state.handle_key(key.code));
        }
    } else {
        state.tick();
    }
    Ok(None)
}
