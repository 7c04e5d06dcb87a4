use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::models::Project;
use crate::query::{DerivedView, QueryState, SortKey};
use crate::selection::Selection;
use crate::ui::map::marker_color;

/// Column headers with the key that sorts them. Location is not sortable.
const COLUMNS: [(&str, Option<SortKey>); 5] = [
    ("Project Name", Some(SortKey::ProjectName)),
    ("Status", Some(SortKey::Status)),
    ("Last Updated", Some(SortKey::LastUpdated)),
    ("Location", None),
    ("Budget", Some(SortKey::Budget)),
];

// Represents the cursor of the project table; the selection lives in the dashboard
pub struct TableViewState {
    table_state: TableState,
}

impl TableViewState {
    pub fn new() -> Self {
        let mut table_state = TableState::default();
        table_state.select(Some(0));
        Self { table_state }
    }

    pub fn cursor(&self) -> Option<usize> {
        self.table_state.selected()
    }

    pub fn next(&mut self, len: usize) {
        if len == 0 {
            return;
        }

        let i = match self.table_state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self, len: usize) {
        if len == 0 {
            return;
        }

        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    /// Moves the cursor onto a row, e.g. after the map selected it.
    pub fn follow(&mut self, index: usize) {
        self.table_state.select(Some(index));
    }

    /// Keeps the cursor inside the list after it shrank.
    pub fn clamp(&mut self, len: usize) {
        match self.table_state.selected() {
            _ if len == 0 => self.table_state.select(None),
            Some(i) if i >= len => self.table_state.select(Some(len - 1)),
            None => self.table_state.select(Some(0)),
            _ => {}
        }
    }

    pub fn cursor_project<'a>(&self, projects: &'a [Project]) -> Option<&'a Project> {
        self.table_state.selected().and_then(|i| projects.get(i))
    }
}

impl Default for TableViewState {
    fn default() -> Self {
        Self::new()
    }
}

/// What the table asks the dashboard to do.
pub enum TableIntent {
    Sort(SortKey),
    Select(Project),
    LoadMore,
}

/// Keys while the table has focus. The letters stand in for clicking a column header.
pub fn handle_key(state: &mut TableViewState, key: KeyCode, view: &DerivedView) -> Option<TableIntent> {
    match key {
        KeyCode::Down => state.next(view.visible.len()),
        KeyCode::Up => state.previous(view.visible.len()),
        KeyCode::Enter => {
            if let Some(project) = state.cursor_project(&view.visible) {
                return Some(TableIntent::Select(project.clone()));
            }
        }
        KeyCode::Char('n') => return Some(TableIntent::Sort(SortKey::ProjectName)),
        KeyCode::Char('t') => return Some(TableIntent::Sort(SortKey::Status)),
        KeyCode::Char('u') => return Some(TableIntent::Sort(SortKey::LastUpdated)),
        KeyCode::Char('b') => return Some(TableIntent::Sort(SortKey::Budget)),
        KeyCode::Char('l') => {
            if view.has_more {
                return Some(TableIntent::LoadMore);
            }
        }
        _ => {}
    }
    None
}

fn header_label(title: &str, key: Option<SortKey>, query: &QueryState) -> String {
    match key {
        Some(key) if key == query.sort_key => format!("{} {}", title, query.sort_direction.arrow()),
        _ => title.to_string(),
    }
}

pub fn render_table<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    state: &mut TableViewState,
    view: &DerivedView,
    query: &QueryState,
    selection: &Selection,
    focused: bool,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)].as_ref())
        .split(area);

    // Define the header cells
    let header_cells = COLUMNS.iter().map(|(title, key)| {
        Cell::from(header_label(title, *key, query)).style(Style::default().fg(Color::Yellow))
    });
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows = view.visible.iter().map(|project| {
        let selected = selection.is_selected(&project.id);
        let name = match &project.category {
            Some(category) => format!("{} · {}", project.project_name, category),
            None => project.project_name.clone(),
        };
        let cells = vec![
            Cell::from(name),
            Cell::from(project.status.label())
                .style(Style::default().fg(marker_color(project.status, false))),
            Cell::from(project.last_updated_date()),
            Cell::from(format!("{:.3}, {:.3}", project.latitude, project.longitude)),
            Cell::from(project.budget_display()),
        ];

        let row = Row::new(cells).height(1);
        if selected {
            row.style(Style::default().bg(Color::Blue).fg(Color::White))
        } else {
            row
        }
    });

    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let title = format!("Projects ({} of {})", view.visible.len(), view.filtered_len);
    let table = Table::new(rows)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
        .widths(&[
            Constraint::Percentage(38),
            Constraint::Percentage(12),
            Constraint::Percentage(15),
            Constraint::Percentage(20),
            Constraint::Percentage(15),
        ]);

    frame.render_stateful_widget(table, chunks[0], &mut state.table_state);

    let footer_text = if view.has_more {
        format!(
            "<L> Load More ({} more match)",
            view.filtered_len - view.visible.len()
        )
    } else if view.filtered_len == 0 {
        "No projects match the current filters".to_string()
    } else {
        "All matching projects shown".to_string()
    };

    let footer = Paragraph::new(footer_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));

    frame.render_widget(footer, chunks[1]);
}
