use std::collections::HashMap;

use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{
        canvas::{Canvas, Map, MapResolution, Points},
        Block, Borders, Clear, Paragraph,
    },
    Frame,
};

use crate::models::{Project, ProjectStatus};
use crate::selection::Selection;

/// Geographic centre of the contiguous US.
pub const DEFAULT_CENTER: (f64, f64) = (39.8283, -98.5795);
pub const DEFAULT_ZOOM: u8 = 4;
/// Zoom used when recentring on a selected project.
pub const SELECTED_ZOOM: u8 = 12;
pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 14;

/// Grid cells across the viewport width used for clustering.
const CLUSTER_COLUMNS: f64 = 16.0;
const TRANSITION_STEPS: u32 = 5;
const PAN_FRACTION: f64 = 0.1;

pub const SELECTED_COLOR: Color = Color::Magenta;
const CLUSTER_COLOR: Color = Color::Cyan;

/// Marker colour. Selection wins over status.
pub fn marker_color(status: ProjectStatus, selected: bool) -> Color {
    if selected {
        return SELECTED_COLOR;
    }
    match status {
        ProjectStatus::Active => Color::Green,
        ProjectStatus::Pending => Color::Yellow,
        ProjectStatus::Completed => Color::Blue,
        ProjectStatus::Cancelled => Color::Red,
        ProjectStatus::Unknown => Color::Gray,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            latitude: DEFAULT_CENTER.0,
            longitude: DEFAULT_CENTER.1,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl Viewport {
    /// Degrees of longitude across the viewport; halves with each zoom level.
    pub fn longitude_span(&self) -> f64 {
        360.0 / 2f64.powi(i32::from(self.zoom.max(MIN_ZOOM)) - 1)
    }

    pub fn latitude_span(&self) -> f64 {
        self.longitude_span() / 2.0
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        let half = self.longitude_span() / 2.0;
        [self.longitude - half, self.longitude + half]
    }

    pub fn y_bounds(&self) -> [f64; 2] {
        let half = self.latitude_span() / 2.0;
        [self.latitude - half, self.latitude + half]
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        let [west, east] = self.x_bounds();
        let [south, north] = self.y_bounds();
        (west..=east).contains(&longitude) && (south..=north).contains(&latitude)
    }

    pub fn cluster_cell_size(&self) -> f64 {
        self.longitude_span() / CLUSTER_COLUMNS
    }

    fn clamped(mut self) -> Self {
        self.latitude = self.latitude.clamp(-90.0, 90.0);
        self.longitude = self.longitude.clamp(-180.0, 180.0);
        self.zoom = self.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Transition {
    from: Viewport,
    to: Viewport,
    step: u32,
}

/// Markers closer than one grid cell, drawn as one symbol with a count.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub latitude: f64,
    pub longitude: f64,
    /// Indices into the slice handed to [`cluster_markers`], in input order.
    pub members: Vec<usize>,
}

/// Grid clustering. Projects with out-of-range coordinates are left out.
/// Clusters come back in the order their first member appears.
pub fn cluster_markers(projects: &[Project], cell_size: f64) -> Vec<Cluster> {
    let cell_size = if cell_size > 0.0 { cell_size } else { f64::MIN_POSITIVE };
    let mut clusters: Vec<Cluster> = Vec::new();
    let mut by_cell: HashMap<(i64, i64), usize> = HashMap::new();

    for (index, project) in projects.iter().enumerate() {
        if !project.has_valid_coordinates() {
            continue;
        }
        let cell = (
            (project.longitude / cell_size).floor() as i64,
            (project.latitude / cell_size).floor() as i64,
        );
        let slot = *by_cell.entry(cell).or_insert_with(|| {
            clusters.push(Cluster {
                latitude: 0.0,
                longitude: 0.0,
                members: Vec::new(),
            });
            clusters.len() - 1
        });
        clusters[slot].members.push(index);
    }

    for cluster in &mut clusters {
        let n = cluster.members.len() as f64;
        cluster.latitude = cluster.members.iter().map(|&i| projects[i].latitude).sum::<f64>() / n;
        cluster.longitude = cluster.members.iter().map(|&i| projects[i].longitude).sum::<f64>() / n;
    }

    clusters
}

/// View-side map state: where the camera is and which marker the keyboard
/// cursor sits on. Selection itself lives in the dashboard.
pub struct MapViewState {
    viewport: Viewport,
    transition: Option<Transition>,
    centered_on: Option<String>,
    marker_cursor: Option<String>,
}

impl MapViewState {
    pub fn new() -> Self {
        Self {
            viewport: Viewport::default(),
            transition: None,
            centered_on: None,
            marker_cursor: None,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Starts a recentre when the selected id differs from the last one seen.
    /// Returns true only on the call that started it.
    pub fn sync_selection(&mut self, selected: Option<&Project>) -> bool {
        let id = selected.map(|p| p.id.as_str());
        if self.centered_on.as_deref() == id {
            return false;
        }
        self.centered_on = id.map(str::to_string);

        match selected {
            Some(project) if project.has_valid_coordinates() => {
                self.marker_cursor = Some(project.id.clone());
                let target = Viewport {
                    latitude: project.latitude,
                    longitude: project.longitude,
                    zoom: SELECTED_ZOOM,
                };
                self.transition = Some(Transition {
                    from: self.viewport,
                    to: target,
                    step: 0,
                });
                true
            }
            _ => false,
        }
    }

    /// Advances the recentre transition by one frame.
    pub fn tick(&mut self) {
        let Some(transition) = &mut self.transition else {
            return;
        };
        transition.step += 1;
        if transition.step >= TRANSITION_STEPS {
            self.viewport = transition.to;
            self.transition = None;
            return;
        }

        // ease-out
        let t = f64::from(transition.step) / f64::from(TRANSITION_STEPS);
        let eased = 1.0 - (1.0 - t).powi(2);
        let from = transition.from;
        let to = transition.to;
        let zoom = f64::from(from.zoom) + (f64::from(to.zoom) - f64::from(from.zoom)) * eased;
        self.viewport = Viewport {
            latitude: from.latitude + (to.latitude - from.latitude) * eased,
            longitude: from.longitude + (to.longitude - from.longitude) * eased,
            zoom: zoom.round() as u8,
        };
    }

    pub fn pan(&mut self, east: f64, north: f64) {
        self.transition = None;
        let mut viewport = self.viewport;
        viewport.longitude += east * viewport.longitude_span() * PAN_FRACTION;
        viewport.latitude += north * viewport.latitude_span() * PAN_FRACTION;
        self.viewport = viewport.clamped();
    }

    pub fn zoom_in(&mut self) {
        self.transition = None;
        self.viewport.zoom = (self.viewport.zoom + 1).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.transition = None;
        self.viewport.zoom = self.viewport.zoom.saturating_sub(1).max(MIN_ZOOM);
    }

    pub fn reset_view(&mut self) {
        self.transition = None;
        self.viewport = Viewport::default();
    }

    /// Moves the marker cursor through the plottable projects, wrapping around.
    pub fn move_cursor(&mut self, projects: &[Project], forward: bool) {
        let plottable: Vec<&Project> = projects.iter().filter(|p| p.has_valid_coordinates()).collect();
        if plottable.is_empty() {
            self.marker_cursor = None;
            return;
        }

        let current = self
            .marker_cursor
            .as_deref()
            .and_then(|id| plottable.iter().position(|p| p.id == id));
        let next = match current {
            Some(i) if forward => (i + 1) % plottable.len(),
            Some(i) => (i + plottable.len() - 1) % plottable.len(),
            None if forward => 0,
            None => plottable.len() - 1,
        };

        let project = plottable[next];
        self.marker_cursor = Some(project.id.clone());
        // keep the cursor on screen
        if !self.viewport.contains(project.latitude, project.longitude) {
            self.transition = None;
            self.viewport.latitude = project.latitude;
            self.viewport.longitude = project.longitude;
        }
    }

    pub fn cursor_project<'a>(&self, projects: &'a [Project]) -> Option<&'a Project> {
        let id = self.marker_cursor.as_deref()?;
        projects.iter().find(|p| p.id == id)
    }
}

impl Default for MapViewState {
    fn default() -> Self {
        Self::new()
    }
}

/// What the map asks the dashboard to do.
pub enum MapIntent {
    Select(Project),
}

/// Keys while the map has focus: arrows pan, +/- zoom, [ and ] walk the
/// marker cursor, Enter selects the project under it, 0 resets the camera.
pub fn handle_key(state: &mut MapViewState, key: KeyCode, projects: &[Project]) -> Option<MapIntent> {
    match key {
        KeyCode::Left => state.pan(-1.0, 0.0),
        KeyCode::Right => state.pan(1.0, 0.0),
        KeyCode::Up => state.pan(0.0, 1.0),
        KeyCode::Down => state.pan(0.0, -1.0),
        KeyCode::Char('+') | KeyCode::Char('=') => state.zoom_in(),
        KeyCode::Char('-') => state.zoom_out(),
        KeyCode::Char('0') => state.reset_view(),
        KeyCode::Char(']') => state.move_cursor(projects, true),
        KeyCode::Char('[') => state.move_cursor(projects, false),
        KeyCode::Enter => {
            if let Some(project) = state.cursor_project(projects) {
                return Some(MapIntent::Select(project.clone()));
            }
        }
        _ => {}
    }
    None
}

pub fn render_map<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    state: &MapViewState,
    projects: &[Project],
    selection: &Selection,
    focused: bool,
) {
    let viewport = state.viewport();
    let clusters = cluster_markers(projects, viewport.cluster_cell_size());
    let cursor_id = if focused {
        state.marker_cursor.as_deref()
    } else {
        None
    };

    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let title = format!(
        "Map ({:.3}, {:.3}) zoom {}",
        viewport.latitude, viewport.longitude, viewport.zoom
    );

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .x_bounds(viewport.x_bounds())
        .y_bounds(viewport.y_bounds())
        .paint(|ctx| {
            ctx.draw(&Map {
                resolution: MapResolution::High,
                color: Color::DarkGray,
            });
            ctx.layer();

            for cluster in &clusters {
                let selected = cluster
                    .members
                    .iter()
                    .any(|&i| selection.is_selected(&projects[i].id));

                if cluster.members.len() == 1 {
                    let project = &projects[cluster.members[0]];
                    let color = marker_color(project.status, selected);
                    ctx.draw(&Points {
                        coords: &[(project.longitude, project.latitude)],
                        color,
                    });
                    let mut style = Style::default().fg(color);
                    if selected || cursor_id == Some(project.id.as_str()) {
                        style = style.add_modifier(Modifier::BOLD);
                    }
                    ctx.print(
                        project.longitude,
                        project.latitude,
                        Span::styled("●", style),
                    );
                } else {
                    let color = if selected { SELECTED_COLOR } else { CLUSTER_COLOR };
                    ctx.print(
                        cluster.longitude,
                        cluster.latitude,
                        Span::styled(
                            format!("({})", cluster.members.len()),
                            Style::default().fg(color).add_modifier(Modifier::BOLD),
                        ),
                    );
                }
            }

            let labelled = selection
                .id()
                .and_then(|id| visible_project(projects, id))
                .into_iter()
                .chain(cursor_id.and_then(|id| visible_project(projects, id)));
            for project in labelled {
                if project.has_valid_coordinates() {
                    ctx.print(
                        project.longitude,
                        project.latitude,
                        Span::styled(
                            format!("  {}", project.project_name),
                            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                        ),
                    );
                }
            }
        });

    frame.render_widget(canvas, area);
    render_legend(frame, area);

    // The cursor wins while the map has focus; a filtered-out selection shows nothing.
    let detailed = cursor_id
        .or_else(|| selection.id())
        .and_then(|id| visible_project(projects, id));
    if let Some(project) = detailed {
        render_details(frame, area, project);
    }
}

fn visible_project<'a>(projects: &'a [Project], id: &str) -> Option<&'a Project> {
    projects.iter().find(|p| p.id == id)
}

/// Name, status, category, budget and last update of one project.
fn detail_lines(project: &Project) -> Vec<Spans<'static>> {
    let label = Style::default().fg(Color::Gray);
    vec![
        Spans::from(Span::styled(
            project.project_name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Spans::from(vec![
            Span::styled("Status: ", label),
            Span::styled(
                project.status.label(),
                Style::default().fg(marker_color(project.status, false)),
            ),
        ]),
        Spans::from(vec![
            Span::styled("Category: ", label),
            Span::raw(project.category.clone().unwrap_or_else(|| "-".to_string())),
        ]),
        Spans::from(vec![
            Span::styled("Budget: ", label),
            Span::raw(project.budget_display()),
        ]),
        Spans::from(vec![
            Span::styled("Updated: ", label),
            Span::raw(project.last_updated_date()),
        ]),
    ]
}

fn render_details<B: Backend>(frame: &mut Frame<B>, area: Rect, project: &Project) {
    const WIDTH: u16 = 34;
    const HEIGHT: u16 = 7;
    if area.width < WIDTH + 24 || area.height < HEIGHT + 2 {
        return;
    }
    let details_area = Rect::new(
        area.x + area.width - WIDTH - 2,
        area.y + area.height - HEIGHT - 1,
        WIDTH,
        HEIGHT,
    );

    let details = Paragraph::new(detail_lines(project))
        .block(Block::default().title("Details").borders(Borders::ALL));
    frame.render_widget(Clear, details_area);
    frame.render_widget(details, details_area);
}

fn render_legend<B: Backend>(frame: &mut Frame<B>, area: Rect) {
    if area.width < 20 || area.height < 9 {
        return;
    }
    let legend_area = Rect::new(area.x + 2, area.y + 1, 16, 7);

    let entries = [
        ProjectStatus::Active,
        ProjectStatus::Pending,
        ProjectStatus::Completed,
        ProjectStatus::Cancelled,
    ];
    let mut lines: Vec<Spans> = entries
        .iter()
        .map(|status| {
            Spans::from(vec![
                Span::styled("● ", Style::default().fg(marker_color(*status, false))),
                Span::raw(status.label()),
            ])
        })
        .collect();
    lines.push(Spans::from(vec![
        Span::styled("● ", Style::default().fg(SELECTED_COLOR)),
        Span::raw("Selected"),
    ]));

    let legend = Paragraph::new(lines).block(Block::default().title("Legend").borders(Borders::ALL));
    frame.render_widget(Clear, legend_area);
    frame.render_widget(legend, legend_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui::{backend::TestBackend, Terminal};

    fn project(id: &str, latitude: f64, longitude: f64, status: ProjectStatus) -> Project {
        Project {
            id: id.to_string(),
            project_name: id.to_uppercase(),
            latitude,
            longitude,
            status,
            last_updated: 0,
            description: None,
            budget: None,
            category: None,
        }
    }

    #[test]
    fn status_colours_with_selection_override() {
        assert_eq!(marker_color(ProjectStatus::Active, false), Color::Green);
        assert_eq!(marker_color(ProjectStatus::Pending, false), Color::Yellow);
        assert_eq!(marker_color(ProjectStatus::Completed, false), Color::Blue);
        assert_eq!(marker_color(ProjectStatus::Cancelled, false), Color::Red);
        assert_eq!(marker_color(ProjectStatus::Unknown, false), Color::Gray);
        assert_eq!(marker_color(ProjectStatus::Cancelled, true), SELECTED_COLOR);
    }

    #[test]
    fn nearby_markers_share_a_cluster() {
        let projects = vec![
            project("a", 40.01, -105.01, ProjectStatus::Active),
            project("b", 40.02, -105.02, ProjectStatus::Pending),
            project("c", 47.6, -122.3, ProjectStatus::Active),
            project("bad", 95.0, 0.0, ProjectStatus::Active),
        ];
        let clusters = cluster_markers(&projects, 1.0);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members, vec![0, 1]);
        assert_eq!(clusters[1].members, vec![2]);
        assert!((clusters[0].latitude - 40.015).abs() < 1e-9);
    }

    #[test]
    fn fine_cells_split_clusters() {
        let projects = vec![
            project("a", 40.01, -105.01, ProjectStatus::Active),
            project("b", 40.02, -105.02, ProjectStatus::Pending),
        ];
        assert_eq!(cluster_markers(&projects, 0.001).len(), 2);
    }

    #[test]
    fn recentres_once_per_distinct_selection() {
        let a = project("a", 40.0, -105.0, ProjectStatus::Active);
        let b = project("b", 47.6, -122.3, ProjectStatus::Active);
        let mut map = MapViewState::new();

        assert!(map.sync_selection(Some(&a)));
        assert!(!map.sync_selection(Some(&a)));
        assert!(!map.sync_selection(Some(&a.clone())));
        assert!(map.sync_selection(Some(&b)));
        assert!(!map.sync_selection(Some(&b)));
    }

    #[test]
    fn transition_lands_on_the_selected_project() {
        let a = project("a", 40.0, -105.0, ProjectStatus::Active);
        let mut map = MapViewState::new();
        map.sync_selection(Some(&a));
        assert!(map.is_animating());

        for _ in 0..TRANSITION_STEPS {
            map.tick();
        }
        assert!(!map.is_animating());
        assert_eq!(
            map.viewport(),
            Viewport {
                latitude: 40.0,
                longitude: -105.0,
                zoom: SELECTED_ZOOM
            }
        );
    }

    #[test]
    fn out_of_range_selection_does_not_move_the_camera() {
        let bad = project("bad", 120.0, 0.0, ProjectStatus::Active);
        let mut map = MapViewState::new();
        assert!(!map.sync_selection(Some(&bad)));
        assert_eq!(map.viewport(), Viewport::default());
    }

    #[test]
    fn cursor_skips_unplottable_projects_and_wraps() {
        let projects = vec![
            project("a", 40.0, -105.0, ProjectStatus::Active),
            project("bad", 120.0, 0.0, ProjectStatus::Active),
            project("c", 41.0, -104.0, ProjectStatus::Active),
        ];
        let mut map = MapViewState::new();
        map.move_cursor(&projects, true);
        assert_eq!(map.cursor_project(&projects).map(|p| p.id.as_str()), Some("a"));
        map.move_cursor(&projects, true);
        assert_eq!(map.cursor_project(&projects).map(|p| p.id.as_str()), Some("c"));
        map.move_cursor(&projects, true);
        assert_eq!(map.cursor_project(&projects).map(|p| p.id.as_str()), Some("a"));
        map.move_cursor(&projects, false);
        assert_eq!(map.cursor_project(&projects).map(|p| p.id.as_str()), Some("c"));
    }

    #[test]
    fn enter_on_cursor_emits_select() {
        let projects = vec![project("a", 40.0, -105.0, ProjectStatus::Active)];
        let mut map = MapViewState::new();
        assert!(handle_key(&mut map, KeyCode::Enter, &projects).is_none());
        handle_key(&mut map, KeyCode::Char(']'), &projects);
        match handle_key(&mut map, KeyCode::Enter, &projects) {
            Some(MapIntent::Select(p)) => assert_eq!(p.id, "a"),
            None => panic!("expected a selection"),
        }
    }

    fn rendered(state: &MapViewState, projects: &[Project], selection: &Selection, focused: bool) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal
            .draw(|f| {
                let area = f.size();
                render_map(f, area, state, projects, selection, focused);
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol.as_str())
            .collect()
    }

    #[test]
    fn filtered_out_selection_is_neither_labelled_nor_detailed() {
        let visible = vec![project("vis", 40.0, -100.0, ProjectStatus::Active)];
        let mut selection = Selection::new();
        selection.select(project("hiddenproj", 41.0, -99.0, ProjectStatus::Pending));

        let screen = rendered(&MapViewState::new(), &visible, &selection, false);
        assert!(!screen.contains("HIDDENPROJ"));
        assert!(!screen.contains("Details"));

        selection.select(visible[0].clone());
        let screen = rendered(&MapViewState::new(), &visible, &selection, false);
        assert!(screen.contains("VIS"));
        assert!(screen.contains("Details"));
    }

    #[test]
    fn details_show_the_marker_under_the_cursor() {
        let mut described = project("lake", 40.0, -100.0, ProjectStatus::Completed);
        described.category = Some("Water".to_string());
        described.budget = Some(1_250_000.0);
        let projects = vec![described, project("river", 35.0, -90.0, ProjectStatus::Active)];
        let mut selection = Selection::new();
        selection.select(projects[1].clone());

        let mut map = MapViewState::new();
        map.move_cursor(&projects, true);
        let screen = rendered(&map, &projects, &selection, true);
        assert!(screen.contains("Status: Completed"));
        assert!(screen.contains("Category: Water"));
        assert!(screen.contains("Budget: $1,250,000"));

        // unfocused, the panel falls back to the selection
        let screen = rendered(&map, &projects, &selection, false);
        assert!(screen.contains("Status: Active"));
        assert!(screen.contains("Budget: $0"));
    }

    #[test]
    fn detail_lines_fill_absent_fields() {
        let text: Vec<String> = detail_lines(&project("bare", 40.0, -100.0, ProjectStatus::Pending))
            .iter()
            .map(|line| line.0.iter().map(|span| span.content.as_ref()).collect())
            .collect();
        assert_eq!(
            text,
            vec![
                "BARE",
                "Status: Pending",
                "Category: -",
                "Budget: $0",
                "Updated: 1970-01-01",
            ]
        );
    }

    #[test]
    fn zoom_is_clamped() {
        let mut map = MapViewState::new();
        for _ in 0..20 {
            map.zoom_in();
        }
        assert_eq!(map.viewport().zoom, MAX_ZOOM);
        for _ in 0..20 {
            map.zoom_out();
        }
        assert_eq!(map.viewport().zoom, MIN_ZOOM);
        assert!((map.viewport().longitude_span() - 360.0).abs() < 1e-9);
    }
}
