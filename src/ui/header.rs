use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::query::StatusFilter;
use crate::ui::components::text_input::{render_text_input, TextInputState};

/// Title bar, search box and status chips.
pub fn render_header<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    search: &TextInputState,
    status_filter: StatusFilter,
    total_projects: usize,
    user_name: &str,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(30),
                Constraint::Percentage(30),
                Constraint::Percentage(40),
            ]
            .as_ref(),
        )
        .split(area);

    let title = Paragraph::new(vec![
        Spans::from(vec![Span::styled(
            "Geo Data Dashboard",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )]),
        Spans::from(vec![
            Span::raw(format!("{} projects", total_projects)),
            Span::styled(format!("  {}", user_name), Style::default().fg(Color::Gray)),
        ]),
    ])
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    render_text_input(frame, chunks[1], "Search </>", search, false);

    let mut chips = Vec::with_capacity(StatusFilter::ALL.len() * 2);
    for filter in StatusFilter::ALL {
        let style = if filter == status_filter {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        chips.push(Span::styled(format!(" {} ", filter.label()), style));
        chips.push(Span::raw(" "));
    }

    let filters = Paragraph::new(Spans::from(chips))
        .block(Block::default().title("Status <F>").borders(Borders::ALL));
    frame.render_widget(filters, chunks[2]);
}
