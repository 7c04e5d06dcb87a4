use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Spans,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub enum LoadErrorAction {
    Retry,
    SignOut,
    Exit,
}

pub fn render_loading<B: Backend>(frame: &mut Frame<B>, message: &str) {
    let clear_block = Block::default().style(Style::default().bg(Color::Black));
    frame.render_widget(clear_block, frame.size());

    let area = centered_rect(40, 20, frame.size());
    let loading = Paragraph::new(message.to_string())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(loading, area);
}

pub fn render_load_error<B: Backend>(frame: &mut Frame<B>, message: &str) {
    let area = centered_rect(60, 30, frame.size());

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from("Could not load projects."),
        Spans::from(""),
        Spans::from(message.to_string()),
        Spans::from(""),
        Spans::from("<R> Retry  <O> Sign out  <Q> Quit"),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(Block::default().title("Load Failed").borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(popup, area);
}

// Helper function to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn handle_load_error_input() -> Result<Option<LoadErrorAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Char('r') => return Ok(Some(LoadErrorAction::Retry)),
            KeyCode::Char('o') => return Ok(Some(LoadErrorAction::SignOut)),
            KeyCode::Char('q') | KeyCode::Esc => return Ok(Some(LoadErrorAction::Exit)),
            _ => {}
        }
    }
    Ok(None)
}
