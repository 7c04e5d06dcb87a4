use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Single-line text field used by the search box and the sign-in form.
pub struct TextInputState {
    pub value: String,
    pub editing: bool,
    masked: bool,
}

impl TextInputState {
    pub fn new() -> Self {
        Self {
            value: String::new(),
            editing: false,
            masked: false,
        }
    }

    /// Field whose contents render as asterisks.
    pub fn masked() -> Self {
        Self {
            masked: true,
            ..Self::new()
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
    }

    /// Applies a key while editing. Returns true if the value changed.
    pub fn handle_input(&mut self, key: KeyCode) -> bool {
        if !self.editing {
            return false;
        }

        match key {
            KeyCode::Char(c) => {
                self.value.push(c);
                true
            }
            KeyCode::Backspace => self.value.pop().is_some(),
            _ => false,
        }
    }

    pub fn get_display_string(&self) -> String {
        let shown = if self.masked {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        };

        if self.editing {
            format!("{}|", shown)
        } else {
            shown
        }
    }
}

impl Default for TextInputState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_text_input<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    title: &str,
    state: &TextInputState,
    focused: bool,
) {
    let border_style = if state.editing {
        Style::default().fg(Color::Yellow)
    } else if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let text_style = if state.editing {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let input = Paragraph::new(Spans::from(vec![Span::styled(
        state.get_display_string(),
        text_style,
    )]))
    .block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(border_style),
    );

    frame.render_widget(input, area);
}
