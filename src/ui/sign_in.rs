use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tracing::info;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::User;
use crate::ui::components::text_input::TextInputState;

pub const MIN_PASSWORD_LEN: usize = 4;
const INVALID_CREDENTIALS: &str = "Invalid credentials. Please try again.";

pub enum SignInAction {
    Submit,
    Anonymous,
    Exit,
}

#[derive(Clone, Copy, PartialEq)]
pub enum SignInField {
    Email,
    Password,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum SignInFlow {
    SignIn,
    SignUp,
}

impl SignInFlow {
    fn title(&self) -> &'static str {
        match self {
            SignInFlow::SignIn => "Sign in",
            SignInFlow::SignUp => "Sign up",
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            SignInFlow::SignIn => "Successfully signed in",
            SignInFlow::SignUp => "Successfully signed up",
        }
    }
}

/// Client-side credential check. Any email with a long enough password passes;
/// the user is named after the local part of the address.
pub fn authenticate(email: &str, password: &str) -> Option<User> {
    if email.is_empty() || password.chars().count() < MIN_PASSWORD_LEN {
        return None;
    }
    let name = email.split('@').next().unwrap_or(email);
    Some(User::new(name))
}

/// `Guest<n>` with n below 1000.
pub fn guest_user(seed: u32) -> User {
    User::new(format!("Guest{}", seed % 1000))
}

pub struct SignInState {
    pub email: TextInputState,
    pub password: TextInputState,
    pub current_field: SignInField,
    pub flow: SignInFlow,
    pub submitting: bool,
    message: Option<(String, bool)>,
}

impl SignInState {
    pub fn new() -> Self {
        Self {
            email: TextInputState::new(),
            password: TextInputState::masked(),
            current_field: SignInField::Email,
            flow: SignInFlow::SignIn,
            submitting: false,
            message: None,
        }
    }

    pub fn editing(&self) -> bool {
        self.email.editing || self.password.editing
    }

    fn current_input(&mut self) -> &mut TextInputState {
        match self.current_field {
            SignInField::Email => &mut self.email,
            SignInField::Password => &mut self.password,
        }
    }

    pub fn toggle_editing(&mut self) {
        self.current_input().toggle_editing();
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            SignInField::Email => SignInField::Password,
            SignInField::Password => SignInField::Email,
        };
    }

    pub fn toggle_flow(&mut self) {
        self.flow = match self.flow {
            SignInFlow::SignIn => SignInFlow::SignUp,
            SignInFlow::SignUp => SignInFlow::SignIn,
        };
    }

    /// Checks the form after the simulated round trip.
    pub async fn submit(&mut self, delay: Duration) -> Option<User> {
        self.submitting = true;
        tokio::time::sleep(delay).await;
        self.submitting = false;

        match authenticate(&self.email.value, &self.password.value) {
            Some(user) => {
                info!(user = %user.name, flow = ?self.flow, "signed in");
                self.message = Some((self.flow.success_message().to_string(), true));
                Some(user)
            }
            None => {
                self.message = Some((INVALID_CREDENTIALS.to_string(), false));
                None
            }
        }
    }

    pub fn sign_in_anonymously(&mut self) -> User {
        let seed = chrono::Local::now().timestamp_subsec_millis();
        let user = guest_user(seed);
        info!(user = %user.name, "signed in anonymously");
        self.message = Some(("Signed in anonymously".to_string(), true));
        user
    }

    pub fn message(&self) -> Option<&(String, bool)> {
        self.message.as_ref()
    }
}

impl Default for SignInState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_sign_in<B: Backend>(f: &mut Frame<B>, state: &SignInState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = Paragraph::new(format!("Geo Data Dashboard - {}", state.flow.title()))
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);

    let message = match state.message() {
        Some((text, true)) => Span::styled(text.clone(), Style::default().fg(Color::Green)),
        Some((text, false)) => Span::styled(text.clone(), Style::default().fg(Color::Red)),
        None if state.submitting => Span::styled("Checking...", Style::default().fg(Color::Gray)),
        None => Span::raw(""),
    };
    let message = Paragraph::new(Spans::from(vec![message])).block(Block::default().borders(Borders::ALL));
    f.render_widget(message, chunks[2]);

    let help_text = if state.editing() {
        "Enter - Save field | Esc - Cancel editing"
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Submit | G - Guest | M - Sign in/up | Esc - Quit"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[4]);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &SignInState, area: Rect) {
    let fields = [
        (SignInField::Email, "Email", &state.email),
        (SignInField::Password, "Password", &state.password),
    ];

    let items: Vec<ListItem> = fields
        .iter()
        .map(|(field, name, input)| {
            let label_style = if *field == state.current_field {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let value_style = if input.editing {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Spans::from(vec![
                Span::styled(format!("{}: ", name), label_style),
                Span::styled(input.get_display_string(), value_style),
            ]))
        })
        .collect();

    let form = List::new(items).block(Block::default().borders(Borders::ALL).title("Credentials"));
    f.render_widget(form, area);
}

pub fn handle_input(state: &mut SignInState) -> Result<Option<SignInAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Esc => {
                if state.editing() {
                    state.toggle_editing();
                } else {
                    return Ok(Some(SignInAction::Exit));
                }
            }
            KeyCode::Enter => state.toggle_editing(),
            KeyCode::Up | KeyCode::Down | KeyCode::Tab if !state.editing() => state.next_field(),
            KeyCode::Char('s') if !state.editing() => return Ok(Some(SignInAction::Submit)),
            KeyCode::Char('g') if !state.editing() => return Ok(Some(SignInAction::Anonymous)),
            KeyCode::Char('m') if !state.editing() => state.toggle_flow(),
            code if state.editing() => {
                state.current_input().handle_input(code);
            }
            _ => {}
        }
    }
    Ok(None)
}
