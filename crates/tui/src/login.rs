use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::{
    input::TextInput,
    theme::{centered_rect, Theme},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Email,
    Password,
}

pub(crate) enum LoginAction {
    None,
    Submit { email: String, password: String },
    Quit,
}

pub(crate) struct LoginForm {
    email: TextInput,
    password: TextInput,
    focus: Focus,
    pub error: Option<String>,
    pub submitting: bool,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            email: TextInput::default(),
            password: TextInput::masked(),
            focus: Focus::Email,
            error: None,
            submitting: false,
        }
    }
}

impl LoginForm {
    fn focused(&mut self) -> &mut TextInput {
        match self.focus {
            Focus::Email => &mut self.email,
            Focus::Password => &mut self.password,
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Email => Focus::Password,
            Focus::Password => Focus::Email,
        };
    }

    /// Keep the e-mail, drop the password after a failed attempt.
    pub fn fail(&mut self, message: String) {
        self.submitting = false;
        self.error = Some(message);
        self.password.clear();
        self.focus = Focus::Password;
    }

    pub fn reset(&mut self) {
        let email = std::mem::take(&mut self.email);
        *self = Self {
            email,
            ..Self::default()
        };
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> LoginAction {
        if self.submitting {
            return LoginAction::None;
        }
        match key.code {
            KeyCode::Esc => return LoginAction::Quit,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => self.toggle_focus(),
            KeyCode::Enter => {
                if self.focus == Focus::Email {
                    self.focus = Focus::Password;
                    return LoginAction::None;
                }
                let email = self.email.value().trim().to_string();
                if email.is_empty() || self.password.value().is_empty() {
                    self.error = Some("E-mail and password are required".to_string());
                    return LoginAction::None;
                }
                self.error = None;
                self.submitting = true;
                return LoginAction::Submit {
                    email,
                    password: self.password.value().to_string(),
                };
            }
            KeyCode::Left => self.focused().move_cursor(-1),
            KeyCode::Right => self.focused().move_cursor(1),
            KeyCode::Home => self.focused().move_home(),
            KeyCode::End => self.focused().move_end(),
            KeyCode::Backspace => self.focused().backspace(),
            KeyCode::Delete => self.focused().delete(),
            KeyCode::Char(ch)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                self.focused().insert(ch)
            }
            _ => {}
        }
        LoginAction::None
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let modal = centered_rect(56, 11, area);
        frame.render_widget(Clear, modal);

        let field = |label: &str, input: &TextInput, focus: Focus| {
            let style = if self.focus == focus {
                theme.selected()
            } else {
                Style::default().fg(theme.primary_fg)
            };
            Line::from(vec![
                Span::styled(format!("{label:<10}"), Style::default().fg(theme.accent)),
                Span::styled(input.display(), style),
            ])
        };
        let status = if self.submitting {
            Line::from(Span::styled("Signing in…", Style::default().fg(theme.warning)))
        } else if let Some(error) = &self.error {
            Line::from(Span::styled(error.clone(), Style::default().fg(theme.danger)))
        } else {
            Line::from("")
        };
        let helper = Line::from(vec![
            Span::styled(" Enter ", theme.key_hint()),
            Span::raw(" sign in  "),
            Span::styled(" Tab ", theme.key_hint()),
            Span::raw(" switch  "),
            Span::styled(" Esc ", theme.key_hint()),
            Span::raw(" quit"),
        ]);

        let paragraph = Paragraph::new(vec![
            Line::from("Administrator access only"),
            Line::from(""),
            field("E-mail", &self.email, Focus::Email),
            field("Password", &self.password, Focus::Password),
            Line::from(""),
            status,
            Line::from(""),
            helper,
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" sgadmin · Sign in ", theme.title()))
                .title_alignment(Alignment::Center),
        )
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, modal);

        if !self.submitting {
            let (row, input) = match self.focus {
                Focus::Email => (3, &self.email),
                Focus::Password => (4, &self.password),
            };
            let x = modal.x + 11 + input.cursor() as u16;
            let y = modal.y + row;
            if x < modal.x + modal.width.saturating_sub(1) {
                frame.set_cursor(x, y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(form: &mut LoginForm, text: &str) {
        for ch in text.chars() {
            form.handle_key(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn submits_credentials_from_password_field() {
        let mut form = LoginForm::default();
        type_text(&mut form, "admin@example.com");
        assert!(matches!(form.handle_key(key(KeyCode::Enter)), LoginAction::None));
        type_text(&mut form, "pw");
        match form.handle_key(key(KeyCode::Enter)) {
            LoginAction::Submit { email, password } => {
                assert_eq!(email, "admin@example.com");
                assert_eq!(password, "pw");
            }
            _ => panic!("expected submit"),
        }
        assert!(form.submitting);
    }

    #[test]
    fn failure_keeps_email_and_clears_password() {
        let mut form = LoginForm::default();
        type_text(&mut form, "a@b.c");
        form.handle_key(key(KeyCode::Tab));
        type_text(&mut form, "secret");
        form.handle_key(key(KeyCode::Enter));
        form.fail("Invalid credentials".to_string());
        assert_eq!(form.email.value(), "a@b.c");
        assert!(form.password.value().is_empty());
        assert_eq!(form.error.as_deref(), Some("Invalid credentials"));
        assert!(!form.submitting);
    }

    #[test]
    fn empty_fields_are_not_submitted() {
        let mut form = LoginForm::default();
        form.handle_key(key(KeyCode::Tab));
        assert!(matches!(form.handle_key(key(KeyCode::Enter)), LoginAction::None));
        assert!(form.error.is_some());
    }
}
