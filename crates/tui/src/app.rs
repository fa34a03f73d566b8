use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use sgadmin_core::{
    auth::{self, AuthError},
    nav::{self, Route, LANDING},
    resource::{Notice, NoticeLevel},
    ApiClient, ResourceKind, SessionPhase, SessionStore,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::{
    login::{LoginAction, LoginForm},
    screen::{AnyScreen, ScreenCtx, ScreenUpdate, ViewState},
    theme::{centered_rect, contains, Theme},
};

const TICK_RATE: Duration = Duration::from_millis(250);
const NOTICE_TTL_SECS: i64 = 8;

pub(crate) enum AppEvent {
    Input(Event),
    Tick,
    LoginFinished(Result<(), AuthError>),
    Screen { mount: u64, update: ScreenUpdate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuEntry {
    Resource(ResourceKind),
    Logout,
    Quit,
}

const MENU: [MenuEntry; 8] = [
    MenuEntry::Resource(ResourceKind::Users),
    MenuEntry::Resource(ResourceKind::Games),
    MenuEntry::Resource(ResourceKind::Genres),
    MenuEntry::Resource(ResourceKind::Platforms),
    MenuEntry::Resource(ResourceKind::Groups),
    MenuEntry::Resource(ResourceKind::Posts),
    MenuEntry::Logout,
    MenuEntry::Quit,
];

impl MenuEntry {
    fn label(self) -> &'static str {
        match self {
            MenuEntry::Resource(kind) => kind.title(),
            MenuEntry::Logout => "Logout",
            MenuEntry::Quit => "Quit",
        }
    }
}

struct Mounted {
    token: u64,
    screen: AnyScreen,
    view: ViewState,
}

/// Top-level state of the admin console.
pub struct AdminApp {
    api: ApiClient,
    session: SessionStore,
    route: Route,
    login: LoginForm,
    menu_cursor: usize,
    mounted: Option<Mounted>,
    next_mount: u64,
    status: Option<Notice>,
    theme: Theme,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    should_quit: bool,
}

impl AdminApp {
    pub fn new(api: ApiClient, session: SessionStore) -> Self {
        Self {
            api,
            session,
            route: LANDING,
            login: LoginForm::default(),
            menu_cursor: 0,
            mounted: None,
            next_mount: 0,
            status: None,
            theme: Theme::default(),
            event_tx: None,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);

        // First frame shows the restoring placeholder, then the guard decides.
        terminal.draw(|frame| self.draw(frame))?;
        let phase = self.session.restore();
        info!(?phase, "Session restore finished");
        self.navigate(self.route);

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.should_quit {
                break;
            }
            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) || self.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                self.handle_input(event);
                true
            }
            Some(AppEvent::Tick) => {
                self.handle_tick();
                true
            }
            Some(AppEvent::LoginFinished(result)) => {
                self.handle_login_result(result);
                true
            }
            Some(AppEvent::Screen { mount, update }) => {
                self.apply_screen_update(mount, update);
                true
            }
            None => false,
        }
    }

    fn handle_tick(&mut self) {
        let expired = self.status.as_ref().is_some_and(|notice| {
            notice.level != NoticeLevel::Error
                && (chrono::Local::now() - notice.at).num_seconds() >= NOTICE_TTL_SECS
        });
        if expired {
            self.status = None;
        }
    }

    fn notify(&mut self, notice: Notice) {
        if notice.session_expired && self.session.is_authenticated() {
            self.expire_session();
            return;
        }
        match notice.level {
            NoticeLevel::Error => error!(message = %notice.message, "Notice"),
            _ => debug!(message = %notice.message, "Notice"),
        }
        self.status = Some(notice);
    }

    fn expire_session(&mut self) {
        info!("Credential rejected; signing out");
        if let Err(err) = self.session.logout() {
            error!(?err, "Failed to clear expired session");
        }
        self.status = Some(Notice::error("Session expired, please sign in again"));
        self.navigate(Route::Login);
    }

    fn apply_screen_update(&mut self, mount: u64, update: ScreenUpdate) {
        let Some(mounted) = self.mounted.as_mut().filter(|mounted| mounted.token == mount) else {
            debug!(mount, "Dropping result for unmounted screen");
            return;
        };
        if let Some(notice) = update(&mut mounted.screen) {
            self.notify(notice);
        }
    }

    fn navigate(&mut self, requested: Route) {
        let phase = self.session.phase();
        let Some(route) = nav::resolve(requested, phase) else {
            self.route = requested;
            return;
        };
        if route != requested {
            debug!(?requested, ?route, "Route redirected");
        }
        self.route = route;
        match route {
            Route::Resource(kind) => self.mount(kind),
            Route::Login => {
                self.mounted = None;
                self.login.reset();
            }
            Route::Home => {
                self.mounted = None;
            }
        }
    }

    fn mount(&mut self, kind: ResourceKind) {
        if self
            .mounted
            .as_ref()
            .is_some_and(|mounted| mounted.screen.kind() == kind)
        {
            return;
        }
        let Some(tx) = self.event_tx.clone() else {
            return;
        };
        self.next_mount += 1;
        let token = self.next_mount;
        let mut screen = AnyScreen::new(kind);
        let ctx = ScreenCtx {
            api: self.api.clone(),
            tx,
            mount: token,
        };
        screen.load(&ctx);
        info!(%kind, token, "Screen mounted");
        self.mounted = Some(Mounted {
            token,
            screen,
            view: ViewState::default(),
        });
    }

    fn logout(&mut self) {
        match self.session.logout() {
            Ok(()) => self.notify(Notice::success("Signed out")),
            Err(err) => {
                error!(?err, "Logout failed");
                self.notify(Notice::error(format!("Logout failed: {err:#}")));
            }
        }
        self.navigate(Route::Login);
    }

    fn handle_login_result(&mut self, result: Result<(), AuthError>) {
        match result {
            Ok(()) => {
                let name = self
                    .session
                    .principal()
                    .map(|user| user.display_name())
                    .unwrap_or_default();
                self.login.reset();
                self.notify(Notice::success(format!("Welcome, {name}")));
                self.navigate(LANDING);
            }
            Err(err) => {
                info!(error = %err, "Login failed");
                self.login.fail(err.user_message());
            }
        }
    }

    fn submit_login(&mut self, email: String, password: String) {
        let Some(tx) = self.event_tx.clone() else {
            return;
        };
        let api = self.api.clone();
        let session = self.session.clone();
        tokio::spawn(async move {
            let result = auth::authenticate(&api, &session, &email, &password).await;
            if tx.send(AppEvent::LoginFinished(result)).await.is_err() {
                debug!("Event loop gone; dropping login result");
            }
        });
    }

    fn handle_input(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if let Some(mounted) = self.mounted.as_mut() {
            if let Some(area) = mounted.view.modal_area {
                if !contains(area, mouse.column, mouse.row) {
                    mounted.screen.cancel();
                    mounted.view.modal_area = None;
                    self.notify(Notice::info("Changes discarded"));
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if nav::guard(self.route, self.session.phase()) != nav::Guard::Render {
            return;
        }
        match self.route {
            Route::Login => match self.login.handle_key(key) {
                LoginAction::Submit { email, password } => self.submit_login(email, password),
                LoginAction::Quit => self.should_quit = true,
                LoginAction::None => {}
            },
            Route::Home => self.handle_menu_key(key),
            Route::Resource(_) => self.handle_resource_key(key),
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => {
                self.menu_cursor = (self.menu_cursor + 1).min(MENU.len() - 1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.menu_cursor = self.menu_cursor.saturating_sub(1);
            }
            KeyCode::Char('L') => self.logout(),
            KeyCode::Char(ch @ '1'..='6') => {
                let idx = ch as usize - '1' as usize;
                self.navigate(Route::Resource(ResourceKind::ALL[idx]));
            }
            KeyCode::Enter => match MENU[self.menu_cursor] {
                MenuEntry::Resource(kind) => self.navigate(Route::Resource(kind)),
                MenuEntry::Logout => self.logout(),
                MenuEntry::Quit => self.should_quit = true,
            },
            _ => {}
        }
    }

    fn handle_resource_key(&mut self, key: KeyEvent) {
        let Some(tx) = self.event_tx.clone() else {
            return;
        };
        let Some(mounted) = self.mounted.as_mut() else {
            return;
        };
        let busy = mounted.screen.has_overlay() || mounted.view.filtering;
        if !busy {
            let current = mounted.screen.kind().index();
            let target = match key.code {
                KeyCode::Char(ch @ '1'..='6') => Some(ch as usize - '1' as usize),
                KeyCode::Char(']') | KeyCode::Right => {
                    Some((current + 1) % ResourceKind::ALL.len())
                }
                KeyCode::Char('[') | KeyCode::Left => {
                    Some((current + ResourceKind::ALL.len() - 1) % ResourceKind::ALL.len())
                }
                _ => None,
            };
            if let Some(idx) = target {
                self.navigate(Route::Resource(ResourceKind::ALL[idx]));
                return;
            }
            match key.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Esc | KeyCode::Char('h') => {
                    self.navigate(Route::Home);
                    return;
                }
                KeyCode::Char('L') => {
                    self.logout();
                    return;
                }
                _ => {}
            }
        }
        let ctx = ScreenCtx {
            api: self.api.clone(),
            tx,
            mount: mounted.token,
        };
        if let Some(notice) = mounted.screen.handle_key(key, &mut mounted.view, &ctx) {
            self.notify(notice);
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        match nav::guard(self.route, self.session.phase()) {
            nav::Guard::Wait => {
                let splash = Paragraph::new("Restoring session…")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(self.theme.muted));
                frame.render_widget(splash, centered_rect(area.width, 1, area));
                return;
            }
            nav::Guard::Redirect(_) => return,
            nav::Guard::Render => {}
        }

        if self.route == Route::Login {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(3)])
                .split(area);
            self.login.render(frame, chunks[0], &self.theme);
            self.render_status(frame, chunks[1]);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(3),
            ])
            .split(area);
        self.render_shell(frame, chunks[0]);
        match self.route {
            Route::Resource(_) => {
                if let Some(mounted) = self.mounted.as_mut() {
                    mounted
                        .screen
                        .render(frame, chunks[1], &mut mounted.view, &self.theme, &self.api);
                }
            }
            _ => self.draw_menu(frame, chunks[1]),
        }
        self.render_status(frame, chunks[2]);
    }

    fn render_shell(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ResourceKind::ALL
            .iter()
            .enumerate()
            .map(|(idx, kind)| Line::from(format!("{} {}", idx + 1, kind.title())))
            .collect();
        let selected = match self.route {
            Route::Resource(kind) => kind.index(),
            _ => usize::MAX,
        };
        let who = self
            .session
            .principal()
            .map(|user| format!(" {} · L logout ", user.username))
            .unwrap_or_default();
        let mut tabs = Tabs::new(titles)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Span::styled(" sgadmin ", self.theme.title()))
                    .title(
                        ratatui::widgets::block::Title::from(Span::styled(
                            who,
                            Style::default().fg(self.theme.muted),
                        ))
                        .alignment(Alignment::Right),
                    ),
            )
            .style(Style::default().fg(self.theme.primary_fg))
            .highlight_style(
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            );
        if selected != usize::MAX {
            tabs = tabs.select(selected);
        } else {
            tabs = tabs.highlight_style(Style::default().fg(self.theme.primary_fg));
        }
        frame.render_widget(tabs, area);
    }

    fn draw_menu(&self, frame: &mut Frame, area: Rect) {
        let menu_height = (MENU.len() as u16)
            .saturating_mul(2)
            .saturating_add(2)
            .min(area.height);
        let menu_width = 32.min(area.width.max(1));
        let menu_area = centered_rect(menu_width, menu_height, area);

        let menu_lines: Vec<Line> = MENU
            .iter()
            .enumerate()
            .flat_map(|(idx, item)| {
                let line = if idx == self.menu_cursor {
                    Line::from(Span::styled(
                        format!("▶ {}", item.label()),
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(Span::styled(
                        format!("  {}", item.label()),
                        Style::default().fg(self.theme.primary_fg),
                    ))
                };
                [line, Line::from("")]
            })
            .collect();

        let menu = Paragraph::new(menu_lines)
            .block(Block::default().borders(Borders::ALL).title(" Dashboard "))
            .alignment(Alignment::Center);
        frame.render_widget(menu, menu_area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title(" Status ");
        let line = match &self.status {
            Some(notice) => Line::from(vec![
                Span::styled(
                    notice.at.format("%H:%M:%S ").to_string(),
                    Style::default().fg(self.theme.muted),
                ),
                Span::styled(notice.message.clone(), self.theme.notice(notice.level)),
            ]),
            None => Line::from(Span::styled(
                "Ready",
                Style::default().fg(self.theme.muted),
            )),
        };
        let paragraph = Paragraph::new(line).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::Mountable;
    use sgadmin_core::{
        models::{Genre, User},
        AppConfig,
    };
    use tempfile::{tempdir, TempDir};

    fn app() -> Result<(AdminApp, TempDir)> {
        let dir = tempdir()?;
        let config = AppConfig {
            api_base_url: "http://127.0.0.1:9".to_string(),
            media_base_url: None,
            request_timeout_secs: Some(1),
            session_dir: dir.path().join("session"),
            log_dir: dir.path().join("logs"),
        };
        let session = SessionStore::new(&config.session_dir);
        let api = ApiClient::new(&config, session.clone())?;
        Ok((AdminApp::new(api, session), dir))
    }

    fn admin() -> User {
        serde_json::from_value(serde_json::json!({
            "id": 1, "username": "root", "email": "root@example.com", "is_admin": true
        }))
        .expect("user")
    }

    #[test]
    fn anonymous_start_lands_on_login() -> Result<()> {
        let (mut app, _dir) = app()?;
        app.session.restore();
        app.navigate(Route::Resource(ResourceKind::Games));
        assert_eq!(app.route, Route::Login);
        assert!(app.mounted.is_none());
        Ok(())
    }

    #[test]
    fn rejected_credential_signs_out() -> Result<()> {
        let (mut app, _dir) = app()?;
        app.session.login(admin(), "tok")?;
        app.navigate(Route::Home);
        assert_eq!(app.route, Route::Home);

        let mut notice = Notice::error("Failed to load users: Unauthenticated. (401)");
        notice.session_expired = true;
        app.notify(notice);
        assert_eq!(app.session.phase(), SessionPhase::Anonymous);
        assert_eq!(app.route, Route::Login);
        Ok(())
    }

    fn left_click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn click_outside_modal_cancels_it() -> Result<()> {
        let (mut app, _dir) = app()?;
        let mut screen = AnyScreen::new(ResourceKind::Genres);
        Genre::project(&mut screen).expect("genres").open_create();
        app.mounted = Some(Mounted {
            token: 1,
            screen,
            view: ViewState {
                modal_area: Some(Rect::new(10, 5, 30, 8)),
                ..ViewState::default()
            },
        });

        app.handle_mouse(left_click(12, 6));
        let mounted = app.mounted.as_ref().expect("mounted");
        assert!(mounted.screen.has_overlay());

        app.handle_mouse(left_click(2, 2));
        let mounted = app.mounted.as_ref().expect("mounted");
        assert!(!mounted.screen.has_overlay());
        assert!(mounted.view.modal_area.is_none());
        Ok(())
    }

    #[test]
    fn stale_screen_updates_are_ignored() -> Result<()> {
        let (mut app, _dir) = app()?;
        app.mounted = Some(Mounted {
            token: 2,
            screen: AnyScreen::new(ResourceKind::Genres),
            view: ViewState::default(),
        });
        app.apply_screen_update(1, Box::new(|_| Some(Notice::error("stale"))));
        assert!(app.status.is_none());
        app.apply_screen_update(2, Box::new(|_| Some(Notice::success("fresh"))));
        assert_eq!(app.status.as_ref().map(|n| n.message.as_str()), Some("fresh"));
        Ok(())
    }
}
