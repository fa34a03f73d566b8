//! Terminal adapter for the generic resource screens.
//!
//! Requests run in spawned tasks; their results come back through the app
//! channel as [`ScreenUpdate`] closures tagged with the mount token of the
//! screen that issued them.

use std::future::Future;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState,
        Wrap,
    },
    Frame,
};
use sgadmin_core::{
    models::{Game, Genre, Group, Platform, Post, User},
    resource::{
        EntityForm, FieldKind, FormMode, FormSession, LoadState, Lookup, Lookups, Notice,
        Overlay, Resource, ResourceKind, ResourceScreen, Submit,
    },
    ApiClient,
};
use tokio::sync::mpsc;
use tracing::debug;

use crate::{
    app::AppEvent,
    theme::{centered_rect, Theme},
};

/// Deferred mutation of a mounted screen.
pub(crate) type ScreenUpdate = Box<dyn FnOnce(&mut AnyScreen) -> Option<Notice> + Send>;

/// One screen per resource kind.
pub(crate) enum AnyScreen {
    Users(ResourceScreen<User>),
    Games(ResourceScreen<Game>),
    Genres(ResourceScreen<Genre>),
    Platforms(ResourceScreen<Platform>),
    Groups(ResourceScreen<Group>),
    Posts(ResourceScreen<Post>),
}

macro_rules! with_screen {
    ($any:expr, $screen:ident => $body:expr) => {
        match $any {
            AnyScreen::Users($screen) => $body,
            AnyScreen::Games($screen) => $body,
            AnyScreen::Genres($screen) => $body,
            AnyScreen::Platforms($screen) => $body,
            AnyScreen::Groups($screen) => $body,
            AnyScreen::Posts($screen) => $body,
        }
    };
}

/// Ties a resource to its [`AnyScreen`] variant and its screen-specific keys.
pub(crate) trait Mountable: Resource {
    fn wrap(screen: ResourceScreen<Self>) -> AnyScreen;

    fn project(screen: &mut AnyScreen) -> Option<&mut ResourceScreen<Self>>;

    /// Keys beyond list/create/edit/delete. `None` when not handled.
    fn extra_key(
        _screen: &mut ResourceScreen<Self>,
        _key: &KeyEvent,
        _ctx: &ScreenCtx,
    ) -> Option<Option<Notice>> {
        None
    }

    fn extra_hints() -> &'static [(&'static str, &'static str)] {
        &[]
    }
}

macro_rules! mountable {
    ($item:ty, $variant:ident) => {
        impl Mountable for $item {
            fn wrap(screen: ResourceScreen<Self>) -> AnyScreen {
                AnyScreen::$variant(screen)
            }

            fn project(screen: &mut AnyScreen) -> Option<&mut ResourceScreen<Self>> {
                match screen {
                    AnyScreen::$variant(screen) => Some(screen),
                    _ => None,
                }
            }
        }
    };
}

mountable!(Game, Games);
mountable!(Genre, Genres);
mountable!(Platform, Platforms);
mountable!(Group, Groups);
mountable!(Post, Posts);

impl Mountable for User {
    fn wrap(screen: ResourceScreen<Self>) -> AnyScreen {
        AnyScreen::Users(screen)
    }

    fn project(screen: &mut AnyScreen) -> Option<&mut ResourceScreen<Self>> {
        match screen {
            AnyScreen::Users(screen) => Some(screen),
            _ => None,
        }
    }

    fn extra_key(
        screen: &mut ResourceScreen<Self>,
        key: &KeyEvent,
        ctx: &ScreenCtx,
    ) -> Option<Option<Notice>> {
        if key.code != KeyCode::Char('a') || !key.modifiers.is_empty() {
            return None;
        }
        let id = screen.selected().map(|user| user.id)?;
        let (id, is_admin) = screen.admin_toggle_request(id)?;
        let api = ctx.api.clone();
        ctx.spawn(
            async move { api.set_admin(id, is_admin).await },
            move |screen: &mut ResourceScreen<User>, result| {
                Some(screen.apply_admin_toggled(id, result))
            },
        );
        Some(Some(Notice::info(format!(
            "Requesting admin rights change for user #{id}"
        ))))
    }

    fn extra_hints() -> &'static [(&'static str, &'static str)] {
        &[("a", "admin")]
    }
}

impl AnyScreen {
    pub fn new(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Users => User::wrap(ResourceScreen::new()),
            ResourceKind::Games => Game::wrap(ResourceScreen::new()),
            ResourceKind::Genres => Genre::wrap(ResourceScreen::new()),
            ResourceKind::Platforms => Platform::wrap(ResourceScreen::new()),
            ResourceKind::Groups => Group::wrap(ResourceScreen::new()),
            ResourceKind::Posts => Post::wrap(ResourceScreen::new()),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            AnyScreen::Users(_) => ResourceKind::Users,
            AnyScreen::Games(_) => ResourceKind::Games,
            AnyScreen::Genres(_) => ResourceKind::Genres,
            AnyScreen::Platforms(_) => ResourceKind::Platforms,
            AnyScreen::Groups(_) => ResourceKind::Groups,
            AnyScreen::Posts(_) => ResourceKind::Posts,
        }
    }

    pub fn has_overlay(&self) -> bool {
        with_screen!(self, screen => screen.overlay().is_some())
    }

    pub fn load(&mut self, ctx: &ScreenCtx) {
        with_screen!(self, screen => load(screen, ctx))
    }

    pub fn cancel(&mut self) {
        with_screen!(self, screen => screen.cancel())
    }

    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        view: &mut ViewState,
        ctx: &ScreenCtx,
    ) -> Option<Notice> {
        with_screen!(self, screen => handle_key(screen, key, view, ctx))
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        view: &mut ViewState,
        theme: &Theme,
        api: &ApiClient,
    ) {
        with_screen!(self, screen => render(screen, frame, area, view, theme, api))
    }
}

/// Terminal-only state of a mounted screen.
#[derive(Debug, Default)]
pub(crate) struct ViewState {
    pub filtering: bool,
    pub table: TableState,
    pub modal_area: Option<Rect>,
}

/// What a screen needs to issue requests.
pub(crate) struct ScreenCtx {
    pub api: ApiClient,
    pub tx: mpsc::Sender<AppEvent>,
    pub mount: u64,
}

impl ScreenCtx {
    /// Run `request` and apply its result to the screen that issued it.
    pub fn spawn<R, T, Fut, F>(&self, request: Fut, apply: F)
    where
        R: Mountable,
        T: Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        F: FnOnce(&mut ResourceScreen<R>, T) -> Option<Notice> + Send + 'static,
    {
        let tx = self.tx.clone();
        let mount = self.mount;
        tokio::spawn(async move {
            let result = request.await;
            let update: ScreenUpdate = Box::new(move |any: &mut AnyScreen| {
                R::project(any).and_then(|screen| apply(screen, result))
            });
            if tx.send(AppEvent::Screen { mount, update }).await.is_err() {
                debug!(mount, "Event loop gone; dropping screen update");
            }
        });
    }
}

fn load<R: Mountable>(screen: &mut ResourceScreen<R>, ctx: &ScreenCtx) {
    screen.begin_load();
    let api = ctx.api.clone();
    ctx.spawn(
        async move { api.list::<R>().await },
        |screen: &mut ResourceScreen<R>, result| screen.apply_loaded(result),
    );
}

fn fetch_lookups<R: Mountable>(lookups: Vec<Lookup>, ctx: &ScreenCtx) {
    for lookup in lookups {
        let api = ctx.api.clone();
        ctx.spawn(
            async move { api.lookup(lookup).await },
            move |screen: &mut ResourceScreen<R>, result| screen.apply_lookup(lookup, result),
        );
    }
}

fn submit<R: Mountable>(screen: &mut ResourceScreen<R>, ctx: &ScreenCtx) -> Option<Notice> {
    let request = match screen.begin_submit() {
        Ok(Some(request)) => request,
        Ok(None) => return None,
        Err(notice) => return Some(notice),
    };
    let api = ctx.api.clone();
    match request {
        Submit::Create(payload) => ctx.spawn(
            async move { api.create::<R>(payload).await },
            |screen: &mut ResourceScreen<R>, result| Some(screen.apply_created(result)),
        ),
        Submit::Update { id, payload } => ctx.spawn(
            async move { api.update::<R>(id, payload).await },
            move |screen: &mut ResourceScreen<R>, result| Some(screen.apply_updated(id, result)),
        ),
    }
    Some(Notice::info("Saving…"))
}

fn delete<R: Mountable>(id: u64, ctx: &ScreenCtx) -> Option<Notice> {
    let api = ctx.api.clone();
    ctx.spawn(
        async move { api.delete(R::KIND, id).await },
        move |screen: &mut ResourceScreen<R>, result| Some(screen.apply_deleted(id, result)),
    );
    Some(Notice::info(format!("Deleting {} #{id}…", R::KIND.singular())))
}

fn handle_key<R: Mountable>(
    screen: &mut ResourceScreen<R>,
    key: KeyEvent,
    view: &mut ViewState,
    ctx: &ScreenCtx,
) -> Option<Notice> {
    if let Some((session, lookups)) = screen.form_mut() {
        return match handle_form_key(session, lookups, &key) {
            FormAction::None => None,
            FormAction::Cancel => {
                screen.cancel();
                Some(Notice::info("Changes discarded"))
            }
            FormAction::Submit => submit(screen, ctx),
        };
    }
    if screen.confirm_selection().is_some() {
        let answer = match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                screen.toggle_confirm();
                return None;
            }
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(false),
            KeyCode::Enter => screen.confirm_selection(),
            _ => None,
        }?;
        return screen
            .confirm_delete(answer)
            .and_then(|id| delete::<R>(id, ctx));
    }
    if view.filtering {
        handle_filter_key(screen, view, &key);
        return None;
    }
    if let Some(notice) = R::extra_key(screen, &key, ctx) {
        return notice;
    }
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => screen.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => screen.move_cursor(-1),
        KeyCode::Char('g') | KeyCode::Home => screen.move_to(0),
        KeyCode::Char('G') | KeyCode::End => screen.move_to(usize::MAX),
        KeyCode::PageDown => screen.move_cursor(10),
        KeyCode::PageUp => screen.move_cursor(-10),
        KeyCode::Char('/') => {
            view.filtering = true;
            return Some(Notice::info("Type to filter, Enter to keep, Esc to clear"));
        }
        KeyCode::Char('r') => {
            load(screen, ctx);
            return Some(Notice::info(format!("Reloading {}…", R::KIND.slug())));
        }
        KeyCode::Char('n') | KeyCode::Char('c') => {
            let lookups = screen.open_create()?;
            fetch_lookups::<R>(lookups, ctx);
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            let id = screen.selected().map(Resource::id)?;
            let lookups = screen.open_edit(id)?;
            fetch_lookups::<R>(lookups, ctx);
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            let id = screen.selected().map(Resource::id)?;
            screen.request_delete(id);
        }
        _ => {}
    }
    None
}

fn handle_filter_key<R: Resource>(
    screen: &mut ResourceScreen<R>,
    view: &mut ViewState,
    key: &KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            view.filtering = false;
            screen.set_filter("");
        }
        KeyCode::Enter => view.filtering = false,
        KeyCode::Backspace => {
            let mut filter = screen.filter().to_string();
            filter.pop();
            screen.set_filter(filter);
        }
        KeyCode::Char(ch) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            let filter = format!("{}{ch}", screen.filter());
            screen.set_filter(filter);
        }
        _ => {}
    }
}

enum FormAction {
    None,
    Cancel,
    Submit,
}

fn handle_form_key<F: EntityForm>(
    session: &mut FormSession<F>,
    lookups: &Lookups,
    key: &KeyEvent,
) -> FormAction {
    if session.submitting {
        return FormAction::None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('s') {
        return FormAction::Submit;
    }
    if session.picker.is_some() {
        match key.code {
            KeyCode::Esc => session.close_picker(),
            KeyCode::Up => session.move_picker(-1, lookups),
            KeyCode::Down => session.move_picker(1, lookups),
            KeyCode::Enter => session.choose(lookups),
            KeyCode::Backspace => session.picker_input(None),
            KeyCode::Char(ch) if !ctrl => session.picker_input(Some(ch)),
            _ => {}
        }
        return FormAction::None;
    }
    let Some(spec) = session.current() else {
        return FormAction::Cancel;
    };
    match key.code {
        KeyCode::Esc => return FormAction::Cancel,
        KeyCode::Tab | KeyCode::Down => session.move_focus(1),
        KeyCode::BackTab | KeyCode::Up => session.move_focus(-1),
        KeyCode::Enter => match spec.kind {
            FieldKind::Reference(_) | FieldKind::References(_) => {
                session.open_picker();
            }
            FieldKind::Privacy => session.toggle_privacy(),
            _ if session.cursor + 1 == F::fields().len() => return FormAction::Submit,
            _ => session.move_focus(1),
        },
        KeyCode::Char(' ') if spec.kind == FieldKind::Privacy => session.toggle_privacy(),
        KeyCode::Backspace | KeyCode::Delete if !spec.kind.is_textual() => session.clear_current(),
        KeyCode::Backspace => session.backspace(),
        KeyCode::Delete => session.delete(),
        KeyCode::Left => session.move_caret(-1),
        KeyCode::Right => session.move_caret(1),
        KeyCode::Home => session.caret_home(),
        KeyCode::End => session.caret_end(),
        KeyCode::Char('u') if ctrl => session.clear_current(),
        KeyCode::Char(ch) if !ctrl && spec.kind.is_textual() => session.insert(ch),
        _ => {}
    }
    FormAction::None
}

fn render<R: Mountable>(
    screen: &ResourceScreen<R>,
    frame: &mut Frame,
    area: Rect,
    view: &mut ViewState,
    theme: &Theme,
    api: &ApiClient,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(4)])
        .split(area);
    render_table(screen, frame, chunks[0], view, theme);
    render_details(screen, frame, chunks[1], view, theme, api);

    view.modal_area = match screen.overlay() {
        Some(Overlay::Form(session)) => {
            Some(render_form(session, screen.lookups(), frame, area, theme))
        }
        Some(Overlay::ConfirmDelete { label, yes_selected, .. }) => {
            Some(render_confirm::<R>(label, *yes_selected, frame, area, theme))
        }
        None => None,
    };
}

fn render_table<R: Resource>(
    screen: &ResourceScreen<R>,
    frame: &mut Frame,
    area: Rect,
    view: &mut ViewState,
    theme: &Theme,
) {
    let rows = screen.rows();
    let headers = R::headers();
    let widths: Vec<Constraint> = headers
        .iter()
        .enumerate()
        .map(|(idx, _)| {
            if idx == 0 {
                Constraint::Length(6)
            } else {
                Constraint::Fill(1)
            }
        })
        .collect();

    let body: Vec<Row> = if rows.is_empty() {
        let placeholder = match screen.state() {
            LoadState::Loading => format!("Loading {}…", R::KIND.slug()),
            LoadState::Error(message) => format!("Could not load {}: {message}", R::KIND.slug()),
            LoadState::Ready if !screen.filter().is_empty() => {
                "No rows match the filter".to_string()
            }
            LoadState::Ready => format!("No {} yet", R::KIND.slug()),
        };
        let style = match screen.state() {
            LoadState::Error(_) => Style::default().fg(theme.danger),
            LoadState::Loading => Style::default().fg(theme.warning),
            LoadState::Ready => Style::default().fg(theme.muted),
        };
        vec![Row::new(vec![Cell::from(""), Cell::from(placeholder).style(style)])]
    } else {
        rows.iter()
            .map(|item| Row::new(item.columns().into_iter().map(Cell::from).collect::<Vec<_>>()))
            .collect()
    };

    view.table.select((!rows.is_empty()).then_some(screen.cursor()));

    let mut title = vec![Span::styled(
        format!(" {} ({}) ", R::KIND.title(), rows.len()),
        theme.title(),
    )];
    if matches!(screen.state(), LoadState::Loading) && !rows.is_empty() {
        title.push(Span::styled("refreshing… ", Style::default().fg(theme.warning)));
    }
    if view.filtering || !screen.filter().is_empty() {
        title.push(Span::styled(
            format!("/{}{} ", screen.filter(), if view.filtering { "_" } else { "" }),
            Style::default().fg(theme.accent),
        ));
    }

    let header = Row::new(headers.iter().map(|title| Cell::from(*title)).collect::<Vec<_>>())
        .style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));
    let table = Table::new(body, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(Line::from(title)))
        .highlight_style(theme.selected())
        .highlight_symbol("▶ ");
    frame.render_stateful_widget(table, area, &mut view.table);
}

fn render_details<R: Mountable>(
    screen: &ResourceScreen<R>,
    frame: &mut Frame,
    area: Rect,
    view: &ViewState,
    theme: &Theme,
    api: &ApiClient,
) {
    let mut hints: Vec<(&str, &str)> = if view.filtering {
        vec![("Enter", "keep"), ("Esc", "clear")]
    } else {
        vec![("n", "new"), ("e", "edit"), ("d", "delete"), ("/", "filter"), ("r", "reload")]
    };
    if !view.filtering {
        hints.extend_from_slice(R::extra_hints());
    }
    let mut hint_spans = Vec::new();
    for (key, action) in hints {
        hint_spans.push(Span::styled(format!(" {key} "), theme.key_hint()));
        hint_spans.push(Span::raw(format!(" {action}  ")));
    }

    let media = screen
        .selected()
        .map(|item| {
            item.media()
                .into_iter()
                .map(|(label, path)| format!("{label}: {}", api.media_url(path)))
                .collect::<Vec<_>>()
                .join("  ")
        })
        .unwrap_or_default();

    let paragraph = Paragraph::new(vec![
        Line::from(hint_spans),
        Line::from(Span::styled(media, Style::default().fg(theme.muted))),
    ])
    .block(Block::default().borders(Borders::ALL))
    .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_form<F: EntityForm>(
    session: &FormSession<F>,
    lookups: &Lookups,
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
) -> Rect {
    let fields = F::fields();
    let height = (fields.len() as u16 + 6).max(9);
    let modal = centered_rect(area.width.saturating_sub(8).min(90), height, area);
    frame.render_widget(Clear, modal);

    let title = match session.mode {
        FormMode::Create => " New record ".to_string(),
        FormMode::Edit(id) => format!(" Edit #{id} "),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title, theme.title()));
    let inner = block.inner(modal);
    frame.render_widget(block, modal);

    let label_width = fields.iter().map(|spec| spec.label.len()).max().unwrap_or(0) + 2;
    let mut lines: Vec<Line> = fields
        .iter()
        .enumerate()
        .map(|(idx, spec)| {
            let focused = idx == session.cursor;
            let marker = if spec.required { "*" } else { " " };
            let label = format!("{:<label_width$}", format!("{}{marker}", spec.label));
            let value = session.display_value(spec, lookups);
            let value_style = if focused {
                theme.selected()
            } else {
                Style::default().fg(theme.primary_fg)
            };
            let suffix = match spec.kind {
                FieldKind::Reference(_) | FieldKind::References(_) if focused => " (Enter to pick)",
                FieldKind::Privacy if focused => " (Space to toggle)",
                FieldKind::Date if focused => " (YYYY-MM-DD)",
                FieldKind::Attachment if focused => " (local file path)",
                _ => "",
            };
            Line::from(vec![
                Span::styled(label, Style::default().fg(theme.accent)),
                Span::styled(value, value_style),
                Span::styled(suffix, Style::default().fg(theme.muted)),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    if session.submitting {
        lines.push(Line::from(Span::styled("Saving…", Style::default().fg(theme.warning))));
    } else if let Some(error) = &session.error {
        lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(theme.danger))));
    } else {
        lines.push(Line::from(Span::styled(
            "Tab move · Ctrl+S save · Esc cancel",
            Style::default().fg(theme.muted),
        )));
    }
    frame.render_widget(Paragraph::new(lines), inner);

    if let Some(spec) = session.current() {
        if spec.kind.is_textual() && session.picker.is_none() && !session.submitting {
            let column = u16::try_from(label_width + session.caret).unwrap_or(u16::MAX);
            let row = u16::try_from(session.cursor).unwrap_or(u16::MAX);
            let x = inner.x.saturating_add(column);
            let y = inner.y.saturating_add(row);
            if x < inner.right() && y < inner.bottom() {
                frame.set_cursor(x, y);
            }
        }
    }

    if session.picker.is_some() {
        render_picker(session, lookups, frame, modal, theme);
    }
    modal
}

fn render_picker<F: EntityForm>(
    session: &FormSession<F>,
    lookups: &Lookups,
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
) {
    let Some(picker) = &session.picker else {
        return;
    };
    let options = session.picker_options(lookups);
    let popup = centered_rect(
        area.width.saturating_sub(10).min(50),
        area.height.saturating_sub(2).max(6),
        area,
    );
    frame.render_widget(Clear, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(popup);
    let query = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().fg(theme.accent)),
        Span::raw(picker.query.clone()),
    ]))
    .block(Block::default().borders(Borders::ALL).title(" Search "));
    frame.render_widget(query, chunks[0]);

    let items: Vec<ListItem> = if options.is_empty() {
        vec![ListItem::new(Span::styled("No options", Style::default().fg(theme.muted)))]
    } else {
        options
            .iter()
            .map(|entry| {
                let mark = if session.is_selected(entry.id) { "[x] " } else { "[ ] " };
                ListItem::new(format!("{mark}{}", entry.label))
            })
            .collect()
    };
    let mut state = ListState::default();
    if !options.is_empty() {
        state.select(Some(picker.cursor.min(options.len() - 1)));
    }
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Enter select · Esc close "))
        .highlight_style(theme.selected());
    frame.render_stateful_widget(list, chunks[1], &mut state);
}

fn render_confirm<R: Resource>(
    label: &str,
    yes_selected: bool,
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
) -> Rect {
    let modal = centered_rect(50, 7, area);
    frame.render_widget(Clear, modal);
    let button = |text: &'static str, active: bool| {
        if active {
            Span::styled(format!(" {text} "), theme.key_hint())
        } else {
            Span::styled(format!(" {text} "), Style::default().fg(theme.primary_fg))
        }
    };
    let paragraph = Paragraph::new(vec![
        Line::from(format!("Delete {} {label}?", R::KIND.singular())),
        Line::from(""),
        Line::from(vec![
            button("Yes", yes_selected),
            Span::raw("   "),
            button("No", !yes_selected),
        ]),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(" Confirm ", Style::default().fg(theme.danger))),
    )
    .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, modal);
    modal
}
