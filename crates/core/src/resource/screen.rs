//! State machine shared by every resource screen.
//!
//! Each remote operation is split into a `begin`/`request` step that returns
//! what to send and an `apply` step that consumes the result, so the caller
//! can run requests concurrently and apply them in whatever order they
//! resolve.

use std::collections::HashSet;

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use super::{
    entities::Resource,
    form::{EntityForm, FormMode, FormSession},
    lookup::{Lookup, LookupEntry, Lookups},
};
use crate::{
    api::{ApiError, FormPayload},
    models::User,
};

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Neutral information.
    Info,
    /// An operation completed.
    Success,
    /// An operation failed.
    Error,
}

/// Transient message for the status bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Text shown to the operator.
    pub message: String,
    /// The server rejected the credential; the session must be dropped.
    pub session_expired: bool,
    /// When the notice was raised.
    pub at: DateTime<Local>,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            session_expired: false,
            at: Local::now(),
        }
    }

    /// Neutral notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    /// Success notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    /// Failure notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    /// Failure notice for a remote call, flagging rejected credentials.
    pub fn from_api(context: &str, err: &ApiError) -> Self {
        let mut notice = Self::error(format!("{context}: {err}"));
        notice.session_expired = err.is_unauthorized();
        notice
    }
}

/// Collection lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    /// A list request is in flight.
    Loading,
    /// The collection reflects the last successful list.
    Ready,
    /// The last list request failed.
    Error(String),
}

/// Modal shown above the table.
#[derive(Debug, Clone)]
pub enum Overlay<F> {
    /// Create or edit form.
    Form(FormSession<F>),
    /// Delete confirmation for record `id`.
    ConfirmDelete {
        /// Record to delete.
        id: u64,
        /// Label shown in the prompt.
        label: String,
        /// Highlighted answer.
        yes_selected: bool,
    },
}

/// Request produced by a form submit.
#[derive(Debug, Clone, PartialEq)]
pub enum Submit {
    /// Create a record.
    Create(FormPayload),
    /// Update record `id`.
    Update {
        /// Target record.
        id: u64,
        /// Encoded form.
        payload: FormPayload,
    },
}

/// List/create/edit/delete controller for one entity type.
///
/// The screen owns its collection exclusively. Create and update results are
/// patched in with the server's canonical record, deletes are filtered out
/// locally; nothing triggers a full reload on its own.
#[derive(Debug, Clone)]
pub struct ResourceScreen<R: Resource> {
    items: Vec<R>,
    state: LoadState,
    overlay: Option<Overlay<R::Form>>,
    lookups: Lookups,
    filter: String,
    cursor: usize,
    deleted: HashSet<u64>,
}

impl<R: Resource> Default for ResourceScreen<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> ResourceScreen<R> {
    /// A freshly mounted screen waiting for its first list.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            state: LoadState::Loading,
            overlay: None,
            lookups: Lookups::default(),
            filter: String::new(),
            cursor: 0,
            deleted: HashSet::new(),
        }
    }

    /// Whole collection in server order.
    pub fn items(&self) -> &[R] {
        &self.items
    }

    /// Collection lifecycle.
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Open modal, if any.
    pub fn overlay(&self) -> Option<&Overlay<R::Form>> {
        self.overlay.as_ref()
    }

    /// Lookup tables backing the open form.
    pub fn lookups(&self) -> &Lookups {
        &self.lookups
    }

    /// Open form together with the lookups its selectors read.
    pub fn form_mut(&mut self) -> Option<(&mut FormSession<R::Form>, &Lookups)> {
        match self.overlay.as_mut() {
            Some(Overlay::Form(session)) => Some((session, &self.lookups)),
            _ => None,
        }
    }

    /// Mark a list request as started. Current rows stay visible.
    pub fn begin_load(&mut self) {
        self.state = LoadState::Loading;
    }

    /// Replace the collection wholesale with a list result.
    pub fn apply_loaded(&mut self, result: Result<Vec<R>, ApiError>) -> Option<Notice> {
        match result {
            Ok(items) => {
                let total = items.len();
                self.items = items
                    .into_iter()
                    .filter(|item| !self.deleted.contains(&item.id()))
                    .collect();
                self.state = LoadState::Ready;
                self.clamp_cursor();
                debug!(kind = %R::KIND, total, kept = self.items.len(), "Collection loaded");
                None
            }
            Err(err) => {
                warn!(kind = %R::KIND, error = %err, "Collection fetch failed");
                self.items.clear();
                self.cursor = 0;
                self.state = LoadState::Error(err.to_string());
                Some(Notice::from_api(
                    &format!("Failed to load {}", R::KIND.slug()),
                    &err,
                ))
            }
        }
    }

    /// Rows matching the filter, in collection order.
    pub fn rows(&self) -> Vec<&R> {
        let needle = self.filter.trim().to_lowercase();
        self.items
            .iter()
            .filter(|item| needle.is_empty() || item.search_text().to_lowercase().contains(&needle))
            .collect()
    }

    /// Current filter text.
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Replace the filter text.
    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        self.clamp_cursor();
    }

    /// Highlighted row index among [`ResourceScreen::rows`].
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Highlighted record.
    pub fn selected(&self) -> Option<&R> {
        self.rows().get(self.cursor).copied()
    }

    /// Move the highlight by `delta`, clamped.
    pub fn move_cursor(&mut self, delta: isize) {
        let total = self.rows().len() as isize;
        self.cursor = if total == 0 {
            0
        } else {
            (self.cursor as isize + delta).clamp(0, total - 1) as usize
        };
    }

    /// Move the highlight to `index`, clamped.
    pub fn move_to(&mut self, index: usize) {
        self.cursor = index;
        self.clamp_cursor();
    }

    fn clamp_cursor(&mut self) {
        let total = self.rows().len();
        if total == 0 {
            self.cursor = 0;
        } else if self.cursor >= total {
            self.cursor = total - 1;
        }
    }

    /// Open an empty create form. Returns the lookups to fetch.
    pub fn open_create(&mut self) -> Option<Vec<Lookup>> {
        if self.overlay.is_some() {
            return None;
        }
        self.overlay = Some(Overlay::Form(FormSession::new(
            FormMode::Create,
            R::Form::default(),
        )));
        Some(R::Form::lookups())
    }

    /// Open an edit form pre-filled from record `id`. Returns the lookups to fetch.
    pub fn open_edit(&mut self, id: u64) -> Option<Vec<Lookup>> {
        if self.overlay.is_some() {
            return None;
        }
        let item = self.items.iter().find(|item| item.id() == id)?;
        let form = R::Form::from_item(item);
        for (lookup, entry) in R::Form::known_labels(item) {
            self.lookups.seed(lookup, entry);
        }
        self.overlay = Some(Overlay::Form(FormSession::new(FormMode::Edit(id), form)));
        Some(R::Form::lookups())
    }

    /// Store a fetched lookup table. Failures leave the form usable.
    pub fn apply_lookup(
        &mut self,
        lookup: Lookup,
        result: Result<Vec<LookupEntry>, ApiError>,
    ) -> Option<Notice> {
        match result {
            Ok(entries) => {
                let mut entries = entries;
                for known in self.lookups.entries(lookup) {
                    if !entries.iter().any(|entry| entry.id == known.id) {
                        entries.push(known.clone());
                    }
                }
                self.lookups.insert(lookup, entries);
                None
            }
            Err(err) => {
                warn!(kind = %R::KIND, lookup = lookup.noun(), error = %err, "Lookup fetch failed");
                Some(Notice::from_api(
                    &format!("Failed to load {}", lookup.noun()),
                    &err,
                ))
            }
        }
    }

    /// Close any modal without submitting.
    pub fn cancel(&mut self) {
        self.overlay = None;
    }

    /// Validate the open form and produce its request.
    ///
    /// `Ok(None)` when there is no form or a submit is already in flight.
    /// Validation errors are kept on the form and returned as a notice.
    pub fn begin_submit(&mut self) -> Result<Option<Submit>, Notice> {
        let Some(Overlay::Form(session)) = self.overlay.as_mut() else {
            return Ok(None);
        };
        if session.submitting {
            return Ok(None);
        }
        if let Err(message) = session.form.validate() {
            session.error = Some(message.clone());
            return Err(Notice::error(message));
        }
        session.error = None;
        session.submitting = true;
        session.picker = None;
        let payload = session.form.to_payload();
        Ok(Some(match session.mode {
            FormMode::Create => Submit::Create(payload),
            FormMode::Edit(id) => Submit::Update { id, payload },
        }))
    }

    fn submitting_form(&mut self, mode: FormMode) -> Option<&mut FormSession<R::Form>> {
        match self.overlay.as_mut() {
            Some(Overlay::Form(session)) if session.mode == mode && session.submitting => {
                Some(session)
            }
            _ => None,
        }
    }

    fn fail_submit(&mut self, mode: FormMode, context: &str, err: &ApiError) -> Notice {
        warn!(kind = %R::KIND, error = %err, "{context}");
        let notice = Notice::from_api(context, err);
        if let Some(session) = self.submitting_form(mode) {
            session.submitting = false;
            session.error = Some(err.to_string());
        }
        notice
    }

    /// Append the created record and close its form.
    pub fn apply_created(&mut self, result: Result<R, ApiError>) -> Notice {
        match result {
            Ok(item) => {
                if self.submitting_form(FormMode::Create).is_some() {
                    self.overlay = None;
                }
                let notice = Notice::success(format!(
                    "Created {} {}",
                    R::KIND.singular(),
                    item.label()
                ));
                self.upsert(item);
                notice
            }
            Err(err) => self.fail_submit(
                FormMode::Create,
                &format!("Failed to create {}", R::KIND.singular()),
                &err,
            ),
        }
    }

    /// Replace record `id` with the server's copy and close its form.
    pub fn apply_updated(&mut self, id: u64, result: Result<R, ApiError>) -> Notice {
        match result {
            Ok(item) => {
                if self.submitting_form(FormMode::Edit(id)).is_some() {
                    self.overlay = None;
                }
                let notice = Notice::success(format!(
                    "Updated {} {}",
                    R::KIND.singular(),
                    item.label()
                ));
                self.replace(id, item);
                notice
            }
            Err(err) => self.fail_submit(
                FormMode::Edit(id),
                &format!("Failed to update {}", R::KIND.singular()),
                &err,
            ),
        }
    }

    /// Ask for confirmation before deleting record `id`.
    pub fn request_delete(&mut self, id: u64) -> bool {
        if self.overlay.is_some() {
            return false;
        }
        let Some(item) = self.items.iter().find(|item| item.id() == id) else {
            return false;
        };
        self.overlay = Some(Overlay::ConfirmDelete {
            id,
            label: item.label(),
            yes_selected: false,
        });
        true
    }

    /// Move the highlight between Yes and No.
    pub fn toggle_confirm(&mut self) {
        if let Some(Overlay::ConfirmDelete { yes_selected, .. }) = self.overlay.as_mut() {
            *yes_selected = !*yes_selected;
        }
    }

    /// The highlighted confirmation answer.
    pub fn confirm_selection(&self) -> Option<bool> {
        match self.overlay {
            Some(Overlay::ConfirmDelete { yes_selected, .. }) => Some(yes_selected),
            _ => None,
        }
    }

    /// Close the confirmation. Returns the id to delete on Yes.
    pub fn confirm_delete(&mut self, yes: bool) -> Option<u64> {
        match self.overlay.take() {
            Some(Overlay::ConfirmDelete { id, .. }) if yes => Some(id),
            Some(Overlay::ConfirmDelete { .. }) => None,
            other => {
                self.overlay = other;
                None
            }
        }
    }

    /// Remove record `id` once the server confirms the delete.
    pub fn apply_deleted(&mut self, id: u64, result: Result<(), ApiError>) -> Notice {
        match result {
            Ok(()) => {
                self.deleted.insert(id);
                self.items.retain(|item| item.id() != id);
                self.clamp_cursor();
                Notice::success(format!("Deleted {} #{id}", R::KIND.singular()))
            }
            Err(err) => {
                warn!(kind = %R::KIND, id, error = %err, "Delete failed");
                Notice::from_api(&format!("Failed to delete {}", R::KIND.singular()), &err)
            }
        }
    }

    fn upsert(&mut self, item: R) {
        if self.deleted.contains(&item.id()) {
            return;
        }
        match self.items.iter_mut().find(|known| known.id() == item.id()) {
            Some(slot) => *slot = item,
            None => self.items.push(item),
        }
    }

    fn replace(&mut self, id: u64, item: R) {
        if let Some(slot) = self.items.iter_mut().find(|known| known.id() == id) {
            *slot = item;
        }
    }
}

impl ResourceScreen<User> {
    /// Target of an admin toggle on record `id`: its id and the negated flag.
    pub fn admin_toggle_request(&self, id: u64) -> Option<(u64, bool)> {
        if self.overlay.is_some() {
            return None;
        }
        self.items
            .iter()
            .find(|user| user.id == id)
            .map(|user| (user.id, !user.is_admin))
    }

    /// Replace the user with the server's record after an admin toggle.
    pub fn apply_admin_toggled(&mut self, id: u64, result: Result<User, ApiError>) -> Notice {
        match result {
            Ok(user) => {
                let message = if user.is_admin {
                    format!("{} is now an administrator", user.username)
                } else {
                    format!("{} is no longer an administrator", user.username)
                };
                self.replace(id, user);
                Notice::success(message)
            }
            Err(err) => {
                warn!(user_id = id, error = %err, "Admin toggle failed");
                Notice::from_api("Failed to change admin rights", &err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Genre, Group};
    use reqwest::StatusCode;

    fn genre(id: u64, name: &str) -> Genre {
        Genre {
            id,
            name: name.to_string(),
        }
    }

    fn user(id: u64, is_admin: bool) -> User {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "username": format!("user{id}"),
            "email": format!("user{id}@example.com"),
            "is_admin": is_admin,
        }))
        .expect("user")
    }

    fn server_error(status: StatusCode) -> ApiError {
        ApiError::Status {
            status,
            message: "nope".to_string(),
        }
    }

    fn ready(items: Vec<Genre>) -> ResourceScreen<Genre> {
        let mut screen = ResourceScreen::new();
        assert!(screen.apply_loaded(Ok(items)).is_none());
        screen
    }

    fn names(screen: &ResourceScreen<Genre>) -> Vec<(u64, String)> {
        screen
            .items()
            .iter()
            .map(|genre| (genre.id, genre.name.clone()))
            .collect()
    }

    #[test]
    fn list_replaces_wholesale() {
        let list = vec![genre(1, "A"), genre(2, "B")];
        let mut screen = ready(list.clone());
        screen.begin_load();
        assert_eq!(screen.state(), &LoadState::Loading);
        screen.apply_loaded(Ok(list.clone()));
        assert_eq!(screen.items(), list.as_slice());
        assert_eq!(screen.state(), &LoadState::Ready);
    }

    #[test]
    fn failed_list_leaves_empty_error_state() {
        let mut screen = ready(vec![genre(1, "A")]);
        screen.begin_load();
        let notice = screen
            .apply_loaded(Err(server_error(StatusCode::INTERNAL_SERVER_ERROR)))
            .expect("notice");
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(!notice.session_expired);
        assert!(screen.items().is_empty());
        assert!(matches!(screen.state(), LoadState::Error(_)));
        assert!(screen.selected().is_none());
    }

    #[test]
    fn create_appends_canonical_item() {
        let mut screen = ready(vec![genre(1, "A")]);
        assert_eq!(screen.open_create(), Some(Vec::new()));
        if let Some((session, _)) = screen.form_mut() {
            for ch in "b".chars() {
                session.insert(ch);
            }
        }
        let submit = screen.begin_submit().expect("valid").expect("submit");
        assert!(matches!(submit, Submit::Create(_)));
        assert_eq!(screen.begin_submit(), Ok(None));

        screen.apply_created(Ok(genre(2, "B")));
        assert_eq!(names(&screen), vec![(1, "A".into()), (2, "B".into())]);
        assert!(screen.overlay().is_none());
    }

    #[test]
    fn failed_create_keeps_form_values() {
        let mut screen = ready(vec![genre(1, "A")]);
        screen.open_create();
        if let Some((session, _)) = screen.form_mut() {
            session.insert('Z');
        }
        screen.begin_submit().expect("valid");
        let notice = screen.apply_created(Err(server_error(StatusCode::UNPROCESSABLE_ENTITY)));
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(screen.items().len(), 1);
        let (session, _) = screen.form_mut().expect("form still open");
        assert_eq!(session.form.0.name, "Z");
        assert!(!session.submitting);
        assert!(session.error.is_some());
    }

    #[test]
    fn invalid_form_is_not_submitted() {
        let mut screen = ready(Vec::new());
        screen.open_create();
        let notice = screen.begin_submit().expect_err("name missing");
        assert_eq!(notice.message, "Name is required");
        let (session, _) = screen.form_mut().expect("form");
        assert!(!session.submitting);
    }

    #[test]
    fn edit_replaces_by_id_and_preserves_others() {
        let mut screen = ready(vec![genre(1, "A"), genre(2, "B")]);
        screen.open_edit(1).expect("edit");
        let submit = screen.begin_submit().expect("valid").expect("submit");
        assert!(matches!(submit, Submit::Update { id: 1, .. }));
        screen.apply_updated(1, Ok(genre(1, "A2")));
        assert_eq!(names(&screen), vec![(1, "A2".into()), (2, "B".into())]);
        assert!(screen.overlay().is_none());
    }

    #[test]
    fn delete_confirmation_controls_removal() {
        let mut screen = ready(vec![genre(1, "A"), genre(2, "B"), genre(3, "C")]);
        assert!(screen.request_delete(2));
        assert_eq!(screen.confirm_delete(false), None);
        assert_eq!(screen.items().len(), 3);

        screen.request_delete(2);
        screen.toggle_confirm();
        assert_eq!(screen.confirm_selection(), Some(true));
        assert_eq!(screen.confirm_delete(true), Some(2));
        screen.apply_deleted(2, Ok(()));
        assert_eq!(names(&screen), vec![(1, "A".into()), (3, "C".into())]);
    }

    #[test]
    fn failed_delete_keeps_collection() {
        let mut screen = ready(vec![genre(1, "A")]);
        let notice = screen.apply_deleted(1, Err(server_error(StatusCode::UNAUTHORIZED)));
        assert!(notice.session_expired);
        assert_eq!(screen.items().len(), 1);
    }

    #[test]
    fn delete_before_list_does_not_resurrect_row() {
        let mut screen = ready(vec![genre(1, "A"), genre(2, "B")]);
        screen.begin_load();
        screen.request_delete(1);
        let id = screen.confirm_delete(true).expect("id");
        screen.apply_deleted(id, Ok(()));
        screen.apply_loaded(Ok(vec![genre(1, "A"), genre(2, "B")]));
        assert_eq!(names(&screen), vec![(2, "B".into())]);
    }

    #[test]
    fn admin_toggle_uses_server_value() {
        let mut screen: ResourceScreen<User> = ResourceScreen::new();
        screen.apply_loaded(Ok(vec![user(1, false), user(2, true)]));
        assert_eq!(screen.admin_toggle_request(1), Some((1, true)));

        // the server refuses to promote and returns the unchanged record
        screen.apply_admin_toggled(1, Ok(user(1, false)));
        assert!(!screen.items()[0].is_admin);

        screen.apply_admin_toggled(2, Ok(user(2, false)));
        assert!(!screen.items()[1].is_admin);
    }

    #[test]
    fn filter_narrows_rows_and_clamps_cursor() {
        let mut screen = ready(vec![genre(1, "Action"), genre(2, "Puzzle"), genre(3, "RPG")]);
        screen.move_cursor(5);
        assert_eq!(screen.cursor(), 2);
        screen.set_filter("puz");
        assert_eq!(screen.cursor(), 0);
        assert_eq!(screen.selected().map(|genre| genre.id), Some(2));
        screen.set_filter("");
        assert_eq!(screen.rows().len(), 3);
    }

    #[test]
    fn lookup_failure_leaves_form_open() {
        let mut screen: ResourceScreen<Group> = ResourceScreen::new();
        screen.apply_loaded(Ok(Vec::new()));
        let lookups = screen.open_create().expect("form");
        assert_eq!(lookups, vec![Lookup::Games, Lookup::Users]);
        let notice = screen
            .apply_lookup(Lookup::Games, Err(ApiError::MissingCredential))
            .expect("notice");
        assert!(notice.message.starts_with("Failed to load games"));
        assert!(screen.form_mut().is_some());
        assert!(screen
            .apply_lookup(Lookup::Users, Ok(vec![LookupEntry::new(1, "ada")]))
            .is_none());
        assert_eq!(screen.lookups().label(Lookup::Users, 1), "ada");
    }
}
