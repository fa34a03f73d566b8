//! Typed form records and the editing session around them.
//!
//! Each entity form is a plain struct with typed fields. The static
//! [`FieldSpec`] table drives rendering and validation; `to_payload` is the
//! single place where a form is mapped onto the wire.

use std::{fmt, path::Path};

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::lookup::{Lookup, LookupEntry, Lookups};
use crate::{api::FormPayload, models::Privacy};

/// Wire format of date fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Bring an API date into [`DATE_FORMAT`] for editing.
///
/// Timestamps such as `1990-05-01T00:00:00.000000Z` keep their calendar day.
/// Values that parse as nothing known are returned unchanged.
pub fn prefill_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return date.format(DATE_FORMAT).to_string();
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return stamp.date_naive().format(DATE_FORMAT).to_string();
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|stamp| stamp.date().format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// How a field is edited and validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Text that is never echoed.
    Secret,
    /// `YYYY-MM-DD` date.
    Date,
    /// Local file path uploaded with the form.
    Attachment,
    /// Single id chosen from a lookup table.
    Reference(Lookup),
    /// Several ids chosen from a lookup table.
    References(Lookup),
    /// Public/private switch.
    Privacy,
}

impl FieldKind {
    /// Lookup table the field selects from, if any.
    pub fn lookup(self) -> Option<Lookup> {
        match self {
            FieldKind::Reference(lookup) | FieldKind::References(lookup) => Some(lookup),
            _ => None,
        }
    }

    /// True for fields edited by typing.
    pub fn is_textual(self) -> bool {
        matches!(
            self,
            FieldKind::Text | FieldKind::Secret | FieldKind::Date | FieldKind::Attachment
        )
    }
}

/// Static description of one form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Wire key, also used to address the field.
    pub key: &'static str,
    /// Label shown next to the input.
    pub label: &'static str,
    /// Editing behaviour.
    pub kind: FieldKind,
    /// Whether an empty value blocks submission.
    pub required: bool,
}

impl FieldSpec {
    /// A field that must be filled in.
    pub const fn required(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: true,
        }
    }

    /// A field that may stay empty.
    pub const fn optional(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: false,
        }
    }
}

/// Read access to a field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRef<'a> {
    /// Text-backed value.
    Text(&'a str),
    /// Single reference.
    Reference(Option<u64>),
    /// Multiple references.
    References(&'a [u64]),
    /// Privacy switch.
    Privacy(Privacy),
}

/// Write access to a field value.
#[derive(Debug)]
pub enum FieldMut<'a> {
    /// Text-backed value.
    Text(&'a mut String),
    /// Single reference.
    Reference(&'a mut Option<u64>),
    /// Multiple references.
    References(&'a mut Vec<u64>),
    /// Privacy switch.
    Privacy(&'a mut Privacy),
}

/// A typed form bound to one entity type.
pub trait EntityForm: Clone + Default + fmt::Debug + Send + 'static {
    /// Entity the form creates or edits.
    type Item;

    /// Field table, in display order.
    fn fields() -> &'static [FieldSpec];

    /// Pre-fill from an existing record.
    fn from_item(item: &Self::Item) -> Self;

    /// Read a field by key.
    fn field(&self, key: &str) -> Option<FieldRef<'_>>;

    /// Write a field by key.
    fn field_mut(&mut self, key: &str) -> Option<FieldMut<'_>>;

    /// Map the form onto its wire payload.
    fn to_payload(&self) -> FormPayload;

    /// Labels of related records embedded in `item`, used before lookups arrive.
    fn known_labels(_item: &Self::Item) -> Vec<(Lookup, LookupEntry)> {
        Vec::new()
    }

    /// Lookup tables the form's selectors need.
    fn lookups() -> Vec<Lookup> {
        let mut lookups: Vec<Lookup> = Vec::new();
        for lookup in Self::fields().iter().filter_map(|spec| spec.kind.lookup()) {
            if !lookups.contains(&lookup) {
                lookups.push(lookup);
            }
        }
        lookups
    }

    /// Check required fields, date syntax and attachment paths.
    fn validate(&self) -> Result<(), String> {
        for spec in Self::fields() {
            match self.field(spec.key) {
                Some(FieldRef::Text(value)) => {
                    let value = value.trim();
                    if value.is_empty() {
                        if spec.required {
                            return Err(format!("{} is required", spec.label));
                        }
                        continue;
                    }
                    match spec.kind {
                        FieldKind::Date => {
                            NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
                                format!("{} must be a date (YYYY-MM-DD)", spec.label)
                            })?;
                        }
                        FieldKind::Attachment if !Path::new(value).is_file() => {
                            return Err(format!("{}: no such file {value}", spec.label));
                        }
                        _ => {}
                    }
                }
                Some(FieldRef::Reference(None)) if spec.required => {
                    return Err(format!("{} is required", spec.label));
                }
                Some(FieldRef::References(ids)) if spec.required && ids.is_empty() => {
                    return Err(format!("Select at least one of {}", spec.label));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Which operation the open form will perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    /// New record.
    Create,
    /// Existing record `id`.
    Edit(u64),
}

/// Option list opened on a reference field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Picker {
    /// Case-insensitive substring narrowing the options.
    pub query: String,
    /// Highlighted option among the narrowed ones.
    pub cursor: usize,
}

/// A form being edited inside a modal.
#[derive(Debug, Clone)]
pub struct FormSession<F> {
    /// Create or edit.
    pub mode: FormMode,
    /// Current values.
    pub form: F,
    /// Focused field index.
    pub cursor: usize,
    /// Caret position, in characters, inside the focused text field.
    pub caret: usize,
    /// Open option list for the focused reference field.
    pub picker: Option<Picker>,
    /// A submit request is in flight.
    pub submitting: bool,
    /// Last validation or server error, shown inside the modal.
    pub error: Option<String>,
}

impl<F: EntityForm> FormSession<F> {
    /// Wrap `form` with focus on the first field.
    pub fn new(mode: FormMode, form: F) -> Self {
        let mut session = Self {
            mode,
            form,
            cursor: 0,
            caret: 0,
            picker: None,
            submitting: false,
            error: None,
        };
        session.caret = session.text_len();
        session
    }

    /// Spec of the focused field.
    pub fn current(&self) -> Option<&'static FieldSpec> {
        F::fields().get(self.cursor)
    }

    /// Move focus by `delta`, wrapping around.
    pub fn move_focus(&mut self, delta: isize) {
        let total = F::fields().len() as isize;
        if total == 0 {
            return;
        }
        self.cursor = (self.cursor as isize + delta).rem_euclid(total) as usize;
        self.picker = None;
        self.caret = self.text_len();
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        let spec = self.current()?;
        match self.form.field_mut(spec.key)? {
            FieldMut::Text(value) if spec.kind.is_textual() => Some(value),
            _ => None,
        }
    }

    fn text_len(&self) -> usize {
        self.current()
            .and_then(|spec| match self.form.field(spec.key) {
                Some(FieldRef::Text(value)) => Some(value.chars().count()),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// Insert a character at the caret of the focused text field.
    pub fn insert(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        let caret = self.caret;
        if let Some(value) = self.text_mut() {
            let at = byte_offset(value, caret);
            value.insert(at, ch);
            self.caret += 1;
        }
    }

    /// Remove the character before the caret.
    pub fn backspace(&mut self) {
        if self.caret == 0 {
            return;
        }
        let caret = self.caret;
        if let Some(value) = self.text_mut() {
            let at = byte_offset(value, caret - 1);
            value.remove(at);
            self.caret -= 1;
        }
    }

    /// Remove the character under the caret.
    pub fn delete(&mut self) {
        let caret = self.caret;
        if let Some(value) = self.text_mut() {
            if caret < value.chars().count() {
                let at = byte_offset(value, caret);
                value.remove(at);
            }
        }
    }

    /// Move the caret by `delta` characters.
    pub fn move_caret(&mut self, delta: isize) {
        let len = self.text_len() as isize;
        self.caret = (self.caret as isize + delta).clamp(0, len) as usize;
    }

    /// Caret to the start of the field.
    pub fn caret_home(&mut self) {
        self.caret = 0;
    }

    /// Caret to the end of the field.
    pub fn caret_end(&mut self) {
        self.caret = self.text_len();
    }

    /// Reset the focused field to empty.
    pub fn clear_current(&mut self) {
        let Some(spec) = self.current() else {
            return;
        };
        match self.form.field_mut(spec.key) {
            Some(FieldMut::Text(value)) => value.clear(),
            Some(FieldMut::Reference(value)) => *value = None,
            Some(FieldMut::References(values)) => values.clear(),
            Some(FieldMut::Privacy(value)) => *value = Privacy::default(),
            None => {}
        }
        self.caret = 0;
    }

    /// Flip the focused privacy switch.
    pub fn toggle_privacy(&mut self) {
        let Some(spec) = self.current() else {
            return;
        };
        if let Some(FieldMut::Privacy(value)) = self.form.field_mut(spec.key) {
            *value = value.toggled();
        }
    }

    /// Open the option list when the focused field is a reference.
    pub fn open_picker(&mut self) -> bool {
        let is_reference = self
            .current()
            .and_then(|spec| spec.kind.lookup())
            .is_some();
        if is_reference {
            self.picker = Some(Picker::default());
        }
        is_reference
    }

    /// Close the option list.
    pub fn close_picker(&mut self) {
        self.picker = None;
    }

    /// Options of the focused reference field narrowed by the picker query.
    pub fn picker_options<'a>(&self, lookups: &'a Lookups) -> Vec<&'a LookupEntry> {
        let Some(lookup) = self.current().and_then(|spec| spec.kind.lookup()) else {
            return Vec::new();
        };
        let needle = self
            .picker
            .as_ref()
            .map(|picker| picker.query.trim().to_lowercase())
            .unwrap_or_default();
        lookups
            .entries(lookup)
            .iter()
            .filter(|entry| needle.is_empty() || entry.label.to_lowercase().contains(&needle))
            .collect()
    }

    /// Move the picker highlight.
    pub fn move_picker(&mut self, delta: isize, lookups: &Lookups) {
        let total = self.picker_options(lookups).len();
        if let Some(picker) = self.picker.as_mut() {
            picker.cursor = if total == 0 {
                0
            } else {
                (picker.cursor as isize + delta).clamp(0, total as isize - 1) as usize
            };
        }
    }

    /// Edit the picker query.
    pub fn picker_input(&mut self, ch: Option<char>) {
        if let Some(picker) = self.picker.as_mut() {
            match ch {
                Some(ch) if !ch.is_control() => picker.query.push(ch),
                Some(_) => {}
                None => {
                    picker.query.pop();
                }
            }
            picker.cursor = 0;
        }
    }

    /// Apply the highlighted option. Single references close the picker;
    /// multi references toggle membership and stay open.
    pub fn choose(&mut self, lookups: &Lookups) {
        let Some(cursor) = self.picker.as_ref().map(|picker| picker.cursor) else {
            return;
        };
        let Some(id) = self
            .picker_options(lookups)
            .get(cursor)
            .map(|entry| entry.id)
        else {
            return;
        };
        let Some(spec) = self.current() else {
            return;
        };
        match self.form.field_mut(spec.key) {
            Some(FieldMut::Reference(value)) => {
                *value = Some(id);
                self.picker = None;
            }
            Some(FieldMut::References(values)) => {
                if let Some(pos) = values.iter().position(|known| *known == id) {
                    values.remove(pos);
                } else {
                    values.push(id);
                }
            }
            _ => {}
        }
    }

    /// Text shown for `spec` in the modal.
    pub fn display_value(&self, spec: &FieldSpec, lookups: &Lookups) -> String {
        match (self.form.field(spec.key), spec.kind) {
            (Some(FieldRef::Text(value)), FieldKind::Secret) => "*".repeat(value.chars().count()),
            (Some(FieldRef::Text(value)), _) => value.to_string(),
            (Some(FieldRef::Reference(Some(id))), FieldKind::Reference(lookup)) => {
                lookups.label(lookup, id)
            }
            (Some(FieldRef::Reference(None)), _) => "(none)".to_string(),
            (Some(FieldRef::References(ids)), FieldKind::References(lookup)) => ids
                .iter()
                .map(|id| lookups.label(lookup, *id))
                .collect::<Vec<_>>()
                .join(", "),
            (Some(FieldRef::Privacy(privacy)), _) => privacy.as_str().to_string(),
            _ => String::new(),
        }
    }

    /// Whether option `id` is currently selected in the focused field.
    pub fn is_selected(&self, id: u64) -> bool {
        let Some(spec) = self.current() else {
            return false;
        };
        match self.form.field(spec.key) {
            Some(FieldRef::Reference(value)) => value == Some(id),
            Some(FieldRef::References(ids)) => ids.contains(&id),
            _ => false,
        }
    }
}

fn byte_offset(value: &str, chars: usize) -> usize {
    value
        .char_indices()
        .nth(chars)
        .map(|(idx, _)| idx)
        .unwrap_or(value.len())
}
