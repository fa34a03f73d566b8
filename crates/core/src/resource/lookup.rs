//! Option tables feeding the reference selectors of entity forms.

use std::collections::HashMap;

use serde_json::Value;

/// A remote list of `(id, label)` options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookup {
    /// All genres.
    Genres,
    /// All platforms.
    Platforms,
    /// Game index.
    Games,
    /// All users.
    Users,
    /// All groups.
    Groups,
}

impl Lookup {
    /// Endpoint returning the options.
    pub fn path(self) -> &'static str {
        match self {
            Lookup::Genres => "/api/genres",
            Lookup::Platforms => "/api/platforms",
            Lookup::Games => "/api/games/index",
            Lookup::Users => "/api/dashboard/users",
            Lookup::Groups => "/api/groups",
        }
    }

    /// Record field used as the option label.
    pub fn label_key(self) -> &'static str {
        match self {
            Lookup::Users => "username",
            _ => "name",
        }
    }

    /// Plural noun for messages.
    pub fn noun(self) -> &'static str {
        match self {
            Lookup::Genres => "genres",
            Lookup::Platforms => "platforms",
            Lookup::Games => "games",
            Lookup::Users => "users",
            Lookup::Groups => "groups",
        }
    }
}

/// One selectable option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupEntry {
    /// Referenced record id.
    pub id: u64,
    /// Display label.
    pub label: String,
}

impl LookupEntry {
    /// Build an entry.
    pub fn new(id: u64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }

    /// Extract an entry from a raw API record; `None` when it has no usable id.
    pub fn from_value(lookup: Lookup, value: &Value) -> Option<Self> {
        let id = match value.get("id")? {
            Value::Number(number) => number.as_u64()?,
            Value::String(text) => text.trim().parse().ok()?,
            _ => return None,
        };
        let label = value
            .get(lookup.label_key())
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| fallback_label(id));
        Some(Self { id, label })
    }
}

/// Option tables keyed by lookup, owned by a single screen.
#[derive(Debug, Clone, Default)]
pub struct Lookups {
    tables: HashMap<Lookup, Vec<LookupEntry>>,
}

impl Lookups {
    /// Replace the table for `lookup` with freshly fetched entries.
    pub fn insert(&mut self, lookup: Lookup, entries: Vec<LookupEntry>) {
        self.tables.insert(lookup, entries);
    }

    /// Add labels known from embedded relations without discarding fetched ones.
    pub fn seed(&mut self, lookup: Lookup, entry: LookupEntry) {
        let table = self.tables.entry(lookup).or_default();
        if !table.iter().any(|known| known.id == entry.id) {
            table.push(entry);
        }
    }

    /// Options of `lookup`, empty when never fetched.
    pub fn entries(&self, lookup: Lookup) -> &[LookupEntry] {
        self.tables.get(&lookup).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Label of `id`, or `#id` when unknown.
    pub fn label(&self, lookup: Lookup, id: u64) -> String {
        self.entries(lookup)
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.label.clone())
            .unwrap_or_else(|| fallback_label(id))
    }
}

fn fallback_label(id: u64) -> String {
    format!("#{id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn users_are_labelled_by_username() {
        let raw = json!({"id": 7, "username": "ada", "name": "Ada"});
        let entry = LookupEntry::from_value(Lookup::Users, &raw).expect("entry");
        assert_eq!(entry, LookupEntry::new(7, "ada"));
        assert!(LookupEntry::from_value(Lookup::Genres, &json!({"name": "RPG"})).is_none());
    }

    #[test]
    fn seeding_keeps_fetched_labels() {
        let mut lookups = Lookups::default();
        lookups.insert(Lookup::Genres, vec![LookupEntry::new(1, "RPG")]);
        lookups.seed(Lookup::Genres, LookupEntry::new(1, "stale"));
        lookups.seed(Lookup::Genres, LookupEntry::new(2, "Puzzle"));
        assert_eq!(lookups.label(Lookup::Genres, 1), "RPG");
        assert_eq!(lookups.label(Lookup::Genres, 2), "Puzzle");
        assert_eq!(lookups.label(Lookup::Platforms, 9), "#9");
    }
}
