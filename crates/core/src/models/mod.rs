//! Entity models mirrored from the dashboard API.
//!
//! Optional fields default to `None` so partially populated records
//! (lookups, embedded relations) deserialize without ceremony.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Platform account; the principal of an admin session is also a `User`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Server identifier.
    pub id: u64,
    /// Public handle.
    pub username: String,
    /// Login e-mail.
    #[serde(default)]
    pub email: String,
    /// Given name.
    #[serde(default)]
    pub name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub surname: Option<String>,
    /// Free-form profile text.
    #[serde(default)]
    pub biography: Option<String>,
    /// Birthday as sent by the API (`YYYY-MM-DD`).
    #[serde(default)]
    pub birthday: Option<String>,
    /// Country.
    #[serde(default)]
    pub location: Option<String>,
    /// Relative path of the avatar image.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Relative path of the cover image.
    #[serde(default)]
    pub cover_url: Option<String>,
    /// Administrator flag. Only changed through the dedicated toggle.
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_admin: bool,
}

impl User {
    /// "Name Surname" when available, otherwise the username.
    pub fn display_name(&self) -> String {
        let full = [self.name.as_deref(), self.surname.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }
}

/// Game catalogue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Server identifier.
    pub id: u64,
    /// Title.
    pub name: String,
    /// Long description.
    #[serde(default)]
    pub description: Option<String>,
    /// Studio credit.
    #[serde(default)]
    pub developer: Option<String>,
    /// Publisher credit.
    #[serde(default)]
    pub publisher: Option<String>,
    /// Release date as sent by the API (`YYYY-MM-DD`).
    #[serde(default)]
    pub release_date: Option<String>,
    /// Relative path of the cover image.
    #[serde(default)]
    pub cover_image: Option<String>,
    /// Genres attached to the game.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub genres: Vec<Genre>,
    /// Platforms the game ships on.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub platforms: Vec<Platform>,
}

/// Game genre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    /// Server identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
}

/// Gaming platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    /// Server identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
}

/// Visibility of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    /// Anyone may join.
    #[default]
    Public,
    /// Invitation only.
    Private,
}

impl Privacy {
    /// Wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Privacy::Public => "public",
            Privacy::Private => "private",
        }
    }

    /// The other variant.
    pub fn toggled(self) -> Self {
        match self {
            Privacy::Public => Privacy::Private,
            Privacy::Private => Privacy::Public,
        }
    }
}

/// Minimal `{id, name}` relation embedded in other records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRef {
    /// Identifier of the related record.
    pub id: u64,
    /// Its display name.
    #[serde(default)]
    pub name: String,
}

/// Minimal `{id, username}` relation embedded in other records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    /// Identifier of the related user.
    pub id: u64,
    /// Their handle.
    #[serde(default)]
    pub username: String,
}

/// Community group, optionally attached to a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Server identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Long description.
    #[serde(default)]
    pub description: Option<String>,
    /// Visibility.
    #[serde(default)]
    pub privacy: Privacy,
    /// Owning game id.
    #[serde(default)]
    pub game_id: Option<u64>,
    /// Owning game, when the API embeds it.
    #[serde(default)]
    pub game: Option<NamedRef>,
    /// Creator id.
    #[serde(default)]
    pub created_by: Option<u64>,
    /// Creator, when the API embeds it.
    #[serde(default)]
    pub creator: Option<UserRef>,
    /// Relative path of the group image.
    #[serde(default)]
    pub group_image: Option<String>,
}

/// User post, optionally published inside a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Server identifier.
    pub id: u64,
    /// Body text.
    #[serde(default)]
    pub content: String,
    /// Author id.
    #[serde(default)]
    pub user_id: Option<u64>,
    /// Author, when the API embeds it.
    #[serde(default)]
    pub user: Option<UserRef>,
    /// Group id.
    #[serde(default)]
    pub group_id: Option<u64>,
    /// Group, when the API embeds it.
    #[serde(default)]
    pub group: Option<NamedRef>,
    /// Relative path of the attached image.
    #[serde(default)]
    pub image_path: Option<String>,
    /// Relative path of the attached video.
    #[serde(default)]
    pub video_path: Option<String>,
}

impl Post {
    /// Author id, from the flat column or the embedded relation.
    pub fn author_id(&self) -> Option<u64> {
        self.user_id.or_else(|| self.user.as_ref().map(|user| user.id))
    }

    /// Group id, from the flat column or the embedded relation.
    pub fn group_ref_id(&self) -> Option<u64> {
        self.group_id
            .or_else(|| self.group.as_ref().map(|group| group.id))
    }
}

/// Accepts `true`/`false`, `0`/`1`, `"0"`/`"1"`/`"true"` and `null`.
fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(flag) => flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Value::String(text) => matches!(text.trim(), "1" | "true" | "TRUE" | "True"),
        _ => false,
    })
}

fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn admin_flag_accepts_numeric_values() {
        let user: User = serde_json::from_value(json!({
            "id": 4,
            "username": "neo",
            "email": "neo@example.com",
            "is_admin": 1
        }))
        .expect("user");
        assert!(user.is_admin);

        let user: User =
            serde_json::from_value(json!({"id": 5, "username": "trinity", "is_admin": null}))
                .expect("user");
        assert!(!user.is_admin);
        assert_eq!(user.display_name(), "trinity");
    }

    #[test]
    fn game_relations_tolerate_null() {
        let game: Game = serde_json::from_value(json!({
            "id": 1,
            "name": "Celeste",
            "genres": null,
            "platforms": [{"id": 2, "name": "Switch"}]
        }))
        .expect("game");
        assert!(game.genres.is_empty());
        assert_eq!(game.platforms[0].name, "Switch");
    }

    #[test]
    fn post_relations_fall_back_to_embedded_records() {
        let post: Post = serde_json::from_value(json!({
            "id": 9,
            "content": "gg",
            "user": {"id": 3, "username": "morpheus"},
            "group": {"id": 7, "name": "Speedrunners"}
        }))
        .expect("post");
        assert_eq!(post.author_id(), Some(3));
        assert_eq!(post.group_ref_id(), Some(7));
    }

    #[test]
    fn privacy_uses_lowercase_wire_values() {
        let group: Group =
            serde_json::from_value(json!({"id": 1, "name": "LAN", "privacy": "private"}))
                .expect("group");
        assert_eq!(group.privacy, Privacy::Private);
        assert_eq!(group.privacy.toggled().as_str(), "public");
    }
}
