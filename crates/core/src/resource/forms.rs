//! Form records for each entity type.

use super::{
    form::{prefill_date, EntityForm, FieldKind, FieldMut, FieldRef, FieldSpec},
    lookup::{Lookup, LookupEntry},
};
use crate::{
    api::FormPayload,
    models::{Game, Genre, Group, Platform, Post, Privacy, User},
};

fn text_ref<'a>(value: &'a str) -> Option<FieldRef<'a>> {
    Some(FieldRef::Text(value))
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Editable user profile. The admin flag is changed through its own toggle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserForm {
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// Handle.
    pub username: String,
    /// Login e-mail.
    pub email: String,
    /// New password; left out of the payload when empty.
    pub password: String,
    /// Profile text.
    pub biography: String,
    /// `YYYY-MM-DD`.
    pub birthday: String,
    /// Country.
    pub location: String,
    /// Local avatar image to upload.
    pub avatar: String,
    /// Local cover image to upload.
    pub cover: String,
}

const USER_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("name", "Name", FieldKind::Text),
    FieldSpec::optional("surname", "Surname", FieldKind::Text),
    FieldSpec::required("username", "Username", FieldKind::Text),
    FieldSpec::required("email", "E-mail", FieldKind::Text),
    FieldSpec::optional("password", "Password", FieldKind::Secret),
    FieldSpec::optional("biography", "Biography", FieldKind::Text),
    FieldSpec::optional("birthday", "Birthday", FieldKind::Date),
    FieldSpec::optional("location", "Location", FieldKind::Text),
    FieldSpec::optional("avatar_url", "Avatar file", FieldKind::Attachment),
    FieldSpec::optional("cover_url", "Cover file", FieldKind::Attachment),
];

impl EntityForm for UserForm {
    type Item = User;

    fn fields() -> &'static [FieldSpec] {
        USER_FIELDS
    }

    fn from_item(user: &User) -> Self {
        Self {
            name: user.name.clone().unwrap_or_default(),
            surname: user.surname.clone().unwrap_or_default(),
            username: user.username.clone(),
            email: user.email.clone(),
            password: String::new(),
            biography: user.biography.clone().unwrap_or_default(),
            birthday: user.birthday.as_deref().map(prefill_date).unwrap_or_default(),
            location: user.location.clone().unwrap_or_default(),
            avatar: String::new(),
            cover: String::new(),
        }
    }

    fn field(&self, key: &str) -> Option<FieldRef<'_>> {
        match key {
            "name" => text_ref(&self.name),
            "surname" => text_ref(&self.surname),
            "username" => text_ref(&self.username),
            "email" => text_ref(&self.email),
            "password" => text_ref(&self.password),
            "biography" => text_ref(&self.biography),
            "birthday" => text_ref(&self.birthday),
            "location" => text_ref(&self.location),
            "avatar_url" => text_ref(&self.avatar),
            "cover_url" => text_ref(&self.cover),
            _ => None,
        }
    }

    fn field_mut(&mut self, key: &str) -> Option<FieldMut<'_>> {
        let value = match key {
            "name" => &mut self.name,
            "surname" => &mut self.surname,
            "username" => &mut self.username,
            "email" => &mut self.email,
            "password" => &mut self.password,
            "biography" => &mut self.biography,
            "birthday" => &mut self.birthday,
            "location" => &mut self.location,
            "avatar_url" => &mut self.avatar,
            "cover_url" => &mut self.cover,
            _ => return None,
        };
        Some(FieldMut::Text(value))
    }

    fn to_payload(&self) -> FormPayload {
        FormPayload::multipart()
            .text("name", self.name.trim())
            .text("surname", self.surname.trim())
            .text("username", self.username.trim())
            .text("email", self.email.trim())
            .optional("password", non_empty(&self.password))
            .text("biography", self.biography.trim())
            .optional("birthday", non_empty(&self.birthday))
            .text("location", self.location.trim())
            .attach("avatar_url", self.avatar.trim())
            .attach("cover_url", self.cover.trim())
    }
}

/// Editable game record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameForm {
    /// Title.
    pub name: String,
    /// Long description.
    pub description: String,
    /// Studio.
    pub developer: String,
    /// Publisher.
    pub publisher: String,
    /// `YYYY-MM-DD`.
    pub release_date: String,
    /// Selected genre ids.
    pub genres: Vec<u64>,
    /// Selected platform ids.
    pub platforms: Vec<u64>,
    /// Local cover image to upload.
    pub cover_image: String,
}

const GAME_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("name", "Name", FieldKind::Text),
    FieldSpec::optional("description", "Description", FieldKind::Text),
    FieldSpec::optional("developer", "Developer", FieldKind::Text),
    FieldSpec::optional("publisher", "Publisher", FieldKind::Text),
    FieldSpec::optional("release_date", "Release date", FieldKind::Date),
    FieldSpec::optional("genres", "Genres", FieldKind::References(Lookup::Genres)),
    FieldSpec::optional(
        "platforms",
        "Platforms",
        FieldKind::References(Lookup::Platforms),
    ),
    FieldSpec::optional("cover_image", "Cover file", FieldKind::Attachment),
];

impl EntityForm for GameForm {
    type Item = Game;

    fn fields() -> &'static [FieldSpec] {
        GAME_FIELDS
    }

    fn from_item(game: &Game) -> Self {
        Self {
            name: game.name.clone(),
            description: game.description.clone().unwrap_or_default(),
            developer: game.developer.clone().unwrap_or_default(),
            publisher: game.publisher.clone().unwrap_or_default(),
            release_date: game
                .release_date
                .as_deref()
                .map(prefill_date)
                .unwrap_or_default(),
            genres: game.genres.iter().map(|genre| genre.id).collect(),
            platforms: game.platforms.iter().map(|platform| platform.id).collect(),
            cover_image: String::new(),
        }
    }

    fn field(&self, key: &str) -> Option<FieldRef<'_>> {
        match key {
            "name" => text_ref(&self.name),
            "description" => text_ref(&self.description),
            "developer" => text_ref(&self.developer),
            "publisher" => text_ref(&self.publisher),
            "release_date" => text_ref(&self.release_date),
            "genres" => Some(FieldRef::References(&self.genres)),
            "platforms" => Some(FieldRef::References(&self.platforms)),
            "cover_image" => text_ref(&self.cover_image),
            _ => None,
        }
    }

    fn field_mut(&mut self, key: &str) -> Option<FieldMut<'_>> {
        match key {
            "name" => Some(FieldMut::Text(&mut self.name)),
            "description" => Some(FieldMut::Text(&mut self.description)),
            "developer" => Some(FieldMut::Text(&mut self.developer)),
            "publisher" => Some(FieldMut::Text(&mut self.publisher)),
            "release_date" => Some(FieldMut::Text(&mut self.release_date)),
            "genres" => Some(FieldMut::References(&mut self.genres)),
            "platforms" => Some(FieldMut::References(&mut self.platforms)),
            "cover_image" => Some(FieldMut::Text(&mut self.cover_image)),
            _ => None,
        }
    }

    fn to_payload(&self) -> FormPayload {
        FormPayload::multipart()
            .text("name", self.name.trim())
            .text("description", self.description.trim())
            .text("developer", self.developer.trim())
            .text("publisher", self.publisher.trim())
            .optional("release_date", non_empty(&self.release_date))
            .list("genres", &self.genres)
            .list("platforms", &self.platforms)
            .attach("cover_image", self.cover_image.trim())
    }

    fn known_labels(game: &Game) -> Vec<(Lookup, LookupEntry)> {
        let genres = game
            .genres
            .iter()
            .map(|genre| (Lookup::Genres, LookupEntry::new(genre.id, &genre.name)));
        let platforms = game.platforms.iter().map(|platform| {
            (
                Lookup::Platforms,
                LookupEntry::new(platform.id, &platform.name),
            )
        });
        genres.chain(platforms).collect()
    }
}

/// Name-only form shared by genres and platforms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameForm {
    /// Display name.
    pub name: String,
}

const NAME_FIELDS: &[FieldSpec] = &[FieldSpec::required("name", "Name", FieldKind::Text)];

impl NameForm {
    fn field(&self, key: &str) -> Option<FieldRef<'_>> {
        (key == "name").then_some(FieldRef::Text(&self.name))
    }

    fn field_mut(&mut self, key: &str) -> Option<FieldMut<'_>> {
        (key == "name").then_some(FieldMut::Text(&mut self.name))
    }

    fn to_payload(&self) -> FormPayload {
        FormPayload::json().text("name", self.name.trim())
    }
}

/// Genre form, posted as JSON.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenreForm(pub NameForm);

/// Platform form, posted as JSON.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlatformForm(pub NameForm);

macro_rules! name_form {
    ($form:ty, $item:ty) => {
        impl EntityForm for $form {
            type Item = $item;

            fn fields() -> &'static [FieldSpec] {
                NAME_FIELDS
            }

            fn from_item(item: &$item) -> Self {
                Self(NameForm {
                    name: item.name.clone(),
                })
            }

            fn field(&self, key: &str) -> Option<FieldRef<'_>> {
                self.0.field(key)
            }

            fn field_mut(&mut self, key: &str) -> Option<FieldMut<'_>> {
                self.0.field_mut(key)
            }

            fn to_payload(&self) -> FormPayload {
                self.0.to_payload()
            }
        }
    };
}

name_form!(GenreForm, Genre);
name_form!(PlatformForm, Platform);

/// Editable group record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupForm {
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: String,
    /// Visibility.
    pub privacy: Privacy,
    /// Owning game.
    pub game_id: Option<u64>,
    /// Creator.
    pub created_by: Option<u64>,
    /// Local image to upload.
    pub group_image: String,
}

const GROUP_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("name", "Name", FieldKind::Text),
    FieldSpec::optional("description", "Description", FieldKind::Text),
    FieldSpec::optional("privacy", "Privacy", FieldKind::Privacy),
    FieldSpec::optional("game_id", "Game", FieldKind::Reference(Lookup::Games)),
    FieldSpec::optional("created_by", "Creator", FieldKind::Reference(Lookup::Users)),
    FieldSpec::optional("group_image", "Image file", FieldKind::Attachment),
];

impl EntityForm for GroupForm {
    type Item = Group;

    fn fields() -> &'static [FieldSpec] {
        GROUP_FIELDS
    }

    fn from_item(group: &Group) -> Self {
        Self {
            name: group.name.clone(),
            description: group.description.clone().unwrap_or_default(),
            privacy: group.privacy,
            game_id: group
                .game_id
                .or_else(|| group.game.as_ref().map(|game| game.id)),
            created_by: group
                .created_by
                .or_else(|| group.creator.as_ref().map(|user| user.id)),
            group_image: String::new(),
        }
    }

    fn field(&self, key: &str) -> Option<FieldRef<'_>> {
        match key {
            "name" => text_ref(&self.name),
            "description" => text_ref(&self.description),
            "privacy" => Some(FieldRef::Privacy(self.privacy)),
            "game_id" => Some(FieldRef::Reference(self.game_id)),
            "created_by" => Some(FieldRef::Reference(self.created_by)),
            "group_image" => text_ref(&self.group_image),
            _ => None,
        }
    }

    fn field_mut(&mut self, key: &str) -> Option<FieldMut<'_>> {
        match key {
            "name" => Some(FieldMut::Text(&mut self.name)),
            "description" => Some(FieldMut::Text(&mut self.description)),
            "privacy" => Some(FieldMut::Privacy(&mut self.privacy)),
            "game_id" => Some(FieldMut::Reference(&mut self.game_id)),
            "created_by" => Some(FieldMut::Reference(&mut self.created_by)),
            "group_image" => Some(FieldMut::Text(&mut self.group_image)),
            _ => None,
        }
    }

    fn to_payload(&self) -> FormPayload {
        FormPayload::multipart()
            .text("name", self.name.trim())
            .text("description", self.description.trim())
            .text("privacy", self.privacy.as_str())
            .optional("game_id", self.game_id)
            .optional("created_by", self.created_by)
            .attach("group_image", self.group_image.trim())
    }

    fn known_labels(group: &Group) -> Vec<(Lookup, LookupEntry)> {
        let game = group
            .game
            .iter()
            .map(|game| (Lookup::Games, LookupEntry::new(game.id, &game.name)));
        let creator = group
            .creator
            .iter()
            .map(|user| (Lookup::Users, LookupEntry::new(user.id, &user.username)));
        game.chain(creator).collect()
    }
}

/// Editable post record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostForm {
    /// Body text.
    pub content: String,
    /// Author.
    pub user_id: Option<u64>,
    /// Group the post belongs to; omitted from the payload when unset.
    pub group_id: Option<u64>,
    /// Local image to upload.
    pub image: String,
    /// Local video to upload.
    pub video: String,
}

const POST_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("content", "Content", FieldKind::Text),
    FieldSpec::required("user_id", "Author", FieldKind::Reference(Lookup::Users)),
    FieldSpec::optional("group_id", "Group", FieldKind::Reference(Lookup::Groups)),
    FieldSpec::optional("image", "Image file", FieldKind::Attachment),
    FieldSpec::optional("video", "Video file", FieldKind::Attachment),
];

impl EntityForm for PostForm {
    type Item = Post;

    fn fields() -> &'static [FieldSpec] {
        POST_FIELDS
    }

    fn from_item(post: &Post) -> Self {
        Self {
            content: post.content.clone(),
            user_id: post.author_id(),
            group_id: post.group_ref_id(),
            image: String::new(),
            video: String::new(),
        }
    }

    fn field(&self, key: &str) -> Option<FieldRef<'_>> {
        match key {
            "content" => text_ref(&self.content),
            "user_id" => Some(FieldRef::Reference(self.user_id)),
            "group_id" => Some(FieldRef::Reference(self.group_id)),
            "image" => text_ref(&self.image),
            "video" => text_ref(&self.video),
            _ => None,
        }
    }

    fn field_mut(&mut self, key: &str) -> Option<FieldMut<'_>> {
        match key {
            "content" => Some(FieldMut::Text(&mut self.content)),
            "user_id" => Some(FieldMut::Reference(&mut self.user_id)),
            "group_id" => Some(FieldMut::Reference(&mut self.group_id)),
            "image" => Some(FieldMut::Text(&mut self.image)),
            "video" => Some(FieldMut::Text(&mut self.video)),
            _ => None,
        }
    }

    fn to_payload(&self) -> FormPayload {
        FormPayload::multipart()
            .text("content", self.content.trim())
            .optional("user_id", self.user_id)
            .optional("group_id", self.group_id)
            .attach("image", self.image.trim())
            .attach("video", self.video.trim())
    }

    fn known_labels(post: &Post) -> Vec<(Lookup, LookupEntry)> {
        let user = post
            .user
            .iter()
            .map(|user| (Lookup::Users, LookupEntry::new(user.id, &user.username)));
        let group = post
            .group
            .iter()
            .map(|group| (Lookup::Groups, LookupEntry::new(group.id, &group.name)));
        user.chain(group).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{
        form::{FormMode, FormSession},
        lookup::Lookups,
    };
    use crate::models::{NamedRef, UserRef};
    use std::fs;
    use tempfile::tempdir;

    fn pairs(payload: &FormPayload) -> Vec<(String, String)> {
        payload.pairs()
    }

    #[test]
    fn game_lists_are_sent_as_repeated_keys() {
        let form = GameForm {
            name: "Hades".into(),
            genres: vec![1, 4],
            platforms: vec![2],
            ..GameForm::default()
        };
        let pairs = pairs(&form.to_payload());
        let genres: Vec<_> = pairs
            .iter()
            .filter(|(key, _)| key == "genres[]")
            .map(|(_, value)| value.as_str())
            .collect();
        assert_eq!(genres, ["1", "4"]);
        assert!(pairs.iter().all(|(key, _)| key != "genres"));
        assert!(pairs.iter().all(|(key, _)| key != "release_date"));
    }

    #[test]
    fn post_without_group_omits_group_id() {
        let form = PostForm {
            content: "hello".into(),
            user_id: Some(3),
            ..PostForm::default()
        };
        let pairs = pairs(&form.to_payload());
        assert!(pairs.contains(&("user_id".to_string(), "3".to_string())));
        assert!(pairs.iter().all(|(key, _)| key != "group_id"));
    }

    #[test]
    fn user_password_only_sent_when_filled() {
        let mut form = UserForm {
            username: "ada".into(),
            email: "ada@example.com".into(),
            ..UserForm::default()
        };
        assert!(form.to_payload().pairs().iter().all(|(key, _)| key != "password"));
        form.password = "hunter22".into();
        assert!(form
            .to_payload()
            .pairs()
            .contains(&("password".to_string(), "hunter22".to_string())));
    }

    #[test]
    fn genre_form_posts_json_name() {
        let form = GenreForm::from_item(&Genre {
            id: 1,
            name: "RPG".into(),
        });
        let payload = form.to_payload();
        assert!(!payload.is_multipart());
        assert_eq!(payload.to_json(), serde_json::json!({"name": "RPG"}));
    }

    #[test]
    fn validation_checks_required_dates_and_files() -> anyhow::Result<()> {
        let mut form = GameForm::default();
        assert_eq!(form.validate().unwrap_err(), "Name is required");

        form.name = "Celeste".into();
        form.release_date = "25/01/2018".into();
        assert!(form.validate().unwrap_err().contains("YYYY-MM-DD"));

        form.release_date = "2018-01-25".into();
        form.cover_image = "/definitely/not/here.png".into();
        assert!(form.validate().unwrap_err().contains("no such file"));

        let dir = tempdir()?;
        let cover = dir.path().join("cover.png");
        fs::write(&cover, b"png")?;
        form.cover_image = cover.display().to_string();
        assert!(form.validate().is_ok());

        let post = PostForm {
            content: "hi".into(),
            ..PostForm::default()
        };
        assert_eq!(post.validate().unwrap_err(), "Author is required");
        Ok(())
    }

    #[test]
    fn edit_prefill_trims_timestamps_to_dates() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": 4,
            "username": "ada",
            "email": "ada@example.com",
            "birthday": "1990-05-01T00:00:00.000000Z"
        }))
        .expect("user");
        let form = UserForm::from_item(&user);
        assert_eq!(form.birthday, "1990-05-01");
        assert!(form.validate().is_ok());

        let game: Game = serde_json::from_value(serde_json::json!({
            "id": 2,
            "name": "Celeste",
            "release_date": "2018-01-25 00:00:00"
        }))
        .expect("game");
        assert_eq!(GameForm::from_item(&game).release_date, "2018-01-25");
        assert_eq!(prefill_date("soon"), "soon");
    }

    #[test]
    fn edit_prefill_resolves_embedded_labels() {
        let post = Post {
            id: 5,
            content: "gg".into(),
            user_id: None,
            user: Some(UserRef {
                id: 2,
                username: "ada".into(),
            }),
            group_id: Some(8),
            group: Some(NamedRef {
                id: 8,
                name: "Speedrun".into(),
            }),
            image_path: None,
            video_path: None,
        };
        let mut lookups = Lookups::default();
        for (lookup, entry) in PostForm::known_labels(&post) {
            lookups.seed(lookup, entry);
        }
        let session = FormSession::new(FormMode::Edit(5), PostForm::from_item(&post));
        let labels: Vec<String> = PostForm::fields()
            .iter()
            .map(|spec| session.display_value(spec, &lookups))
            .collect();
        assert_eq!(labels[1], "ada");
        assert_eq!(labels[2], "Speedrun");
        assert_eq!(PostForm::lookups(), vec![Lookup::Users, Lookup::Groups]);
    }

    #[test]
    fn picker_toggles_multi_references() {
        let mut lookups = Lookups::default();
        lookups.insert(
            Lookup::Genres,
            vec![LookupEntry::new(1, "Action"), LookupEntry::new(2, "Puzzle")],
        );
        let mut session = FormSession::new(FormMode::Create, GameForm::default());
        session.move_focus(5);
        assert!(session.open_picker());
        session.picker_input(Some('p'));
        assert_eq!(session.picker_options(&lookups).len(), 1);
        session.choose(&lookups);
        assert_eq!(session.form.genres, vec![2]);
        session.choose(&lookups);
        assert!(session.form.genres.is_empty());
        assert!(session.picker.is_some());
    }

    #[test]
    fn text_editing_respects_caret() {
        let mut session = FormSession::new(FormMode::Create, GroupForm::default());
        for ch in "Lan".chars() {
            session.insert(ch);
        }
        session.caret_home();
        session.insert('é');
        session.move_caret(10);
        session.backspace();
        assert_eq!(session.form.name, "éLa");

        session.move_focus(2);
        session.toggle_privacy();
        assert_eq!(session.form.privacy, Privacy::Private);
        session.move_focus(-3);
        assert_eq!(session.cursor, GroupForm::fields().len() - 1);
    }
}
