use std::fmt;

use serde::de::DeserializeOwned;

use super::{
    form::EntityForm,
    forms::{GameForm, GenreForm, GroupForm, PlatformForm, PostForm, UserForm},
    kind::ResourceKind,
};
use crate::models::{Game, Genre, Group, Platform, Post, User};

const PREVIEW_LEN: usize = 60;

/// An entity managed by a [`ResourceScreen`](super::ResourceScreen).
pub trait Resource: Clone + fmt::Debug + DeserializeOwned + Send + Sync + 'static {
    /// Endpoint family.
    const KIND: ResourceKind;
    /// Form used to create and edit the entity.
    type Form: EntityForm<Item = Self>;

    /// Server identifier.
    fn id(&self) -> u64;

    /// Table column titles.
    fn headers() -> &'static [&'static str];

    /// Table cells, aligned with [`Resource::headers`].
    fn columns(&self) -> Vec<String>;

    /// Short name used in confirmations and notices.
    fn label(&self) -> String;

    /// Text matched by the screen filter.
    fn search_text(&self) -> String {
        self.columns().join(" ")
    }

    /// Relative media paths attached to the record.
    fn media(&self) -> Vec<(&'static str, &str)> {
        Vec::new()
    }
}

fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > PREVIEW_LEN || line.len() < text.len() {
        let cut: String = line.chars().take(PREVIEW_LEN).collect();
        format!("{cut}…")
    } else {
        line.to_string()
    }
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn media_entries<'a, const N: usize>(
    entries: [(&'static str, &'a Option<String>); N],
) -> Vec<(&'static str, &'a str)> {
    entries
        .into_iter()
        .filter_map(|(label, path)| {
            path.as_deref()
                .filter(|path| !path.trim().is_empty())
                .map(|path| (label, path))
        })
        .collect()
}

impl Resource for User {
    const KIND: ResourceKind = ResourceKind::Users;
    type Form = UserForm;

    fn id(&self) -> u64 {
        self.id
    }

    fn headers() -> &'static [&'static str] {
        &["ID", "Username", "E-mail", "Name", "Location", "Admin"]
    }

    fn columns(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.username.clone(),
            self.email.clone(),
            self.display_name(),
            opt(&self.location),
            if self.is_admin { "yes" } else { "no" }.to_string(),
        ]
    }

    fn label(&self) -> String {
        self.username.clone()
    }

    fn media(&self) -> Vec<(&'static str, &str)> {
        media_entries([("avatar", &self.avatar_url), ("cover", &self.cover_url)])
    }
}

impl Resource for Game {
    const KIND: ResourceKind = ResourceKind::Games;
    type Form = GameForm;

    fn id(&self) -> u64 {
        self.id
    }

    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Developer", "Released", "Genres", "Platforms"]
    }

    fn columns(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            opt(&self.developer),
            opt(&self.release_date),
            self.genres
                .iter()
                .map(|genre| genre.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            self.platforms
                .iter()
                .map(|platform| platform.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        ]
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn media(&self) -> Vec<(&'static str, &str)> {
        media_entries([("cover", &self.cover_image)])
    }
}

impl Resource for Genre {
    const KIND: ResourceKind = ResourceKind::Genres;
    type Form = GenreForm;

    fn id(&self) -> u64 {
        self.id
    }

    fn headers() -> &'static [&'static str] {
        &["ID", "Name"]
    }

    fn columns(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone()]
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

impl Resource for Platform {
    const KIND: ResourceKind = ResourceKind::Platforms;
    type Form = PlatformForm;

    fn id(&self) -> u64 {
        self.id
    }

    fn headers() -> &'static [&'static str] {
        &["ID", "Name"]
    }

    fn columns(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone()]
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

impl Resource for Group {
    const KIND: ResourceKind = ResourceKind::Groups;
    type Form = GroupForm;

    fn id(&self) -> u64 {
        self.id
    }

    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Privacy", "Game", "Creator"]
    }

    fn columns(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.privacy.as_str().to_string(),
            self.game
                .as_ref()
                .map(|game| game.name.clone())
                .or_else(|| self.game_id.map(|id| format!("#{id}")))
                .unwrap_or_default(),
            self.creator
                .as_ref()
                .map(|user| user.username.clone())
                .or_else(|| self.created_by.map(|id| format!("#{id}")))
                .unwrap_or_default(),
        ]
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn media(&self) -> Vec<(&'static str, &str)> {
        media_entries([("image", &self.group_image)])
    }
}

impl Resource for Post {
    const KIND: ResourceKind = ResourceKind::Posts;
    type Form = PostForm;

    fn id(&self) -> u64 {
        self.id
    }

    fn headers() -> &'static [&'static str] {
        &["ID", "Content", "Author", "Group"]
    }

    fn columns(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            preview(&self.content),
            self.author(),
            self.group
                .as_ref()
                .map(|group| group.name.clone())
                .or_else(|| self.group_id.map(|id| format!("#{id}")))
                .unwrap_or_default(),
        ]
    }

    fn label(&self) -> String {
        format!("post #{} by {}", self.id, self.author())
    }

    /// Content, author username and group name.
    fn search_text(&self) -> String {
        let group = self
            .group
            .as_ref()
            .map(|group| group.name.as_str())
            .unwrap_or_default();
        format!("{} {} {}", self.content, self.author(), group)
    }

    fn media(&self) -> Vec<(&'static str, &str)> {
        media_entries([("image", &self.image_path), ("video", &self.video_path)])
    }
}

impl Post {
    fn author(&self) -> String {
        self.user
            .as_ref()
            .map(|user| user.username.clone())
            .or_else(|| self.user_id.map(|id| format!("#{id}")))
            .unwrap_or_default()
    }
}
