use std::fmt;

/// The six entity types managed by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Platform accounts.
    Users,
    /// Game catalogue.
    Games,
    /// Game genres.
    Genres,
    /// Gaming platforms.
    Platforms,
    /// Community groups.
    Groups,
    /// User posts.
    Posts,
}

impl ResourceKind {
    /// Every kind, in menu order.
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Users,
        ResourceKind::Games,
        ResourceKind::Genres,
        ResourceKind::Platforms,
        ResourceKind::Groups,
        ResourceKind::Posts,
    ];

    /// Plural path segment, e.g. `games`.
    pub fn slug(self) -> &'static str {
        match self {
            ResourceKind::Users => "users",
            ResourceKind::Games => "games",
            ResourceKind::Genres => "genres",
            ResourceKind::Platforms => "platforms",
            ResourceKind::Groups => "groups",
            ResourceKind::Posts => "posts",
        }
    }

    /// Key used by single-record response envelopes, e.g. `{"game": {..}}`.
    pub fn singular(self) -> &'static str {
        match self {
            ResourceKind::Users => "user",
            ResourceKind::Games => "game",
            ResourceKind::Genres => "genre",
            ResourceKind::Platforms => "platform",
            ResourceKind::Groups => "group",
            ResourceKind::Posts => "post",
        }
    }

    /// Human readable title.
    pub fn title(self) -> &'static str {
        match self {
            ResourceKind::Users => "Users",
            ResourceKind::Games => "Games",
            ResourceKind::Genres => "Genres",
            ResourceKind::Platforms => "Platforms",
            ResourceKind::Groups => "Groups",
            ResourceKind::Posts => "Posts",
        }
    }

    /// Collection endpoint. Groups are listed through the public route.
    pub fn list_path(self) -> &'static str {
        match self {
            ResourceKind::Users => "/api/dashboard/users",
            ResourceKind::Games => "/api/dashboard/games",
            ResourceKind::Genres => "/api/dashboard/genres",
            ResourceKind::Platforms => "/api/dashboard/platforms",
            ResourceKind::Groups => "/api/groups",
            ResourceKind::Posts => "/api/dashboard/posts",
        }
    }

    /// Create endpoint.
    pub fn create_path(self) -> String {
        format!("/api/dashboard/{}/create", self.slug())
    }

    /// Update endpoint for record `id`.
    pub fn update_path(self, id: u64) -> String {
        format!("/api/dashboard/{}/{id}/update", self.slug())
    }

    /// Delete endpoint for record `id`.
    pub fn delete_path(self, id: u64) -> String {
        format!("/api/dashboard/{}/{id}/delete", self.slug())
    }

    /// Position in [`ResourceKind::ALL`].
    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|kind| *kind == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
