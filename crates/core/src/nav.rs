//! Routes and the session guard in front of them.

use crate::{resource::ResourceKind, session::SessionPhase};

/// A place the console can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Sign-in form.
    Login,
    /// Resource menu shown after sign-in.
    Home,
    /// One resource screen.
    Resource(ResourceKind),
}

/// Where authenticated users land.
pub const LANDING: Route = Route::Home;

impl Route {
    /// Whether the route needs an authenticated session.
    pub fn is_protected(self) -> bool {
        !matches!(self, Route::Login)
    }
}

/// Outcome of guarding a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// The session is still being restored; render nothing yet.
    Wait,
    /// Show the requested route.
    Render,
    /// Show another route instead.
    Redirect(Route),
}

/// Decide what to show for `route` given the session phase.
pub fn guard(route: Route, phase: SessionPhase) -> Guard {
    match (phase, route.is_protected()) {
        (SessionPhase::Restoring, _) => Guard::Wait,
        (SessionPhase::Anonymous, true) => Guard::Redirect(Route::Login),
        (SessionPhase::Authenticated, false) => Guard::Redirect(LANDING),
        _ => Guard::Render,
    }
}

/// Follow redirects until a route renders. `None` while restoring.
pub fn resolve(route: Route, phase: SessionPhase) -> Option<Route> {
    let mut current = route;
    for _ in 0..2 {
        match guard(current, phase) {
            Guard::Wait => return None,
            Guard::Render => return Some(current),
            Guard::Redirect(next) => current = next,
        }
    }
    Some(current)
}
