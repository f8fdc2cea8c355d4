//! Minimal route holder
//!
//! Stands in for the front-end router: the API client redirects here on an
//! expired session and views read the current route to decide what to show.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;
use tracing::debug;

use crate::entities::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", content = "kind", rename_all = "snake_case")]
pub enum Route {
    Login,
    Signup,
    Dashboard,
    /// Admin list page of one entity kind
    Entity(EntityKind),
    /// Public landing page
    Public,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/admin/login".to_string(),
            Route::Signup => "/admin/signup".to_string(),
            Route::Dashboard => "/admin".to_string(),
            Route::Entity(kind) => format!("/admin/{}", kind.slug()),
            Route::Public => "/".to_string(),
        }
    }

    /// Whether the route needs a session to render
    pub fn requires_auth(&self) -> bool {
        matches!(self, Route::Dashboard | Route::Entity(_))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Current route plus change notifications
#[derive(Debug)]
pub struct Navigator {
    route: watch::Sender<Route>,
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        let (route, _) = watch::channel(initial);
        Self { route }
    }

    pub fn current(&self) -> Route {
        *self.route.borrow()
    }

    pub fn navigate(&self, to: Route) {
        let from = self.route.send_replace(to);
        if from != to {
            debug!(%from, %to, "navigated");
        }
    }

    /// Send the operator to the login page
    pub fn redirect_to_login(&self) {
        self.navigate(Route::Login);
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.route.subscribe()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Public)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Login.path(), "/admin/login");
        assert_eq!(Route::Entity(EntityKind::Press).path(), "/admin/press");
        assert!(Route::Entity(EntityKind::Careers).requires_auth());
        assert!(!Route::Login.requires_auth());
    }

    #[test]
    fn test_navigate_and_subscribe() {
        let nav = Navigator::new(Route::Dashboard);
        let mut rx = nav.subscribe();
        assert!(!rx.has_changed().unwrap());

        nav.redirect_to_login();
        assert_eq!(nav.current(), Route::Login);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Route::Login);
    }
}
