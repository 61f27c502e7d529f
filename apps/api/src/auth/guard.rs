//! Role-based route guarding.
//!
//! `evaluate` is a pure function of the allowed roles and the session state;
//! it is re-run on every navigation and never reaches a terminal state.

use serde::Serialize;

use crate::auth::session::SessionState;
use crate::models::profile::Role;

pub const ALL_ROLES: &[Role] = &Role::ALL;
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const MENTOR_ONLY: &[Role] = &[Role::Mentor];

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Session state not known yet; show a placeholder.
    Loading,
    RedirectToLogin { to: &'static str },
    Render,
    /// Signed in, but the role is not allowed here.
    Redirect { to: &'static str },
}

/// Where a role lands when it is turned away from a page.
pub fn landing_page(role: Role) -> &'static str {
    match role {
        Role::Student => "/dashboard",
        Role::Mentor => "/mentor",
        Role::Admin => "/admin",
    }
}

pub fn evaluate(allowed: &[Role], state: &SessionState) -> GuardDecision {
    match state {
        SessionState::Loading => GuardDecision::Loading,
        SessionState::SignedOut => GuardDecision::RedirectToLogin { to: LOGIN_PATH },
        SessionState::SignedIn(session) if allowed.contains(&session.role()) => {
            GuardDecision::Render
        }
        SessionState::SignedIn(session) => GuardDecision::Redirect {
            to: landing_page(session.role()),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAccess {
    Public,
    Protected(&'static [Role]),
}

/// The application's page table.
pub fn page_access(path: &str) -> Option<PageAccess> {
    let path = match path.trim_end_matches('/') {
        "" => "/",
        p => p,
    };
    match path {
        "/" | LOGIN_PATH => Some(PageAccess::Public),
        "/dashboard" | "/profile" | "/projects" | "/mentor" | "/settings" | "/ikigai" => {
            Some(PageAccess::Protected(ALL_ROLES))
        }
        "/admin" => Some(PageAccess::Protected(ADMIN_ONLY)),
        _ => None,
    }
}
