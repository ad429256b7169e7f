//! Setup-completion routing, decided in one place for every front end.

use serde::Serialize;

use crate::models::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Authenticated { setup_complete: bool },
}

impl Session {
    /// A signed-in user whose profile row may not exist yet.
    #[must_use]
    pub fn for_profile(profile: Option<&Profile>) -> Self {
        Self::Authenticated {
            setup_complete: crate::validation::is_setup_complete(profile),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Public,
    Setup,
    App,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    Allow,
    RequireLogin,
    RedirectToSetup,
    RedirectToApp,
}

#[must_use]
pub fn decide(session: Session, route: RouteKind) -> GateDecision {
    match (session, route) {
        (_, RouteKind::Public) => GateDecision::Allow,
        (Session::Anonymous, _) => GateDecision::RequireLogin,
        (
            Session::Authenticated {
                setup_complete: false,
            },
            RouteKind::App,
        ) => GateDecision::RedirectToSetup,
        (
            Session::Authenticated {
                setup_complete: true,
            },
            RouteKind::Setup,
        ) => GateDecision::RedirectToApp,
        (Session::Authenticated { .. }, _) => GateDecision::Allow,
    }
}
