//! Navigation gate: a pure function of (profile, destination, origin).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::contract::model::UserProfile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NavigationOrigin {
    /// Navigation in the browser, with a resolvable session.
    #[default]
    Client,
    /// Server-rendered navigation.
    Server,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GuardDecision {
    Continue,
    Redirect { location: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardRules {
    pub login_path: String,
    pub profile_path: String,
    /// Reachable without a session.
    pub public_paths: Vec<String>,
}

impl Default for GuardRules {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            profile_path: "/profile".to_string(),
            public_paths: vec!["/".to_string(), "/confirm".to_string()],
        }
    }
}

/// Path part of a destination: no query or fragment, leading slash, no trailing slash.
fn normalize(destination: &str) -> String {
    let end = destination.find(['?', '#']).unwrap_or(destination.len());
    let path = destination[..end].trim();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// - anonymous callers may only reach the login page and public paths;
/// - on client navigations, a profile without a name is sent to the profile page
///   unless it is already going there or to the login page.
pub fn evaluate(
    rules: &GuardRules,
    profile: &UserProfile,
    destination: &str,
    origin: NavigationOrigin,
) -> GuardDecision {
    let path = normalize(destination);
    let login = normalize(&rules.login_path);
    let profile_page = normalize(&rules.profile_path);

    if !profile.is_authenticated() {
        let open = path == login || rules.public_paths.iter().any(|p| normalize(p) == path);
        return if open {
            GuardDecision::Continue
        } else {
            GuardDecision::Redirect { location: login }
        };
    }

    if origin == NavigationOrigin::Server {
        return GuardDecision::Continue;
    }

    if !profile.has_full_name() && path != profile_page && path != login {
        return GuardDecision::Redirect {
            location: profile_page,
        };
    }

    GuardDecision::Continue
}
