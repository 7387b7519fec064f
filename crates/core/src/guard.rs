//! Auth guard for role-gated views.
//!
//! A guard wraps a view that needs a signed-in user, optionally with staff
//! or admin rights. It is fed [`AuthSnapshot`]s as they arrive and answers
//! with what to render. On entering a redirecting state it asks the
//! [`Navigator`] to move exactly once.
//!
//! The guard is a convenience for the interface only. Data access must be
//! authorized by the backend.

use crate::{AccessTier, AuthSnapshot};

pub const DEFAULT_UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Client-side navigation.
pub trait Navigator {
    fn navigate(&mut self, path: &str);
}

impl<F: FnMut(&str)> Navigator for F {
    fn navigate(&mut self, path: &str) {
        self(path);
    }
}

/// Where the guard stands for a given snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardState {
    /// Auth state not known yet.
    Loading,
    /// Resolved, nobody signed in.
    Unauthenticated,
    /// Signed in, role below the required tier.
    Forbidden,
    /// Signed in with a sufficient role.
    Authorized,
}

/// What the guarded slot should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardView {
    /// Loading indicator.
    Placeholder,
    /// Nothing; a navigation is under way.
    Nothing,
    /// The guarded content.
    Content,
}

/// Stateful guard that remembers the last state it acted on.
#[derive(Debug, Clone)]
pub struct AuthGuard {
    tier: AccessTier,
    sign_in_path: String,
    unauthorized_path: String,
    last: Option<GuardState>,
}

impl AuthGuard {
    #[must_use]
    pub fn new(tier: AccessTier) -> Self {
        Self {
            tier,
            sign_in_path: crate::routes::DEFAULT_SIGN_IN_PATH.to_owned(),
            unauthorized_path: DEFAULT_UNAUTHORIZED_PATH.to_owned(),
            last: None,
        }
    }

    #[must_use]
    pub fn with_paths(
        mut self,
        sign_in_path: impl Into<String>,
        unauthorized_path: impl Into<String>,
    ) -> Self {
        self.sign_in_path = sign_in_path.into();
        self.unauthorized_path = unauthorized_path.into();
        self
    }

    #[must_use]
    pub const fn tier(&self) -> AccessTier {
        self.tier
    }

    /// Classify `snapshot` without side effects.
    #[must_use]
    pub fn state_for(&self, snapshot: &AuthSnapshot) -> GuardState {
        if snapshot.loading {
            return GuardState::Loading;
        }
        match snapshot.role() {
            None => GuardState::Unauthenticated,
            Some(role) if role.satisfies(self.tier) => GuardState::Authorized,
            Some(_) => GuardState::Forbidden,
        }
    }

    /// Process a new snapshot and return what to render.
    ///
    /// Navigates only when the state changes into `Unauthenticated` or
    /// `Forbidden`; repeated snapshots in the same state do nothing.
    pub fn observe(&mut self, snapshot: &AuthSnapshot, navigator: &mut impl Navigator) -> GuardView {
        let state = self.state_for(snapshot);
        let entered = self.last != Some(state);
        self.last = Some(state);

        match state {
            GuardState::Loading => GuardView::Placeholder,
            GuardState::Unauthenticated => {
                if entered {
                    navigator.navigate(&self.sign_in_path);
                }
                GuardView::Nothing
            }
            GuardState::Forbidden => {
                if entered {
                    navigator.navigate(&self.unauthorized_path);
                }
                GuardView::Nothing
            }
            GuardState::Authorized => GuardView::Content,
        }
    }
}

impl Default for AuthGuard {
    fn default() -> Self {
        Self::new(AccessTier::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Role, SessionUser, UserId};

    fn signed_in(role: Role) -> AuthSnapshot {
        AuthSnapshot::signed_in(SessionUser {
            id: UserId::new("u1"),
            email: "someone@example.com".to_owned(),
            name: None,
            role,
        })
    }

    #[test]
    fn test_loading_renders_placeholder_without_navigation() {
        let mut visited = Vec::new();
        let mut guard = AuthGuard::default();
        let view = guard.observe(&AuthSnapshot::loading(), &mut |p: &str| {
            visited.push(p.to_owned());
        });
        assert_eq!(view, GuardView::Placeholder);
        assert!(visited.is_empty());
    }

    #[test]
    fn test_unauthenticated_navigates_to_sign_in_once() {
        let mut visited = Vec::new();
        let mut nav = |p: &str| visited.push(p.to_owned());
        let mut guard = AuthGuard::default();

        guard.observe(&AuthSnapshot::loading(), &mut nav);
        assert_eq!(
            guard.observe(&AuthSnapshot::signed_out(), &mut nav),
            GuardView::Nothing
        );
        guard.observe(&AuthSnapshot::signed_out(), &mut nav);

        assert_eq!(visited, vec!["/sign-in".to_owned()]);
    }

    #[test]
    fn test_moderator_passes_default_tier() {
        let mut visited = Vec::new();
        let mut guard = AuthGuard::default();
        let view = guard.observe(&signed_in(Role::Moderator), &mut |p: &str| {
            visited.push(p.to_owned());
        });
        assert_eq!(view, GuardView::Content);
        assert!(visited.is_empty());
    }

    #[test]
    fn test_moderator_is_forbidden_from_admin_only() {
        let mut visited = Vec::new();
        let mut guard = AuthGuard::new(AccessTier::AdminOnly);
        let view = guard.observe(&signed_in(Role::Moderator), &mut |p: &str| {
            visited.push(p.to_owned());
        });
        assert_eq!(view, GuardView::Nothing);
        assert_eq!(visited, vec!["/unauthorized".to_owned()]);
    }

    #[test]
    fn test_customer_is_forbidden_from_staff_views() {
        let guard = AuthGuard::default();
        assert_eq!(guard.state_for(&signed_in(Role::Customer)), GuardState::Forbidden);
        assert_eq!(guard.state_for(&signed_in(Role::Admin)), GuardState::Authorized);
    }

    #[test]
    fn test_custom_paths() {
        let mut visited = Vec::new();
        let mut guard = AuthGuard::default().with_paths("/login", "/403");
        guard.observe(&AuthSnapshot::signed_out(), &mut |p: &str| {
            visited.push(p.to_owned());
        });
        assert_eq!(visited, vec!["/login".to_owned()]);
    }
}
