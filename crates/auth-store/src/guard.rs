//! Render-time authorization backstop.
//!
//! Re-derives authorization from the store after hydration, covering paths
//! the edge layer can miss (cached static export, soft client navigation).
//! Advisory only: the edge layer stays authoritative for security decisions.

use crate::store::StoreSnapshot;
use route_policy::{classify, home_route, is_auth_page, RouteClass, LOGIN_ROUTE};

/// What the UI should do for the current route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Render the route's children.
    Render,
    /// Render nothing yet: the store has not settled and rendering an
    /// authorization-dependent branch would flash the wrong state.
    Hold,
    /// Perform a client-side redirect and render nothing meanwhile.
    Redirect(String),
}

/// Evaluate the guard for a path against the current store snapshot.
pub fn evaluate(snapshot: &StoreSnapshot, path: &str) -> GuardOutcome {
    if snapshot.is_loading() {
        return GuardOutcome::Hold;
    }

    match (&snapshot.identity, classify(path)) {
        // Authenticated sessions never see the login/register pages.
        (Some(user), _) if is_auth_page(path) => {
            GuardOutcome::Redirect(home_route(user.role).to_string())
        }
        // Under-privileged access to the admin surface bounces home,
        // silently.
        (Some(user), RouteClass::ProtectedSuperAdmin) if !user.role.is_super_admin() => {
            GuardOutcome::Redirect(home_route(user.role).to_string())
        }
        (Some(_), _) => GuardOutcome::Render,
        (None, RouteClass::Public) => GuardOutcome::Render,
        (None, _) => GuardOutcome::Redirect(LOGIN_ROUTE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store_fsm::StorePhase;
    use auth_api::AuthIdentity;
    use session_token::Role;

    fn identity(role: Role) -> AuthIdentity {
        AuthIdentity {
            id: "user-1".to_string(),
            name: Some("Ada".to_string()),
            email: "ada@example.com".to_string(),
            role,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    fn snapshot(identity_: Option<AuthIdentity>, phase: StorePhase) -> StoreSnapshot {
        StoreSnapshot {
            identity: identity_,
            phase,
            error: None,
        }
    }

    #[test]
    fn test_holds_while_loading() {
        let s = snapshot(Some(identity(Role::User)), StorePhase::Initializing);
        assert_eq!(evaluate(&s, "/listing"), GuardOutcome::Hold);

        let s = snapshot(None, StorePhase::Uninitialized);
        assert_eq!(evaluate(&s, "/"), GuardOutcome::Hold);
    }

    #[test]
    fn test_anonymous_on_public_renders() {
        let s = snapshot(None, StorePhase::Anonymous);
        assert_eq!(evaluate(&s, "/"), GuardOutcome::Render);
        assert_eq!(evaluate(&s, "/auth/login"), GuardOutcome::Render);
    }

    #[test]
    fn test_anonymous_on_protected_redirects_to_login() {
        let s = snapshot(None, StorePhase::Anonymous);
        assert_eq!(
            evaluate(&s, "/listing"),
            GuardOutcome::Redirect("/auth/login".to_string())
        );
        assert_eq!(
            evaluate(&s, "/super-admin/reviews"),
            GuardOutcome::Redirect("/auth/login".to_string())
        );
    }

    #[test]
    fn test_authenticated_never_sees_auth_pages() {
        let s = snapshot(Some(identity(Role::User)), StorePhase::Authenticated);
        assert_eq!(
            evaluate(&s, "/auth/login"),
            GuardOutcome::Redirect("/".to_string())
        );

        let s = snapshot(Some(identity(Role::SuperAdmin)), StorePhase::Authenticated);
        assert_eq!(
            evaluate(&s, "/auth/register"),
            GuardOutcome::Redirect("/super-admin".to_string())
        );
    }

    #[test]
    fn test_user_bounced_from_admin_surface() {
        let s = snapshot(Some(identity(Role::User)), StorePhase::Authenticated);
        assert_eq!(
            evaluate(&s, "/super-admin/reviews"),
            GuardOutcome::Redirect("/".to_string())
        );
    }

    #[test]
    fn test_super_admin_renders_admin_surface() {
        let s = snapshot(Some(identity(Role::SuperAdmin)), StorePhase::Authenticated);
        assert_eq!(evaluate(&s, "/super-admin/reviews"), GuardOutcome::Render);
    }

    #[test]
    fn test_user_renders_protected_route() {
        let s = snapshot(Some(identity(Role::User)), StorePhase::Authenticated);
        assert_eq!(evaluate(&s, "/listing"), GuardOutcome::Render);
    }

    #[test]
    fn test_refreshing_counts_as_settled() {
        // Identity stays trusted while a refresh is in flight.
        let s = snapshot(Some(identity(Role::User)), StorePhase::Refreshing);
        assert_eq!(evaluate(&s, "/listing"), GuardOutcome::Render);
    }
}
