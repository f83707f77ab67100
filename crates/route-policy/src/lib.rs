//! Static route classification for the storefront.
//!
//! Paths are classified with table lookups only — no I/O, no caching, safe to
//! call on every request. The policy here is default-deny: anything that is
//! not explicitly public requires a session, and `/super-admin` additionally
//! requires the super-admin role.

use session_token::Role;

/// Routes reachable without a session.
const PUBLIC_ROUTES: &[&str] = &["/", "/auth/login", "/auth/register"];

/// Auth pages an already-authenticated session is redirected away from.
const AUTH_PAGES: &[&str] = &["/auth/login", "/auth/register"];

/// Prefix guarding the review-moderation panel and the rest of the
/// super-admin surface.
const SUPER_ADMIN_PREFIX: &str = "/super-admin";

/// Where a login lands, by role. Users go to the product listing, super
/// admins to the moderation panel.
const USER_LANDING_ROUTE: &str = "/listing";

/// Safe default to bounce an under-privileged (but authenticated) request to.
const USER_HOME_ROUTE: &str = "/";

/// Login page, target of all unauthenticated redirects.
pub const LOGIN_ROUTE: &str = "/auth/login";

/// Authorization level required by a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// No session required.
    Public,
    /// Any authenticated session.
    ProtectedUser,
    /// Super-admin sessions only.
    ProtectedSuperAdmin,
}

/// Classify a request path.
///
/// Exact match against the public table, prefix match against the
/// super-admin subtree, everything else requires an ordinary session.
pub fn classify(path: &str) -> RouteClass {
    if PUBLIC_ROUTES.contains(&path) {
        return RouteClass::Public;
    }
    if path == SUPER_ADMIN_PREFIX || path.starts_with("/super-admin/") {
        return RouteClass::ProtectedSuperAdmin;
    }
    RouteClass::ProtectedUser
}

/// True for the login/register pages.
pub fn is_auth_page(path: &str) -> bool {
    AUTH_PAGES.contains(&path)
}

/// Home route for a role — the safe default for silent redirects.
pub fn home_route(role: Role) -> &'static str {
    match role {
        Role::User => USER_HOME_ROUTE,
        Role::SuperAdmin => SUPER_ADMIN_PREFIX,
    }
}

/// Landing route after a successful login.
pub fn landing_route(role: Role) -> &'static str {
    match role {
        Role::User => USER_LANDING_ROUTE,
        Role::SuperAdmin => SUPER_ADMIN_PREFIX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_routes() {
        assert_eq!(classify("/"), RouteClass::Public);
        assert_eq!(classify("/auth/login"), RouteClass::Public);
        assert_eq!(classify("/auth/register"), RouteClass::Public);
    }

    #[test]
    fn test_super_admin_routes() {
        assert_eq!(classify("/super-admin"), RouteClass::ProtectedSuperAdmin);
        assert_eq!(
            classify("/super-admin/reviews"),
            RouteClass::ProtectedSuperAdmin
        );
        assert_eq!(
            classify("/super-admin/reviews/pending"),
            RouteClass::ProtectedSuperAdmin
        );
    }

    #[test]
    fn test_prefix_match_requires_separator() {
        // A sibling path sharing the prefix text is not the admin subtree.
        assert_eq!(classify("/super-administrator"), RouteClass::ProtectedUser);
    }

    #[test]
    fn test_everything_else_is_protected_user() {
        assert_eq!(classify("/listing"), RouteClass::ProtectedUser);
        assert_eq!(classify("/listing/42"), RouteClass::ProtectedUser);
        assert_eq!(classify("/home"), RouteClass::ProtectedUser);
        assert_eq!(classify("/account/profile"), RouteClass::ProtectedUser);
    }

    #[test]
    fn test_auth_pages() {
        assert!(is_auth_page("/auth/login"));
        assert!(is_auth_page("/auth/register"));
        assert!(!is_auth_page("/"));
        assert!(!is_auth_page("/listing"));
    }

    #[test]
    fn test_role_homes() {
        assert_eq!(home_route(Role::User), "/");
        assert_eq!(home_route(Role::SuperAdmin), "/super-admin");
        assert_eq!(landing_route(Role::User), "/listing");
        assert_eq!(landing_route(Role::SuperAdmin), "/super-admin");
    }
}
