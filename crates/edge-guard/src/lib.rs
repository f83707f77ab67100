//! Edge authorization middleware for the storefront.
//!
//! Evaluated server-side per incoming request, before anything renders. A
//! strict finite-state machine over the session cookies:
//!
//! ```text
//! NoToken      × Public          → allow
//! NoToken      × non-Public      → redirect to login
//! TokenValid   × eligible route  → allow
//! TokenValid   × admin route,
//!                non-admin role  → redirect to role home
//! TokenValid   × auth page       → redirect to role home
//! TokenInvalid                   → one refresh attempt:
//!                                    success → allow (cookies forwarded)
//!                                    failure → redirect to login,
//!                                              both cookies cleared
//! ```
//!
//! Bounded by construction: exactly one refresh attempt per request, no
//! loops, no recursion. Concurrent requests are not de-duplicated — N
//! simultaneous requests with an expired token may issue N refresh calls.

use auth_api::AuthApiClient;
use route_policy::{classify, home_route, is_auth_page, RouteClass, LOGIN_ROUTE};
use session_token::{Claims, Role, SessionTokenVerifier};
use storefront_core::{Config, CoreError, CoreResult};
use tracing::{debug, warn};

/// Access token cookie name (httponly, set by the auth API).
pub const ACCESS_COOKIE: &str = "accessToken";
/// Refresh token cookie name (httponly, set by the auth API).
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Session cookies extracted from an incoming request.
#[derive(Debug, Clone, Default)]
pub struct RequestCookies {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl RequestCookies {
    /// No cookies at all (anonymous request).
    pub fn none() -> Self {
        Self::default()
    }
}

/// Per-request token state.
#[derive(Debug, Clone)]
enum TokenState {
    /// Neither session cookie present.
    NoToken,
    /// Access token verified; claims are trusted.
    Valid(Claims),
    /// A session exists but the access token does not verify (expired,
    /// malformed, forged, or missing while a refresh cookie remains).
    Invalid,
}

/// What the middleware tells the server to do with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Let the request through.
    Allow,
    /// Let the request through; forward these `Set-Cookie` headers from the
    /// refresh endpoint onto the response. The refreshed token is trusted
    /// without re-verification.
    AllowAfterRefresh { set_cookies: Vec<String> },
    /// Redirect. `clear_cookies` removes both session cookies so a dead
    /// session does not retrigger futile refresh attempts.
    Redirect {
        location: String,
        clear_cookies: bool,
    },
}

/// Pure outcome of the decision table, before any I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Allow,
    RedirectLogin,
    RedirectHome(Role),
    AttemptRefresh,
}

/// The decision table. No I/O; fully deterministic in (path, token state).
fn decide(route: RouteClass, state: &TokenState, path: &str) -> Gate {
    match state {
        TokenState::NoToken => match route {
            RouteClass::Public => Gate::Allow,
            _ => Gate::RedirectLogin,
        },
        TokenState::Valid(claims) => {
            if is_auth_page(path) {
                // Never show login/register to an authenticated session.
                return Gate::RedirectHome(claims.role);
            }
            match route {
                RouteClass::ProtectedSuperAdmin if !claims.role.is_super_admin() => {
                    Gate::RedirectHome(claims.role)
                }
                _ => Gate::Allow,
            }
        }
        TokenState::Invalid => Gate::AttemptRefresh,
    }
}

/// Server-side authorization gate.
pub struct EdgeGuard {
    verifier: SessionTokenVerifier,
    api: AuthApiClient,
}

impl EdgeGuard {
    /// Create a guard from the shared verifier and a stateless API client.
    pub fn new(verifier: SessionTokenVerifier, api: AuthApiClient) -> Self {
        Self { verifier, api }
    }

    /// Build a guard from loaded configuration: the shared signing secret
    /// and the auth API base URL. Requires `STOREFRONT_SESSION_SECRET`.
    pub fn from_config(config: &Config) -> CoreResult<Self> {
        let verifier = SessionTokenVerifier::new(config.session_secret()?);
        let api = AuthApiClient::stateless(config.api_base_url.clone())
            .map_err(|e| CoreError::Config(format!("auth API client: {e}")))?;
        Ok(Self::new(verifier, api))
    }

    fn token_state(&self, cookies: &RequestCookies) -> TokenState {
        match (&cookies.access_token, &cookies.refresh_token) {
            (None, None) => TokenState::NoToken,
            (Some(token), _) => match self.verifier.verify(token) {
                Ok(claims) => TokenState::Valid(claims),
                Err(_) => TokenState::Invalid,
            },
            // Access cookie gone but a refresh cookie remains: the session
            // is recoverable, so take the refresh path.
            (None, Some(_)) => TokenState::Invalid,
        }
    }

    /// Authorize one request.
    pub async fn authorize(&self, path: &str, cookies: &RequestCookies) -> Decision {
        let route = classify(path);
        let state = self.token_state(cookies);
        debug!(path = %path, route = ?route, state = ?discriminant_name(&state), "Edge authorization");

        match decide(route, &state, path) {
            Gate::Allow => Decision::Allow,
            Gate::RedirectLogin => Decision::Redirect {
                location: LOGIN_ROUTE.to_string(),
                clear_cookies: false,
            },
            Gate::RedirectHome(role) => Decision::Redirect {
                location: home_route(role).to_string(),
                clear_cookies: false,
            },
            Gate::AttemptRefresh => self.refresh_once(path, cookies).await,
        }
    }

    /// The single bounded refresh escalation.
    async fn refresh_once(&self, path: &str, cookies: &RequestCookies) -> Decision {
        let refresh_token = match cookies.refresh_token.as_deref() {
            Some(token) => token,
            None => {
                // Invalid access token and nothing to refresh with.
                return Decision::Redirect {
                    location: LOGIN_ROUTE.to_string(),
                    clear_cookies: true,
                };
            }
        };

        match self.api.refresh_with_cookie(refresh_token).await {
            Ok(exchange) => {
                debug!(path = %path, "Session refreshed at the edge");
                Decision::AllowAfterRefresh {
                    set_cookies: exchange.set_cookies,
                }
            }
            Err(e) => {
                warn!(path = %path, "Edge refresh failed, clearing session cookies: {}", e);
                Decision::Redirect {
                    location: LOGIN_ROUTE.to_string(),
                    clear_cookies: true,
                }
            }
        }
    }
}

fn discriminant_name(state: &TokenState) -> &'static str {
    match state {
        TokenState::NoToken => "NoToken",
        TokenState::Valid(_) => "TokenValid",
        TokenState::Invalid => "TokenInvalid",
    }
}
