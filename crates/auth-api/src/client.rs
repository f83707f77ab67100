//! REST client for the external authentication API.
//!
//! Two usage modes share one type:
//! - the client store uses a cookie-jar client ([`AuthApiClient::new`]) so
//!   the httponly session cookies set by the API ride along on subsequent
//!   calls, the way a browser carries them;
//! - the edge layer uses a stateless client ([`AuthApiClient::stateless`])
//!   and forwards/collects cookies explicitly per request.

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use session_token::Role;
use tracing::{debug, warn};

/// The resolved user projection returned by the auth API.
///
/// Derived 1:1 from a valid session via the server-side profile lookup; not
/// self-contained in the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthIdentity {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterResponse {
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    user: AuthIdentity,
}

/// Shape shared by the profile and refresh endpoints.
#[derive(Debug, Deserialize)]
struct StatusResponse {
    success: bool,
    #[serde(default)]
    user: Option<AuthIdentity>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Result of a cookie-forwarding refresh exchange (edge layer).
#[derive(Debug, Clone)]
pub struct CookieExchange {
    /// User returned by the refresh endpoint, when included.
    pub user: Option<AuthIdentity>,
    /// Raw `Set-Cookie` header values to forward onto the outgoing response.
    pub set_cookies: Vec<String>,
}

/// Client for the auth API.
#[derive(Clone)]
pub struct AuthApiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl AuthApiClient {
    /// Create a browser-like client with a cookie jar.
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let http_client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http_client,
            base_url: normalize(base_url.into()),
        })
    }

    /// Create a stateless client (no cookie jar) for per-request server use.
    pub fn stateless(base_url: impl Into<String>) -> ApiResult<Self> {
        let http_client = reqwest::Client::builder().build()?;
        Ok(Self {
            http_client,
            base_url: normalize(base_url.into()),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Register a new account. Returns the new user id.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> ApiResult<String> {
        let response = self
            .http_client
            .post(self.url("/register"))
            .json(&serde_json::json!({
                "name": name,
                "email": email,
                "password": password,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(reject(response).await);
        }

        let data: RegisterResponse = response.json().await?;
        Ok(data.user_id)
    }

    /// Authenticate with email/password. On success the API sets the session
    /// cookies; the returned user is the resolved identity.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthIdentity> {
        debug!(email = %email, "Attempting login");

        let response = self
            .http_client
            .post(self.url("/login"))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(reject(response).await);
        }

        let data: LoginResponse = response.json().await?;
        Ok(data.user)
    }

    /// Invalidate the session server-side. Best-effort from the caller's
    /// perspective; errors are surfaced but callers may ignore them.
    pub async fn logout(&self) -> ApiResult<()> {
        let response = self.http_client.post(self.url("/logout")).send().await?;

        if !response.status().is_success() {
            return Err(reject(response).await);
        }
        Ok(())
    }

    /// Exchange the refresh cookie for fresh session cookies.
    ///
    /// Returns the user when the endpoint includes one. Cookie handling is
    /// implicit via the jar.
    pub async fn refresh_token(&self) -> ApiResult<Option<AuthIdentity>> {
        let response = self
            .http_client
            .post(self.url("/refresh-token"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(reject(response).await);
        }

        let data: StatusResponse = response.json().await?;
        if !data.success {
            return Err(ApiError::Rejected {
                status: 200,
                message: data.error.unwrap_or_else(|| "refresh rejected".to_string()),
            });
        }
        Ok(data.user)
    }

    /// Fetch the current profile. Requires a valid session cookie.
    pub async fn fetch_profile(&self) -> ApiResult<AuthIdentity> {
        let response = self.http_client.get(self.url("/profile")).send().await?;

        if !response.status().is_success() {
            return Err(reject(response).await);
        }

        let data: StatusResponse = response.json().await?;
        match data.user {
            Some(user) if data.success => Ok(user),
            _ => Err(ApiError::Rejected {
                status: 200,
                message: data
                    .error
                    .unwrap_or_else(|| "profile unavailable".to_string()),
            }),
        }
    }

    /// Update profile fields. Returns the updated identity.
    pub async fn update_profile(&self, name: &str, email: &str) -> ApiResult<AuthIdentity> {
        let response = self
            .http_client
            .put(self.url("/profile"))
            .json(&serde_json::json!({
                "name": name,
                "email": email,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(reject(response).await);
        }

        let data: StatusResponse = response.json().await?;
        match data.user {
            Some(user) if data.success => Ok(user),
            _ => Err(ApiError::Rejected {
                status: 200,
                message: data
                    .error
                    .unwrap_or_else(|| "profile update failed".to_string()),
            }),
        }
    }

    /// Edge-layer refresh: forward the refresh cookie explicitly and collect
    /// the `Set-Cookie` headers for the outgoing response.
    ///
    /// Must be called on a [`stateless`](Self::stateless) client so no jar
    /// state leaks between unrelated requests.
    pub async fn refresh_with_cookie(&self, refresh_token: &str) -> ApiResult<CookieExchange> {
        let response = self
            .http_client
            .post(self.url("/refresh-token"))
            .header(
                reqwest::header::COOKIE,
                format!("refreshToken={}", refresh_token),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(reject(response).await);
        }

        let set_cookies: Vec<String> = response
            .headers()
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(String::from))
            .collect();

        let data: StatusResponse = response.json().await?;
        if !data.success {
            return Err(ApiError::Rejected {
                status: 200,
                message: data.error.unwrap_or_else(|| "refresh rejected".to_string()),
            });
        }

        Ok(CookieExchange {
            user: data.user,
            set_cookies,
        })
    }
}

fn normalize(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Map a non-success response to an [`ApiError`], pulling the API's error
/// message out of the body when present.
async fn reject(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    warn!(status = %status, "Auth API call failed");

    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .unwrap_or(body);

    if status.is_server_error() {
        ApiError::Server {
            status: status.as_u16(),
            message,
        }
    } else {
        ApiError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}
