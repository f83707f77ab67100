//! Client for the external authentication REST API.
//!
//! The API owns credential checking, token issuance, and the httponly session
//! cookies (`accessToken`, `refreshToken`). This crate only speaks to it:
//! - login/register/logout
//! - token refresh (cookie-jar and explicit-cookie variants)
//! - profile fetch/update

mod client;
mod error;

pub use client::{AuthApiClient, AuthIdentity, CookieExchange};
pub use error::{ApiError, ApiResult};
