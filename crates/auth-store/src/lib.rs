//! Client-side authentication state for the storefront.
//!
//! This crate provides:
//! - The auth state store: login/logout/refresh/initialize against the
//!   external auth API, with single-flight initialization
//! - Explicit FSM-based lifecycle tracking
//! - Persisted identity snapshot (user projection only, never tokens)
//! - The render-time auth guard backstop

mod error;
mod guard;
mod store;
mod store_fsm;

pub use error::{AuthError, AuthResult};
pub use guard::{evaluate, GuardOutcome};
pub use store::{AuthStore, InitPhase, LoginOutcome, StateCallback, StoreSnapshot};
pub use store_fsm::store_machine;
pub use store_fsm::{StoreMachine, StoreMachineInput, StoreMachineState, StorePhase};
