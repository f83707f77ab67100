//! Store lifecycle state machine using rust-fsm.
//!
//! The store's phase is tracked by an explicit finite state machine instead
//! of a loose `isLoading` boolean plus nullable user.
//!
//! ## State Diagram
//!
//! ```text
//! ┌───────────────┐
//! │ Uninitialized │ (initial)
//! └───────┬───────┘
//!         │ InitStarted / LoginStarted
//!         ▼
//! ┌───────────────┐      ResolvedUser       ┌───────────────┐
//! │ Initializing  │ ──────────────────────► │ Authenticated │
//! └───────┬───────┘                         └───┬───────┬───┘
//!         │ ResolvedAnonymous                   │       │ RefreshStarted
//!         ▼                                     │       ▼
//! ┌───────────────┐       LoginSucceeded        │  ┌────────────┐
//! │   Anonymous   │ ◄─────────────┐             │  │ Refreshing │
//! └───────┬───────┘               │             │  └─────┬──────┘
//!         │ LoginStarted          │             │        │ RefreshSucceeded /
//!         ▼                       │             │        │ RefreshFailed
//! ┌───────────────┐               │             │        ▼
//! │   LoggingIn   │ ──────────────┘             │   Authenticated
//! └───────────────┘  (LoginFailed → Anonymous)  │
//!                                               │ LogoutStarted
//!                                               ▼
//!                                        ┌────────────┐
//!                                        │ LoggingOut │ ── LogoutCompleted ──► Anonymous
//!                                        └────────────┘
//! ```
//!
//! A failed refresh deliberately lands back on `Authenticated`: "could not
//! refresh" is not "definitely logged out", so the identity is kept.

use rust_fsm::*;

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub store_machine(Uninitialized)

    Uninitialized => {
        InitStarted => Initializing,
        LoginStarted => LoggingIn
    },
    Initializing => {
        ResolvedUser => Authenticated,
        ResolvedAnonymous => Anonymous
    },
    Anonymous => {
        InitStarted => Initializing,
        LoginStarted => LoggingIn
    },
    LoggingIn => {
        LoginSucceeded => Authenticated,
        LoginFailed => Anonymous
    },
    Authenticated => {
        InitStarted => Initializing,
        RefreshStarted => Refreshing,
        LogoutStarted => LoggingOut
    },
    Refreshing => {
        RefreshSucceeded => Authenticated,
        RefreshFailed => Authenticated
    },
    LoggingOut => {
        LogoutCompleted => Anonymous
    }
}

// Re-export the generated types with clearer names
pub use store_machine::Input as StoreMachineInput;
pub use store_machine::State as StoreMachineState;
pub use store_machine::StateMachine as StoreMachine;

/// Store phase for external consumption (guard, UI bindings).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePhase {
    /// Fresh store; nothing resolved yet.
    Uninitialized,
    /// Re-validating a persisted snapshot.
    Initializing,
    /// Login call in flight.
    LoggingIn,
    /// Resolved: a trusted identity is present.
    Authenticated,
    /// Resolved: no identity.
    Anonymous,
    /// Token refresh in flight (identity stays trusted meanwhile).
    Refreshing,
    /// Logout in flight.
    LoggingOut,
}

impl StorePhase {
    /// True while authorization-dependent UI must not render.
    ///
    /// Refreshing is not loading: the current identity remains valid while
    /// the refresh runs.
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            StorePhase::Uninitialized
                | StorePhase::Initializing
                | StorePhase::LoggingIn
                | StorePhase::LoggingOut
        )
    }

    /// True once the store has settled on an answer (with or without a user).
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            StorePhase::Authenticated | StorePhase::Anonymous | StorePhase::Refreshing
        )
    }
}

impl From<&StoreMachineState> for StorePhase {
    fn from(state: &StoreMachineState) -> Self {
        match state {
            StoreMachineState::Uninitialized => StorePhase::Uninitialized,
            StoreMachineState::Initializing => StorePhase::Initializing,
            StoreMachineState::LoggingIn => StorePhase::LoggingIn,
            StoreMachineState::Authenticated => StorePhase::Authenticated,
            StoreMachineState::Anonymous => StorePhase::Anonymous,
            StoreMachineState::Refreshing => StorePhase::Refreshing,
            StoreMachineState::LoggingOut => StorePhase::LoggingOut,
        }
    }
}
