//! The auth state store: single source of truth for "who is the current
//! user" on the client.
//!
//! Identity lives in memory; only the user projection is persisted (via
//! [`ProfileCache`]) for fast optimistic paint on reload. Tokens never touch
//! this store — they are httponly cookies owned by the auth API and carried
//! by the HTTP client's cookie jar.

use crate::store_fsm::{StoreMachine, StoreMachineInput, StorePhase};
use crate::{AuthError, AuthResult};
use auth_api::{AuthApiClient, AuthIdentity};
use std::sync::Mutex;
use storefront_core::{Config, Paths};
use storefront_storage::{FileStore, ProfileCache, StoredIdentity};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Initialization phase, explicit so the single-flight semantics are
/// testable in isolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitPhase {
    /// No initialization has run since boot (or since the last logout).
    Idle,
    /// One initialization is in flight; concurrent callers wait on it.
    Initializing,
    /// Initialization completed; later calls return immediately.
    Done,
}

/// Snapshot of store state for guards and UI bindings.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    /// Resolved identity, if any.
    pub identity: Option<AuthIdentity>,
    /// Current lifecycle phase.
    pub phase: StorePhase,
    /// Last user-facing error message, if any.
    pub error: Option<String>,
}

impl StoreSnapshot {
    /// True while authorization-dependent UI must not render.
    pub fn is_loading(&self) -> bool {
        self.phase.is_loading()
    }

    /// True when settled with a trusted identity.
    pub fn is_authenticated(&self) -> bool {
        !self.phase.is_loading() && self.identity.is_some()
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The resolved identity from the server response.
    pub identity: AuthIdentity,
    /// Landing route for the identity's role. The caller must perform a
    /// hard navigation here (full reload, not a soft transition) so all
    /// role-dependent UI remounts cleanly.
    pub navigate_to: &'static str,
}

/// Callback type for store state change notifications.
pub type StateCallback = Box<dyn Fn(StoreSnapshot) + Send + Sync>;

/// Client-side auth state store.
pub struct AuthStore {
    api: AuthApiClient,
    cache: ProfileCache,
    fsm: Mutex<StoreMachine>,
    identity: Mutex<Option<AuthIdentity>>,
    last_error: Mutex<Option<String>>,
    init_phase: watch::Sender<InitPhase>,
    state_callback: Mutex<Option<StateCallback>>,
}

impl AuthStore {
    /// Create a store, hydrating the identity from the persisted snapshot
    /// if one exists. The hydrated identity is optimistic until
    /// [`initialize`](Self::initialize) re-validates it.
    pub fn new(api: AuthApiClient, cache: ProfileCache) -> AuthResult<Self> {
        let hydrated = cache.get_identity()?.map(identity_from_stored);
        if hydrated.is_some() {
            debug!("Hydrated identity from persisted snapshot");
        }

        let (init_phase, _) = watch::channel(InitPhase::Idle);

        Ok(Self {
            api,
            cache,
            fsm: Mutex::new(StoreMachine::new()),
            identity: Mutex::new(hydrated),
            last_error: Mutex::new(None),
            init_phase,
            state_callback: Mutex::new(None),
        })
    }

    /// Open a store from configuration: API client against the configured
    /// base URL, identity snapshot persisted under the state file.
    pub fn open(config: &Config, paths: &Paths) -> AuthResult<Self> {
        paths.ensure_dirs()?;
        let backing = FileStore::open(paths.state_file())?;
        let api = AuthApiClient::new(config.api_base_url.clone())?;
        Self::new(api, ProfileCache::new(Box::new(backing)))
    }

    /// Set a callback to be notified on every phase change.
    pub fn set_state_callback(&self, callback: StateCallback) {
        let mut cb = self.state_callback.lock().unwrap();
        *cb = Some(callback);
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> StorePhase {
        let fsm = self.fsm.lock().unwrap();
        StorePhase::from(fsm.state())
    }

    /// Current initialization phase.
    pub fn init_phase(&self) -> InitPhase {
        *self.init_phase.borrow()
    }

    /// Current snapshot of identity, phase, and last error.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            identity: self.identity.lock().unwrap().clone(),
            phase: self.phase(),
            error: self.last_error.lock().unwrap().clone(),
        }
    }

    /// Login with email and password.
    ///
    /// On success the API has set the session cookies; the store holds the
    /// resolved identity and reports the role's landing route for the
    /// caller's hard navigation.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<LoginOutcome> {
        self.transition(&StoreMachineInput::LoginStarted)?;
        self.set_error(None);

        match self.api.login(email, password).await {
            Ok(user) => {
                self.store_identity(&user)?;
                self.transition(&StoreMachineInput::LoginSucceeded)?;
                info!(user_id = %user.id, "Login successful");

                Ok(LoginOutcome {
                    navigate_to: route_policy::landing_route(user.role),
                    identity: user,
                })
            }
            Err(e) => {
                let message = e.to_string();
                warn!("Login failed: {}", message);
                self.set_error(Some(message.clone()));
                self.transition(&StoreMachineInput::LoginFailed)?;

                if e.is_unauthorized() {
                    Err(AuthError::InvalidCredentials(message))
                } else {
                    Err(AuthError::Api(e))
                }
            }
        }
    }

    /// Register a new account. Returns the new user id. Does not log in.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> AuthResult<String> {
        self.set_error(None);
        match self.api.register(name, email, password).await {
            Ok(user_id) => Ok(user_id),
            Err(e) => {
                self.set_error(Some(e.to_string()));
                Err(AuthError::Api(e))
            }
        }
    }

    /// Logout.
    ///
    /// Local clearing is authoritative: identity and the persisted snapshot
    /// are removed even when the remote invalidation call fails. The remote
    /// call is best-effort.
    pub async fn logout(&self) -> AuthResult<()> {
        let _ = self.transition(&StoreMachineInput::LogoutStarted);

        if let Err(e) = self.api.logout().await {
            warn!("Remote logout failed (continuing local clear): {}", e);
        }

        self.clear_identity()?;
        let _ = self.transition(&StoreMachineInput::LogoutCompleted);

        // A fresh lifecycle may re-validate from scratch.
        self.init_phase.send_replace(InitPhase::Idle);

        info!("Logged out");
        Ok(())
    }

    /// Refresh the access token via the refresh endpoint.
    ///
    /// Returns `Ok(true)` on success (updating the identity when the
    /// endpoint returns one) and `Ok(false)` on failure. Failure never
    /// clears the identity: "could not refresh" is not "definitely logged
    /// out".
    pub async fn refresh_access_token(&self) -> AuthResult<bool> {
        let engaged = self.phase() == StorePhase::Authenticated;
        if engaged {
            self.transition(&StoreMachineInput::RefreshStarted)?;
        }

        match self.api.refresh_token().await {
            Ok(user) => {
                if let Some(user) = user {
                    self.store_identity(&user)?;
                }
                if engaged {
                    self.transition(&StoreMachineInput::RefreshSucceeded)?;
                }
                debug!("Access token refreshed");
                Ok(true)
            }
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                if engaged {
                    let _ = self.transition(&StoreMachineInput::RefreshFailed);
                }
                Ok(false)
            }
        }
    }

    /// Initialize the store: re-validate any persisted identity against the
    /// profile endpoint.
    ///
    /// Idempotent and single-flight: the first caller runs the validation,
    /// concurrent callers await the in-flight run, and later callers return
    /// immediately once the phase is [`InitPhase::Done`]. Exactly one
    /// profile call is issued no matter how many callers race.
    pub async fn initialize(&self) -> AuthResult<()> {
        if *self.init_phase.borrow() == InitPhase::Done {
            return Ok(());
        }

        let won = self.init_phase.send_if_modified(|phase| {
            if *phase == InitPhase::Idle {
                *phase = InitPhase::Initializing;
                true
            } else {
                false
            }
        });

        if !won {
            // Another caller owns the run; share its outcome.
            let mut rx = self.init_phase.subscribe();
            while *rx.borrow_and_update() != InitPhase::Done {
                if rx.changed().await.is_err() {
                    break;
                }
            }
            return Ok(());
        }

        let result = self.run_initialization().await;
        self.init_phase.send_replace(InitPhase::Done);
        result
    }

    /// The single in-flight initialization body.
    async fn run_initialization(&self) -> AuthResult<()> {
        self.transition(&StoreMachineInput::InitStarted)?;

        let has_identity = self.identity.lock().unwrap().is_some();
        if !has_identity {
            debug!("No persisted identity; resolving anonymous");
            self.transition(&StoreMachineInput::ResolvedAnonymous)?;
            return Ok(());
        }

        match self.api.fetch_profile().await {
            Ok(user) => {
                info!(user_id = %user.id, "Persisted identity re-validated");
                self.store_identity(&user)?;
                self.transition(&StoreMachineInput::ResolvedUser)?;
            }
            Err(e) if e.is_indeterminate() => {
                // Absence of proof, not proof of invalidity: keep the
                // identity and just end the loading phase.
                warn!(
                    "Indeterminate failure during auth initialization, keeping existing identity: {}",
                    e
                );
                self.transition(&StoreMachineInput::ResolvedUser)?;
            }
            Err(e) => {
                info!("Persisted identity rejected, clearing: {}", e);
                self.clear_identity()?;
                self.transition(&StoreMachineInput::ResolvedAnonymous)?;
            }
        }
        Ok(())
    }

    /// Fetch the current profile and update the identity.
    ///
    /// Returns `Ok(false)` when the API rejects the call; a 401 also clears
    /// the local identity (the profile endpoint is auth-sensitive).
    /// Indeterminate failures surface as errors and leave identity alone.
    pub async fn fetch_profile(&self) -> AuthResult<bool> {
        match self.api.fetch_profile().await {
            Ok(user) => {
                self.store_identity(&user)?;
                Ok(true)
            }
            Err(e) if e.is_indeterminate() => Err(AuthError::Api(e)),
            Err(e) => {
                self.set_error(Some(e.to_string()));
                if e.is_unauthorized() {
                    self.clear_identity()?;
                }
                Ok(false)
            }
        }
    }

    /// Update profile fields. Returns whether the update was accepted.
    pub async fn update_profile(&self, name: &str, email: &str) -> AuthResult<bool> {
        match self.api.update_profile(name, email).await {
            Ok(user) => {
                self.store_identity(&user)?;
                Ok(true)
            }
            Err(e) if e.is_indeterminate() => Err(AuthError::Api(e)),
            Err(e) => {
                self.set_error(Some(e.to_string()));
                if e.is_unauthorized() {
                    self.clear_identity()?;
                }
                Ok(false)
            }
        }
    }

    /// Transition the lifecycle machine and notify the callback when the
    /// phase changed.
    fn transition(&self, input: &StoreMachineInput) -> Result<StorePhase, AuthError> {
        let mut fsm = self.fsm.lock().unwrap();
        let old_phase = StorePhase::from(fsm.state());

        fsm.consume(input).map_err(|_| {
            AuthError::InvalidStateTransition(format!(
                "Cannot apply {:?} in state {:?}",
                input,
                fsm.state()
            ))
        })?;

        let new_phase = StorePhase::from(fsm.state());
        drop(fsm);

        if old_phase != new_phase {
            debug!(old_phase = ?old_phase, new_phase = ?new_phase, "Store phase transition");
            self.notify_state_change();
        }

        Ok(new_phase)
    }

    fn notify_state_change(&self) {
        let cb = self.state_callback.lock().unwrap();
        if let Some(callback) = cb.as_ref() {
            callback(self.snapshot());
        }
    }

    fn store_identity(&self, user: &AuthIdentity) -> AuthResult<()> {
        *self.identity.lock().unwrap() = Some(user.clone());
        self.cache.set_identity(&identity_to_stored(user))?;
        Ok(())
    }

    fn clear_identity(&self) -> AuthResult<()> {
        *self.identity.lock().unwrap() = None;
        self.cache.clear_identity()?;
        Ok(())
    }

    fn set_error(&self, message: Option<String>) {
        *self.last_error.lock().unwrap() = message;
    }
}

fn identity_to_stored(user: &AuthIdentity) -> StoredIdentity {
    StoredIdentity {
        id: user.id.clone(),
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role,
        created_at: user.created_at.clone(),
    }
}

fn identity_from_stored(stored: StoredIdentity) -> AuthIdentity {
    AuthIdentity {
        id: stored.id,
        name: stored.name,
        email: stored.email,
        role: stored.role,
        created_at: stored.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use session_token::Role;
    use storefront_storage::MemoryStore;

    fn stored_identity() -> StoredIdentity {
        StoredIdentity {
            id: "user-1".to_string(),
            name: Some("Ada".to_string()),
            email: "ada@example.com".to_string(),
            role: Role::User,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    fn store_with_snapshot(snapshot: Option<StoredIdentity>) -> AuthStore {
        let backing = MemoryStore::new();
        let cache = ProfileCache::new(Box::new(backing));
        if let Some(s) = snapshot {
            cache.set_identity(&s).unwrap();
        }
        // Dead port: nothing should actually connect in these tests.
        let api = AuthApiClient::new("http://127.0.0.1:9").unwrap();
        AuthStore::new(api, cache).unwrap()
    }

    #[test]
    fn test_new_store_is_uninitialized() {
        let store = store_with_snapshot(None);
        assert_eq!(store.phase(), StorePhase::Uninitialized);
        assert_eq!(store.init_phase(), InitPhase::Idle);
        assert!(store.snapshot().identity.is_none());
        assert!(store.snapshot().is_loading());
    }

    #[test]
    fn test_hydration_from_snapshot() {
        let store = store_with_snapshot(Some(stored_identity()));
        let snapshot = store.snapshot();
        assert_eq!(snapshot.identity.as_ref().unwrap().id, "user-1");
        // Hydrated but not yet settled: still loading.
        assert!(snapshot.is_loading());
        assert!(!store.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn test_initialize_without_snapshot_resolves_anonymous() {
        let store = store_with_snapshot(None);

        store.initialize().await.unwrap();

        assert_eq!(store.phase(), StorePhase::Anonymous);
        assert_eq!(store.init_phase(), InitPhase::Done);
        assert!(!store.snapshot().is_loading());
    }

    #[tokio::test]
    async fn test_initialize_network_failure_preserves_identity() {
        // The API client points at a dead port, so the profile re-validation
        // fails with a connection error — indeterminate, so fail open.
        let store = store_with_snapshot(Some(stored_identity()));

        store.initialize().await.unwrap();

        assert_eq!(store.phase(), StorePhase::Authenticated);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.identity.as_ref().unwrap().id, "user-1");
        assert!(snapshot.is_authenticated());
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let store = store_with_snapshot(None);

        store.initialize().await.unwrap();
        store.initialize().await.unwrap();

        assert_eq!(store.init_phase(), InitPhase::Done);
        assert_eq!(store.phase(), StorePhase::Anonymous);
    }

    #[tokio::test]
    async fn test_logout_clears_identity_despite_remote_failure() {
        let store = store_with_snapshot(Some(stored_identity()));
        store.initialize().await.unwrap();
        assert!(store.snapshot().identity.is_some());

        // Remote logout cannot reach the API; local clear happens anyway.
        store.logout().await.unwrap();

        assert!(store.snapshot().identity.is_none());
        assert_eq!(store.phase(), StorePhase::Anonymous);
        // Logout re-opens the initialization lifecycle.
        assert_eq!(store.init_phase(), InitPhase::Idle);
    }

    #[tokio::test]
    async fn test_refresh_failure_does_not_clear_identity() {
        let store = store_with_snapshot(Some(stored_identity()));
        store.initialize().await.unwrap();

        let refreshed = store.refresh_access_token().await.unwrap();

        assert!(!refreshed);
        assert!(store.snapshot().identity.is_some());
        assert_eq!(store.phase(), StorePhase::Authenticated);
    }

    #[tokio::test]
    async fn test_state_callback_fires_on_phase_change() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let store = store_with_snapshot(None);
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();

        store.set_state_callback(Box::new(move |_snapshot| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        }));

        store.initialize().await.unwrap();

        // Uninitialized -> Initializing -> Anonymous.
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
