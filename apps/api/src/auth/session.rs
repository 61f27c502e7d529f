//! Session store: resolves bearer tokens to signed-in users and their
//! profiles, and follows sign-in/sign-out events from the auth backend.
//!
//! Lifecycle is explicit: `init` subscribes to auth-state changes and marks
//! the store ready, `shutdown` unsubscribes and drops every cached session.
//! Until `init` completes every lookup reports `SessionState::Loading`.
//!
//! Resolved sessions are cached for at most the configured TTL, or the
//! token's own lifetime when the backend reports a shorter one. Sign-out is
//! global, so it evicts every cached token of the user.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache;
use moka::Expiry;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::provider::{AuthError, AuthEvent, AuthProvider, AuthSession, AuthUser};
use crate::errors::AppError;
use crate::models::profile::{Role, UserProfile};
use crate::store::{Store, StoreError};

/// Default session cache TTL (5 minutes).
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 300;

/// Default session cache capacity.
pub const DEFAULT_SESSION_CACHE_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
pub struct SessionCacheConfig {
    pub ttl: Duration,
    pub max_capacity: u64,
}

impl Default for SessionCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECONDS),
            max_capacity: DEFAULT_SESSION_CACHE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Session {
    #[serde(skip)]
    pub access_token: String,
    /// Token lifetime in seconds, as reported by the auth backend.
    #[serde(skip)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
    pub profile: UserProfile,
}

impl Session {
    pub fn role(&self) -> Role {
        self.profile.role
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Loading,
    SignedOut,
    SignedIn(Box<Session>),
}

/// Caps each entry at the cache TTL or the token's lifetime, whichever ends first.
struct SessionExpiry {
    ttl: Duration,
}

impl Expiry<String, Session> for SessionExpiry {
    fn expire_after_create(
        &self,
        _token: &String,
        session: &Session,
        _created_at: Instant,
    ) -> Option<Duration> {
        let lifetime = session
            .expires_in
            .map(Duration::from_secs)
            .map_or(self.ttl, |token_ttl| token_ttl.min(self.ttl));
        Some(lifetime)
    }
}

pub struct SessionStore {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn Store>,
    sessions: Cache<String, Session>,
    ready: AtomicBool,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl SessionStore {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn Store>,
        config: SessionCacheConfig,
    ) -> Arc<Self> {
        info!(
            ttl_seconds = config.ttl.as_secs(),
            max_capacity = config.max_capacity,
            "Session cache configuration loaded"
        );
        let sessions = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(SessionExpiry { ttl: config.ttl })
            .build();
        Arc::new(Self {
            auth,
            store,
            sessions,
            ready: AtomicBool::new(false),
            listener: Mutex::new(None),
        })
    }

    pub fn auth(&self) -> &Arc<dyn AuthProvider> {
        &self.auth
    }

    /// Subscribes to auth-state changes and marks the store ready.
    /// Calling it twice replaces the previous subscription.
    pub async fn init(self: &Arc<Self>) {
        let mut events = self.auth.subscribe();
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => this.apply_event(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Session listener lagged, skipped {skipped} auth events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("Auth event channel closed");
        });

        if let Some(previous) = self.listener.lock().await.replace(handle) {
            previous.abort();
        }
        self.ready.store(true, Ordering::SeqCst);
        info!("Session store initialized");
    }

    /// Unsubscribes from auth-state changes and forgets every cached session.
    pub async fn shutdown(&self) {
        self.ready.store(false, Ordering::SeqCst);
        if let Some(handle) = self.listener.lock().await.take() {
            handle.abort();
        }
        self.sessions.invalidate_all();
        info!("Session store shut down");
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn apply_event(&self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(auth_session) => {
                if let Err(e) = self.remember(auth_session).await {
                    warn!("Failed to load profile for signed-in user: {e}");
                }
            }
            AuthEvent::SignedOut { access_token } => self.evict_token_owner(&access_token).await,
        }
    }

    async fn remember(&self, auth_session: AuthSession) -> Result<Session, StoreError> {
        let profile = self.ensure_profile(&auth_session.user).await?;
        let session = Session {
            access_token: auth_session.access_token,
            expires_in: auth_session.expires_in,
            user: auth_session.user,
            profile,
        };
        self.sessions
            .insert(session.access_token.clone(), session.clone())
            .await;
        Ok(session)
    }

    /// Loads the user's profile, creating it from auth metadata on first login.
    async fn ensure_profile(&self, user: &AuthUser) -> Result<UserProfile, StoreError> {
        if let Some(profile) = self.store.get_profile(user.id).await? {
            return Ok(profile);
        }
        let meta = &user.user_metadata;
        let profile = UserProfile::first_login(
            user.id,
            &user.email,
            meta.full_name.as_deref(),
            Role::from_metadata(meta.role.as_deref()),
            meta.avatar_url.as_deref(),
        );
        match self.store.insert_profile(&profile).await {
            Ok(()) => Ok(profile),
            // lost a race with a concurrent first login
            Err(StoreError::Conflict(_)) => self
                .store
                .get_profile(user.id)
                .await?
                .ok_or_else(|| StoreError::Conflict(format!("email {} taken", user.email))),
            Err(e) => Err(e),
        }
    }

    /// Resolves a bearer token to the current session state.
    pub async fn resolve(&self, access_token: Option<&str>) -> Result<SessionState, AppError> {
        if !self.is_ready() {
            return Ok(SessionState::Loading);
        }
        let Some(token) = access_token else {
            return Ok(SessionState::SignedOut);
        };
        if let Some(session) = self.sessions.get(token).await {
            return Ok(SessionState::SignedIn(Box::new(session)));
        }

        let user = match self.auth.get_user(token).await {
            Ok(user) => user,
            Err(AuthError::InvalidToken) => return Ok(SessionState::SignedOut),
            Err(e) => return Err(e.into()),
        };
        let session = self
            .remember(AuthSession {
                access_token: token.to_string(),
                refresh_token: None,
                expires_in: None,
                user,
            })
            .await?;
        Ok(SessionState::SignedIn(Box::new(session)))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let auth_session = self.auth.sign_in_with_password(email, password).await?;
        Ok(self.remember(auth_session).await?)
    }

    /// Signs the user out everywhere and evicts all of their cached tokens.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        self.auth.sign_out(access_token).await?;
        self.evict_token_owner(access_token).await;
        Ok(())
    }

    async fn evict_token_owner(&self, access_token: &str) {
        match self.sessions.get(access_token).await {
            Some(session) => self.forget_user(session.profile.id).await,
            None => self.sessions.invalidate(access_token).await,
        }
    }

    /// Replaces the cached profile of every session belonging to `profile.id`.
    pub async fn refresh_profile(&self, profile: &UserProfile) {
        let stale: Vec<_> = self
            .sessions
            .iter()
            .filter(|(_, s)| s.profile.id == profile.id)
            .collect();
        for (token, mut session) in stale {
            session.profile = profile.clone();
            self.sessions.insert(token.as_ref().clone(), session).await;
        }
    }

    /// Drops every cached session of a user, e.g. after account deletion.
    pub async fn forget_user(&self, user_id: Uuid) {
        let tokens: Vec<_> = self
            .sessions
            .iter()
            .filter(|(_, s)| s.profile.id == user_id)
            .map(|(token, _)| token)
            .collect();
        for token in tokens {
            self.sessions.invalidate(token.as_ref()).await;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::StubAuth;
    use super::*;
    use crate::store::MemoryStore;

    async fn ready_store(auth: StubAuth) -> (Arc<SessionStore>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let sessions = SessionStore::new(Arc::new(auth), store.clone(), SessionCacheConfig::default());
        sessions.init().await;
        (sessions, store)
    }

    fn is_signed_in(state: &SessionState) -> bool {
        matches!(state, SessionState::SignedIn(_))
    }

    #[tokio::test]
    async fn test_loading_until_initialized() {
        let store = Arc::new(MemoryStore::new());
        let sessions =
            SessionStore::new(Arc::new(StubAuth::new()), store, SessionCacheConfig::default());
        assert_eq!(sessions.resolve(Some("x")).await.unwrap(), SessionState::Loading);
        sessions.init().await;
        assert_eq!(sessions.resolve(None).await.unwrap(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn test_first_resolve_creates_profile_from_metadata() {
        let (sessions, store) =
            ready_store(StubAuth::new().with_user("mia@uni.edu", "mentor")).await;

        let state = sessions.resolve(Some("token-mia@uni.edu")).await.unwrap();
        let SessionState::SignedIn(session) = state else {
            panic!("expected signed in, got {state:?}");
        };
        assert_eq!(session.role(), Role::Mentor);
        assert_eq!(session.profile.full_name.as_deref(), Some("mia"));
        assert!(store.get_profile(session.user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unknown_token_is_signed_out() {
        let (sessions, _) = ready_store(StubAuth::new()).await;
        assert_eq!(
            sessions.resolve(Some("forged")).await.unwrap(),
            SessionState::SignedOut
        );
    }

    #[tokio::test]
    async fn test_sign_in_then_sign_out() {
        let (sessions, _) = ready_store(StubAuth::new().with_user("leo@uni.edu", "student")).await;
        let session = sessions.sign_in("leo@uni.edu", "secret").await.unwrap();
        assert_eq!(session.role(), Role::Student);

        sessions.sign_out(&session.access_token).await.unwrap();
        // let the listener drain the sign-in and sign-out events
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        assert!(sessions.sessions.get(&session.access_token).await.is_none());
        assert_eq!(
            sessions.resolve(Some(&session.access_token)).await.unwrap(),
            SessionState::SignedOut
        );
    }

    #[tokio::test]
    async fn test_sign_out_evicts_every_token_of_the_user() {
        let auth = StubAuth::new()
            .with_user("leo@uni.edu", "student")
            .with_alias("laptop-token", "leo@uni.edu")
            .with_user("mia@uni.edu", "student");
        let (sessions, _) = ready_store(auth).await;

        for token in ["token-leo@uni.edu", "laptop-token", "token-mia@uni.edu"] {
            assert!(is_signed_in(&sessions.resolve(Some(token)).await.unwrap()));
        }

        sessions.sign_out("token-leo@uni.edu").await.unwrap();

        assert_eq!(
            sessions.resolve(Some("laptop-token")).await.unwrap(),
            SessionState::SignedOut
        );
        assert!(is_signed_in(
            &sessions.resolve(Some("token-mia@uni.edu")).await.unwrap()
        ));
    }

    #[tokio::test]
    async fn test_cached_session_expires_after_ttl() {
        let auth = Arc::new(StubAuth::new().with_user("leo@uni.edu", "student"));
        let sessions = SessionStore::new(
            auth.clone(),
            Arc::new(MemoryStore::new()),
            SessionCacheConfig {
                ttl: Duration::from_millis(50),
                max_capacity: 100,
            },
        );
        sessions.init().await;

        let token = "token-leo@uni.edu";
        assert!(is_signed_in(&sessions.resolve(Some(token)).await.unwrap()));

        // revoked elsewhere, no event reaches this process
        auth.revoke(token);
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(
            sessions.resolve(Some(token)).await.unwrap(),
            SessionState::SignedOut
        );
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let (sessions, _) = ready_store(StubAuth::new().with_user("leo@uni.edu", "student")).await;
        assert!(matches!(
            sessions.sign_in("leo@uni.edu", "guess").await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_shutdown_returns_to_loading() {
        let (sessions, _) = ready_store(StubAuth::new().with_user("leo@uni.edu", "admin")).await;
        sessions.resolve(Some("token-leo@uni.edu")).await.unwrap();
        sessions.shutdown().await;
        assert!(sessions.sessions.get("token-leo@uni.edu").await.is_none());
        assert_eq!(
            sessions.resolve(Some("token-leo@uni.edu")).await.unwrap(),
            SessionState::Loading
        );
    }
}
