//! Session store: single source of truth for "who is logged in".
//!
//! In-memory state lives in a `tokio::sync::watch` channel (subscribers get
//! replay-latest semantics); durable state lives under three independent
//! storage keys (`auth_token`, `auth_user`, `auth_session`). "Logged in" is
//! defined as token + user snapshot both present in storage; the client
//! never checks session expiry locally.
//!
//! Every authentication network call goes through this store, exactly once
//! per operation - no retries, no background refresh timer.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::instrument;

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{AuthResponse, LoginRequest, OauthProvider, RegisterRequest, User};
use crate::storage::{Storage, StorageExt, keys};

/// Client-side authentication state.
///
/// Construct once at process start and call [`initialize`](Self::initialize)
/// before any route guard runs.
pub struct SessionStore {
    api: ApiClient,
    storage: Arc<dyn Storage>,
    user_tx: watch::Sender<Option<User>>,
}

impl SessionStore {
    /// Create a new session store in the logged-out state.
    #[must_use]
    pub fn new(api: ApiClient, storage: Arc<dyn Storage>) -> Self {
        let (user_tx, _) = watch::channel(None);
        Self {
            api,
            storage,
            user_tx,
        }
    }

    // =========================================================================
    // State access
    // =========================================================================

    /// The current identity, if authenticated.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.user_tx.borrow().clone()
    }

    /// Subscribe to identity changes.
    ///
    /// The receiver immediately holds the current snapshot; every change is
    /// observed as the most recent value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.user_tx.subscribe()
    }

    /// Whether the current identity has the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user_tx
            .borrow()
            .as_ref()
            .is_some_and(|user| user.role.is_admin())
    }

    /// Whether a user is logged in.
    ///
    /// If in-memory state says "not authenticated" but storage holds both a
    /// token and a user snapshot, the stored identity is adopted into memory
    /// and subsequent calls short-circuit from memory. This covers callers
    /// that race ahead of [`initialize`](Self::initialize).
    pub fn is_logged_in(&self) -> bool {
        if self.user_tx.borrow().is_some() {
            return true;
        }

        let token = self.storage.get(keys::AUTH_TOKEN);
        let stored_user: Option<User> = self.storage.get_json(keys::AUTH_USER);
        if let (Some(_), Some(user)) = (token, stored_user) {
            tracing::debug!("Restoring identity from storage");
            self.user_tx.send_replace(Some(user));
            return true;
        }

        false
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Initialize authentication state from durable storage.
    ///
    /// Run exactly once at process start, before any route is allowed to
    /// activate. Adopts the stored identity when both token and user
    /// snapshot exist; otherwise clears to logged-out. No backend call is
    /// made - the stored identity is trusted until an operation says
    /// otherwise.
    #[instrument(skip(self))]
    pub fn initialize(&self) {
        let token = self.storage.get(keys::AUTH_TOKEN);
        let stored_user: Option<User> = self.storage.get_json(keys::AUTH_USER);

        match (token, stored_user) {
            (Some(_), Some(user)) => {
                tracing::debug!(user = %user.id, "Adopting stored identity");
                self.user_tx.send_replace(Some(user));
            }
            _ => {
                tracing::debug!("No stored identity, starting logged out");
                self.clear_current_user();
            }
        }
    }

    // =========================================================================
    // Authentication operations
    // =========================================================================

    /// Log in with email and password.
    ///
    /// On success the returned identity is adopted and persisted. On failure
    /// state is left untouched - a pre-existing session survives a failed
    /// re-login attempt.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with the backend's message on failure.
    #[instrument(skip(self, credentials))]
    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse> {
        let response = self.api.login(credentials).await?;
        self.adopt(&response);
        Ok(response)
    }

    /// Register a new account.
    ///
    /// Deliberately does NOT adopt the returned session: email verification
    /// gates the first login.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with the backend's message on failure.
    #[instrument(skip(self, data))]
    pub async fn register(&self, data: &RegisterRequest) -> Result<AuthResponse> {
        let response = self.api.register(data).await?;
        Ok(response)
    }

    /// Log out.
    ///
    /// Local cleanup is guaranteed: in-memory identity and all three storage
    /// keys are cleared whether or not the backend call succeeds.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            tracing::warn!(error = %e, "Backend logout failed, clearing local state anyway");
        }
        self.clear_current_user();
    }

    /// Fetch the OAuth redirect URL for a provider.
    ///
    /// The caller is responsible for sending the browser there.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with the backend's message on failure.
    #[instrument(skip(self))]
    pub async fn oauth_redirect_url(&self, provider: OauthProvider) -> Result<String> {
        let url = self.api.oauth_redirect_url(provider).await?;
        Ok(url)
    }

    /// Complete an OAuth flow with the provider's authorization code.
    ///
    /// On success the identity is adopted and persisted exactly like
    /// [`login`](Self::login); on failure state is untouched.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with the backend's message on failure.
    #[instrument(skip(self, code, state))]
    pub async fn oauth_callback(
        &self,
        provider: OauthProvider,
        code: &str,
        state: Option<&str>,
    ) -> Result<AuthResponse> {
        let response = self.api.oauth_callback(provider, code, state).await?;
        self.adopt(&response);
        Ok(response)
    }

    /// Re-validate and extend the session.
    ///
    /// On success the in-memory identity is replaced (storage is not
    /// rewritten). On failure the in-memory identity is cleared but durable
    /// storage is left alone - the caller decides whether to escalate to
    /// [`logout`](Self::logout).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with the backend's message on failure.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<AuthResponse> {
        match self.api.refresh().await {
            Ok(response) => {
                self.user_tx.send_replace(Some(response.user.clone()));
                Ok(response)
            }
            Err(e) => {
                self.user_tx.send_replace(None);
                Err(e.into())
            }
        }
    }

    /// Ask the backend for the current server-side session.
    ///
    /// Failures are swallowed and reported as "no session"; this call is a
    /// probe, not an operation.
    #[instrument(skip(self))]
    pub async fn server_session(&self) -> Option<AuthResponse> {
        match self.api.get_session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Session check failed");
                None
            }
        }
    }

    /// Verify an email address with the token from the verification mail.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with the backend's message on failure.
    #[instrument(skip(self, token))]
    pub async fn verify_email(&self, token: &str) -> Result<String> {
        let response = self.api.verify_email(token).await?;
        Ok(response.message)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Adopt an auth response: replace the in-memory identity and persist
    /// user, session, and token (when present) to storage.
    ///
    /// Storage write failures are logged and swallowed; the in-memory state
    /// stays authoritative for this page life.
    fn adopt(&self, response: &AuthResponse) {
        self.user_tx.send_replace(Some(response.user.clone()));

        if let Err(e) = self.storage.set_json(keys::AUTH_USER, &response.user) {
            tracing::error!(error = %e, "Failed to persist user snapshot");
        }
        if let Some(session) = &response.session
            && let Err(e) = self.storage.set_json(keys::AUTH_SESSION, session)
        {
            tracing::error!(error = %e, "Failed to persist session snapshot");
        }
        if let Some(token) = &response.token
            && let Err(e) = self.storage.set(keys::AUTH_TOKEN, token)
        {
            tracing::error!(error = %e, "Failed to persist auth token");
        }
    }

    /// Clear the in-memory identity and all three storage keys.
    fn clear_current_user(&self) {
        self.user_tx.send_replace(None);
        self.storage.remove(keys::AUTH_TOKEN);
        self.storage.remove(keys::AUTH_USER);
        self.storage.remove(keys::AUTH_SESSION);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use url::Url;

    use super::*;
    use crate::config::ClientConfig;
    use crate::storage::MemoryStorage;

    fn sample_user(role: &str) -> String {
        format!(
            r#"{{
                "id": "usr_1",
                "email": "jane@example.com",
                "name": "Jane",
                "username": "jane",
                "role": "{role}",
                "emailVerified": true,
                "createdAt": "2025-01-15T10:00:00Z",
                "updatedAt": "2025-01-15T10:00:00Z"
            }}"#
        )
    }

    /// Store wired to an unreachable backend; good enough for the paths that
    /// never touch the network.
    fn offline_store(storage: Arc<MemoryStorage>) -> SessionStore {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let config = ClientConfig::new(
            Url::parse("http://127.0.0.1:9").expect("url"),
            PathBuf::from("/tmp/unused"),
        );
        let api = ApiClient::new(&config, storage.clone());
        SessionStore::new(api, storage)
    }

    #[test]
    fn test_initialize_adopts_stored_identity() {
        let storage = Arc::new(MemoryStorage::default());
        storage.set(keys::AUTH_TOKEN, "tok_1").expect("set");
        storage.set(keys::AUTH_USER, &sample_user("user")).expect("set");

        let store = offline_store(storage);
        store.initialize();

        assert!(store.is_logged_in());
        assert_eq!(
            store.current_user().expect("user").id.as_str(),
            "usr_1"
        );
    }

    #[test]
    fn test_initialize_without_token_starts_logged_out() {
        let storage = Arc::new(MemoryStorage::default());
        // User snapshot alone is not enough - both keys must be present.
        storage.set(keys::AUTH_USER, &sample_user("user")).expect("set");

        let store = offline_store(storage.clone());
        store.initialize();

        assert!(!store.is_logged_in());
        assert!(store.current_user().is_none());
        // The orphan snapshot is cleared, restoring the both-or-neither
        // invariant.
        assert!(storage.get(keys::AUTH_USER).is_none());
    }

    #[test]
    fn test_is_logged_in_lazily_rehydrates() {
        let storage = Arc::new(MemoryStorage::default());
        storage.set(keys::AUTH_TOKEN, "tok_1").expect("set");
        storage.set(keys::AUTH_USER, &sample_user("user")).expect("set");

        // No initialize() call: the getter itself must recover.
        let store = offline_store(storage.clone());
        assert!(store.is_logged_in());

        // Now in memory; wiping storage no longer changes the answer.
        storage.remove(keys::AUTH_TOKEN);
        storage.remove(keys::AUTH_USER);
        assert!(store.is_logged_in());
    }

    #[test]
    fn test_is_admin_follows_role() {
        let storage = Arc::new(MemoryStorage::default());
        storage.set(keys::AUTH_TOKEN, "tok_1").expect("set");
        storage.set(keys::AUTH_USER, &sample_user("admin")).expect("set");

        let store = offline_store(storage);
        store.initialize();
        assert!(store.is_admin());
    }

    #[test]
    fn test_subscribe_replays_latest() {
        let storage = Arc::new(MemoryStorage::default());
        storage.set(keys::AUTH_TOKEN, "tok_1").expect("set");
        storage.set(keys::AUTH_USER, &sample_user("user")).expect("set");

        let store = offline_store(storage);
        store.initialize();

        // A late subscriber sees the current snapshot immediately.
        let rx = store.subscribe();
        assert!(rx.borrow().is_some());
    }

    #[tokio::test]
    async fn test_logout_clears_locally_even_when_backend_unreachable() {
        let storage = Arc::new(MemoryStorage::default());
        storage.set(keys::AUTH_TOKEN, "tok_1").expect("set");
        storage.set(keys::AUTH_USER, &sample_user("user")).expect("set");
        storage
            .set(keys::AUTH_SESSION, r#"{"id":"ses_1"}"#)
            .expect("set");

        let store = offline_store(storage.clone());
        store.initialize();
        assert!(store.is_logged_in());

        // The backend at 127.0.0.1:9 refuses connections; logout must still
        // clear everything.
        store.logout().await;

        assert!(!store.is_logged_in());
        assert!(storage.get(keys::AUTH_TOKEN).is_none());
        assert!(storage.get(keys::AUTH_USER).is_none());
        assert!(storage.get(keys::AUTH_SESSION).is_none());
    }
}
