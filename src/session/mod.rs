//! Session store: who is signed in, and with which token.
//!
//! The store is the single writer of the session. It persists the token and
//! identity to [`Storage`] under the `token` and `user` keys and hands the
//! token to outgoing requests through [`SessionStore::authorize`], read at
//! call time. Nothing else mutates credentials.

mod errors;
mod identity;

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::api::ApiError;
use crate::backend::{Backend, error_message};
use crate::storage::{KvStore, Storage, StorageError, TOKEN_KEY, USER_KEY};

pub use errors::LoginError;
pub use identity::{Identity, Role};

const SIGNIN_PATH: &str = "auth/signin";
const ME_PATH: &str = "auth/me";

/// Current authentication state.
///
/// Token and identity are set and cleared together. The one exception is the
/// start-up refresh, during which a restored token has no identity yet.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub token: Option<String>,
    pub identity: Option<Arc<Identity>>,
}

impl Session {
    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    /// Token restored but identity not fetched yet.
    pub fn is_loading(&self) -> bool {
        self.token.is_some() && self.identity.is_none()
    }
}

#[derive(Serialize)]
struct SignInRequest<'a> {
    login: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct SignInResponse {
    token: String,
    id: i64,
    login: String,
    email: String,
    roles: Vec<Role>,
}

/// Result of [`SessionStore::initialize`].
pub struct Startup {
    pub store: Arc<SessionStore>,
    /// Identity fetch started because a token was restored without one.
    pub refresh: Option<JoinHandle<()>>,
}

pub struct SessionStore {
    backend: Backend,
    kv: KvStore,
    state: RwLock<Session>,
    /// Held across each storage-plus-memory update so they apply in one order.
    writes: Mutex<()>,
}

impl SessionStore {
    /// Restore the session from storage.
    ///
    /// When a token is stored without an identity, the identity is fetched in
    /// the background; the store is usable immediately and reports the
    /// loading state until the fetch lands. A failed fetch signs out.
    pub async fn initialize(backend: Backend, storage: &Storage) -> Result<Startup, StorageError> {
        let kv = storage.kv();
        let token = kv.get(TOKEN_KEY).await?;
        let identity = match (&token, kv.get(USER_KEY).await?) {
            (Some(_), Some(raw)) => match serde_json::from_str::<Identity>(&raw) {
                Ok(identity) => Some(Arc::new(identity)),
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable cached identity");
                    None
                }
            },
            (None, Some(_)) => {
                warn!("Removing cached identity without a token");
                kv.remove(&[USER_KEY]).await?;
                None
            }
            _ => None,
        };

        let store = Arc::new(Self {
            backend,
            kv,
            state: RwLock::new(Session { token, identity }),
            writes: Mutex::new(()),
        });

        let refresh = if store.session().is_loading() {
            let store = store.clone();
            Some(tokio::spawn(async move {
                // Failure already signed out inside refresh_identity.
                let _ = store.refresh_identity().await;
            }))
        } else {
            None
        };

        Ok(Startup { store, refresh })
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn current_token(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }

    pub fn current_identity(&self) -> Option<Arc<Identity>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .identity
            .clone()
    }

    /// Attach the current bearer token, if any, to a request.
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        self.attach_credential(request).0
    }

    /// Like [`authorize`](Self::authorize), also returning the token used.
    pub(crate) fn attach_credential(
        &self,
        request: RequestBuilder,
    ) -> (RequestBuilder, Option<String>) {
        match self.current_token() {
            Some(token) => (request.bearer_auth(&token), Some(token)),
            None => (request, None),
        }
    }

    /// Sign in. On success the session is persisted and active before this
    /// returns; on failure the previous session is left untouched.
    pub async fn login(&self, login: &str, password: &str) -> Result<(), LoginError> {
        if login.trim().is_empty() || password.trim().is_empty() {
            return Err(LoginError::MissingCredentials);
        }

        let response = self
            .backend
            .request(Method::POST, SIGNIN_PATH)
            .json(&SignInRequest { login, password })
            .send()
            .await
            .map_err(|e| {
                warn!(login = %login, error = %e, "Sign-in request failed");
                LoginError::Connection
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            info!(login = %login, "Sign-in rejected");
            return Err(LoginError::InvalidCredentials);
        }
        if !status.is_success() {
            let message = error_message(response).await;
            warn!(login = %login, status = %status, "Sign-in failed");
            return Err(LoginError::Rejected(message));
        }

        let body: SignInResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Malformed sign-in response");
            LoginError::Rejected(None)
        })?;

        let identity = Identity {
            id: body.id,
            login: body.login,
            email: body.email,
            roles: body.roles,
        };

        let user_json = serde_json::to_string(&identity).map_err(|e| {
            error!(error = %e, "Failed to serialize identity");
            LoginError::Storage
        })?;

        let _writes = self.writes.lock().await;
        self.kv
            .set_many(&[(TOKEN_KEY, body.token.as_str()), (USER_KEY, user_json.as_str())])
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to persist session");
                LoginError::Storage
            })?;

        info!(login = %identity.login, roles = ?identity.roles, "Signed in");
        self.replace(Session {
            token: Some(body.token),
            identity: Some(Arc::new(identity)),
        });
        Ok(())
    }

    /// Sign out. Clears memory first so no later request carries the token,
    /// then storage. Storage failures are logged, never returned.
    pub async fn logout(&self) {
        let _writes = self.writes.lock().await;
        let was_signed_in = self.clear_session(None);
        self.clear_storage().await;
        if was_signed_in {
            info!("Signed out");
        }
    }

    /// Sign out only if `token` is still the active one. A 401 that belongs to
    /// an older session must not end a newer one.
    pub(crate) async fn expire(&self, token: &str) -> bool {
        let _writes = self.writes.lock().await;
        if !self.clear_session(Some(token)) {
            return false;
        }
        warn!("Session expired");
        self.clear_storage().await;
        true
    }

    /// Reset the in-memory session, when `expected` is given only if it is
    /// still the active token. Returns whether a session was cleared.
    fn clear_session(&self, expected: Option<&str>) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let Some(token) = &state.token else {
            return false;
        };
        if expected.is_some_and(|expected| expected != token.as_str()) {
            return false;
        }
        *state = Session::default();
        true
    }

    async fn clear_storage(&self) {
        if let Err(e) = self.kv.remove(&[TOKEN_KEY, USER_KEY]).await {
            error!(error = %e, "Failed to clear stored session");
        }
    }

    /// Fetch the identity for the current token from `/api/auth/me` and
    /// cache it. Any failure signs out; there is no retry.
    pub async fn refresh_identity(&self) -> Result<Arc<Identity>, ApiError> {
        let Some(token) = self.current_token() else {
            return Err(ApiError::NotSignedIn);
        };

        match self.fetch_identity(&token).await {
            Ok(identity) => Ok(self.adopt_identity(&token, identity).await),
            Err(e) => {
                warn!(error = %e, "Identity refresh failed");
                self.expire(&token).await;
                Err(e)
            }
        }
    }

    /// Re-fetch the identity on demand so role changes made on the backend
    /// take effect. Only a 401 signs out; other failures keep the session.
    pub async fn revalidate(&self) -> Result<Arc<Identity>, ApiError> {
        let Some(token) = self.current_token() else {
            return Err(ApiError::NotSignedIn);
        };

        match self.fetch_identity(&token).await {
            Ok(identity) => Ok(self.adopt_identity(&token, identity).await),
            Err(e) => {
                if e.is_session_expired() {
                    self.expire(&token).await;
                } else {
                    warn!(error = %e, "Revalidation failed");
                }
                Err(e)
            }
        }
    }

    async fn adopt_identity(&self, token: &str, identity: Identity) -> Arc<Identity> {
        let _writes = self.writes.lock().await;
        let (identity, current) = self.install_identity(token, identity);
        if current {
            self.store_identity(&identity).await;
        }
        identity
    }

    async fn fetch_identity(&self, token: &str) -> Result<Identity, ApiError> {
        let response = self
            .backend
            .request(Method::GET, ME_PATH)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ApiError::transport("Identity fetch", e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::SessionExpired);
        }
        if !status.is_success() {
            return Err(match error_message(response).await {
                Some(message) => ApiError::rejected(status, message),
                None => ApiError::Status(status),
            });
        }

        response
            .json::<Identity>()
            .await
            .map_err(|e| ApiError::transport("Identity fetch", e))
    }

    async fn store_identity(&self, identity: &Identity) {
        let raw = match serde_json::to_string(identity) {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = %e, "Failed to serialize identity");
                return;
            }
        };
        if let Err(e) = self.kv.set(USER_KEY, &raw).await {
            error!(error = %e, "Failed to cache identity");
        }
    }

    /// Install a fetched identity unless the session moved on meanwhile.
    /// An unchanged identity keeps its existing reference. The flag reports
    /// whether the identity belongs to the active session.
    fn install_identity(&self, token: &str, identity: Identity) -> (Arc<Identity>, bool) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.token.as_deref() != Some(token) {
            return (Arc::new(identity), false);
        }
        match &state.identity {
            Some(current) if **current == identity => (current.clone(), true),
            _ => {
                let identity = Arc::new(identity);
                state.identity = Some(identity.clone());
                (identity, true)
            }
        }
    }

    fn replace(&self, session: Session) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = session;
    }
}
