use thiserror::Error;
use tracing::{error, info, warn};

use crate::api::error::MISSING_LOGIN_DATA_MESSAGE;
use crate::api::{ApiClient, ApiError};
use crate::models::{normalize_user, LoginResponse, ProfilePatch, UserProfile};
use crate::storage::{KeyValueStore, StorageError};

/// Durable key holding the bearer token.
pub const TOKEN_KEY: &str = "authToken";

/// Durable key holding the JSON-serialized `UserProfile`.
pub const USER_KEY: &str = "userData";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Who is logged in, as seen by the rest of the application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub authenticated: bool,
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

/// Single owner of the session, mirrored to a durable store.
///
/// Every mutation writes the store first and only then changes the
/// in-memory state, so a failed write leaves both untouched.
pub struct SessionStore<S: KeyValueStore> {
    store: S,
    state: SessionState,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Restore the session persisted in `store`. Never touches the network.
    ///
    /// The session counts as authenticated whenever a token is stored. An
    /// unreadable or malformed profile is treated as absent.
    pub fn initialize(store: S) -> Self {
        let token = match store.get(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read stored token");
                None
            }
        };

        let user = match store.get(USER_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "Ignoring malformed stored profile");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read stored profile");
                None
            }
        };

        Self {
            store,
            state: SessionState {
                authenticated: token.is_some(),
                token,
                user,
            },
        }
    }

    /// Exchange credentials for a session.
    ///
    /// On any failure the session is left as it was and the error is
    /// returned to the caller.
    pub async fn login(
        &mut self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<&UserProfile, SessionError> {
        let response = match api.login(email, password).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Login failed");
                return Err(e.into());
            }
        };
        self.accept_login(response)
    }

    /// Validate a credential-exchange response and make it the current session.
    pub fn accept_login(&mut self, response: LoginResponse) -> Result<&UserProfile, SessionError> {
        let token = response.token.filter(|t| !t.is_empty());
        let (token, raw_user) = match (token, response.user) {
            (Some(token), Some(user)) => (token, user),
            _ => {
                error!("Login response missing token or user data");
                return Err(ApiError::Validation(MISSING_LOGIN_DATA_MESSAGE.to_string()).into());
            }
        };

        let user = normalize_user(&raw_user);
        self.establish(token, user)?;
        info!(user_id = self.user().map(|u| u.id.as_str()).unwrap_or(""), "Logged in");
        self.user()
            .ok_or_else(|| ApiError::Validation(MISSING_LOGIN_DATA_MESSAGE.to_string()).into())
    }

    /// Persist token and profile together, then adopt them.
    fn establish(&mut self, token: String, user: UserProfile) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(&user)?;
        let previous_token = self.store.get(TOKEN_KEY).ok().flatten();

        self.store.set(TOKEN_KEY, &token)?;
        if let Err(e) = self.store.set(USER_KEY, &serialized) {
            let rollback = match previous_token {
                Some(ref previous) => self.store.set(TOKEN_KEY, previous),
                None => self.store.delete(TOKEN_KEY),
            };
            if let Err(rollback_err) = rollback {
                error!(error = %rollback_err, "Failed to roll back stored token");
            }
            return Err(e);
        }

        self.state = SessionState {
            authenticated: true,
            token: Some(token),
            user: Some(user),
        };
        Ok(())
    }

    /// Forget the session in memory and in the durable store. Always succeeds;
    /// storage failures are logged.
    pub fn logout(&mut self) {
        self.state = SessionState::default();
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.store.delete(key) {
                warn!(key, error = %e, "Failed to clear stored session entry");
            }
        }
        info!("Logged out");
    }

    /// Merge `patch` into the current profile and persist it. Does nothing
    /// when no user is logged in or the patch sets no field.
    pub fn update_user(&mut self, patch: ProfilePatch) -> Result<(), StorageError> {
        let Some(current) = self.state.user.as_ref() else {
            return Ok(());
        };
        if patch.is_empty() {
            return Ok(());
        }

        let mut updated = current.clone();
        updated.apply(patch);
        self.store.set(USER_KEY, &serde_json::to_string(&updated)?)?;
        self.state.user = Some(updated);
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.authenticated
    }

    pub fn token(&self) -> Option<&str> {
        self.state.token.as_deref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.state.user.as_ref()
    }

    /// Copy of the full session state.
    pub fn snapshot(&self) -> SessionState {
        self.state.clone()
    }

    /// A client that carries this session's bearer token, if any.
    pub fn authorized(&self, api: &ApiClient) -> ApiClient {
        api.with_token(self.state.token.clone())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
