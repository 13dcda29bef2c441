use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::reader::SessionReader;
use super::registration::RegistrationForm;
use super::state::{PreferenceStatus, Session, SessionState};
use super::SessionError;
use crate::gateway::{AuthGateway, ErrorKind, GatewayError, Preferences, PreferencesGateway, Token, User};
use crate::storage::TokenStore;
use crate::util::{flatten_genres, normalize_selection};

/// Owns the session. Constructed once and passed to whatever needs it;
/// views observe it through [`SessionReader`].
pub struct SessionStore {
    auth: Arc<dyn AuthGateway>,
    prefs: Arc<dyn PreferencesGateway>,
    tokens: Arc<dyn TokenStore>,
    tx: watch::Sender<Session>,
}

impl SessionStore {
    pub fn new(
        auth: Arc<dyn AuthGateway>,
        prefs: Arc<dyn PreferencesGateway>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        let (tx, _rx) = watch::channel(Session::hydrating(None));
        Self {
            auth,
            prefs,
            tokens,
            tx,
        }
    }

    pub fn reader(&self) -> SessionReader {
        SessionReader::new(self.tx.subscribe())
    }

    pub fn current(&self) -> Session {
        self.tx.borrow().clone()
    }

    /// Token for an authenticated gateway call.
    pub fn bearer(&self) -> Result<Token, SessionError> {
        self.tx
            .borrow()
            .token()
            .cloned()
            .ok_or(SessionError::Unauthenticated)
    }

    fn publish(&self, session: Session) {
        let state = session.state();
        let previous = self.tx.send_replace(session);
        if previous.state() != state {
            info!(from = ?previous.state(), to = ?state, "session state changed");
        }
    }

    /// Apply a preference update only if the session still carries `token`,
    /// so a logout racing a fetch cannot resurrect stale data.
    fn publish_preferences(&self, token: &Token, status: PreferenceStatus) {
        self.tx.send_if_modified(|session| {
            if session.token() != Some(token) {
                return false;
            }
            *session = session.clone().with_preferences(status);
            true
        });
    }

    /// Restore the previous session from the token store.
    ///
    /// Runs once; later calls return the current state. A rejected token is
    /// cleared and the session falls back to anonymous without an error.
    pub async fn hydrate(&self) -> Result<SessionState, SessionError> {
        let current = self.current();
        if !current.is_loading() {
            debug!("hydration already complete");
            return Ok(current.state());
        }

        let stored = match self.tokens.load() {
            Ok(stored) => stored,
            Err(e) => {
                self.publish(Session::anonymous());
                return Err(e.into());
            }
        };

        let Some(raw) = stored else {
            self.publish(Session::anonymous());
            return Ok(SessionState::Anonymous);
        };

        let token = Token::new(raw);
        self.publish(Session::hydrating(Some(token.clone())));

        match self.auth.current_user(&token).await {
            Ok(user) => {
                info!(user_id = user.id, "restored session");
                let preferences = match self.fetch_preferences(&token).await {
                    Ok(status) => status,
                    Err(e) => {
                        warn!(error = %e, "could not load preferences during hydration");
                        PreferenceStatus::Unknown
                    }
                };
                self.publish(Session::authenticated(token, user).with_preferences(preferences));
                Ok(SessionState::Authenticated)
            }
            Err(e) => {
                if e.is_unauthorized() {
                    info!(reason = %e, "stored token rejected, signing out");
                } else {
                    warn!(error = %e, "could not validate stored token, signing out");
                }
                let cleared = self.tokens.clear();
                self.publish(Session::anonymous());
                cleared?;
                Ok(SessionState::Anonymous)
            }
        }
    }

    /// Exchange credentials for a token. On failure the session is unchanged.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, SessionError> {
        let response = self
            .auth
            .login(username.trim(), password)
            .await
            .map_err(login_error)?;

        let raw = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GatewayError::new(ErrorKind::Server, "No access token received"))?;
        let token = Token::new(raw);

        let user = match response.user {
            Some(user) => user,
            None => self.auth.current_user(&token).await.map_err(login_error)?,
        };

        self.tokens.save(token.expose())?;
        info!(user_id = user.id, "logged in");
        self.publish(Session::authenticated(token, user.clone()));
        Ok(user)
    }

    /// Sign out locally. The backend is told on a best-effort basis; its
    /// failure never keeps the session alive.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let token = self.current().token().cloned();
        if let Some(ref token) = token {
            if let Err(e) = self.auth.logout(token).await {
                warn!(error = %e, "logout notification failed");
            }
        }

        let cleared = self.tokens.clear();
        self.publish(Session::anonymous());
        info!("logged out");
        cleared.map_err(SessionError::from)
    }

    /// Re-read the user's preferences. `Ok(None)` means nothing is on file.
    pub async fn refresh_preferences(&self) -> Result<Option<Preferences>, SessionError> {
        let token = self.bearer()?;
        let status = self.fetch_preferences(&token).await?;
        let preferences = match status {
            PreferenceStatus::Present(ref p) => Some(p.clone()),
            _ => None,
        };
        self.publish_preferences(&token, status);
        Ok(preferences)
    }

    async fn fetch_preferences(&self, token: &Token) -> Result<PreferenceStatus, GatewayError> {
        match self.prefs.preferences(token).await {
            Ok(p) => Ok(PreferenceStatus::Present(p)),
            Err(e) if e.is_not_found() => Ok(PreferenceStatus::Missing),
            Err(e) => Err(e),
        }
    }

    /// Store the user's genre selection, creating the record when none is
    /// known to exist and updating it otherwise.
    pub async fn save_preferences<S: AsRef<str>>(&self, selection: &[S]) -> Result<Preferences, SessionError> {
        let token = self.bearer()?;
        let genres = normalize_selection(selection);
        if genres.is_empty() {
            return Err(SessionError::Validation("Please select at least one genre".to_string()));
        }

        let exists = matches!(
            self.current().preference_status(),
            PreferenceStatus::Present(p) if !p.is_empty()
        );
        let saved = if exists {
            self.prefs.update_preferences(&token, &genres).await?
        } else {
            self.prefs.create_preferences(&token, &genres).await?
        };

        info!(count = saved.preferred_genres.len(), "saved genre preferences");
        self.publish_preferences(&token, PreferenceStatus::Present(saved.clone()));
        Ok(saved)
    }

    /// Every genre in the catalog, flattened, deduplicated and sorted.
    pub async fn available_genres(&self) -> Result<Vec<String>, SessionError> {
        let raw = self.prefs.genres().await?;
        Ok(flatten_genres(&raw))
    }

    /// Create an account. Does not sign in.
    pub async fn register(&self, form: RegistrationForm) -> Result<User, SessionError> {
        let registration = form.validate()?;
        let user = self.auth.register(&registration).await?;
        info!(user_id = user.id, "registered account");
        Ok(user)
    }
}

fn login_error(e: GatewayError) -> SessionError {
    match e.kind {
        ErrorKind::Unauthorized | ErrorKind::BadRequest => SessionError::InvalidCredentials(e.message),
        _ => SessionError::Gateway(e),
    }
}
