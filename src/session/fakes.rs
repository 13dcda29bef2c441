//! In-memory gateway doubles for session tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::gateway::*;

fn error(status: u16, detail: &str) -> GatewayError {
    let body = serde_json::json!({ "detail": detail }).to_string();
    GatewayError::from_response(status, body.as_bytes(), "Request failed")
}

fn user(id: i64, username: &str) -> User {
    User {
        id,
        username: Some(username.to_string()),
        email: None,
        full_name: None,
    }
}

#[derive(Default)]
pub struct FakeAuth {
    users: HashMap<String, User>,
    accounts: HashMap<(String, String), String>,
    inline_user: bool,
    logout_fails: bool,
    me_calls: AtomicUsize,
    logout_calls: AtomicUsize,
    registrations: AtomicUsize,
}

impl FakeAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` on `/auth/me`.
    pub fn with_user(mut self, token: &str, id: i64, username: &str) -> Self {
        self.users.insert(token.to_string(), user(id, username));
        self
    }

    /// Accept `username`/`password` on login, issuing `token`.
    pub fn with_account(mut self, username: &str, password: &str, token: &str, id: i64) -> Self {
        self.accounts
            .insert((username.to_string(), password.to_string()), token.to_string());
        self.with_user(token, id, username)
    }

    pub fn returning_user_on_login(mut self) -> Self {
        self.inline_user = true;
        self
    }

    pub fn failing_logout(mut self) -> Self {
        self.logout_fails = true;
        self
    }

    pub fn me_calls(&self) -> usize {
        self.me_calls.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

    pub fn registrations(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthGateway for FakeAuth {
    async fn login(&self, username: &str, password: &str) -> GatewayResult<LoginResponse> {
        let token = self
            .accounts
            .get(&(username.to_string(), password.to_string()))
            .ok_or_else(|| error(401, "Invalid credentials"))?;
        let user = if self.inline_user {
            self.users.get(token).cloned()
        } else {
            None
        };
        Ok(LoginResponse {
            access_token: Some(token.clone()),
            token_type: Some("bearer".to_string()),
            user,
        })
    }

    async fn current_user(&self, token: &Token) -> GatewayResult<User> {
        self.me_calls.fetch_add(1, Ordering::SeqCst);
        self.users
            .get(token.expose())
            .cloned()
            .ok_or_else(|| error(401, "Could not validate credentials"))
    }

    async fn logout(&self, _token: &Token) -> GatewayResult<()> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        if self.logout_fails {
            return Err(GatewayError::network("Failed to logout"));
        }
        Ok(())
    }

    async fn register(&self, registration: &Registration) -> GatewayResult<User> {
        let n = self.registrations.fetch_add(1, Ordering::SeqCst);
        Ok(User {
            id: 100 + n as i64,
            username: None,
            email: Some(registration.email.clone()),
            full_name: registration.full_name.clone(),
        })
    }
}

#[derive(Default)]
pub struct FakePreferences {
    by_token: Mutex<HashMap<String, Preferences>>,
    catalog: Vec<String>,
    failure: Mutex<Option<u16>>,
    created: AtomicUsize,
    updated: AtomicUsize,
}

impl FakePreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_genres(self, token: &str, genres: &[&str]) -> Self {
        self.by_token.lock().unwrap().insert(
            token.to_string(),
            Preferences {
                id: Some(1),
                preferred_genres: genres.iter().map(|g| g.to_string()).collect(),
                updated_at: None,
            },
        );
        self
    }

    pub fn with_catalog(mut self, raw: &[&str]) -> Self {
        self.catalog = raw.iter().map(|g| g.to_string()).collect();
        self
    }

    pub fn failing(self, status: u16) -> Self {
        self.fail_with(status);
        self
    }

    pub fn fail_with(&self, status: u16) {
        *self.failure.lock().unwrap() = Some(status);
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn updated(&self) -> usize {
        self.updated.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> GatewayResult<()> {
        match *self.failure.lock().unwrap() {
            Some(status) => Err(error(status, "Internal server error")),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PreferencesGateway for FakePreferences {
    async fn genres(&self) -> GatewayResult<Vec<String>> {
        self.check_failure()?;
        Ok(self.catalog.clone())
    }

    async fn preferences(&self, token: &Token) -> GatewayResult<Preferences> {
        self.check_failure()?;
        self.by_token
            .lock()
            .unwrap()
            .get(token.expose())
            .cloned()
            .ok_or_else(|| error(404, "Preferences not found"))
    }

    async fn create_preferences(&self, token: &Token, genres: &[String]) -> GatewayResult<Preferences> {
        self.check_failure()?;
        self.created.fetch_add(1, Ordering::SeqCst);
        let prefs = Preferences {
            id: Some(1),
            preferred_genres: genres.to_vec(),
            updated_at: None,
        };
        self.by_token
            .lock()
            .unwrap()
            .insert(token.expose().to_string(), prefs.clone());
        Ok(prefs)
    }

    async fn update_preferences(&self, token: &Token, genres: &[String]) -> GatewayResult<Preferences> {
        self.check_failure()?;
        let mut by_token = self.by_token.lock().unwrap();
        let prefs = by_token
            .get_mut(token.expose())
            .ok_or_else(|| error(404, "Preferences do not exist for this user"))?;
        prefs.preferred_genres = genres.to_vec();
        self.updated.fetch_add(1, Ordering::SeqCst);
        Ok(prefs.clone())
    }
}
