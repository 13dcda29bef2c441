use crate::gateway::{Preferences, Token, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Boot-time restore from the token store is in progress.
    Hydrating,
    Anonymous,
    Authenticated,
}

/// What is known about the user's genre preferences.
#[derive(Debug, Clone, PartialEq)]
pub enum PreferenceStatus {
    /// Not fetched yet, or the last fetch failed.
    Unknown,
    /// The backend has nothing on file.
    Missing,
    Present(Preferences),
}

/// Whether a signed-in user still has to pick genres.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceGate {
    SignedOut,
    Unchecked,
    Required,
    Satisfied,
}

/// Immutable snapshot of the session.
///
/// Constructors keep `user` and preferences empty whenever there is no token.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    token: Option<Token>,
    user: Option<User>,
    preferences: PreferenceStatus,
}

impl Session {
    pub(crate) fn hydrating(token: Option<Token>) -> Self {
        Self {
            state: SessionState::Hydrating,
            token,
            user: None,
            preferences: PreferenceStatus::Unknown,
        }
    }

    pub(crate) fn anonymous() -> Self {
        Self {
            state: SessionState::Anonymous,
            token: None,
            user: None,
            preferences: PreferenceStatus::Unknown,
        }
    }

    pub(crate) fn authenticated(token: Token, user: User) -> Self {
        Self {
            state: SessionState::Authenticated,
            token: Some(token),
            user: Some(user),
            preferences: PreferenceStatus::Unknown,
        }
    }

    pub(crate) fn with_preferences(mut self, preferences: PreferenceStatus) -> Self {
        if self.token.is_some() {
            self.preferences = preferences;
        }
        self
    }

    pub(crate) fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == SessionState::Hydrating
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn preference_status(&self) -> &PreferenceStatus {
        &self.preferences
    }

    pub fn preferences(&self) -> Option<&Preferences> {
        match self.preferences {
            PreferenceStatus::Present(ref p) => Some(p),
            _ => None,
        }
    }

    pub fn preference_gate(&self) -> PreferenceGate {
        if self.state != SessionState::Authenticated {
            return PreferenceGate::SignedOut;
        }
        match self.preferences {
            PreferenceStatus::Unknown => PreferenceGate::Unchecked,
            PreferenceStatus::Missing => PreferenceGate::Required,
            PreferenceStatus::Present(ref p) if p.is_empty() => PreferenceGate::Required,
            PreferenceStatus::Present(_) => PreferenceGate::Satisfied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana() -> User {
        User {
            id: 7,
            username: Some("ana".to_string()),
            email: None,
            full_name: None,
        }
    }

    #[test]
    fn test_anonymous_ignores_preferences() {
        let session = Session::anonymous().with_preferences(PreferenceStatus::Missing);
        assert_eq!(session.preference_status(), &PreferenceStatus::Unknown);
        assert_eq!(session.preference_gate(), PreferenceGate::SignedOut);
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_preference_gate() {
        let session = Session::authenticated(Token::new("tok-1"), ana());
        assert_eq!(session.preference_gate(), PreferenceGate::Unchecked);

        let session = session.with_preferences(PreferenceStatus::Missing);
        assert_eq!(session.preference_gate(), PreferenceGate::Required);

        let empty = Preferences {
            id: Some(0),
            preferred_genres: vec![],
            updated_at: None,
        };
        let session = session.with_preferences(PreferenceStatus::Present(empty));
        assert_eq!(session.preference_gate(), PreferenceGate::Required);
        assert!(session.preferences().is_some());

        let picked = Preferences {
            id: Some(3),
            preferred_genres: vec!["Drama".to_string()],
            updated_at: None,
        };
        let session = session.with_preferences(PreferenceStatus::Present(picked));
        assert_eq!(session.preference_gate(), PreferenceGate::Satisfied);
    }

    #[test]
    fn test_hydrating_is_loading() {
        let session = Session::hydrating(Some(Token::new("tok-1")));
        assert!(session.is_loading());
        assert!(session.user().is_none());
        assert_eq!(session.preference_gate(), PreferenceGate::SignedOut);
    }
}
