use regex::Regex;

use super::SessionError;
use crate::gateway::Registration;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
const MIN_PASSWORD_LEN: usize = 8;

/// Sign-up input as typed by the user, before validation.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: Option<String>,
}

impl RegistrationForm {
    pub fn validate(self) -> Result<Registration, SessionError> {
        let email = self.email.trim().to_string();
        if !is_email(&email) {
            return Err(SessionError::Validation("Please enter a valid email address".to_string()));
        }
        if self.password != self.confirm_password {
            return Err(SessionError::Validation("Passwords do not match".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(SessionError::Validation(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LEN
            )));
        }

        let full_name = self
            .full_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(Registration {
            email,
            password: self.password,
            full_name,
        })
    }
}

fn is_email(s: &str) -> bool {
    Regex::new(EMAIL_PATTERN)
        .map(|re| re.is_match(s))
        .unwrap_or(false)
}
