//! Client-side session lifecycle: token persistence, hydration on start,
//! login/logout and the genre-preference gate.

#[cfg(test)]
mod fakes;
pub mod reader;
pub mod registration;
pub mod state;
pub mod store;

pub use reader::SessionReader;
pub use registration::RegistrationForm;
pub use state::{PreferenceGate, PreferenceStatus, Session, SessionState};
pub use store::SessionStore;

use crate::gateway::GatewayError;
use crate::storage::StorageError;

/// Errors surfaced to the view layer. `Display` is the message to show.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{0}")]
    InvalidCredentials(String),
    #[error("{0}")]
    Gateway(#[from] GatewayError),
    #[error("You need to log in first")]
    Unauthenticated,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
