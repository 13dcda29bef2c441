pub mod file;
pub mod memory;

pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;

/// Durable client-side state: a single slot holding the raw token string.
///
/// Access is synchronous so that every change to the in-memory token can be
/// persisted before the new session state is published.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> StorageResult<Option<String>>;
    fn save(&self, token: &str) -> StorageResult<()>;
    fn clear(&self) -> StorageResult<()>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Token storage error at {0}: {1}")]
    Io(String, std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;
