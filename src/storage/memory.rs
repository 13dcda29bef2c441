use std::sync::Mutex;

use super::{StorageResult, TokenStore};

/// Token store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            slot: Mutex::new(Some(token.to_string())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // A poisoned slot still holds a consistent Option.
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> StorageResult<Option<String>> {
        Ok(self.slot().clone())
    }

    fn save(&self, token: &str) -> StorageResult<()> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        *self.slot() = None;
        Ok(())
    }
}
