use tokio::sync::watch;

use super::state::Session;

/// Read-only handle on the session. Views hold one of these instead of the
/// store, so they can observe state but only change it through store calls.
#[derive(Debug, Clone)]
pub struct SessionReader {
    rx: watch::Receiver<Session>,
}

impl SessionReader {
    pub(crate) fn new(rx: watch::Receiver<Session>) -> Self {
        Self { rx }
    }

    pub fn current(&self) -> Session {
        self.rx.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.rx.borrow().is_authenticated()
    }

    /// Wait until hydration has finished.
    pub async fn ready(&mut self) -> Session {
        let ready = self.rx.wait_for(|s| !s.is_loading()).await.map(|s| s.clone());
        // Store dropped mid-hydration; report what was last published.
        ready.unwrap_or_else(|_| self.current())
    }

    /// Wait for the next published change. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Session> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}
