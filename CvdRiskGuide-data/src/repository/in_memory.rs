use std::sync::{Arc, Mutex};

use crate::models::session::SessionSnapshot;
use super::errors::RepositoryError;

/// In-memory storage for the single calculator session
#[derive(Debug, Clone)]
pub struct InMemorySessionStorage {
    /// The current snapshot, if one has been stored
    current: Arc<Mutex<Option<SessionSnapshot>>>,
}

impl Default for InMemorySessionStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionStorage {
    /// Create a new, empty session storage
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the current snapshot
    pub async fn store_snapshot(&self, snapshot: &SessionSnapshot) -> Result<SessionSnapshot, RepositoryError> {
        let mut slot = self.current.lock().map_err(|e| RepositoryError::Lock(e.to_string()))?;
        *slot = Some(snapshot.clone());
        Ok(snapshot.clone())
    }

    /// Get the current snapshot
    pub async fn get_current(&self) -> Result<Option<SessionSnapshot>, RepositoryError> {
        let slot = self.current.lock().map_err(|e| RepositoryError::Lock(e.to_string()))?;
        Ok(slot.clone())
    }

    /// Drop the current snapshot, returning whether one existed
    pub async fn clear(&self) -> Result<bool, RepositoryError> {
        let mut slot = self.current.lock().map_err(|e| RepositoryError::Lock(e.to_string()))?;
        Ok(slot.take().is_some())
    }
}
