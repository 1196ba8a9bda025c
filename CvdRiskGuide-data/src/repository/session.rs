use chrono::Utc;
use tracing::debug;
use uuid::Uuid;
use async_trait::async_trait;

use crate::models::session::{SaveSessionRequest, SessionSnapshot};
use super::errors::RepositoryError;
use super::in_memory::InMemorySessionStorage;

/// Repository trait for the calculator session
#[async_trait]
pub trait SessionRepositoryTrait {
    /// Replace the current snapshot with a new one
    async fn save(&self, request: SaveSessionRequest) -> Result<SessionSnapshot, RepositoryError>;

    /// Get the current snapshot, if any
    async fn get_current(&self) -> Result<Option<SessionSnapshot>, RepositoryError>;

    /// Clear the session. Returns whether a snapshot was removed.
    async fn clear(&self) -> Result<bool, RepositoryError>;
}

/// Repository for the single in-memory calculator session.
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct SessionRepository {
    storage: InMemorySessionStorage,
}

impl SessionRepository {
    /// Create a new repository
    pub fn new() -> Self {
        Self {
            storage: InMemorySessionStorage::new(),
        }
    }
}

#[async_trait]
impl SessionRepositoryTrait for SessionRepository {
    async fn save(&self, request: SaveSessionRequest) -> Result<SessionSnapshot, RepositoryError> {
        if request.request.is_null() || request.assessment.is_null() {
            return Err(RepositoryError::Validation(
                "Session snapshot requires both a request and an assessment".to_string(),
            ));
        }

        let snapshot = SessionSnapshot {
            id: Uuid::new_v4().to_string(),
            request: request.request,
            assessment: request.assessment,
            updated_at: Utc::now().to_rfc3339(),
        };

        debug!("Replacing session snapshot with {}", snapshot.id);
        self.storage.store_snapshot(&snapshot).await
    }

    async fn get_current(&self) -> Result<Option<SessionSnapshot>, RepositoryError> {
        self.storage.get_current().await
    }

    async fn clear(&self) -> Result<bool, RepositoryError> {
        let removed = self.storage.clear().await?;
        debug!("Session cleared (snapshot removed: {})", removed);
        Ok(removed)
    }
}

/// Mock session repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock implementation of SessionRepository for testing
    #[derive(Debug)]
    pub struct MockSessionRepository {
        current: Mutex<Option<SessionSnapshot>>,
        should_fail: bool,
    }

    impl Default for MockSessionRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockSessionRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self {
                current: Mutex::new(None),
                should_fail: false,
            }
        }

        /// Create a mock repository holding a snapshot
        pub fn with_snapshot(snapshot: SessionSnapshot) -> Self {
            Self {
                current: Mutex::new(Some(snapshot)),
                should_fail: false,
            }
        }

        /// Configure every operation to fail with a lock error
        pub fn failing() -> Self {
            Self {
                current: Mutex::new(None),
                should_fail: true,
            }
        }

        fn check(&self) -> Result<(), RepositoryError> {
            if self.should_fail {
                Err(RepositoryError::Lock("mock is configured to fail".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl SessionRepositoryTrait for MockSessionRepository {
        async fn save(&self, request: SaveSessionRequest) -> Result<SessionSnapshot, RepositoryError> {
            self.check()?;
            let snapshot = SessionSnapshot {
                id: Uuid::new_v4().to_string(),
                request: request.request,
                assessment: request.assessment,
                updated_at: Utc::now().to_rfc3339(),
            };
            *self.current.lock()? = Some(snapshot.clone());
            Ok(snapshot)
        }

        async fn get_current(&self) -> Result<Option<SessionSnapshot>, RepositoryError> {
            self.check()?;
            Ok(self.current.lock()?.clone())
        }

        async fn clear(&self) -> Result<bool, RepositoryError> {
            self.check()?;
            Ok(self.current.lock()?.take().is_some())
        }
    }
}
