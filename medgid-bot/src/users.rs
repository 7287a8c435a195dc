//! Persistent user registry: a JSON array file of everyone who started the bot.
//!
//! Shared process-wide; reads and writes are serialized behind a lock and the
//! file is rewritten whole on every change. Used by the admin broadcast.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use medgid_core::{CoreError, User};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// One registered user, as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub joined_date: DateTime<Utc>,
}

/// JSON-file-backed registry. A missing or unreadable file is an empty
/// registry, not an error.
pub struct UserRegistry {
    path: PathBuf,
    lock: Mutex<()>,
}

impl UserRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Records a user on first contact. Returns true when the user was new.
    pub async fn record(&self, user: &User) -> Result<bool, CoreError> {
        let _guard = self.lock.lock().await;
        let mut profiles = self.load().await;
        if profiles.iter().any(|p| p.id == user.id) {
            return Ok(false);
        }
        profiles.push(UserProfile {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            joined_date: Utc::now(),
        });
        self.store(&profiles).await?;
        info!(user_id = user.id, user = %user.full_name(), "New user registered");
        Ok(true)
    }

    /// All registered users.
    pub async fn all(&self) -> Vec<UserProfile> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    async fn load(&self) -> Vec<UserProfile> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(profiles) => profiles,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Users file unreadable, treating as empty");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Users file could not be read, treating as empty");
                Vec::new()
            }
        }
    }

    async fn store(&self, profiles: &[UserProfile]) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(profiles)
            .map_err(|e| CoreError::Config(format!("users file serialization: {}", e)))?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn user(id: i64) -> User {
        User {
            id,
            username: Some(format!("user{}", id)),
            first_name: Some("Test".to_string()),
            last_name: None,
        }
    }

    #[tokio::test]
    async fn test_record_and_list() {
        let dir = TempDir::new().unwrap();
        let registry = UserRegistry::new(dir.path().join("users.json"));

        assert!(registry.record(&user(1)).await.unwrap());
        assert!(registry.record(&user(2)).await.unwrap());
        // Second contact from the same user is a no-op.
        assert!(!registry.record(&user(1)).await.unwrap());

        let all = registry.all().await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, 1);
        assert_eq!(all[0].username.as_deref(), Some("user1"));
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let registry = UserRegistry::new(dir.path().join("users.json"));
        assert!(registry.all().await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_empty_and_recoverable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, "oops[").unwrap();

        let registry = UserRegistry::new(&path);
        assert!(registry.all().await.is_empty());
        assert!(registry.record(&user(3)).await.unwrap());
        assert_eq!(registry.all().await.len(), 1);
    }
}
