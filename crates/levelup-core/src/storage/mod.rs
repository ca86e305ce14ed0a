//! Persistence port and its implementations.
//!
//! The engine never reaches for a global store. It is handed a
//! [`KeyValueStore`] and a [`UserId`] for every call, and all keys are
//! namespaced per user through [`StorageKey`].
//!
//! Stores are not required to be `Sync`. Callers must not run two
//! read-modify-write cycles against the same user at once; the single UI
//! thread of the app guarantees that.

mod config;
pub mod database;
pub mod memory;
pub mod repository;

pub use config::{CapsConfig, ContentConfig, EngineConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use repository::ProgressRepository;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::daily_cap::CapKind;
use crate::daily_gate::ContentKind;
use crate::error::StorageError;

/// Prefix shared by every key written by the engine.
pub const KEY_PREFIX: &str = "levelup";

/// String-keyed, string-valued store supplied by the host application.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Identity whose progress is being read or written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh identity for a guest session.
    pub fn guest() -> Self {
        Self(format!("guest-{}", uuid::Uuid::new_v4()))
    }

    pub fn is_guest(&self) -> bool {
        self.0.starts_with("guest-")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Per-user entity stored by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    TotalPoints,
    Streak,
    RefreshMarker(ContentKind),
    DailyContent(ContentKind),
    RecentContent(ContentKind),
    CompletionCounter(CapKind),
}

impl StorageKey {
    fn suffix(&self) -> String {
        match self {
            StorageKey::TotalPoints => "points".to_string(),
            StorageKey::Streak => "streak".to_string(),
            StorageKey::RefreshMarker(kind) => format!("refresh:{kind}"),
            StorageKey::DailyContent(kind) => format!("content:{kind}"),
            StorageKey::RecentContent(kind) => format!("recent:{kind}"),
            StorageKey::CompletionCounter(kind) => format!("cap:{kind}"),
        }
    }

    /// Full key, e.g. `levelup:alice:refresh:quiz`.
    pub fn for_user(&self, user: &UserId) -> String {
        format!("{KEY_PREFIX}:{}:{}", user, self.suffix())
    }
}

/// Returns `~/.config/levelup[-dev]/`, or `$LEVELUP_DATA_DIR` when set.
///
/// Set LEVELUP_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("LEVELUP_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("LEVELUP_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("levelup-dev")
            } else {
                base_dir.join("levelup")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced_per_user() {
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");
        assert_eq!(StorageKey::TotalPoints.for_user(&alice), "levelup:alice:points");
        assert_ne!(
            StorageKey::TotalPoints.for_user(&alice),
            StorageKey::TotalPoints.for_user(&bob)
        );
    }

    #[test]
    fn content_kinds_use_separate_keys() {
        let user = UserId::new("u1");
        assert_eq!(
            StorageKey::RefreshMarker(ContentKind::Quiz).for_user(&user),
            "levelup:u1:refresh:quiz"
        );
        assert_ne!(
            StorageKey::RefreshMarker(ContentKind::Quiz).for_user(&user),
            StorageKey::RefreshMarker(ContentKind::DailyChallenges).for_user(&user)
        );
        assert_ne!(
            StorageKey::CompletionCounter(CapKind::Quiz).for_user(&user),
            StorageKey::CompletionCounter(CapKind::Challenges).for_user(&user)
        );
    }

    #[test]
    fn guest_ids_are_unique() {
        let a = UserId::guest();
        let b = UserId::guest();
        assert!(a.is_guest());
        assert_ne!(a, b);
        assert!(!UserId::new("alice").is_guest());
    }
}
