//! Typed access to a user's persisted progression.
//!
//! Every entity is created lazily: a missing key reads as the entity's
//! default. A value that no longer decodes is logged and also read as the
//! default, so one corrupt entry cannot lock a user out.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{KeyValueStore, StorageKey, UserId};
use crate::content::RecentHistory;
use crate::daily_cap::{CapKind, DailyCompletionCounter};
use crate::daily_gate::{ContentKind, DailyRefreshMarker};
use crate::error::StorageError;
use crate::level::sanitize_points;
use crate::streak::StreakState;

pub struct ProgressRepository<S> {
    store: S,
}

impl<S: KeyValueStore> ProgressRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn load<T: DeserializeOwned + Default>(
        &self,
        user: &UserId,
        key: StorageKey,
    ) -> Result<T, StorageError> {
        let full_key = key.for_user(user);
        let Some(raw) = self.store.get(&full_key)? else {
            return Ok(T::default());
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(key = %full_key, error = %e, "discarding undecodable stored value");
                Ok(T::default())
            }
        }
    }

    fn save<T: Serialize + ?Sized>(
        &self,
        user: &UserId,
        key: StorageKey,
        value: &T,
    ) -> Result<(), StorageError> {
        let full_key = key.for_user(user);
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: full_key.clone(),
            source,
        })?;
        self.store.set(&full_key, &raw)
    }

    /// Total points; negative or non-numeric stored values read as 0.
    pub fn total_points(&self, user: &UserId) -> Result<u64, StorageError> {
        let value: Value = self.load(user, StorageKey::TotalPoints)?;
        Ok(points_from_json(&value))
    }

    pub fn set_total_points(&self, user: &UserId, points: u64) -> Result<(), StorageError> {
        self.save(user, StorageKey::TotalPoints, &points)
    }

    pub fn streak(&self, user: &UserId) -> Result<StreakState, StorageError> {
        let state: StreakState = self.load(user, StorageKey::Streak)?;
        Ok(state.normalized())
    }

    pub fn set_streak(&self, user: &UserId, state: &StreakState) -> Result<(), StorageError> {
        self.save(user, StorageKey::Streak, state)
    }

    pub fn refresh_marker(
        &self,
        user: &UserId,
        kind: ContentKind,
    ) -> Result<DailyRefreshMarker, StorageError> {
        self.load(user, StorageKey::RefreshMarker(kind))
    }

    pub fn set_refresh_marker(
        &self,
        user: &UserId,
        kind: ContentKind,
        marker: &DailyRefreshMarker,
    ) -> Result<(), StorageError> {
        self.save(user, StorageKey::RefreshMarker(kind), marker)
    }

    pub fn completion_counter(
        &self,
        user: &UserId,
        kind: CapKind,
    ) -> Result<DailyCompletionCounter, StorageError> {
        self.load(user, StorageKey::CompletionCounter(kind))
    }

    pub fn set_completion_counter(
        &self,
        user: &UserId,
        kind: CapKind,
        counter: &DailyCompletionCounter,
    ) -> Result<(), StorageError> {
        self.save(user, StorageKey::CompletionCounter(kind), counter)
    }

    pub fn recent_history(
        &self,
        user: &UserId,
        kind: ContentKind,
    ) -> Result<RecentHistory, StorageError> {
        self.load(user, StorageKey::RecentContent(kind))
    }

    pub fn set_recent_history(
        &self,
        user: &UserId,
        kind: ContentKind,
        history: &RecentHistory,
    ) -> Result<(), StorageError> {
        self.save(user, StorageKey::RecentContent(kind), history)
    }

    pub fn daily_content<T: DeserializeOwned>(
        &self,
        user: &UserId,
        kind: ContentKind,
    ) -> Result<Vec<T>, StorageError> {
        self.load(user, StorageKey::DailyContent(kind))
    }

    pub fn set_daily_content<T: Serialize>(
        &self,
        user: &UserId,
        kind: ContentKind,
        items: &[T],
    ) -> Result<(), StorageError> {
        self.save(user, StorageKey::DailyContent(kind), items)
    }
}

/// Lenient decode of a stored point total.
fn points_from_json(value: &Value) -> u64 {
    match value {
        Value::Number(n) => {
            if let Some(p) = n.as_u64() {
                p
            } else if let Some(p) = n.as_i64() {
                sanitize_points(p)
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f > 0.0)
                    .map(|f| f.floor() as u64)
                    .unwrap_or(0)
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(sanitize_points)
            .unwrap_or(0),
        _ => 0,
    }
}
