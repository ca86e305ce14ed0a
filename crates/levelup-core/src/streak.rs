//! Daily completion streaks.
//!
//! A streak counts consecutive calendar days with at least one completion.
//! Two separate rules act on it:
//! - [`update_streak`] is the active transition applied when a completion
//!   happens.
//! - [`retrieve_streak`] is the passive decay applied when the streak is
//!   read: a streak whose last completion is more than one calendar day old
//!   is reported as broken even though nothing was completed.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::day::calendar_days_between;

/// Persisted streak snapshot.
///
/// Invariant: `last_completion == None` implies `count == 0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub count: u32,
    pub last_completion: Option<DateTime<Utc>>,
}

impl StreakState {
    pub fn is_active(&self) -> bool {
        self.last_completion.is_some() && self.count > 0
    }

    /// Restore the `None => 0` invariant on a snapshot read from storage.
    pub fn normalized(mut self) -> Self {
        if self.last_completion.is_none() {
            self.count = 0;
        }
        self
    }
}

/// Which rule an update applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTransition {
    /// First completion ever (or after a decayed streak)
    Started,
    /// Another completion on the same calendar day
    SameDay,
    /// First completion on the day after the last one
    Extended,
    /// First completion after a gap of more than one day
    Restarted,
}

impl StreakTransition {
    pub fn description(&self) -> &'static str {
        match self {
            StreakTransition::Started => "Streak started",
            StreakTransition::SameDay => "Already counted today",
            StreakTransition::Extended => "Streak extended",
            StreakTransition::Restarted => "Streak restarted after a missed day",
        }
    }
}

/// New state plus the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakUpdate {
    pub state: StreakState,
    pub transition: StreakTransition,
}

/// Classify a completion at `now` against `state`.
pub fn classify<Tz: TimeZone>(state: &StreakState, now: &DateTime<Tz>) -> StreakTransition {
    match state.last_completion {
        None => StreakTransition::Started,
        Some(last) => match calendar_days_between(&last, now) {
            // A last completion on a later local day means the clock moved
            // back; count it as today.
            d if d <= 0 => StreakTransition::SameDay,
            1 => StreakTransition::Extended,
            _ => StreakTransition::Restarted,
        },
    }
}

/// Apply a completion at `now`, reporting which rule fired.
pub fn apply_completion<Tz: TimeZone>(state: &StreakState, now: &DateTime<Tz>) -> StreakUpdate {
    let transition = classify(state, now);
    let count = match transition {
        StreakTransition::Started | StreakTransition::Restarted => 1,
        // max(1) repairs a snapshot that had a timestamp but a zero count.
        StreakTransition::SameDay => state.count.max(1),
        StreakTransition::Extended => state.count.saturating_add(1),
    };

    StreakUpdate {
        state: StreakState {
            count,
            last_completion: Some(now.with_timezone(&Utc)),
        },
        transition,
    }
}

/// Active transition applied on a completion at `now`.
pub fn update_streak<Tz: TimeZone>(state: &StreakState, now: &DateTime<Tz>) -> StreakState {
    apply_completion(state, now).state
}

/// Read-time view of `state` at `now`, with passive decay applied.
pub fn retrieve_streak<Tz: TimeZone>(state: &StreakState, now: &DateTime<Tz>) -> StreakState {
    match state.last_completion {
        Some(last) if calendar_days_between(&last, now) > 1 => StreakState::default(),
        _ => state.clone().normalized(),
    }
}
