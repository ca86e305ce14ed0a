//! "N completions per day" gates.
//!
//! Standard challenges and quiz answers are both capped per calendar day.
//! They share this mechanism but never a counter: each [`CapKind`] has its
//! own [`DailyCompletionCounter`] and its own cap.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::day::{day_index, next_midnight, DayIndex};

/// Default number of standard challenge completions per day.
pub const DEFAULT_CHALLENGE_CAP: u32 = 2;
/// Default number of quiz completions per day.
pub const DEFAULT_QUIZ_CAP: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapKind {
    Challenges,
    Quiz,
}

impl CapKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapKind::Challenges => "challenges",
            CapKind::Quiz => "quiz",
        }
    }
}

impl std::fmt::Display for CapKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completions recorded on `day`.
///
/// Invariant: a counter whose `day` is not today is treated as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCompletionCounter {
    pub day: DayIndex,
    pub count: u32,
}

impl DailyCompletionCounter {
    /// The counter as it applies on `today`.
    pub fn rolled_to(self, today: DayIndex) -> Self {
        if self.day == today {
            self
        } else {
            Self {
                day: today,
                count: 0,
            }
        }
    }
}

/// Result of [`DailyCapGate::record_completion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapDecision {
    pub counter: DailyCompletionCounter,
    pub allowed: bool,
}

/// A per-day cap for one kind of completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyCapGate {
    kind: CapKind,
    cap: u32,
}

impl DailyCapGate {
    pub fn new(kind: CapKind, cap: u32) -> Self {
        Self { kind, cap }
    }

    pub fn challenges() -> Self {
        Self::new(CapKind::Challenges, DEFAULT_CHALLENGE_CAP)
    }

    pub fn quiz() -> Self {
        Self::new(CapKind::Quiz, DEFAULT_QUIZ_CAP)
    }

    pub fn kind(&self) -> CapKind {
        self.kind
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    /// Try to record one completion at `now`.
    ///
    /// A rejected completion leaves the (rolled) counter unchanged and must
    /// not award points.
    pub fn record_completion<Tz: TimeZone>(
        &self,
        counter: &DailyCompletionCounter,
        now: &DateTime<Tz>,
    ) -> CapDecision {
        let counter = counter.rolled_to(day_index(now));
        if counter.count >= self.cap {
            return CapDecision {
                counter,
                allowed: false,
            };
        }
        CapDecision {
            counter: DailyCompletionCounter {
                count: counter.count + 1,
                ..counter
            },
            allowed: true,
        }
    }

    /// Completions still available today.
    pub fn remaining_today<Tz: TimeZone>(&self, counter: &DailyCompletionCounter, now: &DateTime<Tz>) -> u32 {
        self.cap
            .saturating_sub(counter.rolled_to(day_index(now)).count)
    }

    /// End of the cooldown when today's cap is reached: the next local
    /// midnight. `None` while completions remain.
    pub fn cooldown_until<Tz: TimeZone>(
        &self,
        counter: &DailyCompletionCounter,
        now: &DateTime<Tz>,
    ) -> Option<DateTime<Tz>> {
        if self.remaining_today(counter, now) > 0 {
            return None;
        }
        next_midnight(now)
    }
}
