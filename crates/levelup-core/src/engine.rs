//! Progression engine.
//!
//! Binds the pure rules (level calculator, ledger, streaks, daily gates) to a
//! [`KeyValueStore`]. Every call is one read-compute-write cycle for a single
//! user; the caller guarantees that no two cycles for the same user overlap.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::content::ContentSource;
use crate::daily_cap::{CapKind, DailyCapGate};
use crate::daily_gate::{ContentKind, DailyContentGate};
use crate::error::{ConfigError, Result};
use crate::events::ProgressEvent;
use crate::level::{LevelCalculator, LevelInfo};
use crate::points::{award_points, PointsReset};
use crate::storage::{EngineConfig, KeyValueStore, ProgressRepository, UserId};
use crate::streak::{apply_completion, retrieve_streak, StreakState, StreakTransition, StreakUpdate};

/// Result of awarding points for one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsAward {
    pub base_points: u64,
    /// Multiplier of the level held before the award
    pub bonus_multiplier: f64,
    pub awarded: u64,
    pub total_before: u64,
    pub total_after: u64,
    pub level_before: u32,
    pub level_after: u32,
}

impl PointsAward {
    pub fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }
}

/// Result of [`ProgressionEngine::complete_challenge`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CompletionOutcome {
    Completed {
        award: PointsAward,
        streak: StreakUpdate,
        remaining_today: u32,
        events: Vec<ProgressEvent>,
    },
    /// Today's cap is used up; nothing was awarded.
    CapReached {
        kind: CapKind,
        cap: u32,
        cooldown_until: Option<DateTime<Utc>>,
    },
}

impl CompletionOutcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, CompletionOutcome::Completed { .. })
    }
}

/// Result of [`ProgressionEngine::reset_points`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetOutcome {
    pub reset: PointsReset,
    pub level_after: u32,
    pub events: Vec<ProgressEvent>,
}

/// Today's content for one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyContent<T> {
    pub kind: ContentKind,
    pub items: Vec<T>,
    /// True when the items were generated by this call
    pub refreshed: bool,
    /// `DailyContentRefreshed` when `refreshed`, empty otherwise
    pub events: Vec<ProgressEvent>,
}

pub struct ProgressionEngine<S> {
    repo: ProgressRepository<S>,
    calculator: LevelCalculator,
    challenge_gate: DailyCapGate,
    quiz_gate: DailyCapGate,
}

impl<S: KeyValueStore> ProgressionEngine<S> {
    /// Engine with the standard table, bonus schedule and caps.
    pub fn new(store: S) -> Self {
        Self {
            repo: ProgressRepository::new(store),
            calculator: LevelCalculator::default(),
            challenge_gate: DailyCapGate::challenges(),
            quiz_gate: DailyCapGate::quiz(),
        }
    }

    /// Engine built from a configuration, failing fast if it is invalid.
    pub fn from_config(store: S, config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            repo: ProgressRepository::new(store),
            calculator: config.level_calculator(),
            challenge_gate: config.cap_gate(CapKind::Challenges),
            quiz_gate: config.cap_gate(CapKind::Quiz),
        })
    }

    pub fn repository(&self) -> &ProgressRepository<S> {
        &self.repo
    }

    pub fn calculator(&self) -> &LevelCalculator {
        &self.calculator
    }

    pub fn gate(&self, kind: CapKind) -> &DailyCapGate {
        match kind {
            CapKind::Challenges => &self.challenge_gate,
            CapKind::Quiz => &self.quiz_gate,
        }
    }

    pub fn level_info(&self, user: &UserId) -> Result<LevelInfo> {
        let total = self.repo.total_points(user)?;
        Ok(self.calculator.info(total))
    }

    /// Award `base_points` plus the bonus of the user's current level.
    pub fn award_points(&self, user: &UserId, base_points: u64) -> Result<PointsAward> {
        let total_before = self.repo.total_points(user)?;
        let level_before = self.calculator.level_of(total_before);
        let awarded = self.calculator.points_awarded(base_points, total_before);
        let total_after = award_points(total_before, awarded);
        self.repo.set_total_points(user, total_after)?;

        let award = PointsAward {
            base_points,
            bonus_multiplier: self.calculator.bonus().multiplier(level_before),
            awarded,
            total_before,
            total_after,
            level_before,
            level_after: self.calculator.level_of(total_after),
        };

        tracing::debug!(user = %user, base_points, awarded, total = total_after, "points awarded");
        if award.leveled_up() {
            tracing::info!(
                user = %user,
                from = award.level_before,
                to = award.level_after,
                "level up"
            );
        }
        Ok(award)
    }

    /// Overwrite the user's total at `now`. Unlike [`Self::award_points`]
    /// this may lower it.
    pub fn reset_points<Tz: TimeZone>(
        &self,
        user: &UserId,
        value: u64,
        now: &DateTime<Tz>,
    ) -> Result<ResetOutcome> {
        let previous = self.repo.total_points(user)?;
        let reset = PointsReset::new(previous, value);
        self.repo.set_total_points(user, reset.current)?;
        if reset.is_regression() {
            tracing::warn!(
                user = %user,
                previous = reset.previous,
                total = reset.current,
                "points reset lowered the total"
            );
        }
        Ok(ResetOutcome {
            reset,
            level_after: self.calculator.level_of(reset.current),
            events: vec![ProgressEvent::PointsReset {
                previous: reset.previous,
                total: reset.current,
                at: now.with_timezone(&Utc),
            }],
        })
    }

    /// Streak as of `now`, persisting passive decay if it applied.
    pub fn streak<Tz: TimeZone>(&self, user: &UserId, now: &DateTime<Tz>) -> Result<StreakState> {
        let stored = self.repo.streak(user)?;
        let current = retrieve_streak(&stored, now);
        if current != stored {
            tracing::debug!(user = %user, lost = stored.count, "streak decayed");
            self.repo.set_streak(user, &current)?;
        }
        Ok(current)
    }

    /// Completions of `kind` still available today.
    pub fn remaining_today<Tz: TimeZone>(
        &self,
        user: &UserId,
        kind: CapKind,
        now: &DateTime<Tz>,
    ) -> Result<u32> {
        let counter = self.repo.completion_counter(user, kind)?;
        Ok(self.gate(kind).remaining_today(&counter, now))
    }

    /// Record a completion of `kind` worth `base_points` at `now`.
    ///
    /// Passes the daily cap, awards bonus-adjusted points and advances the
    /// streak. A capped completion changes nothing. The counter is written
    /// last, so a failed award never consumes a slot.
    pub fn complete_challenge<Tz: TimeZone>(
        &self,
        user: &UserId,
        kind: CapKind,
        base_points: u64,
        now: &DateTime<Tz>,
    ) -> Result<CompletionOutcome> {
        let at = now.with_timezone(&Utc);
        let gate = self.gate(kind);
        let counter = self.repo.completion_counter(user, kind)?;
        let decision = gate.record_completion(&counter, now);

        if !decision.allowed {
            tracing::debug!(user = %user, kind = %kind, cap = gate.cap(), "daily cap reached");
            return Ok(CompletionOutcome::CapReached {
                kind,
                cap: gate.cap(),
                cooldown_until: gate
                    .cooldown_until(&decision.counter, now)
                    .map(|t| t.with_timezone(&Utc)),
            });
        }
        let award = self.award_points(user, base_points)?;

        let previous_streak = self.repo.streak(user)?;
        let streak = apply_completion(&previous_streak, now);
        self.repo.set_streak(user, &streak.state)?;

        self.repo.set_completion_counter(user, kind, &decision.counter)?;

        let mut events = vec![ProgressEvent::PointsAwarded {
            base_points,
            awarded: award.awarded,
            total: award.total_after,
            at,
        }];
        if award.leveled_up() {
            let title = self
                .calculator
                .table()
                .get(award.level_after)
                .map(|l| l.title.clone())
                .unwrap_or_default();
            events.push(ProgressEvent::LevelUp {
                from_level: award.level_before,
                to_level: award.level_after,
                title,
                at,
            });
        }
        match streak.transition {
            StreakTransition::Started => events.push(ProgressEvent::StreakStarted { at }),
            StreakTransition::Extended => events.push(ProgressEvent::StreakExtended {
                count: streak.state.count,
                at,
            }),
            StreakTransition::Restarted => events.push(ProgressEvent::StreakRestarted {
                previous_count: previous_streak.count,
                at,
            }),
            StreakTransition::SameDay => {}
        }

        let remaining_today = gate.cap().saturating_sub(decision.counter.count);
        if remaining_today == 0 {
            events.push(ProgressEvent::DailyCapReached {
                kind,
                cap: gate.cap(),
                at,
            });
        }

        Ok(CompletionOutcome::Completed {
            award,
            streak,
            remaining_today,
            events,
        })
    }

    /// Today's content of `kind`, regenerated through `source` on the first
    /// call of each calendar day.
    pub fn daily_content<Tz, Src>(
        &self,
        user: &UserId,
        kind: ContentKind,
        now: &DateTime<Tz>,
        source: &mut Src,
    ) -> Result<DailyContent<Src::Item>>
    where
        Tz: TimeZone,
        Src: ContentSource,
        Src::Item: Serialize + DeserializeOwned,
    {
        let gate = DailyContentGate::new(kind);
        let marker = self.repo.refresh_marker(user, kind)?;
        let mut history = self.repo.recent_history(user, kind)?;

        match gate.refresh_if_needed(&marker, now, &mut history, source) {
            Some(refresh) => {
                self.repo.set_daily_content(user, kind, &refresh.items)?;
                self.repo.set_recent_history(user, kind, &history)?;
                self.repo.set_refresh_marker(user, kind, &refresh.marker)?;
                let event = ProgressEvent::DailyContentRefreshed {
                    kind,
                    items: refresh.items.len(),
                    at: now.with_timezone(&Utc),
                };
                Ok(DailyContent {
                    kind,
                    items: refresh.items,
                    refreshed: true,
                    events: vec![event],
                })
            }
            None => Ok(DailyContent {
                kind,
                items: self.repo.daily_content(user, kind)?,
                refreshed: false,
                events: Vec::new(),
            }),
        }
    }
}
