//! # Levelup Core Library
//!
//! This library provides the progression rules behind the Levelup challenge
//! app: users complete challenges and quizzes, earn points, level up and keep
//! daily streaks. It follows a CLI-first philosophy where every operation is
//! available via a standalone CLI binary, with the mobile app being a thin
//! presentation layer over the same rules.
//!
//! ## Architecture
//!
//! - **Pure rules**: level derivation, points, streaks, daily refresh gates
//!   and daily caps are functions over snapshots; they never touch storage
//! - **Persistence port**: a [`KeyValueStore`] injected into the
//!   [`ProgressionEngine`], with per-user keys derived from a [`UserId`]
//! - **Storage**: an in-memory store and a SQLite-backed one
//! - **Configuration**: TOML-based caps, bonus schedule and level table
//!
//! ## Key Components
//!
//! - [`LevelCalculator`]: level, progress and bonus from a point total
//! - [`DailyContentGate`]: once-per-day content regeneration
//! - [`DailyCapGate`]: per-day completion caps
//! - [`ProgressionEngine`]: read-compute-write façade for one user

pub mod content;
pub mod daily_cap;
pub mod daily_gate;
pub mod day;
pub mod engine;
pub mod error;
pub mod events;
pub mod level;
pub mod points;
pub mod storage;
pub mod streak;

pub use content::{Challenge, ContentPicker, ContentSource, DedupPolicy, QuizQuestion, RecentHistory};
pub use daily_cap::{CapDecision, CapKind, DailyCapGate, DailyCompletionCounter};
pub use daily_gate::{ContentKind, DailyContentGate, DailyRefreshMarker};
pub use day::DayIndex;
pub use engine::{CompletionOutcome, DailyContent, PointsAward, ProgressionEngine, ResetOutcome};
pub use error::{ConfigError, CoreError, StorageError};
pub use events::ProgressEvent;
pub use level::{
    calculate_level, BonusSchedule, LevelCalculator, LevelDefinition, LevelInfo, LevelTable,
    MAX_BONUS_PERCENT, MAX_LEVEL_TITLE,
};
pub use points::{award_points, reset_points, PointsReset};
pub use storage::{Database, EngineConfig, KeyValueStore, MemoryStore, UserId};
pub use streak::{retrieve_streak, update_streak, StreakState, StreakTransition};
