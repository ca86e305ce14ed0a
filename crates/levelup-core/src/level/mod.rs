//! Level table, bonus schedule and the calculator that derives a user's
//! level from their point total.

pub mod bonus;
pub mod calculator;
pub mod table;

pub use bonus::{BonusSchedule, BonusStep, MAX_BONUS_PERCENT};
pub use calculator::{
    calculate_level, points_awarded, sanitize_points, LevelCalculator, LevelInfo,
    MAX_LEVEL_TITLE,
};
pub use table::{LevelDefinition, LevelTable};
