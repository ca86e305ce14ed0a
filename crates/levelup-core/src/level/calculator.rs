//! Level derivation from a point total.

use serde::{Deserialize, Serialize};

use super::bonus::BonusSchedule;
use super::table::LevelTable;

/// Next-level title reported once the highest defined level is reached.
pub const MAX_LEVEL_TITLE: &str = "Max level reached";

/// Everything the UI needs to render a user's level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub level: u32,
    pub title: String,
    /// Progress towards the next level, in `[0, 100]`.
    pub progress_percent: f64,
    /// Threshold of the next level, or of the current one at max level.
    pub points_for_next_level: u64,
    pub remaining_points: u64,
    pub next_level: Option<u32>,
    pub next_level_title: String,
    pub advantages: Vec<String>,
    pub description: String,
    pub bonus_multiplier: f64,
}

impl LevelInfo {
    pub fn is_max_level(&self) -> bool {
        self.next_level.is_none()
    }
}

/// Clamp a persisted point value to the valid domain.
pub fn sanitize_points(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or(0)
}

/// Derive the level reached with `total_points`.
pub fn calculate_level(total_points: u64, table: &LevelTable, bonus: &BonusSchedule) -> LevelInfo {
    let current = table.reached(total_points);
    let bonus_multiplier = bonus.multiplier(current.level);

    match table.next_after(current.level) {
        Some(next) => {
            let span = next.points_required.saturating_sub(current.points_required);
            let earned = total_points.saturating_sub(current.points_required);
            let progress_percent = if span == 0 {
                100.0
            } else {
                (earned as f64 / span as f64 * 100.0).clamp(0.0, 100.0)
            };

            LevelInfo {
                level: current.level,
                title: current.title.clone(),
                progress_percent,
                points_for_next_level: next.points_required,
                remaining_points: next.points_required.saturating_sub(total_points),
                next_level: Some(next.level),
                next_level_title: next.title.clone(),
                advantages: current.advantages.clone(),
                description: current.description.clone(),
                bonus_multiplier,
            }
        }
        None => LevelInfo {
            level: current.level,
            title: current.title.clone(),
            progress_percent: 100.0,
            points_for_next_level: current.points_required,
            remaining_points: 0,
            next_level: None,
            next_level_title: MAX_LEVEL_TITLE.to_string(),
            advantages: current.advantages.clone(),
            description: current.description.clone(),
            bonus_multiplier,
        },
    }
}

/// Points granted for an action worth `base_points` at `current_points`.
///
/// The bonus uses the level held *before* the award; a level-up caused by
/// this award only affects later actions.
pub fn points_awarded(
    base_points: u64,
    current_points: u64,
    table: &LevelTable,
    bonus: &BonusSchedule,
) -> u64 {
    bonus.apply(base_points, table.reached(current_points).level)
}

/// A level table bundled with its bonus schedule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelCalculator {
    table: LevelTable,
    bonus: BonusSchedule,
}

impl LevelCalculator {
    pub fn new(table: LevelTable, bonus: BonusSchedule) -> Self {
        let undefined = bonus.undefined_levels(&table);
        if !undefined.is_empty() {
            tracing::warn!(
                levels = ?undefined,
                "bonus schedule references levels missing from the level table"
            );
        }
        Self { table, bonus }
    }

    pub fn table(&self) -> &LevelTable {
        &self.table
    }

    pub fn bonus(&self) -> &BonusSchedule {
        &self.bonus
    }

    pub fn info(&self, total_points: u64) -> LevelInfo {
        calculate_level(total_points, &self.table, &self.bonus)
    }

    pub fn level_of(&self, total_points: u64) -> u32 {
        self.table.reached(total_points).level
    }

    pub fn points_awarded(&self, base_points: u64, current_points: u64) -> u64 {
        points_awarded(base_points, current_points, &self.table, &self.bonus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelDefinition;
    use proptest::prelude::*;

    fn three_levels() -> LevelTable {
        LevelTable::new(vec![
            LevelDefinition::new(1, "One", 0),
            LevelDefinition::new(2, "Two", 100),
            LevelDefinition::new(3, "Three", 225),
        ])
        .unwrap()
    }

    #[test]
    fn zero_points_is_level_one() {
        let info = calculate_level(0, &three_levels(), &BonusSchedule::standard());
        assert_eq!(info.level, 1);
        assert_eq!(info.title, "One");
        assert_eq!(info.progress_percent, 0.0);
        assert_eq!(info.next_level, Some(2));
        assert_eq!(info.remaining_points, 100);
        assert_eq!(info.bonus_multiplier, 1.0);
    }

    #[test]
    fn accumulating_points_walks_the_table() {
        // The standard table starts 1:0, 2:100, 3:225, 4:400.
        let table = LevelTable::standard();
        let bonus = BonusSchedule::standard();

        let info = calculate_level(100, &table, &bonus);
        assert_eq!(info.level, 2);
        assert_eq!(info.progress_percent, 0.0);
        assert_eq!(info.next_level_title, "Adventurer");

        let info = calculate_level(100 + 125, &table, &bonus);
        assert_eq!(info.level, 3);
        assert_eq!(info.progress_percent, 0.0);
        assert_eq!(info.bonus_multiplier, 1.05);
    }

    #[test]
    fn top_of_a_short_table_is_max_level() {
        let info = calculate_level(225, &three_levels(), &BonusSchedule::standard());
        assert_eq!(info.level, 3);
        assert!(info.is_max_level());
        assert_eq!(info.progress_percent, 100.0);
        assert_eq!(info.next_level_title, MAX_LEVEL_TITLE);
    }

    #[test]
    fn progress_is_relative_to_current_span() {
        let info = calculate_level(160, &three_levels(), &BonusSchedule::standard());
        assert_eq!(info.level, 2);
        // 60 of the 125 points between level 2 and 3.
        assert!((info.progress_percent - 48.0).abs() < 1e-9);
        assert_eq!(info.points_for_next_level, 225);
        assert_eq!(info.remaining_points, 65);
    }

    #[test]
    fn max_level_reports_sentinel() {
        let info = calculate_level(4000, &LevelTable::standard(), &BonusSchedule::standard());
        assert_eq!(info.level, 15);
        assert_eq!(info.next_level_title, MAX_LEVEL_TITLE);
        assert_eq!(info.progress_percent, 100.0);
        assert_eq!(info.remaining_points, 0);
        assert_eq!(info.points_for_next_level, 4000);
        assert_eq!(info.bonus_multiplier, 1.25);

        let beyond = calculate_level(u64::MAX, &LevelTable::standard(), &BonusSchedule::standard());
        assert_eq!(beyond.level, 15);
    }

    #[test]
    fn sparse_gap_uses_next_defined_level() {
        let info = calculate_level(700, &LevelTable::standard(), &BonusSchedule::standard());
        assert_eq!(info.level, 5);
        assert_eq!(info.next_level, Some(8));
        assert_eq!(info.next_level_title, "Veteran");
        // 50 of the 550 points between level 5 (650) and level 8 (1200).
        assert!((info.progress_percent - 50.0 / 550.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn negative_points_are_clamped() {
        assert_eq!(sanitize_points(-42), 0);
        assert_eq!(sanitize_points(0), 0);
        assert_eq!(sanitize_points(310), 310);
    }

    #[test]
    fn bonus_uses_level_before_award() {
        let table = LevelTable::standard();
        let bonus = BonusSchedule::standard();
        // 200 points is level 2 (no bonus) even though +100 would reach level 3.
        assert_eq!(points_awarded(100, 200, &table, &bonus), 100);
        // At level 3 the +5% applies.
        assert_eq!(points_awarded(100, 225, &table, &bonus), 105);
    }

    #[test]
    fn calculator_bundles_table_and_bonus() {
        let calc = LevelCalculator::default();
        assert_eq!(calc.level_of(1999), 8);
        assert_eq!(calc.info(2000).level, 10);
        assert_eq!(calc.points_awarded(10, 2000), 12);
    }

    proptest! {
        #[test]
        fn level_is_monotonic(a in 0u64..10_000, b in 0u64..10_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let calc = LevelCalculator::default();
            prop_assert!(calc.info(lo).level <= calc.info(hi).level);
        }

        #[test]
        fn progress_stays_in_bounds(points in any::<u64>()) {
            let info = LevelCalculator::default().info(points);
            prop_assert!((0.0..=100.0).contains(&info.progress_percent));
        }

        #[test]
        fn bonus_is_non_decreasing(level in 0u32..100) {
            let bonus = BonusSchedule::standard();
            prop_assert!(bonus.multiplier(level) <= bonus.multiplier(level + 1));
        }
    }

    #[test]
    fn exact_threshold_unlocks_level() {
        let calc = LevelCalculator::default();
        for def in calc.table().levels() {
            assert!(calc.info(def.points_required).level >= def.level);
        }
    }
}
