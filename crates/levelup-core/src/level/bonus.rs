//! Level-based bonus on awarded points.
//!
//! The bonus is a step function of the level number and is configured apart
//! from the [`LevelTable`]: reward tuning and unlock tuning are edited
//! independently. The coupling contract is that every `min_level` named here
//! should exist in the table; [`BonusSchedule::undefined_levels`] reports the
//! ones that don't.

use serde::{Deserialize, Serialize};

use super::table::LevelTable;

/// Largest bonus percent a configuration may grant.
pub const MAX_BONUS_PERCENT: u32 = 1000;

/// Bonus granted from `min_level` upwards, in whole percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusStep {
    pub min_level: u32,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<BonusStep>", into = "Vec<BonusStep>")]
pub struct BonusSchedule {
    steps: Vec<BonusStep>,
}

impl BonusSchedule {
    pub fn new(mut steps: Vec<BonusStep>) -> Self {
        steps.sort_by_key(|s| s.min_level);
        Self { steps }
    }

    /// +5% at level 3, +10% at 5, +15% at 8, +20% at 10, +25% at 15.
    pub fn standard() -> Self {
        Self::new(vec![
            BonusStep { min_level: 3, percent: 5 },
            BonusStep { min_level: 5, percent: 10 },
            BonusStep { min_level: 8, percent: 15 },
            BonusStep { min_level: 10, percent: 20 },
            BonusStep { min_level: 15, percent: 25 },
        ])
    }

    /// A schedule that never grants a bonus.
    pub fn none() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn steps(&self) -> &[BonusStep] {
        &self.steps
    }

    /// Bonus percent at `level`.
    ///
    /// Takes the largest percent among reached steps, so the result never
    /// decreases as the level grows even if a step is configured lower than
    /// its predecessor.
    pub fn percent_for(&self, level: u32) -> u32 {
        self.steps
            .iter()
            .filter(|s| level >= s.min_level)
            .map(|s| s.percent)
            .max()
            .unwrap_or(0)
    }

    /// Multiplier applied to awarded points, e.g. `1.05` for +5%.
    pub fn multiplier(&self, level: u32) -> f64 {
        (100 + u64::from(self.percent_for(level))) as f64 / 100.0
    }

    /// `floor(base * multiplier(level))`, computed in integers.
    pub fn apply(&self, base: u64, level: u32) -> u64 {
        let scaled = u128::from(base) * (100 + u128::from(self.percent_for(level))) / 100;
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }

    /// First step whose percent exceeds [`MAX_BONUS_PERCENT`].
    pub fn out_of_range_step(&self) -> Option<&BonusStep> {
        self.steps.iter().find(|s| s.percent > MAX_BONUS_PERCENT)
    }

    /// Step levels that the table does not define.
    pub fn undefined_levels(&self, table: &LevelTable) -> Vec<u32> {
        self.steps
            .iter()
            .map(|s| s.min_level)
            .filter(|&level| !table.contains(level))
            .collect()
    }
}

impl Default for BonusSchedule {
    fn default() -> Self {
        Self::standard()
    }
}

impl From<Vec<BonusStep>> for BonusSchedule {
    fn from(steps: Vec<BonusStep>) -> Self {
        Self::new(steps)
    }
}

impl From<BonusSchedule> for Vec<BonusStep> {
    fn from(schedule: BonusSchedule) -> Self {
        schedule.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelDefinition;

    #[test]
    fn standard_steps() {
        let bonus = BonusSchedule::standard();
        assert_eq!(bonus.percent_for(1), 0);
        assert_eq!(bonus.percent_for(2), 0);
        assert_eq!(bonus.percent_for(3), 5);
        assert_eq!(bonus.percent_for(4), 5);
        assert_eq!(bonus.percent_for(5), 10);
        assert_eq!(bonus.percent_for(8), 15);
        assert_eq!(bonus.percent_for(10), 20);
        assert_eq!(bonus.percent_for(14), 20);
        assert_eq!(bonus.percent_for(15), 25);
        assert_eq!(bonus.percent_for(99), 25);
    }

    #[test]
    fn multiplier_values() {
        let bonus = BonusSchedule::standard();
        assert_eq!(bonus.multiplier(1), 1.0);
        assert_eq!(bonus.multiplier(3), 1.05);
        assert_eq!(bonus.multiplier(15), 1.25);
    }

    #[test]
    fn apply_floors_exactly() {
        let bonus = BonusSchedule::standard();
        // 20 * 1.15 is 22.999... in floating point; integer math gives 23.
        assert_eq!(bonus.apply(20, 8), 23);
        assert_eq!(bonus.apply(50, 3), 52);
        assert_eq!(bonus.apply(100, 1), 100);
        assert_eq!(bonus.apply(0, 15), 0);
    }

    #[test]
    fn extreme_percent_does_not_wrap() {
        let bonus = BonusSchedule::new(vec![BonusStep {
            min_level: 1,
            percent: u32::MAX,
        }]);
        assert!(bonus.multiplier(1) > 1.0);
        assert_eq!(bonus.apply(1, 1), 42_949_673);
        assert_eq!(bonus.out_of_range_step().map(|s| s.min_level), Some(1));
        assert!(BonusSchedule::standard().out_of_range_step().is_none());
    }

    #[test]
    fn out_of_order_percent_never_lowers_bonus() {
        let bonus = BonusSchedule::new(vec![
            BonusStep { min_level: 2, percent: 20 },
            BonusStep { min_level: 4, percent: 10 },
        ]);
        assert_eq!(bonus.percent_for(4), 20);
    }

    #[test]
    fn reports_levels_missing_from_table() {
        let table = LevelTable::new(vec![
            LevelDefinition::new(1, "One", 0),
            LevelDefinition::new(3, "Three", 100),
        ])
        .unwrap();
        assert_eq!(
            BonusSchedule::standard().undefined_levels(&table),
            vec![5, 8, 10, 15]
        );
        assert!(BonusSchedule::standard()
            .undefined_levels(&LevelTable::standard())
            .is_empty());
    }
}
