//! Static level configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One unlockable level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDefinition {
    pub level: u32,
    pub title: String,
    pub points_required: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub advantages: Vec<String>,
}

impl LevelDefinition {
    pub fn new(level: u32, title: impl Into<String>, points_required: u64) -> Self {
        Self {
            level,
            title: title.into(),
            points_required,
            description: String::new(),
            advantages: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_advantages<I, S>(mut self, advantages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.advantages = advantages.into_iter().map(Into::into).collect();
        self
    }
}

/// Validated, level-sorted table of [`LevelDefinition`]s.
///
/// Levels may be sparse (the standard table has no 6, 7, 9 or 11-14).
/// Construction guarantees:
/// - level 1 exists and requires 0 points
/// - level numbers are unique
/// - `points_required` strictly increases with the level number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LevelDefinition>", into = "Vec<LevelDefinition>")]
pub struct LevelTable {
    levels: Vec<LevelDefinition>,
}

impl LevelTable {
    /// Build a table, failing fast on a malformed configuration.
    pub fn new(mut levels: Vec<LevelDefinition>) -> Result<Self, ConfigError> {
        if levels.is_empty() {
            return Err(ConfigError::EmptyLevelTable);
        }
        levels.sort_by_key(|l| l.level);

        let floor = &levels[0];
        if floor.level != 1 || floor.points_required != 0 {
            return Err(ConfigError::MissingFloorLevel {
                found: format!(
                    "level {} at {} points",
                    floor.level, floor.points_required
                ),
            });
        }

        for pair in levels.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            if prev.level == cur.level {
                return Err(ConfigError::DuplicateLevel(cur.level));
            }
            if cur.points_required <= prev.points_required {
                return Err(ConfigError::NonIncreasingThreshold {
                    level: cur.level,
                    points_required: cur.points_required,
                    previous_level: prev.level,
                    previous_points: prev.points_required,
                });
            }
        }

        Ok(Self { levels })
    }

    /// The built-in progression used when no custom table is configured.
    pub fn standard() -> Self {
        Self {
            levels: standard_levels(),
        }
    }

    pub fn levels(&self) -> &[LevelDefinition] {
        &self.levels
    }

    pub fn get(&self, level: u32) -> Option<&LevelDefinition> {
        self.levels
            .binary_search_by_key(&level, |l| l.level)
            .ok()
            .map(|idx| &self.levels[idx])
    }

    /// Level 1.
    pub fn floor(&self) -> &LevelDefinition {
        &self.levels[0]
    }

    /// Highest defined level.
    pub fn max_level(&self) -> &LevelDefinition {
        &self.levels[self.levels.len() - 1]
    }

    /// Greatest defined level whose threshold `points` meets or exceeds.
    pub fn reached(&self, points: u64) -> &LevelDefinition {
        self.levels
            .iter()
            .filter(|l| points >= l.points_required)
            .max_by_key(|l| l.level)
            .unwrap_or_else(|| self.floor())
    }

    /// Smallest defined level strictly above `level`, skipping gaps.
    pub fn next_after(&self, level: u32) -> Option<&LevelDefinition> {
        self.levels.iter().find(|l| l.level > level)
    }

    pub fn contains(&self, level: u32) -> bool {
        self.get(level).is_some()
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<LevelDefinition>> for LevelTable {
    type Error = ConfigError;

    fn try_from(levels: Vec<LevelDefinition>) -> Result<Self, Self::Error> {
        Self::new(levels)
    }
}

impl From<LevelTable> for Vec<LevelDefinition> {
    fn from(table: LevelTable) -> Self {
        table.levels
    }
}

fn standard_levels() -> Vec<LevelDefinition> {
    vec![
        LevelDefinition::new(1, "Novice", 0)
            .with_description("Every journey starts with a first challenge.")
            .with_advantages(["Daily challenges"]),
        LevelDefinition::new(2, "Explorer", 100)
            .with_description("You are finding your way around.")
            .with_advantages(["Daily challenges", "Daily quiz"]),
        LevelDefinition::new(3, "Adventurer", 225)
            .with_description("Challenges no longer scare you.")
            .with_advantages(["+5% bonus points", "Timed challenges"]),
        LevelDefinition::new(4, "Pathfinder", 400)
            .with_description("You open the way for others.")
            .with_advantages(["+5% bonus points", "Location challenges"]),
        LevelDefinition::new(5, "Challenger", 650)
            .with_description("Consistency is becoming a habit.")
            .with_advantages(["+10% bonus points", "Profile badge frame"]),
        LevelDefinition::new(8, "Veteran", 1200)
            .with_description("Few challenges are left untried.")
            .with_advantages(["+15% bonus points", "Exclusive badges"]),
        LevelDefinition::new(10, "Champion", 2000)
            .with_description("A reference for the whole community.")
            .with_advantages(["+20% bonus points", "Champion title"]),
        LevelDefinition::new(15, "Legend", 4000)
            .with_description("The top of the ladder.")
            .with_advantages(["+25% bonus points", "Legend title", "All badges"]),
    ]
}
