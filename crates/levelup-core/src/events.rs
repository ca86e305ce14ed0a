use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::daily_cap::CapKind;
use crate::daily_gate::ContentKind;

/// Every progression change produces an Event.
/// The UI turns them into toasts and animations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProgressEvent {
    PointsAwarded {
        base_points: u64,
        awarded: u64,
        total: u64,
        at: DateTime<Utc>,
    },
    /// Total overwritten; `previous > total` means points were lost.
    PointsReset {
        previous: u64,
        total: u64,
        at: DateTime<Utc>,
    },
    LevelUp {
        from_level: u32,
        to_level: u32,
        title: String,
        at: DateTime<Utc>,
    },
    StreakStarted {
        at: DateTime<Utc>,
    },
    StreakExtended {
        count: u32,
        at: DateTime<Utc>,
    },
    /// A missed day reset the streak before this completion.
    StreakRestarted {
        previous_count: u32,
        at: DateTime<Utc>,
    },
    DailyCapReached {
        kind: CapKind,
        cap: u32,
        at: DateTime<Utc>,
    },
    DailyContentRefreshed {
        kind: ContentKind,
        items: usize,
        at: DateTime<Utc>,
    },
}
