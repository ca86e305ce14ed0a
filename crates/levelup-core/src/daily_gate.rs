//! Once-per-calendar-day regeneration of daily content.
//!
//! Each content kind keeps its own [`DailyRefreshMarker`]; the daily
//! challenge list and the daily quiz never share one.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::content::{ContentSource, RecentHistory};
use crate::day::{day_index, DayIndex};

/// Content regenerated every day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    DailyChallenges,
    Quiz,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::DailyChallenges => "daily_challenges",
            ContentKind::Quiz => "quiz",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day of the last regeneration for one content kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRefreshMarker {
    pub last_refresh_day: DayIndex,
}

/// True iff `last_refresh_day` lies before today's local day.
pub fn needs_refresh<Tz: TimeZone>(last_refresh_day: DayIndex, now: &DateTime<Tz>) -> bool {
    last_refresh_day < day_index(now)
}

/// Marker value recording a refresh at `now`.
pub fn mark_refreshed<Tz: TimeZone>(now: &DateTime<Tz>) -> DayIndex {
    day_index(now)
}

/// Content produced by a refresh, with the marker to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRefresh<T> {
    pub items: Vec<T>,
    pub marker: DailyRefreshMarker,
}

/// Refresh gate bound to one content kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyContentGate {
    kind: ContentKind,
}

impl DailyContentGate {
    pub fn new(kind: ContentKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn needs_refresh<Tz: TimeZone>(&self, marker: &DailyRefreshMarker, now: &DateTime<Tz>) -> bool {
        needs_refresh(marker.last_refresh_day, now)
    }

    pub fn mark_refreshed<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DailyRefreshMarker {
        DailyRefreshMarker {
            last_refresh_day: mark_refreshed(now),
        }
    }

    /// Regenerate through `source` when the marker is stale, `None` otherwise.
    pub fn refresh_if_needed<Tz, S>(
        &self,
        marker: &DailyRefreshMarker,
        now: &DateTime<Tz>,
        history: &mut RecentHistory,
        source: &mut S,
    ) -> Option<DailyRefresh<S::Item>>
    where
        Tz: TimeZone,
        S: ContentSource,
    {
        if !self.needs_refresh(marker, now) {
            return None;
        }
        let items = source.generate(history);
        let marker = self.mark_refreshed(now);
        tracing::debug!(
            kind = %self.kind,
            day = marker.last_refresh_day.0,
            count = items.len(),
            "daily content regenerated"
        );
        Some(DailyRefresh { items, marker })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(d: u32, h: u32, m: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(4 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 2, d, h, m, 0)
            .unwrap()
    }

    struct Counter(u32);

    impl ContentSource for Counter {
        type Item = u32;

        fn generate(&mut self, _history: &mut RecentHistory) -> Vec<u32> {
            self.0 += 1;
            vec![self.0]
        }
    }

    #[test]
    fn default_marker_always_refreshes() {
        assert!(needs_refresh(DailyRefreshMarker::default().last_refresh_day, &at(1, 0, 0)));
    }

    #[test]
    fn fires_once_per_calendar_day() {
        let gate = DailyContentGate::new(ContentKind::Quiz);
        let mut marker = DailyRefreshMarker::default();
        let mut fired = 0;
        for (h, m) in [(0, 0), (6, 30), (12, 0), (23, 59)] {
            if gate.needs_refresh(&marker, &at(10, h, m)) {
                fired += 1;
                marker = gate.mark_refreshed(&at(10, h, m));
            }
        }
        assert_eq!(fired, 1);
        assert!(gate.needs_refresh(&marker, &at(11, 0, 0)));
    }

    #[test]
    fn month_boundary_is_a_new_day() {
        let marker = DailyRefreshMarker {
            last_refresh_day: mark_refreshed(&at(29, 23, 0)),
        };
        let march_first = FixedOffset::west_opt(4 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 0, 5, 0)
            .unwrap();
        assert!(needs_refresh(marker.last_refresh_day, &march_first));
    }

    #[test]
    fn refresh_if_needed_delegates_only_when_stale() {
        let gate = DailyContentGate::new(ContentKind::DailyChallenges);
        let mut source = Counter(0);
        let mut history = RecentHistory::default();

        let first = gate
            .refresh_if_needed(&DailyRefreshMarker::default(), &at(3, 8, 0), &mut history, &mut source)
            .unwrap();
        assert_eq!(first.items, vec![1]);

        let again = gate.refresh_if_needed(&first.marker, &at(3, 20, 0), &mut history, &mut source);
        assert!(again.is_none());
        assert_eq!(source.0, 1);

        let next_day = gate
            .refresh_if_needed(&first.marker, &at(4, 0, 0), &mut history, &mut source)
            .unwrap();
        assert_eq!(next_day.items, vec![2]);
    }

    #[test]
    fn kinds_have_distinct_names() {
        assert_ne!(ContentKind::Quiz.as_str(), ContentKind::DailyChallenges.as_str());
        assert_eq!(ContentKind::Quiz.to_string(), "quiz");
    }
}
