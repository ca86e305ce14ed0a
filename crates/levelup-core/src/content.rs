//! Daily content pools and repeat-avoiding selection.
//!
//! Each day a handful of challenges and quiz questions are drawn at random
//! from a fixed pool. A rolling history of recently drawn keys keeps the same
//! items from coming back on consecutive days; when the pool runs out of
//! fresh items the history is trimmed to its newest `retain_on_reset`
//! entries and selection continues.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Anything drawn from a content pool.
pub trait PoolItem {
    /// Stable identity used by the repeat-avoidance history.
    fn key(&self) -> &str;
}

/// Collaborator that produces a fresh batch of daily content.
pub trait ContentSource {
    type Item;

    fn generate(&mut self, history: &mut RecentHistory) -> Vec<Self::Item>;
}

/// How many items to draw and how repeats are avoided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupPolicy {
    /// Items drawn per refresh
    #[serde(default = "default_picks_per_refresh")]
    pub picks_per_refresh: usize,
    /// Number of recent keys remembered
    #[serde(default = "default_recent_window")]
    pub recent_window: usize,
    /// Keys kept when the pool is exhausted and the history is reset
    #[serde(default = "default_retain_on_reset")]
    pub retain_on_reset: usize,
}

fn default_picks_per_refresh() -> usize {
    3
}
fn default_recent_window() -> usize {
    10
}
fn default_retain_on_reset() -> usize {
    3
}

impl Default for DedupPolicy {
    fn default() -> Self {
        Self {
            picks_per_refresh: default_picks_per_refresh(),
            recent_window: default_recent_window(),
            retain_on_reset: default_retain_on_reset(),
        }
    }
}

/// Rolling list of recently drawn keys, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentHistory {
    keys: VecDeque<String>,
}

impl RecentHistory {
    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Remember `key`, dropping the oldest entries beyond `window`.
    pub fn record(&mut self, key: &str, window: usize) {
        self.keys.retain(|k| k != key);
        self.keys.push_back(key.to_string());
        while self.keys.len() > window {
            self.keys.pop_front();
        }
    }

    /// Keep only the newest `keep` entries.
    pub fn trim_to(&mut self, keep: usize) {
        while self.keys.len() > keep {
            self.keys.pop_front();
        }
    }
}

/// Random picker over a fixed pool.
pub struct ContentPicker<T, R = StdRng> {
    pool: Vec<T>,
    policy: DedupPolicy,
    rng: R,
}

impl<T: PoolItem + Clone> ContentPicker<T, StdRng> {
    pub fn new(pool: Vec<T>, policy: DedupPolicy) -> Self {
        Self::with_rng(pool, policy, StdRng::from_entropy())
    }
}

impl<T: PoolItem + Clone, R: Rng> ContentPicker<T, R> {
    pub fn with_rng(pool: Vec<T>, policy: DedupPolicy, rng: R) -> Self {
        Self { pool, policy, rng }
    }

    pub fn pool(&self) -> &[T] {
        &self.pool
    }

    pub fn policy(&self) -> &DedupPolicy {
        &self.policy
    }

    /// Draw `picks_per_refresh` distinct items, avoiding recent ones.
    pub fn pick(&mut self, history: &mut RecentHistory) -> Vec<T> {
        let wanted = self.policy.picks_per_refresh.min(self.pool.len());

        let mut fresh = Self::fresh_items(&self.pool, history);
        if fresh.len() < wanted {
            tracing::debug!(
                fresh = fresh.len(),
                wanted,
                "content pool exhausted, trimming recent history"
            );
            history.trim_to(self.policy.retain_on_reset);
            fresh = Self::fresh_items(&self.pool, history);
            if fresh.len() < wanted {
                fresh = self.pool.iter().collect();
            }
        }

        let picked: Vec<T> = fresh
            .choose_multiple(&mut self.rng, wanted)
            .map(|item| (*item).clone())
            .collect();

        for item in &picked {
            history.record(item.key(), self.policy.recent_window);
        }
        picked
    }

    fn fresh_items<'a>(pool: &'a [T], history: &RecentHistory) -> Vec<&'a T> {
        pool.iter()
            .filter(|item| !history.contains(item.key()))
            .collect()
    }
}

impl<T: PoolItem + Clone, R: Rng> ContentSource for ContentPicker<T, R> {
    type Item = T;

    fn generate(&mut self, history: &mut RecentHistory) -> Vec<T> {
        self.pick(history)
    }
}

/// Kind of a challenge, as presented by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    Daily,
    Timed,
    Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: ChallengeKind,
    pub points: u64,
}

impl PoolItem for Challenge {
    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: String,
    pub prompt: String,
    pub choices: Vec<String>,
    pub answer_index: usize,
    pub points: u64,
}

impl QuizQuestion {
    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.answer_index
    }
}

impl PoolItem for QuizQuestion {
    fn key(&self) -> &str {
        &self.id
    }
}

fn challenge(id: &str, title: &str, description: &str, kind: ChallengeKind, points: u64) -> Challenge {
    Challenge {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        kind,
        points,
    }
}

fn question(id: &str, prompt: &str, choices: &[&str], answer_index: usize) -> QuizQuestion {
    QuizQuestion {
        id: id.to_string(),
        prompt: prompt.to_string(),
        choices: choices.iter().map(|c| c.to_string()).collect(),
        answer_index,
        points: 10,
    }
}

/// Built-in challenge pool.
pub fn standard_challenges() -> Vec<Challenge> {
    use ChallengeKind::*;
    vec![
        challenge("walk-5k", "Take a walk", "Walk 5,000 steps today.", Daily, 50),
        challenge("read-20", "Read for 20 minutes", "Pick up a book and read.", Timed, 40),
        challenge("park-visit", "Visit a park", "Check in at a nearby park.", Location, 60),
        challenge("water-8", "Stay hydrated", "Drink eight glasses of water.", Daily, 30),
        challenge("no-phone-1h", "Unplug", "Spend one hour without your phone.", Timed, 50),
        challenge("museum", "Culture trip", "Check in at a museum or gallery.", Location, 80),
        challenge("stretch-10", "Stretch", "Do ten minutes of stretching.", Timed, 30),
        challenge("call-friend", "Reach out", "Call a friend you have not talked to in a while.", Daily, 40),
    ]
}

/// Built-in quiz pool.
pub fn standard_quiz() -> Vec<QuizQuestion> {
    vec![
        question("q-planets", "How many planets are in the solar system?", &["7", "8", "9"], 1),
        question("q-ocean", "Which is the largest ocean?", &["Atlantic", "Indian", "Pacific"], 2),
        question("q-water", "What is the chemical formula of water?", &["H2O", "CO2", "O2"], 0),
        question("q-continents", "How many continents are there?", &["5", "6", "7"], 2),
        question("q-light", "What travels faster?", &["Sound", "Light"], 1),
        question("q-bones", "How many bones does an adult human have?", &["206", "186", "226"], 0),
        question("q-capital-jp", "What is the capital of Japan?", &["Osaka", "Kyoto", "Tokyo"], 2),
        question("q-hexagon", "How many sides does a hexagon have?", &["5", "6", "8"], 1),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_pcg::Pcg64;
    use std::collections::HashSet;

    fn picker(picks: usize, window: usize, retain: usize) -> ContentPicker<Challenge, Pcg64> {
        let policy = DedupPolicy {
            picks_per_refresh: picks,
            recent_window: window,
            retain_on_reset: retain,
        };
        ContentPicker::with_rng(standard_challenges(), policy, Pcg64::seed_from_u64(7))
    }

    #[test]
    fn picks_distinct_items() {
        let mut p = picker(3, 10, 3);
        let mut history = RecentHistory::default();
        let picked = p.pick(&mut history);
        assert_eq!(picked.len(), 3);
        let keys: HashSet<&str> = picked.iter().map(|c| c.key()).collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn consecutive_draws_avoid_recent_items() {
        let mut p = picker(3, 10, 0);
        let mut history = RecentHistory::default();
        let first: HashSet<String> = p.pick(&mut history).into_iter().map(|c| c.id).collect();
        let second: HashSet<String> = p.pick(&mut history).into_iter().map(|c| c.id).collect();
        assert!(first.is_disjoint(&second));
    }

    #[test]
    fn exhausted_pool_trims_history_and_keeps_going() {
        // 8 items, 3 per draw: the third draw only has 2 fresh items left.
        let mut p = picker(3, 10, 2);
        let mut history = RecentHistory::default();
        p.pick(&mut history);
        p.pick(&mut history);
        let before: Vec<String> = history.keys().map(str::to_string).collect();
        let third = p.pick(&mut history);
        assert_eq!(third.len(), 3);
        // The two newest keys survived the reset and must not be drawn again.
        for kept in &before[before.len() - 2..] {
            assert!(third.iter().all(|c| &c.id != kept));
        }
    }

    #[test]
    fn history_window_is_bounded() {
        let mut history = RecentHistory::default();
        for key in ["a", "b", "c", "d"] {
            history.record(key, 3);
        }
        let keys: Vec<&str> = history.keys().collect();
        assert_eq!(keys, vec!["b", "c", "d"]);

        history.record("b", 3);
        let keys: Vec<&str> = history.keys().collect();
        assert_eq!(keys, vec!["c", "d", "b"]);
    }

    #[test]
    fn pool_smaller_than_picks_returns_whole_pool() {
        let policy = DedupPolicy {
            picks_per_refresh: 5,
            ..DedupPolicy::default()
        };
        let pool = standard_quiz().into_iter().take(2).collect();
        let mut p = ContentPicker::with_rng(pool, policy, Pcg64::seed_from_u64(1));
        let mut history = RecentHistory::default();
        assert_eq!(p.generate(&mut history).len(), 2);
        assert_eq!(p.generate(&mut history).len(), 2);
    }

    #[test]
    fn standard_pools_have_unique_keys() {
        let challenges: HashSet<String> = standard_challenges().into_iter().map(|c| c.id).collect();
        assert_eq!(challenges.len(), standard_challenges().len());
        let quiz = standard_quiz();
        let keys: HashSet<&str> = quiz.iter().map(|q| q.key()).collect();
        assert_eq!(keys.len(), quiz.len());
        assert!(quiz.iter().all(|q| q.answer_index < q.choices.len()));
    }
}
