//! Karma scoring: a pure replay over finished-round history.
//!
//! Karma combines two roles. As a *proposer* you earn the raw scores other
//! participants give your titles; as a *watcher* you earn your own scores,
//! but generosity above the midpoint pays out at a quarter slope, so honest
//! low ratings are worth more than inflated high ones.
//!
//! The engine never stores incremental state: every query replays the full
//! finished-round history in challenge-creation order. That makes karma a
//! pure function of history and makes recalculation trivially idempotent.

use serde::{Deserialize, Serialize};

use crate::challenge::Challenge;
use crate::user::UserId;

/// Tunable constants of the karma formula.
///
/// The historical implementations disagreed on the exact formula; this is the
/// canonical variant, with every knob exposed so alternatives stay one config
/// edit away.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KarmaConfig {
    /// Karma every user starts from.
    pub baseline: f64,
    /// Upper clamp applied after each round's aggregate update.
    pub max: f64,
    /// Score at which the watcher payout changes slope.
    pub midpoint: f64,
    /// Slope of the watcher payout above the midpoint.
    pub generous_slope: f64,
}

impl Default for KarmaConfig {
    fn default() -> Self {
        Self {
            baseline: 0.0,
            max: 1000.0,
            midpoint: 5.0,
            generous_slope: 0.25,
        }
    }
}

impl KarmaConfig {
    /// Set the starting karma.
    pub fn with_baseline(mut self, baseline: f64) -> Self {
        self.baseline = baseline;
        self
    }

    /// Set the upper clamp.
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = max;
        self
    }
}

/// A user's computed karma.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Karma {
    /// Current value, clamped to `[0, max]`.
    pub value: f64,
    /// Change contributed by the most recent challenge that moved the value.
    pub diff: f64,
}

/// Payout for a score the evaluated user gave as a watcher.
///
/// Linear below the midpoint, quarter slope above it.
pub fn watcher_delta(score: f64, config: &KarmaConfig) -> f64 {
    if score < config.midpoint {
        score
    } else {
        config.midpoint + (score - config.midpoint) * config.generous_slope
    }
}

/// Payout for a score someone else gave to a title the evaluated user
/// proposed. A flat pass-through of the raw score.
pub fn proposer_delta(score: f64) -> f64 {
    score
}

/// Replay a user's full finished-round history.
///
/// `challenges` must be ordered by creation index; rounds are replayed in
/// round order. Self-ratings (rating your own proposed title) count for
/// neither role.
pub fn replay<'a, I>(user: UserId, challenges: I, config: &KarmaConfig) -> Karma
where
    I: IntoIterator<Item = &'a Challenge>,
{
    let mut value = config.baseline;
    let mut diff = 0.0;

    for challenge in challenges {
        let before = value;
        for round in challenge.rounds().iter().filter(|r| r.is_finished) {
            let mut round_delta = 0.0;
            for (watcher, roll) in &round.rolls {
                let Some(score) = roll.score else {
                    continue;
                };
                let Some(title) = challenge.title(roll.title) else {
                    continue;
                };
                if title.proposer == user && *watcher != user {
                    round_delta += proposer_delta(score);
                }
                if *watcher == user && title.proposer != user {
                    round_delta += watcher_delta(score, config);
                }
            }
            value = (value + round_delta).clamp(0.0, config.max);
        }
        if value != before {
            diff = value - before;
        }
    }

    Karma { value, diff }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::MAIN_POOL;
    use chrono::{Duration, TimeZone, Utc};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn config() -> KarmaConfig {
        KarmaConfig::default()
    }

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 5, 21, 30, 0).unwrap()
    }

    /// Two users, one finished round where each rated the other's title.
    fn finished_challenge(score0: f64, score1: f64) -> Challenge {
        let mut rng = StdRng::seed_from_u64(1);
        let mut ch = Challenge::new(0, 123);
        ch.add_participant(UserId(0)).unwrap();
        ch.add_participant(UserId(1)).unwrap();
        ch.add_title(MAIN_POOL, "t0", UserId(0), None).unwrap();
        ch.add_title(MAIN_POOL, "t1", UserId(1), None).unwrap();
        ch.start_round(Duration::days(1), MAIN_POOL, &mut rng, now())
            .unwrap();
        // Make the pairing deterministic: 0 watches t1, 1 watches t0.
        let (t0, _) = ch.find_title("t0").unwrap();
        let assigned0 = ch.last_round().unwrap().roll(UserId(0)).unwrap().title;
        if assigned0 == t0 {
            ch.swap(UserId(0), UserId(1)).unwrap();
        }
        ch.rate(UserId(0), score0, now()).unwrap();
        ch.rate(UserId(1), score1, now()).unwrap();
        ch.end_round(now()).unwrap();
        ch
    }

    #[test]
    fn watcher_delta_is_linear_below_midpoint() {
        let cfg = config();
        assert_eq!(watcher_delta(0.0, &cfg), 0.0);
        assert_eq!(watcher_delta(3.0, &cfg), 3.0);
        assert!(watcher_delta(4.0, &cfg) > watcher_delta(3.0, &cfg));
    }

    #[test]
    fn watcher_delta_decelerates_above_midpoint() {
        let cfg = config();
        assert_eq!(watcher_delta(5.0, &cfg), 5.0);
        assert_eq!(watcher_delta(10.0, &cfg), 6.25);
        // Payout growth over [5, 10] is a quarter of the growth over [0, 5].
        let low = watcher_delta(5.0, &cfg) - watcher_delta(0.0, &cfg);
        let high = watcher_delta(10.0, &cfg) - watcher_delta(5.0, &cfg);
        assert_eq!(high, low * 0.25);
    }

    #[test]
    fn replay_combines_both_roles() {
        // User 0 watches t1 and rates it 8; user 1 watches t0 and rates it 6.
        let ch = finished_challenge(8.0, 6.0);
        let karma = replay(UserId(0), [&ch], &config());
        // Proposer: t0 got 6 from user 1 -> +6.
        // Watcher: gave 8 -> 5 + 3 * 0.25 = 5.75.
        assert_eq!(karma.value, 11.75);
        assert_eq!(karma.diff, 11.75);
    }

    #[test]
    fn unrated_rolls_contribute_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut ch = Challenge::new(0, 123);
        ch.add_participant(UserId(0)).unwrap();
        ch.add_title(MAIN_POOL, "t0", UserId(0), None).unwrap();
        ch.start_round(Duration::days(1), MAIN_POOL, &mut rng, now())
            .unwrap();
        ch.end_round(now()).unwrap();
        let karma = replay(UserId(0), [&ch], &config());
        assert_eq!(karma.value, 0.0);
        assert_eq!(karma.diff, 0.0);
    }

    #[test]
    fn self_rating_counts_for_neither_role() {
        // Single participant inevitably watches their own title.
        let mut rng = StdRng::seed_from_u64(1);
        let mut ch = Challenge::new(0, 123);
        ch.add_participant(UserId(0)).unwrap();
        ch.add_title(MAIN_POOL, "t0", UserId(0), None).unwrap();
        ch.start_round(Duration::days(1), MAIN_POOL, &mut rng, now())
            .unwrap();
        ch.rate(UserId(0), 9.0, now()).unwrap();
        ch.end_round(now()).unwrap();
        let karma = replay(UserId(0), [&ch], &config());
        assert_eq!(karma.value, 0.0);
    }

    #[test]
    fn replay_is_idempotent() {
        let ch = finished_challenge(8.0, 6.0);
        let first = replay(UserId(0), [&ch], &config());
        let second = replay(UserId(0), [&ch], &config());
        assert_eq!(first, second);
    }

    #[test]
    fn karma_clamped_to_max() {
        let ch = finished_challenge(10.0, 10.0);
        let cfg = config().with_max(5.0);
        let karma = replay(UserId(0), [&ch], &cfg);
        assert_eq!(karma.value, 5.0);
    }

    #[test]
    fn diff_tracks_latest_contributing_challenge() {
        let first = finished_challenge(8.0, 6.0);
        let mut second = finished_challenge(2.0, 3.0);
        second.index = 1;
        let karma = replay(UserId(0), [&first, &second], &config());
        // Second challenge: proposer +3, watcher +2.
        assert_eq!(karma.diff, 5.0);
        assert_eq!(karma.value, 11.75 + 5.0);
    }

    #[test]
    fn baseline_shifts_starting_point() {
        let ch = finished_challenge(8.0, 6.0);
        let cfg = config().with_baseline(100.0);
        let karma = replay(UserId(0), [&ch], &cfg);
        assert_eq!(karma.value, 111.75);
    }
}
