//! Rounds: one time-boxed assignment cycle per active participant.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::title::TitleId;
use crate::user::UserId;

/// Legacy wire format for round timestamps (`21:30 05.06.24`).
///
/// Kept for compatibility with the existing store; minute precision is enough
/// for day-scale deadlines.
pub const TIME_FMT: &str = "%H:%M %d.%m.%y";

/// One participant's assignment in a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roll {
    /// The assigned title.
    pub title: TitleId,
    /// The participant's rating, `None` until they rate.
    pub score: Option<f64>,
}

impl Roll {
    /// Create an unrated roll.
    pub fn new(title: TitleId) -> Self {
        Self { title, score: None }
    }
}

/// A single assignment cycle of a challenge.
///
/// Rounds are append-only history: once `is_finished` flips to true it never
/// flips back, and the rolls of a finished round are never mutated again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    /// Assignment and score per participant.
    pub rolls: BTreeMap<UserId, Roll>,
    /// When the round started.
    #[serde(with = "legacy_time")]
    pub start_time: DateTime<Utc>,
    /// Rating deadline; overwritten with the actual end time on finish.
    #[serde(with = "legacy_time")]
    pub finish_time: DateTime<Utc>,
    /// Terminal flag, set exactly once by `end_round`.
    pub is_finished: bool,
}

impl Round {
    /// Open a new round running from `start` for `duration`.
    pub fn new(rolls: BTreeMap<UserId, Roll>, start: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            rolls,
            start_time: start,
            finish_time: start + duration,
            is_finished: false,
        }
    }

    /// Whether the rating deadline has passed at `now`.
    pub fn deadline_passed(&self, now: DateTime<Utc>) -> bool {
        now > self.finish_time
    }

    /// Push the deadline back by `delta`.
    pub fn extend(&mut self, delta: Duration) {
        self.finish_time += delta;
    }

    /// The roll of a participant, if they have one this round.
    pub fn roll(&self, user: UserId) -> Option<&Roll> {
        self.rolls.get(&user)
    }

    /// Mutable access to a participant's roll.
    pub fn roll_mut(&mut self, user: UserId) -> Option<&mut Roll> {
        self.rolls.get_mut(&user)
    }
}

mod legacy_time {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::TIME_FMT;

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.format(TIME_FMT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&s, TIME_FMT)
            .map(|naive| naive.and_utc())
            .map_err(de::Error::custom)
    }
}
