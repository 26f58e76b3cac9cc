//! Challenge aggregate: pools, titles, roster, and the round state machine.
//!
//! A challenge is "started" once its first round exists. Before that, pools,
//! titles, and participants may be edited freely; afterwards the roster and
//! pool membership are frozen and only round-scoped operations (plus renames)
//! remain legal. Rounds are append-only and only the last one may be open.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::{ChallengeError, ChallengeResult};
use crate::pool::Pool;
use crate::round::{Roll, Round};
use crate::title::{TitleId, TitleInfo};
use crate::user::UserId;

/// Name of the pool every challenge is created with.
pub const MAIN_POOL: &str = "main";

/// Lowest accepted rating.
pub const MIN_SCORE: f64 = 0.0;
/// Highest accepted rating.
pub const MAX_SCORE: f64 = 10.0;

/// A full cycle of the watch game: roster, titles, pools, and rounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    /// Monotonic creation index, used to order challenges for karma replay.
    pub index: u64,
    /// Opaque reference to the channel the challenge runs in.
    pub channel: u64,
    participants: Vec<UserId>,
    failed_participants: BTreeMap<UserId, usize>,
    titles: BTreeMap<TitleId, TitleInfo>,
    pools: BTreeMap<String, Pool>,
    rounds: Vec<Round>,
    progress: BTreeMap<UserId, Option<String>>,
}

impl Challenge {
    /// Create an empty challenge with the default `main` pool.
    pub fn new(index: u64, channel: u64) -> Self {
        let mut pools = BTreeMap::new();
        pools.insert(MAIN_POOL.to_string(), Pool::new());
        Self {
            index,
            channel,
            participants: Vec::new(),
            failed_participants: BTreeMap::new(),
            titles: BTreeMap::new(),
            pools,
            rounds: Vec::new(),
            progress: BTreeMap::new(),
        }
    }

    // -----------------------------------------------------------------------
    // State gate
    // -----------------------------------------------------------------------

    /// Whether the first round has been started.
    pub fn has_started(&self) -> bool {
        !self.rounds.is_empty()
    }

    fn check_not_started(&self) -> ChallengeResult<()> {
        if self.has_started() {
            return Err(ChallengeError::ChallengeStarted);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Pools
    // -----------------------------------------------------------------------

    /// Look up a pool by name.
    pub fn pool(&self, name: &str) -> ChallengeResult<&Pool> {
        self.pools
            .get(name)
            .ok_or_else(|| ChallengeError::PoolNotFound(name.to_string()))
    }

    fn pool_mut(&mut self, name: &str) -> ChallengeResult<&mut Pool> {
        self.pools
            .get_mut(name)
            .ok_or_else(|| ChallengeError::PoolNotFound(name.to_string()))
    }

    /// All pools, keyed by name.
    pub fn pools(&self) -> &BTreeMap<String, Pool> {
        &self.pools
    }

    /// Add an empty pool. Pre-start only.
    pub fn add_pool(&mut self, name: &str) -> ChallengeResult<()> {
        self.check_not_started()?;
        if self.pools.contains_key(name) {
            return Err(ChallengeError::PoolExists(name.to_string()));
        }
        self.pools.insert(name.to_string(), Pool::new());
        Ok(())
    }

    /// Remove a pool and every title registered in it. Pre-start only.
    pub fn remove_pool(&mut self, name: &str) -> ChallengeResult<()> {
        self.check_not_started()?;
        let pool = self
            .pools
            .remove(name)
            .ok_or_else(|| ChallengeError::PoolNotFound(name.to_string()))?;
        // Titles live in exactly one pool; dropping the pool orphans them,
        // so purge them from the registry as well.
        for id in pool.all() {
            self.titles.remove(id);
        }
        Ok(())
    }

    /// Rename a pool, keeping its contents. Legal at any time.
    pub fn rename_pool(&mut self, old: &str, new: &str) -> ChallengeResult<()> {
        if self.pools.contains_key(new) {
            return Err(ChallengeError::PoolExists(new.to_string()));
        }
        let pool = self
            .pools
            .remove(old)
            .ok_or_else(|| ChallengeError::PoolNotFound(old.to_string()))?;
        self.pools.insert(new.to_string(), pool);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Titles
    // -----------------------------------------------------------------------

    /// All titles, keyed by id.
    pub fn titles(&self) -> &BTreeMap<TitleId, TitleInfo> {
        &self.titles
    }

    /// Look up a title by id.
    pub fn title(&self, id: TitleId) -> Option<&TitleInfo> {
        self.titles.get(&id)
    }

    /// Find a title by its display name.
    pub fn find_title(&self, name: &str) -> Option<(TitleId, &TitleInfo)> {
        self.titles
            .iter()
            .find(|(_, info)| info.name == name)
            .map(|(id, info)| (*id, info))
    }

    /// Register a title in a pool. Pre-start only.
    ///
    /// The proposer must be an active participant and the name must be unique
    /// across the whole challenge.
    pub fn add_title(
        &mut self,
        pool: &str,
        name: &str,
        proposer: UserId,
        url: Option<String>,
    ) -> ChallengeResult<TitleId> {
        self.check_not_started()?;
        self.check_active(proposer)?;
        if self.find_title(name).is_some() {
            return Err(ChallengeError::TitleExists(name.to_string()));
        }
        // Resolve the pool before mutating anything.
        self.pool(pool)?;

        let id = TitleId::new();
        self.titles
            .insert(id, TitleInfo::new(name, proposer, url));
        self.pool_mut(pool)?.add(id);
        Ok(id)
    }

    /// Remove an unused title from the registry and every pool.
    ///
    /// Used titles are immutable history and cannot be removed.
    pub fn remove_title(&mut self, name: &str) -> ChallengeResult<()> {
        let (id, info) = self
            .find_title(name)
            .ok_or_else(|| ChallengeError::TitleNotFound(name.to_string()))?;
        if info.is_used {
            return Err(ChallengeError::TitleUsed(name.to_string()));
        }
        self.titles.remove(&id);
        for pool in self.pools.values_mut() {
            pool.remove(id);
        }
        Ok(())
    }

    /// Rename a title, preserving its identity, proposer, and usage.
    pub fn rename_title(&mut self, old: &str, new: &str) -> ChallengeResult<()> {
        if self.find_title(new).is_some() {
            return Err(ChallengeError::TitleExists(new.to_string()));
        }
        let (id, _) = self
            .find_title(old)
            .ok_or_else(|| ChallengeError::TitleNotFound(old.to_string()))?;
        if let Some(info) = self.titles.get_mut(&id) {
            info.name = new.to_string();
        }
        Ok(())
    }

    /// The pool a title currently belongs to, if any.
    fn owning_pool_mut(&mut self, id: TitleId) -> Option<&mut Pool> {
        self.pools.values_mut().find(|p| p.contains(id))
    }

    // -----------------------------------------------------------------------
    // Roster
    // -----------------------------------------------------------------------

    /// Ordered roster of the challenge.
    pub fn participants(&self) -> &[UserId] {
        &self.participants
    }

    /// Participants that failed, with the round index they failed in.
    pub fn failed_participants(&self) -> &BTreeMap<UserId, usize> {
        &self.failed_participants
    }

    /// Free-form progress note per participant.
    pub fn progress(&self) -> &BTreeMap<UserId, Option<String>> {
        &self.progress
    }

    /// Participants that have not failed, in roster order.
    pub fn active_participants(&self) -> Vec<UserId> {
        self.participants
            .iter()
            .copied()
            .filter(|p| !self.failed_participants.contains_key(p))
            .collect()
    }

    /// Check that a user is an active (non-failed) participant.
    pub fn check_active(&self, user: UserId) -> ChallengeResult<()> {
        if !self.participants.contains(&user) {
            return Err(ChallengeError::NotParticipating(user));
        }
        if self.failed_participants.contains_key(&user) {
            return Err(ChallengeError::ParticipantFailed(user));
        }
        Ok(())
    }

    /// Add a user to the roster. Pre-start only.
    pub fn add_participant(&mut self, user: UserId) -> ChallengeResult<()> {
        self.check_not_started()?;
        if self.participants.contains(&user) {
            return Err(ChallengeError::AlreadyParticipating(user));
        }
        self.participants.push(user);
        self.progress.insert(user, None);
        Ok(())
    }

    /// Remove a user from the challenge.
    ///
    /// Before the first round this deletes the participant and cascades to
    /// their proposed titles. Afterwards historical rounds must stay intact,
    /// so removal is reinterpreted as failing the user at the current round;
    /// an in-flight unfinished roll loses its score.
    pub fn remove_user(&mut self, user: UserId) -> ChallengeResult<()> {
        self.check_active(user)?;

        if !self.has_started() {
            let proposed: Vec<String> = self
                .titles
                .values()
                .filter(|t| t.proposer == user)
                .map(|t| t.name.clone())
                .collect();
            for name in proposed {
                self.remove_title(&name)?;
            }
            self.participants.retain(|p| *p != user);
            self.progress.remove(&user);
            return Ok(());
        }

        let round_idx = self.rounds.len() - 1;
        if let Some(round) = self.rounds.last_mut()
            && !round.is_finished
            && let Some(roll) = round.roll_mut(user)
        {
            roll.score = None;
        }
        self.failed_participants.insert(user, round_idx);
        Ok(())
    }

    /// Set a participant's progress note.
    pub fn set_progress(&mut self, user: UserId, value: Option<String>) -> ChallengeResult<()> {
        self.check_active(user)?;
        self.progress.insert(user, value);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Rounds
    // -----------------------------------------------------------------------

    /// All rounds in order; only the last may be unfinished.
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// The last round, finished or not.
    pub fn last_round(&self) -> Option<&Round> {
        self.rounds.last()
    }

    /// Index and mutable reference of the open round, if the last round is
    /// still unfinished. Deadline expiry is checked by callers that care.
    fn open_round_mut(&mut self) -> ChallengeResult<(usize, &mut Round)> {
        let idx = self.rounds.len().checked_sub(1).ok_or(ChallengeError::NoRound)?;
        let round = &mut self.rounds[idx];
        if round.is_finished {
            return Err(ChallengeError::RoundEnded);
        }
        Ok((idx, round))
    }

    fn open_round_checked(&mut self, now: DateTime<Utc>) -> ChallengeResult<&mut Round> {
        let (_, round) = self.open_round_mut()?;
        if round.deadline_passed(now) {
            return Err(ChallengeError::RoundEnded);
        }
        Ok(round)
    }

    /// Start a new round lasting `duration`, drawing from the named pool.
    ///
    /// Every active participant is assigned one unique random title; the
    /// draw is atomic, so a short pool starts no round at all. Progress notes
    /// are cleared for the new cycle. Returns the assignment.
    pub fn start_round(
        &mut self,
        duration: Duration,
        pool: &str,
        rng: &mut StdRng,
        now: DateTime<Utc>,
    ) -> ChallengeResult<BTreeMap<UserId, TitleId>> {
        if let Some(last) = self.rounds.last()
            && !last.is_finished
        {
            return Err(ChallengeError::RoundInProgress(self.rounds.len()));
        }

        let active = self.active_participants();
        if active.is_empty() {
            return Err(ChallengeError::NotEnoughParticipants);
        }

        self.pool(pool)?;
        let drawn = self
            .pool_mut(pool)?
            .pop_n(active.len(), rng)
            .ok_or_else(|| ChallengeError::PoolExhausted(pool.to_string()))?;

        let mut rolls = BTreeMap::new();
        let mut assignment = BTreeMap::new();
        for (user, title) in active.into_iter().zip(drawn) {
            if let Some(info) = self.titles.get_mut(&title) {
                info.is_used = true;
            }
            rolls.insert(user, Roll::new(title));
            assignment.insert(user, title);
        }
        for user in &self.participants {
            self.progress.insert(*user, None);
        }
        self.rounds.push(Round::new(rolls, now, duration));
        Ok(assignment)
    }

    /// Rate the caller's assigned title. Overwrites any previous score.
    pub fn rate(&mut self, user: UserId, score: f64, now: DateTime<Utc>) -> ChallengeResult<()> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(ChallengeError::ScoreOutOfRange {
                min: MIN_SCORE,
                max: MAX_SCORE,
            });
        }
        self.check_active(user)?;
        let round = self.open_round_checked(now)?;
        let roll = round
            .roll_mut(user)
            .ok_or(ChallengeError::NotParticipating(user))?;
        roll.score = Some(score);
        Ok(())
    }

    /// Draw a replacement title for a user from the named pool.
    ///
    /// The old title goes back to its owning pool's unused set.
    pub fn reroll(
        &mut self,
        user: UserId,
        pool: &str,
        rng: &mut StdRng,
        now: DateTime<Utc>,
    ) -> ChallengeResult<TitleId> {
        self.check_active(user)?;
        self.pool(pool)?;
        {
            let round = self.open_round_checked(now)?;
            round
                .roll(user)
                .ok_or(ChallengeError::NotParticipating(user))?;
        }

        let new_title = self
            .pool_mut(pool)?
            .pop(rng)
            .ok_or_else(|| ChallengeError::PoolExhausted(pool.to_string()))?;

        let round = self.rounds.last_mut().ok_or(ChallengeError::NoRound)?;
        let roll = round
            .roll_mut(user)
            .ok_or(ChallengeError::NotParticipating(user))?;
        let old_title = roll.title;
        roll.title = new_title;

        self.release_title(old_title);
        if let Some(info) = self.titles.get_mut(&new_title) {
            info.is_used = true;
        }
        Ok(new_title)
    }

    /// Exchange two users' assigned titles in the open round.
    ///
    /// Admin override: no deadline check, and no pool bookkeeping since the
    /// total set of assigned titles is unchanged.
    pub fn swap(&mut self, user1: UserId, user2: UserId) -> ChallengeResult<(TitleId, TitleId)> {
        if user1 == user2 {
            return Err(ChallengeError::SwapSameUser);
        }
        self.check_active(user1)?;
        self.check_active(user2)?;
        let (_, round) = self.open_round_mut()?;
        let title1 = round
            .roll(user1)
            .ok_or(ChallengeError::NotParticipating(user1))?
            .title;
        let title2 = round
            .roll(user2)
            .ok_or(ChallengeError::NotParticipating(user2))?
            .title;
        if let Some(roll) = round.roll_mut(user1) {
            roll.title = title2;
        }
        if let Some(roll) = round.roll_mut(user2) {
            roll.title = title1;
        }
        Ok((title2, title1))
    }

    /// Assign a specific title to a user in the open round.
    ///
    /// Admin override: the previous title returns to its pool, the new one is
    /// taken out of whichever pool holds it. Fails if the new title is
    /// already in use.
    pub fn set_title(&mut self, user: UserId, title_name: &str) -> ChallengeResult<TitleId> {
        self.check_active(user)?;
        let (new_title, info) = self
            .find_title(title_name)
            .ok_or_else(|| ChallengeError::TitleNotFound(title_name.to_string()))?;
        if info.is_used {
            return Err(ChallengeError::TitleUsed(title_name.to_string()));
        }
        let old_title = {
            let (_, round) = self.open_round_mut()?;
            let roll = round
                .roll_mut(user)
                .ok_or(ChallengeError::NotParticipating(user))?;
            let old = roll.title;
            roll.title = new_title;
            old
        };

        self.release_title(old_title);
        if let Some(pool) = self.owning_pool_mut(new_title) {
            pool.take(new_title);
        }
        if let Some(info) = self.titles.get_mut(&new_title) {
            info.is_used = true;
        }
        Ok(new_title)
    }

    /// Mark a title unused and return it to its owning pool.
    fn release_title(&mut self, id: TitleId) {
        if let Some(info) = self.titles.get_mut(&id) {
            info.is_used = false;
        }
        if let Some(pool) = self.owning_pool_mut(id) {
            pool.restore(id);
        }
    }

    /// Finish the open round.
    ///
    /// Every participant whose roll is unscored and who has not already
    /// failed is recorded as failed at this round. Returns the newly failed
    /// users. The round's finish time is overwritten with `now`.
    pub fn end_round(&mut self, now: DateTime<Utc>) -> ChallengeResult<Vec<UserId>> {
        let (idx, _) = self.open_round_mut()?;
        let newly_failed: Vec<UserId> = self.rounds[idx]
            .rolls
            .iter()
            .filter(|(user, roll)| {
                roll.score.is_none() && !self.failed_participants.contains_key(user)
            })
            .map(|(user, _)| *user)
            .collect();
        for user in &newly_failed {
            self.failed_participants.insert(*user, idx);
        }
        let round = &mut self.rounds[idx];
        round.finish_time = now;
        round.is_finished = true;
        Ok(newly_failed)
    }

    /// Push the open round's deadline back by `delta`.
    ///
    /// Expiry is terminal for rating purposes, so extension is only legal
    /// before the current deadline passes.
    pub fn extend_round(&mut self, delta: Duration, now: DateTime<Utc>) -> ChallengeResult<()> {
        let round = self.open_round_checked(now)?;
        round.extend(delta);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 5, 21, 30, 0).unwrap()
    }

    fn day() -> Duration {
        Duration::days(1)
    }

    /// Challenge with n participants, each proposing one title into `main`.
    fn seeded(n: u64) -> Challenge {
        let mut ch = Challenge::new(0, 123);
        for i in 0..n {
            let user = UserId(i);
            ch.add_participant(user).unwrap();
            ch.add_title(MAIN_POOL, &format!("title_{i}"), user, None)
                .unwrap();
        }
        ch
    }

    #[test]
    fn new_challenge_has_main_pool() {
        let ch = Challenge::new(0, 123);
        assert!(ch.pool(MAIN_POOL).is_ok());
        assert!(!ch.has_started());
    }

    #[test]
    fn duplicate_pool_rejected() {
        let mut ch = Challenge::new(0, 123);
        assert_eq!(
            ch.add_pool(MAIN_POOL),
            Err(ChallengeError::PoolExists(MAIN_POOL.to_string()))
        );
    }

    #[test]
    fn remove_pool_purges_its_titles() {
        let mut ch = seeded(1);
        ch.add_pool("extra").unwrap();
        ch.add_title("extra", "spare", UserId(0), None).unwrap();
        ch.remove_pool("extra").unwrap();
        assert!(ch.find_title("spare").is_none());
        assert!(ch.find_title("title_0").is_some());
    }

    #[test]
    fn rename_pool_keeps_contents() {
        let mut ch = seeded(2);
        ch.rename_pool(MAIN_POOL, "movies").unwrap();
        assert!(ch.pool(MAIN_POOL).is_err());
        assert_eq!(ch.pool("movies").unwrap().unused_len(), 2);
    }

    #[test]
    fn title_names_are_globally_unique() {
        let mut ch = seeded(1);
        ch.add_pool("extra").unwrap();
        assert_eq!(
            ch.add_title("extra", "title_0", UserId(0), None),
            Err(ChallengeError::TitleExists("title_0".to_string()))
        );
    }

    #[test]
    fn title_requires_active_proposer() {
        let mut ch = Challenge::new(0, 123);
        assert_eq!(
            ch.add_title(MAIN_POOL, "t", UserId(9), None),
            Err(ChallengeError::NotParticipating(UserId(9)))
        );
    }

    #[test]
    fn rename_title_preserves_identity() {
        let mut ch = seeded(1);
        let (id, _) = ch.find_title("title_0").unwrap();
        ch.rename_title("title_0", "Perfect Blue").unwrap();
        let (id2, info) = ch.find_title("Perfect Blue").unwrap();
        assert_eq!(id, id2);
        assert_eq!(info.proposer, UserId(0));
        assert!(ch.find_title("title_0").is_none());
    }

    #[test]
    fn add_participant_is_idempotency_checked() {
        let mut ch = seeded(1);
        assert_eq!(
            ch.add_participant(UserId(0)),
            Err(ChallengeError::AlreadyParticipating(UserId(0)))
        );
    }

    #[test]
    fn edits_frozen_after_start() {
        let mut ch = seeded(2);
        ch.start_round(day(), MAIN_POOL, &mut rng(), now()).unwrap();
        assert_eq!(ch.add_pool("late"), Err(ChallengeError::ChallengeStarted));
        assert_eq!(
            ch.add_participant(UserId(7)),
            Err(ChallengeError::ChallengeStarted)
        );
        assert_eq!(
            ch.add_title(MAIN_POOL, "late", UserId(0), None),
            Err(ChallengeError::ChallengeStarted)
        );
    }

    #[test]
    fn start_round_assigns_every_active_participant() {
        let mut ch = seeded(10);
        let assignment = ch.start_round(day(), MAIN_POOL, &mut rng(), now()).unwrap();
        assert_eq!(assignment.len(), 10);
        assert_eq!(ch.pool(MAIN_POOL).unwrap().unused_len(), 0);
        let round = ch.last_round().unwrap();
        for i in 0..10 {
            assert!(round.roll(UserId(i)).is_some());
        }
    }

    #[test]
    fn start_round_consumes_exactly_active_count() {
        let mut ch = seeded(4);
        // One extra title so the pool is not drained completely.
        ch.add_title(MAIN_POOL, "spare", UserId(0), None).unwrap();
        let before = ch.pool(MAIN_POOL).unwrap().unused_len();
        ch.start_round(day(), MAIN_POOL, &mut rng(), now()).unwrap();
        let after = ch.pool(MAIN_POOL).unwrap().unused_len();
        assert_eq!(before - after, 4);
    }

    #[test]
    fn start_round_requires_previous_round_finished() {
        let mut ch = seeded(2);
        ch.add_title(MAIN_POOL, "extra_a", UserId(0), None).unwrap();
        ch.add_title(MAIN_POOL, "extra_b", UserId(1), None).unwrap();
        ch.start_round(day(), MAIN_POOL, &mut rng(), now()).unwrap();
        assert_eq!(
            ch.start_round(day(), MAIN_POOL, &mut rng(), now()),
            Err(ChallengeError::RoundInProgress(1))
        );
    }

    #[test]
    fn start_round_fails_atomically_on_short_pool() {
        let mut ch = seeded(3);
        ch.remove_title("title_2").unwrap();
        let before = ch.pool(MAIN_POOL).unwrap().unused_len();
        assert_eq!(
            ch.start_round(day(), MAIN_POOL, &mut rng(), now()),
            Err(ChallengeError::PoolExhausted(MAIN_POOL.to_string()))
        );
        assert_eq!(ch.pool(MAIN_POOL).unwrap().unused_len(), before);
        assert!(!ch.has_started());
    }

    #[test]
    fn rate_overwrites_previous_score() {
        let mut ch = seeded(2);
        ch.start_round(day(), MAIN_POOL, &mut rng(), now()).unwrap();
        ch.rate(UserId(0), 3.0, now()).unwrap();
        ch.rate(UserId(0), 8.0, now()).unwrap();
        assert_eq!(
            ch.last_round().unwrap().roll(UserId(0)).unwrap().score,
            Some(8.0)
        );
    }

    #[test]
    fn rate_rejects_out_of_range_scores() {
        let mut ch = seeded(1);
        ch.start_round(day(), MAIN_POOL, &mut rng(), now()).unwrap();
        assert!(matches!(
            ch.rate(UserId(0), 10.5, now()),
            Err(ChallengeError::ScoreOutOfRange { .. })
        ));
        assert!(matches!(
            ch.rate(UserId(0), -1.0, now()),
            Err(ChallengeError::ScoreOutOfRange { .. })
        ));
    }

    #[test]
    fn rate_after_deadline_fails() {
        let mut ch = seeded(1);
        ch.start_round(day(), MAIN_POOL, &mut rng(), now()).unwrap();
        let late = now() + Duration::days(2);
        assert_eq!(ch.rate(UserId(0), 8.0, late), Err(ChallengeError::RoundEnded));
    }

    #[test]
    fn end_round_fails_exactly_the_unscored() {
        let mut ch = seeded(10);
        ch.start_round(day(), MAIN_POOL, &mut rng(), now()).unwrap();
        for i in 0..5 {
            ch.rate(UserId(i), 7.0, now()).unwrap();
        }
        let failed = ch.end_round(now()).unwrap();
        assert_eq!(failed.len(), 5);
        for i in 5..10 {
            assert_eq!(ch.failed_participants().get(&UserId(i)), Some(&0));
        }
        for i in 0..5 {
            assert!(!ch.failed_participants().contains_key(&UserId(i)));
        }
        assert!(ch.last_round().unwrap().is_finished);
    }

    #[test]
    fn end_round_twice_is_an_error() {
        let mut ch = seeded(1);
        ch.start_round(day(), MAIN_POOL, &mut rng(), now()).unwrap();
        ch.end_round(now()).unwrap();
        assert_eq!(ch.end_round(now()), Err(ChallengeError::RoundEnded));
    }

    #[test]
    fn already_failed_keep_their_original_round() {
        let mut ch = seeded(2);
        ch.add_title(MAIN_POOL, "extra_a", UserId(0), None).unwrap();
        ch.add_title(MAIN_POOL, "extra_b", UserId(1), None).unwrap();
        ch.start_round(day(), MAIN_POOL, &mut rng(), now()).unwrap();
        ch.end_round(now()).unwrap(); // both fail at round 0

        assert_eq!(
            ch.start_round(day(), MAIN_POOL, &mut rng(), now()),
            Err(ChallengeError::NotEnoughParticipants)
        );
        assert_eq!(ch.failed_participants().get(&UserId(0)), Some(&0));
    }

    #[test]
    fn failed_participant_cannot_rate() {
        let mut ch = seeded(2);
        ch.add_title(MAIN_POOL, "extra_a", UserId(0), None).unwrap();
        ch.start_round(day(), MAIN_POOL, &mut rng(), now()).unwrap();
        ch.rate(UserId(0), 6.0, now()).unwrap();
        ch.end_round(now()).unwrap(); // user 1 fails
        ch.start_round(day(), MAIN_POOL, &mut rng(), now()).unwrap();
        assert_eq!(
            ch.rate(UserId(1), 5.0, now()),
            Err(ChallengeError::ParticipantFailed(UserId(1)))
        );
    }

    #[test]
    fn reroll_returns_old_title_to_its_pool() {
        let mut ch = seeded(1);
        ch.add_pool("trash").unwrap();
        ch.add_title("trash", "backup", UserId(0), None).unwrap();
        ch.start_round(day(), MAIN_POOL, &mut rng(), now()).unwrap();

        let new_title = ch.reroll(UserId(0), "trash", &mut rng(), now()).unwrap();
        assert_eq!(ch.title(new_title).unwrap().name, "backup");
        // Old title is back in main's unused set and marked unused.
        assert_eq!(ch.pool(MAIN_POOL).unwrap().unused_len(), 1);
        assert_eq!(ch.pool("trash").unwrap().unused_len(), 0);
        let (old_id, old_info) = ch.find_title("title_0").unwrap();
        assert!(!old_info.is_used);
        assert!(ch.pool(MAIN_POOL).unwrap().unused().contains(&old_id));
    }

    #[test]
    fn reroll_from_empty_pool_leaves_roll_unchanged() {
        let mut ch = seeded(1);
        ch.add_pool("trash").unwrap();
        ch.start_round(day(), MAIN_POOL, &mut rng(), now()).unwrap();
        let before = ch.last_round().unwrap().roll(UserId(0)).unwrap().title;
        assert_eq!(
            ch.reroll(UserId(0), "trash", &mut rng(), now()),
            Err(ChallengeError::PoolExhausted("trash".to_string()))
        );
        assert_eq!(ch.last_round().unwrap().roll(UserId(0)).unwrap().title, before);
    }

    #[test]
    fn swap_exchanges_titles() {
        let mut ch = seeded(2);
        ch.start_round(day(), MAIN_POOL, &mut rng(), now()).unwrap();
        let before0 = ch.last_round().unwrap().roll(UserId(0)).unwrap().title;
        let before1 = ch.last_round().unwrap().roll(UserId(1)).unwrap().title;
        let (got0, got1) = ch.swap(UserId(0), UserId(1)).unwrap();
        assert_eq!(got0, before1);
        assert_eq!(got1, before0);
        assert_eq!(ch.last_round().unwrap().roll(UserId(0)).unwrap().title, before1);
    }

    #[test]
    fn swap_same_user_rejected() {
        let mut ch = seeded(2);
        ch.start_round(day(), MAIN_POOL, &mut rng(), now()).unwrap();
        assert_eq!(
            ch.swap(UserId(0), UserId(0)),
            Err(ChallengeError::SwapSameUser)
        );
    }

    #[test]
    fn set_title_swaps_pool_bookkeeping() {
        let mut ch = seeded(1);
        ch.add_title(MAIN_POOL, "handpicked", UserId(0), None).unwrap();
        ch.start_round(day(), MAIN_POOL, &mut rng(), now()).unwrap();
        let assigned = ch.last_round().unwrap().roll(UserId(0)).unwrap().title;
        let assigned_name = ch.title(assigned).unwrap().name.clone();
        let other_name = if assigned_name == "handpicked" {
            "title_0"
        } else {
            "handpicked"
        };

        ch.set_title(UserId(0), other_name).unwrap();
        let (other_id, other_info) = ch.find_title(other_name).unwrap();
        assert!(other_info.is_used);
        assert_eq!(ch.last_round().unwrap().roll(UserId(0)).unwrap().title, other_id);
        // Previous title released back to the pool.
        let old_info = ch.title(assigned).unwrap();
        assert!(!old_info.is_used);
        assert!(ch.pool(MAIN_POOL).unwrap().unused().contains(&assigned));
    }

    #[test]
    fn set_title_rejects_used_titles() {
        let mut ch = seeded(2);
        ch.start_round(day(), MAIN_POOL, &mut rng(), now()).unwrap();
        let other = ch.last_round().unwrap().roll(UserId(1)).unwrap().title;
        let other_name = ch.title(other).unwrap().name.clone();
        assert_eq!(
            ch.set_title(UserId(0), &other_name),
            Err(ChallengeError::TitleUsed(other_name))
        );
    }

    #[test]
    fn remove_used_title_fails_and_keeps_it_everywhere() {
        let mut ch = seeded(1);
        ch.start_round(day(), MAIN_POOL, &mut rng(), now()).unwrap();
        assert_eq!(
            ch.remove_title("title_0"),
            Err(ChallengeError::TitleUsed("title_0".to_string()))
        );
        let (id, _) = ch.find_title("title_0").unwrap();
        assert!(ch.pool(MAIN_POOL).unwrap().contains(id));
    }

    #[test]
    fn remove_user_before_start_cascades_titles() {
        let mut ch = seeded(2);
        ch.remove_user(UserId(0)).unwrap();
        assert!(!ch.participants().contains(&UserId(0)));
        assert!(ch.find_title("title_0").is_none());
        assert!(ch.find_title("title_1").is_some());
    }

    #[test]
    fn remove_user_after_start_fails_them_instead() {
        let mut ch = seeded(2);
        ch.start_round(day(), MAIN_POOL, &mut rng(), now()).unwrap();
        ch.rate(UserId(0), 9.0, now()).unwrap();
        ch.remove_user(UserId(0)).unwrap();
        // Still on the roster, but failed at round 0 with score cleared.
        assert!(ch.participants().contains(&UserId(0)));
        assert_eq!(ch.failed_participants().get(&UserId(0)), Some(&0));
        assert_eq!(ch.last_round().unwrap().roll(UserId(0)).unwrap().score, None);
    }

    #[test]
    fn extend_round_before_expiry_only() {
        let mut ch = seeded(1);
        ch.start_round(day(), MAIN_POOL, &mut rng(), now()).unwrap();
        ch.extend_round(Duration::days(1), now()).unwrap();
        assert_eq!(
            ch.last_round().unwrap().finish_time,
            now() + Duration::days(2)
        );
        let late = now() + Duration::days(5);
        assert_eq!(
            ch.extend_round(Duration::days(1), late),
            Err(ChallengeError::RoundEnded)
        );
    }

    #[test]
    fn set_progress_tracks_and_clears() {
        let mut ch = seeded(1);
        ch.set_progress(UserId(0), Some("3/12".to_string())).unwrap();
        assert_eq!(
            ch.progress().get(&UserId(0)),
            Some(&Some("3/12".to_string()))
        );
        ch.start_round(day(), MAIN_POOL, &mut rng(), now()).unwrap();
        assert_eq!(ch.progress().get(&UserId(0)), Some(&None));
    }
}
