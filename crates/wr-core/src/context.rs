//! Guild context: all users and challenges, and the command-facing API.
//!
//! The context is constructed explicitly by the process entry point and
//! passed by reference; there is no ambient global. The surrounding system
//! wraps each call in its own persistence transaction: a method either
//! returns `Ok` after completing the whole mutation or returns `Err` leaving
//! the context untouched.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::challenge::Challenge;
use crate::error::{ChallengeError, ChallengeResult};
use crate::karma::{Karma, KarmaConfig, replay};
use crate::title::TitleId;
use crate::user::{UserId, UserInfo};

/// All state of one guild: users, challenges, and the current challenge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Context {
    users: BTreeMap<UserId, UserInfo>,
    challenges: BTreeMap<String, Challenge>,
    current: Option<String>,
    next_index: u64,
}

impl Context {
    /// Create an empty guild context.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// All known users.
    pub fn users(&self) -> &BTreeMap<UserId, UserInfo> {
        &self.users
    }

    /// All challenges, current and historical, keyed by name.
    pub fn challenges(&self) -> &BTreeMap<String, Challenge> {
        &self.challenges
    }

    /// Name of the current challenge, if one is open.
    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// The current challenge.
    pub fn current(&self) -> ChallengeResult<&Challenge> {
        let name = self.current.as_ref().ok_or(ChallengeError::NoCurrentChallenge)?;
        self.challenges
            .get(name)
            .ok_or(ChallengeError::NoCurrentChallenge)
    }

    fn current_mut(&mut self) -> ChallengeResult<&mut Challenge> {
        let name = self.current.as_ref().ok_or(ChallengeError::NoCurrentChallenge)?;
        self.challenges
            .get_mut(name)
            .ok_or(ChallengeError::NoCurrentChallenge)
    }

    /// Challenges ordered by creation, oldest first. Karma replay order.
    pub fn challenges_by_creation(&self) -> Vec<&Challenge> {
        let mut all: Vec<&Challenge> = self.challenges.values().collect();
        all.sort_by_key(|c| c.index);
        all
    }

    // -----------------------------------------------------------------------
    // Challenge lifecycle
    // -----------------------------------------------------------------------

    /// Open a new challenge. Fails while another is open or on a name clash.
    pub fn start_challenge(&mut self, name: &str, channel: u64) -> ChallengeResult<()> {
        if let Some(current) = &self.current {
            return Err(ChallengeError::ChallengeInProgress(current.clone()));
        }
        if self.challenges.contains_key(name) {
            return Err(ChallengeError::ChallengeExists(name.to_string()));
        }
        let challenge = Challenge::new(self.next_index, channel);
        self.next_index += 1;
        self.challenges.insert(name.to_string(), challenge);
        self.current = Some(name.to_string());
        Ok(())
    }

    /// Close the current challenge, force-finishing any open round.
    ///
    /// The challenge stays in the map forever for history and karma replay.
    /// Returns its name.
    pub fn end_challenge(&mut self, now: DateTime<Utc>) -> ChallengeResult<String> {
        let challenge = self.current_mut()?;
        if let Some(last) = challenge.last_round()
            && !last.is_finished
        {
            challenge.end_round(now)?;
        }
        let name = self.current.take().unwrap_or_default();
        Ok(name)
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    fn ensure_user(&mut self, user: UserId, name: &str) {
        self.users
            .entry(user)
            .or_insert_with(|| UserInfo::new(name));
    }

    /// Add a user to the current challenge's roster, registering them in the
    /// guild on first reference.
    pub fn add_user(&mut self, user: UserId, name: &str) -> ChallengeResult<()> {
        // Validate before touching the guild user table, so a rejected
        // command leaves no trace.
        let challenge = self.current()?;
        if challenge.has_started() {
            return Err(ChallengeError::ChallengeStarted);
        }
        if challenge.participants().contains(&user) {
            return Err(ChallengeError::AlreadyParticipating(user));
        }
        self.ensure_user(user, name);
        self.current_mut()?.add_participant(user)
    }

    /// Remove a user from the current challenge (delete pre-start, fail
    /// post-start).
    pub fn remove_user(&mut self, user: UserId) -> ChallengeResult<()> {
        self.current_mut()?.remove_user(user)
    }

    /// Rename a user, creating the record on first reference.
    pub fn set_name(&mut self, user: UserId, name: &str) {
        self.ensure_user(user, name);
        if let Some(info) = self.users.get_mut(&user) {
            info.name = name.to_string();
        }
    }

    /// Recolor a user, creating the record on first reference.
    pub fn set_color(&mut self, user: UserId, color: &str) {
        let fallback = user.to_string();
        self.ensure_user(user, &fallback);
        if let Some(info) = self.users.get_mut(&user) {
            info.color = color.to_string();
        }
    }

    // -----------------------------------------------------------------------
    // Pools and titles (delegated to the current challenge)
    // -----------------------------------------------------------------------

    /// Add a pool to the current challenge.
    pub fn add_pool(&mut self, name: &str) -> ChallengeResult<()> {
        self.current_mut()?.add_pool(name)
    }

    /// Remove a pool from the current challenge.
    pub fn remove_pool(&mut self, name: &str) -> ChallengeResult<()> {
        self.current_mut()?.remove_pool(name)
    }

    /// Rename a pool in the current challenge.
    pub fn rename_pool(&mut self, old: &str, new: &str) -> ChallengeResult<()> {
        self.current_mut()?.rename_pool(old, new)
    }

    /// Register a title in the current challenge.
    pub fn add_title(
        &mut self,
        pool: &str,
        proposer: UserId,
        name: &str,
        url: Option<String>,
    ) -> ChallengeResult<TitleId> {
        self.current_mut()?.add_title(pool, name, proposer, url)
    }

    /// Remove an unused title from the current challenge.
    pub fn remove_title(&mut self, name: &str) -> ChallengeResult<()> {
        self.current_mut()?.remove_title(name)
    }

    /// Rename a title in the current challenge.
    pub fn rename_title(&mut self, old: &str, new: &str) -> ChallengeResult<()> {
        self.current_mut()?.rename_title(old, new)
    }

    // -----------------------------------------------------------------------
    // Rounds
    // -----------------------------------------------------------------------

    /// Start a round in the current challenge; returns the assignment.
    pub fn start_round(
        &mut self,
        duration: Duration,
        pool: &str,
        rng: &mut StdRng,
        now: DateTime<Utc>,
    ) -> ChallengeResult<BTreeMap<UserId, TitleId>> {
        self.current_mut()?.start_round(duration, pool, rng, now)
    }

    /// Finish the open round; returns the newly failed users.
    pub fn end_round(&mut self, now: DateTime<Utc>) -> ChallengeResult<Vec<UserId>> {
        self.current_mut()?.end_round(now)
    }

    /// Extend the open round's deadline.
    pub fn extend_round(&mut self, delta: Duration, now: DateTime<Utc>) -> ChallengeResult<()> {
        self.current_mut()?.extend_round(delta, now)
    }

    /// Rate the caller's assigned title in the open round.
    pub fn rate(&mut self, user: UserId, score: f64, now: DateTime<Utc>) -> ChallengeResult<()> {
        self.current_mut()?.rate(user, score, now)
    }

    /// Reroll a user's title from the named pool.
    pub fn reroll(
        &mut self,
        user: UserId,
        pool: &str,
        rng: &mut StdRng,
        now: DateTime<Utc>,
    ) -> ChallengeResult<TitleId> {
        self.current_mut()?.reroll(user, pool, rng, now)
    }

    /// Swap two users' assigned titles.
    pub fn swap(&mut self, user1: UserId, user2: UserId) -> ChallengeResult<(TitleId, TitleId)> {
        self.current_mut()?.swap(user1, user2)
    }

    /// Hand a specific title to a user.
    pub fn set_title(&mut self, user: UserId, title: &str) -> ChallengeResult<TitleId> {
        self.current_mut()?.set_title(user, title)
    }

    /// Set a user's progress note in the current challenge.
    pub fn set_progress(&mut self, user: UserId, value: Option<String>) -> ChallengeResult<()> {
        self.current_mut()?.set_progress(user, value)
    }

    // -----------------------------------------------------------------------
    // Karma
    // -----------------------------------------------------------------------

    /// Compute a user's karma by replaying all finished rounds.
    pub fn calc_karma(&self, user: UserId, config: &KarmaConfig) -> Karma {
        replay(user, self.challenges_by_creation(), config)
    }

    /// Replay history for every known user.
    ///
    /// This is the authoritative repair path: since karma is derived purely
    /// from finished rounds, recalculating is idempotent.
    pub fn recalc_karma(&self, config: &KarmaConfig) -> BTreeMap<UserId, Karma> {
        self.users
            .keys()
            .map(|user| (*user, self.calc_karma(*user, config)))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Deadline poll
    // -----------------------------------------------------------------------

    /// Cooperative deadline poll: if the current round is open and its
    /// deadline has passed, finish it and return the newly failed users.
    ///
    /// Any other state (no challenge, no round, round still running) is a
    /// quiet no-op; the poller simply retries on its next tick.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Vec<UserId>> {
        let challenge = self.current_mut().ok()?;
        let last = challenge.last_round()?;
        if last.is_finished || !last.deadline_passed(now) {
            return None;
        }
        challenge.end_round(now).ok()
    }
}
