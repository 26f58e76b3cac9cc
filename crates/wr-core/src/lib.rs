//! Core state machine for the watchroll challenge game.
//!
//! A guild runs *challenges*: participants propose titles into shared pools,
//! each round every active participant is randomly assigned someone else's
//! title to watch and rate, and missing the rating deadline fails you out.
//! Karma is replayed from finished-round history on demand.
//!
//! This crate is pure and synchronous: no I/O, no wall clock (callers pass
//! `now`), no ambient randomness (callers pass an RNG). Persistence lives in
//! `wr-store`, command dispatch in `wr-cli`.

/// Challenge aggregate and the round state machine.
pub mod challenge;
/// Guild context: all users and challenges, command-facing API.
pub mod context;
/// Domain error type shared by every operation.
pub mod error;
/// Karma scoring via pure history replay.
pub mod karma;
/// Title pools with "all" vs "unused" membership.
pub mod pool;
/// Rounds, rolls, and the legacy timestamp format.
pub mod round;
/// Titles and their stable identifiers.
pub mod title;
/// Guild users and display attributes.
pub mod user;

/// Re-export the challenge aggregate.
pub use challenge::{Challenge, MAIN_POOL};
/// Re-export the guild context.
pub use context::Context;
/// Re-export error types.
pub use error::{ChallengeError, ChallengeResult};
/// Re-export karma types.
pub use karma::{Karma, KarmaConfig};
/// Re-export the pool type.
pub use pool::Pool;
/// Re-export round types.
pub use round::{Roll, Round, TIME_FMT};
/// Re-export title types.
pub use title::{TitleId, TitleInfo};
/// Re-export user types.
pub use user::{UserId, UserInfo};
