use crate::user::UserId;

/// Alias for `Result<T, ChallengeError>`.
pub type ChallengeResult<T> = Result<T, ChallengeError>;

/// Domain errors raised by challenge rule violations.
///
/// Every variant is an expected, recoverable condition meant to be shown to
/// the user verbatim. Callers branch on the variant, never on the message
/// text. Persistence and I/O failures are a separate type (`wr-store`) and
/// must never be folded into this one.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChallengeError {
    /// No challenge is currently open in this guild.
    #[error("create a new challenge first")]
    NoCurrentChallenge,

    /// A challenge with the same name already exists.
    #[error("challenge \"{0}\" already exists")]
    ChallengeExists(String),

    /// A new challenge cannot start while another is open.
    #[error("finish \"{0}\" challenge first")]
    ChallengeInProgress(String),

    /// Roster/pool/title edits are frozen once the first round starts.
    #[error("cannot add or remove users, titles, or pools after the challenge has started")]
    ChallengeStarted,

    /// The named pool does not exist in the current challenge.
    #[error("cannot find \"{0}\" pool")]
    PoolNotFound(String),

    /// A pool with the same name already exists.
    #[error("pool \"{0}\" already exists")]
    PoolExists(String),

    /// The pool has fewer unused titles than the draw requires.
    #[error("not enough titles in \"{0}\" pool")]
    PoolExhausted(String),

    /// The named title does not exist in the current challenge.
    #[error("title \"{0}\" does not exist")]
    TitleNotFound(String),

    /// A title with the same name already exists.
    #[error("title \"{0}\" already exists")]
    TitleExists(String),

    /// The title has already been rolled and is immutable history.
    #[error("title \"{0}\" has already been used")]
    TitleUsed(String),

    /// The user is not on the roster of the current challenge.
    #[error("user {0} is not participating in this challenge")]
    NotParticipating(UserId),

    /// The user failed out of the challenge in an earlier round.
    #[error("user {0} has failed this challenge")]
    ParticipantFailed(UserId),

    /// The user is already on the roster.
    #[error("user {0} is already participating in this challenge")]
    AlreadyParticipating(UserId),

    /// No round has been created yet.
    #[error("create a new round first")]
    NoRound,

    /// A round is still open; finish it before starting another.
    #[error("finish round {0} first")]
    RoundInProgress(usize),

    /// The last round has finished or its deadline has passed.
    #[error("round has ended")]
    RoundEnded,

    /// Every remaining participant has failed.
    #[error("not enough participants to start a round")]
    NotEnoughParticipants,

    /// Scores live on a fixed scale.
    #[error("score must be between {min} and {max}")]
    ScoreOutOfRange {
        /// Lowest accepted score.
        min: f64,
        /// Highest accepted score.
        max: f64,
    },

    /// Swapping a title with itself is meaningless.
    #[error("cannot swap titles between the same user")]
    SwapSameUser,
}
