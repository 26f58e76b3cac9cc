//! CLI frontend for the watchroll challenge game.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "wr",
    about = "watchroll — run watch challenges from the terminal",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to the guild store file
    #[arg(long, global = true, default_value = "watchroll.json")]
    store: PathBuf,

    /// RNG seed for deterministic draws
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a new challenge
    StartChallenge {
        /// Challenge name (stays reserved forever)
        name: String,

        /// Channel id the challenge reports to
        #[arg(long, default_value = "0")]
        channel: u64,
    },

    /// Close the current challenge, finishing any open round
    EndChallenge,

    /// Create an empty title pool
    AddPool {
        /// Pool name
        name: String,
    },

    /// Delete a pool and every title proposed into it
    RemovePool {
        /// Pool name
        name: String,
    },

    /// Rename a pool
    RenamePool {
        /// Current name
        old: String,

        /// New name
        new: String,
    },

    /// Put a user on the roster of the current challenge
    AddUser {
        /// Numeric user id
        id: u64,

        /// Display name (used on first registration only)
        name: String,
    },

    /// Take a user off the current challenge
    RemoveUser {
        /// Numeric user id
        id: u64,
    },

    /// Change a user's display name
    SetName {
        /// Numeric user id
        id: u64,

        /// New display name
        name: String,
    },

    /// Change a user's display color
    SetColor {
        /// Numeric user id
        id: u64,

        /// Hex color, e.g. #FF00FF
        color: String,
    },

    /// Set or clear a user's progress note
    SetProgress {
        /// Numeric user id
        id: u64,

        /// Progress note (omit to clear)
        note: Option<String>,
    },

    /// Propose a title into a pool
    AddTitle {
        /// Proposing user's id
        id: u64,

        /// Title name (unique across the challenge)
        name: String,

        /// Pool to propose into
        #[arg(short, long, default_value = "main")]
        pool: String,

        /// Reference URL
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Delete an unused title
    RemoveTitle {
        /// Title name
        name: String,
    },

    /// Rename a title
    RenameTitle {
        /// Current name
        old: String,

        /// New name
        new: String,
    },

    /// Draw one title per active participant and open a round
    StartRound {
        /// Round length in days
        #[arg(short, long, default_value = "7")]
        days: i64,

        /// Pool to draw from
        #[arg(short, long, default_value = "main")]
        pool: String,
    },

    /// Finish the open round; unscored participants fail
    EndRound,

    /// Push the open round's deadline back
    ExtendRound {
        /// Days to add
        days: i64,
    },

    /// Score the caller's assigned title in the open round
    Rate {
        /// Numeric user id
        id: u64,

        /// Score from 0 to 10
        score: f64,
    },

    /// Discard a user's title and draw a fresh one
    Reroll {
        /// Numeric user id
        id: u64,

        /// Pool to draw from
        #[arg(short, long, default_value = "main")]
        pool: String,
    },

    /// Swap the assigned titles of two users
    Swap {
        /// First user's id
        first: u64,

        /// Second user's id
        second: u64,
    },

    /// Hand a specific unused title to a user
    SetTitle {
        /// Numeric user id
        id: u64,

        /// Title name
        title: String,
    },

    /// Show the current challenge, roster, and open round
    Status,

    /// Show the karma standings
    Karma,

    /// Recompute karma for every known user from round history
    RecalcKarma,

    /// Finish the open round if its deadline has passed (quiet otherwise)
    Tick,
}

fn main() {
    let cli = Cli::parse();
    let store = cli.store;
    let seed = cli.seed;

    let result = match cli.command {
        Commands::StartChallenge { name, channel } => {
            commands::challenge::start(&store, &name, channel)
        }
        Commands::EndChallenge => commands::challenge::end(&store),
        Commands::AddPool { name } => commands::pool::add(&store, &name),
        Commands::RemovePool { name } => commands::pool::remove(&store, &name),
        Commands::RenamePool { old, new } => commands::pool::rename(&store, &old, &new),
        Commands::AddUser { id, name } => commands::user::add(&store, id, &name),
        Commands::RemoveUser { id } => commands::user::remove(&store, id),
        Commands::SetName { id, name } => commands::user::set_name(&store, id, &name),
        Commands::SetColor { id, color } => commands::user::set_color(&store, id, &color),
        Commands::SetProgress { id, note } => commands::user::set_progress(&store, id, note),
        Commands::AddTitle {
            id,
            name,
            pool,
            url,
        } => commands::title::add(&store, id, &name, &pool, url),
        Commands::RemoveTitle { name } => commands::title::remove(&store, &name),
        Commands::RenameTitle { old, new } => commands::title::rename(&store, &old, &new),
        Commands::StartRound { days, pool } => commands::round::start(&store, days, &pool, seed),
        Commands::EndRound => commands::round::end(&store),
        Commands::ExtendRound { days } => commands::round::extend(&store, days),
        Commands::Rate { id, score } => commands::rating::rate(&store, id, score),
        Commands::Reroll { id, pool } => commands::rating::reroll(&store, id, &pool, seed),
        Commands::Swap { first, second } => commands::rating::swap(&store, first, second),
        Commands::SetTitle { id, title } => commands::rating::set_title(&store, id, &title),
        Commands::Status => commands::show::status(&store),
        Commands::Karma => commands::show::karma(&store),
        Commands::RecalcKarma => commands::show::recalc_karma(&store),
        Commands::Tick => commands::round::tick(&store),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
