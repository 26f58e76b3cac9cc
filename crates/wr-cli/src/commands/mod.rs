pub mod challenge;
pub mod pool;
pub mod rating;
pub mod round;
pub mod show;
pub mod title;
pub mod user;

use std::path::Path;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use wr_core::{Context, TitleId, UserId};

/// Load the guild store, starting empty if the file does not exist yet.
fn load(path: &Path) -> Result<Context, String> {
    wr_store::load_or_default(path).map_err(|e| e.to_string())
}

/// Persist the guild store. Only called after a mutation succeeded, so a
/// rejected command leaves the file untouched.
fn save(path: &Path, ctx: &Context) -> Result<(), String> {
    wr_store::save(path, ctx).map_err(|e| e.to_string())
}

fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Seeded RNG when requested, OS entropy otherwise.
fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Display name for a user, falling back to the raw id.
fn user_label(ctx: &Context, user: UserId) -> String {
    ctx.users()
        .get(&user)
        .map(|info| info.name.clone())
        .unwrap_or_else(|| user.to_string())
}

/// Display name for a title in the current challenge.
fn title_label(ctx: &Context, id: TitleId) -> String {
    ctx.current()
        .ok()
        .and_then(|challenge| challenge.title(id))
        .map(|info| info.name.clone())
        .unwrap_or_else(|| id.to_string())
}
