use std::path::Path;

use wr_core::UserId;

pub fn rate(store: &Path, id: u64, score: f64) -> Result<(), String> {
    let mut ctx = super::load(store)?;
    ctx.rate(UserId(id), score, super::now())
        .map_err(|e| e.to_string())?;
    super::save(store, &ctx)?;
    let label = super::user_label(&ctx, UserId(id));
    println!("{label} rated their title {score}.");
    Ok(())
}

pub fn reroll(store: &Path, id: u64, pool: &str, seed: Option<u64>) -> Result<(), String> {
    let mut ctx = super::load(store)?;
    let mut rng = super::rng(seed);
    let title = ctx
        .reroll(UserId(id), pool, &mut rng, super::now())
        .map_err(|e| e.to_string())?;
    super::save(store, &ctx)?;
    let label = super::user_label(&ctx, UserId(id));
    println!("{label} rerolled '{}'.", super::title_label(&ctx, title));
    Ok(())
}

pub fn swap(store: &Path, first: u64, second: u64) -> Result<(), String> {
    let mut ctx = super::load(store)?;
    let (to_first, to_second) = ctx
        .swap(UserId(first), UserId(second))
        .map_err(|e| e.to_string())?;
    super::save(store, &ctx)?;
    println!(
        "{} now has '{}', {} now has '{}'.",
        super::user_label(&ctx, UserId(first)),
        super::title_label(&ctx, to_first),
        super::user_label(&ctx, UserId(second)),
        super::title_label(&ctx, to_second),
    );
    Ok(())
}

pub fn set_title(store: &Path, id: u64, title: &str) -> Result<(), String> {
    let mut ctx = super::load(store)?;
    ctx.set_title(UserId(id), title).map_err(|e| e.to_string())?;
    super::save(store, &ctx)?;
    let label = super::user_label(&ctx, UserId(id));
    println!("{label} now has '{title}'.");
    Ok(())
}
