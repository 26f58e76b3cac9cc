use std::path::Path;

use chrono::Duration;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use wr_core::TIME_FMT;

pub fn start(store: &Path, days: i64, pool: &str, seed: Option<u64>) -> Result<(), String> {
    if days < 1 {
        return Err("round length must be at least one day".into());
    }

    let mut ctx = super::load(store)?;
    let mut rng = super::rng(seed);
    let assignment = ctx
        .start_round(Duration::days(days), pool, &mut rng, super::now())
        .map_err(|e| e.to_string())?;
    super::save(store, &ctx)?;

    let challenge = ctx.current().map_err(|e| e.to_string())?;
    let number = challenge.rounds().len();
    println!("  {}", format!("Round {number} started").bold());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Participant", "Title"]);
    for (user, title) in &assignment {
        table.add_row(vec![
            super::user_label(&ctx, *user),
            super::title_label(&ctx, *title),
        ]);
    }
    println!("{table}");

    if let Some(round) = challenge.last_round() {
        println!();
        println!("  Deadline: {}", round.finish_time.format(TIME_FMT));
    }
    Ok(())
}

pub fn end(store: &Path) -> Result<(), String> {
    let mut ctx = super::load(store)?;
    let failed = ctx.end_round(super::now()).map_err(|e| e.to_string())?;
    super::save(store, &ctx)?;

    let number = ctx.current().map_err(|e| e.to_string())?.rounds().len();
    println!("Round {number} has ended.");
    for user in failed {
        let label = super::user_label(&ctx, user);
        println!("  {} {label}", "FAILED".red().bold());
    }
    Ok(())
}

pub fn extend(store: &Path, days: i64) -> Result<(), String> {
    if days < 1 {
        return Err("extension must be at least one day".into());
    }

    let mut ctx = super::load(store)?;
    ctx.extend_round(Duration::days(days), super::now())
        .map_err(|e| e.to_string())?;
    super::save(store, &ctx)?;

    let challenge = ctx.current().map_err(|e| e.to_string())?;
    if let Some(round) = challenge.last_round() {
        println!("Extended the round until {}.", round.finish_time.format(TIME_FMT));
    }
    Ok(())
}

/// Deadline poll: finishes an expired round, otherwise does nothing.
/// Meant to be run from cron or a scheduler loop.
pub fn tick(store: &Path) -> Result<(), String> {
    let mut ctx = super::load(store)?;
    let Some(failed) = ctx.tick(super::now()) else {
        return Ok(());
    };
    super::save(store, &ctx)?;

    let number = ctx.current().map_err(|e| e.to_string())?.rounds().len();
    println!("Round {number} deadline has passed.");
    for user in failed {
        let label = super::user_label(&ctx, user);
        println!("  {} {label}", "FAILED".red().bold());
    }
    Ok(())
}
