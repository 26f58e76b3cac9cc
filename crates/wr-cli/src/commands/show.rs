use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use wr_core::{Context, Karma, KarmaConfig, TIME_FMT, UserId};

pub fn status(store: &Path) -> Result<(), String> {
    let ctx = super::load(store)?;
    let Some(name) = ctx.current_name() else {
        println!("No challenge is currently running.");
        return Ok(());
    };
    let challenge = ctx.current().map_err(|e| e.to_string())?;

    println!("  {}", format!("Challenge '{name}'").bold());
    println!();

    if challenge.participants().is_empty() {
        println!("  No participants yet.");
    } else {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Participant", "Status", "Progress"]);
        for user in challenge.participants() {
            let status = match challenge.failed_participants().get(user) {
                Some(round) => format!("failed (round {})", round + 1),
                None => "active".to_string(),
            };
            let progress = challenge
                .progress()
                .get(user)
                .and_then(|p| p.clone())
                .unwrap_or_default();
            table.add_row(vec![super::user_label(&ctx, *user), status, progress]);
        }
        println!("{table}");
    }
    println!();

    let mut pools = Table::new();
    pools.set_content_arrangement(ContentArrangement::Dynamic);
    pools.set_header(vec!["Pool", "Unused", "Total"]);
    for (pool_name, pool) in challenge.pools() {
        pools.add_row(vec![
            pool_name.clone(),
            pool.unused_len().to_string(),
            pool.all().len().to_string(),
        ]);
    }
    println!("{pools}");
    println!();

    match challenge.last_round() {
        None => println!("  No rounds yet."),
        Some(round) => {
            let number = challenge.rounds().len();
            let state = if round.is_finished {
                "finished".to_string()
            } else {
                format!("until {}", round.finish_time.format(TIME_FMT))
            };
            println!("  {} ({state})", format!("Round {number}").bold());

            let mut rolls = Table::new();
            rolls.set_content_arrangement(ContentArrangement::Dynamic);
            rolls.set_header(vec!["Participant", "Title", "Score"]);
            for (user, roll) in &round.rolls {
                let score = roll
                    .score
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string());
                rolls.add_row(vec![
                    super::user_label(&ctx, *user),
                    super::title_label(&ctx, roll.title),
                    score,
                ]);
            }
            println!("{rolls}");
        }
    }
    Ok(())
}

pub fn karma(store: &Path) -> Result<(), String> {
    let ctx = super::load(store)?;
    let standings = ctx.recalc_karma(&KarmaConfig::default());
    if standings.is_empty() {
        println!("No users known yet.");
        return Ok(());
    }
    print_standings(&ctx, standings.into_iter().collect());
    Ok(())
}

pub fn recalc_karma(store: &Path) -> Result<(), String> {
    let ctx = super::load(store)?;
    let standings = ctx.recalc_karma(&KarmaConfig::default());
    println!("Recalculated karma for {} users.", standings.len());
    print_standings(&ctx, standings.into_iter().collect());
    Ok(())
}

fn print_standings(ctx: &Context, mut standings: Vec<(UserId, Karma)>) {
    standings.sort_by(|(_, a), (_, b)| b.value.total_cmp(&a.value));

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "User", "Karma", "Diff"]);
    for (rank, (user, karma)) in standings.iter().enumerate() {
        let diff = if karma.diff > 0.0 {
            format!("+{}", karma.diff).green().to_string()
        } else if karma.diff < 0.0 {
            karma.diff.to_string().red().to_string()
        } else {
            "0".dimmed().to_string()
        };
        table.add_row(vec![
            (rank + 1).to_string(),
            super::user_label(ctx, *user),
            karma.value.to_string(),
            diff,
        ]);
    }
    println!("{table}");
}
