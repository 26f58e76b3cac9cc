use std::path::Path;

use wr_core::UserId;

pub fn add(store: &Path, id: u64, name: &str) -> Result<(), String> {
    let mut ctx = super::load(store)?;
    ctx.add_user(UserId(id), name).map_err(|e| e.to_string())?;
    super::save(store, &ctx)?;
    let label = super::user_label(&ctx, UserId(id));
    println!("Added {label} to the challenge.");
    Ok(())
}

pub fn remove(store: &Path, id: u64) -> Result<(), String> {
    let mut ctx = super::load(store)?;
    let label = super::user_label(&ctx, UserId(id));
    ctx.remove_user(UserId(id)).map_err(|e| e.to_string())?;
    super::save(store, &ctx)?;
    println!("Removed {label} from the challenge.");
    Ok(())
}

pub fn set_name(store: &Path, id: u64, name: &str) -> Result<(), String> {
    let mut ctx = super::load(store)?;
    ctx.set_name(UserId(id), name);
    super::save(store, &ctx)?;
    println!("User {id} is now known as {name}.");
    Ok(())
}

pub fn set_color(store: &Path, id: u64, color: &str) -> Result<(), String> {
    let mut ctx = super::load(store)?;
    ctx.set_color(UserId(id), color);
    super::save(store, &ctx)?;
    let label = super::user_label(&ctx, UserId(id));
    println!("Set {label}'s color to {color}.");
    Ok(())
}

pub fn set_progress(store: &Path, id: u64, note: Option<String>) -> Result<(), String> {
    let mut ctx = super::load(store)?;
    let cleared = note.is_none();
    ctx.set_progress(UserId(id), note).map_err(|e| e.to_string())?;
    super::save(store, &ctx)?;
    let label = super::user_label(&ctx, UserId(id));
    if cleared {
        println!("Cleared {label}'s progress.");
    } else {
        println!("Updated {label}'s progress.");
    }
    Ok(())
}
