use std::path::Path;

use wr_core::UserId;

pub fn add(
    store: &Path,
    id: u64,
    name: &str,
    pool: &str,
    url: Option<String>,
) -> Result<(), String> {
    let mut ctx = super::load(store)?;
    ctx.add_title(pool, UserId(id), name, url)
        .map_err(|e| e.to_string())?;
    super::save(store, &ctx)?;
    let label = super::user_label(&ctx, UserId(id));
    println!("{label} proposed '{name}' into pool '{pool}'.");
    Ok(())
}

pub fn remove(store: &Path, name: &str) -> Result<(), String> {
    let mut ctx = super::load(store)?;
    ctx.remove_title(name).map_err(|e| e.to_string())?;
    super::save(store, &ctx)?;
    println!("Removed title '{name}'.");
    Ok(())
}

pub fn rename(store: &Path, old: &str, new: &str) -> Result<(), String> {
    let mut ctx = super::load(store)?;
    ctx.rename_title(old, new).map_err(|e| e.to_string())?;
    super::save(store, &ctx)?;
    println!("Renamed title '{old}' to '{new}'.");
    Ok(())
}
