use std::path::Path;

pub fn add(store: &Path, name: &str) -> Result<(), String> {
    let mut ctx = super::load(store)?;
    ctx.add_pool(name).map_err(|e| e.to_string())?;
    super::save(store, &ctx)?;
    println!("Added pool '{name}'.");
    Ok(())
}

pub fn remove(store: &Path, name: &str) -> Result<(), String> {
    let mut ctx = super::load(store)?;
    ctx.remove_pool(name).map_err(|e| e.to_string())?;
    super::save(store, &ctx)?;
    println!("Removed pool '{name}' and its titles.");
    Ok(())
}

pub fn rename(store: &Path, old: &str, new: &str) -> Result<(), String> {
    let mut ctx = super::load(store)?;
    ctx.rename_pool(old, new).map_err(|e| e.to_string())?;
    super::save(store, &ctx)?;
    println!("Renamed pool '{old}' to '{new}'.");
    Ok(())
}
