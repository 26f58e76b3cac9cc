use std::path::Path;

pub fn start(store: &Path, name: &str, channel: u64) -> Result<(), String> {
    let mut ctx = super::load(store)?;
    ctx.start_challenge(name, channel).map_err(|e| e.to_string())?;
    super::save(store, &ctx)?;
    println!("Started challenge '{name}'.");
    Ok(())
}

pub fn end(store: &Path) -> Result<(), String> {
    let mut ctx = super::load(store)?;
    let name = ctx.end_challenge(super::now()).map_err(|e| e.to_string())?;
    super::save(store, &ctx)?;
    println!("Ended challenge '{name}'.");
    Ok(())
}
