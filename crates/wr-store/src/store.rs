//! Atomic load/save of a guild context as a versioned JSON file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use wr_core::Context;

use crate::error::{StoreError, StoreResult};

/// Schema version this build reads and writes.
pub const SCHEMA_VERSION: u32 = 1;

/// On-disk envelope around the guild state.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    schema_version: u32,
    guild: Context,
}

/// Load a guild context, failing fast on schema mismatch.
///
/// The version field is checked before the guild state is decoded, so an
/// incompatible file reports its version instead of a confusing parse error.
pub fn load(path: &Path) -> StoreResult<Context> {
    let data = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&data)?;

    let found = value
        .get("schema_version")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(0) as u32;
    if found != SCHEMA_VERSION {
        return Err(StoreError::SchemaMismatch {
            found,
            expected: SCHEMA_VERSION,
        });
    }

    let envelope: Envelope = serde_json::from_value(value)?;
    Ok(envelope.guild)
}

/// Load a guild context, starting empty if the file does not exist yet.
pub fn load_or_default(path: &Path) -> StoreResult<Context> {
    if path.exists() {
        load(path)
    } else {
        Ok(Context::new())
    }
}

/// Persist a guild context.
///
/// The JSON is written to a sibling temp file and renamed into place, so a
/// crash mid-write never leaves a half-written store behind.
pub fn save(path: &Path, guild: &Context) -> StoreResult<()> {
    let envelope = Envelope {
        schema_version: SCHEMA_VERSION,
        guild: guild.clone(),
    };
    let json = serde_json::to_string_pretty(&envelope)?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
