//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

/// Print a section heading.
pub fn heading(msg: &str) {
    println!("{}", msg.bold());
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{}", json);
    Ok(())
}
