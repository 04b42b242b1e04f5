//! `unescape` command implementation: reverses the escape table over a file.

use anyhow::{Context, Result};
use log::info;
use std::fs;

use csvstrip_core::unescape;

use crate::cli::UnescapeCommand;

pub fn run_unescape(cmd: UnescapeCommand) -> Result<()> {
    let input = fs::read(&cmd.input).with_context(|| format!("Failed to read input file: {}", cmd.input.display()))?;
    let restored = unescape(&input);
    fs::write(&cmd.output, &restored).with_context(|| format!("Failed to write output file: {}", cmd.output.display()))?;
    info!("Restored {} bytes into {} bytes at {}", input.len(), restored.len(), cmd.output.display());
    Ok(())
}
