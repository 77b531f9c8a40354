//! Parse command implementation.

use std::path::Path;

use anyhow::Result;

use super::common::load_program;

/// Execute the parse command.
pub fn execute(file: &Path, json: bool) -> Result<()> {
    let program = load_program(file)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&program)?);
    } else {
        print!("{program}");
    }
    Ok(())
}
