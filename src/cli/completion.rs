//! Shell completion generation for auth0-export
//!
//! Writes a completion script for bash, zsh, fish, PowerShell or elvish to
//! stdout.

use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io::{self, Write};

use crate::cli::CliArgs;
use crate::error::Result;

/// Generate shell completion script
///
/// # Arguments
/// * `shell` - Shell type
///
/// # Returns
/// * `Result<()>` - Success or error
pub fn generate_completion(shell: Shell) -> Result<()> {
    let mut stdout = io::stdout();
    write_completion(shell, &mut stdout);
    stdout.flush()?;
    Ok(())
}

fn write_completion<W: Write>(shell: Shell, out: &mut W) {
    let mut cmd = CliArgs::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
}
