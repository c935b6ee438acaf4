//! Interactive prompts
//!
//! Confirmation and answer prompts read from stdin. Non-interactive
//! stdin never confirms anything.

use anyhow::Result;
use std::io::{self, BufRead, IsTerminal, Write};

/// Prompt for confirmation
///
/// Returns true if user confirms, false otherwise.
/// In non-interactive mode (no TTY), returns false.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !io::stdin().is_terminal() {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(is_yes(&input))
}

/// Read one line of input, showing `prompt` only on a terminal
///
/// Returns `None` at end of input.
pub fn read_line(prompt: &str) -> Result<Option<String>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        print!("{}", prompt);
        io::stdout().flush()?;
    }

    let mut input = String::new();
    if stdin.lock().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim_end_matches(['\r', '\n']).to_string()))
}

fn is_yes(input: &str) -> bool {
    let input = input.trim().to_lowercase();
    input == "y" || input == "yes"
}
