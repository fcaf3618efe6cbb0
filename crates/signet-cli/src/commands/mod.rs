pub mod config;
pub mod deploy;
pub mod init;
pub mod preview;

use std::io::{self, BufRead, Write};

/// Ask a yes/no question on stdout and read the answer from stdin.
/// Anything other than `y`/`yes` counts as no.
pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let answer = line.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Read one line from stdin, falling back to `default` on empty input.
pub fn prompt_line(label: &str, default: Option<&str>) -> anyhow::Result<String> {
    match default {
        Some(value) if !value.is_empty() => print!("{label} [{value}]: "),
        _ => print!("{label}: "),
    }
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let input = line.trim();
    if input.is_empty() {
        Ok(default.unwrap_or_default().to_string())
    } else {
        Ok(input.to_string())
    }
}
