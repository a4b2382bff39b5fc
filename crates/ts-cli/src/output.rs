//! User-facing terminal output. Diagnostics go through `tracing` on stderr;
//! these lines go to stdout.

use std::io::{BufRead, Write};

pub fn info(msg: impl AsRef<str>) {
    println!("  {}", msg.as_ref());
}

pub fn step(msg: impl AsRef<str>) {
    println!("✓ {}", msg.as_ref());
}

pub fn success(msg: impl AsRef<str>) {
    println!("✅ {}", msg.as_ref());
}

pub fn warning(msg: impl AsRef<str>) {
    println!("⚠️  {}", msg.as_ref());
}

/// Titled block of command output.
pub fn section(title: &str, body: &str) {
    let rule = "=".repeat(50);
    println!("\n{rule}\n{title}\n{rule}");
    println!("{}", body.trim_end());
}

/// Ask a yes/no question; anything but `y`/`yes` is no.
pub fn confirm<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    question: &str,
) -> std::io::Result<bool> {
    write!(out, "{question} [y/N]: ")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
