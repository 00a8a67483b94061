//! Render command handler.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use muni_core::markup::render;

pub fn run(file: Option<&Path>) -> Result<()> {
    let text = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .lock()
                .read_to_string(&mut buf)
                .context("read stdin")?;
            buf
        }
    };

    // The shell's trailing newline would render as a stray <br>.
    let text = text.strip_suffix('\n').unwrap_or(&text);
    println!("{}", render(text));
    Ok(())
}
