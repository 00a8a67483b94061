//! Chat command handler.
//!
//! Interactive loop on a terminal; piped stdin falls back to one-shot
//! ask mode. Text replies are typed out through the reveal engine and
//! then replaced in place with the final full-text render, mirroring how
//! a chat widget swaps its accumulated markup on completion.

use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use crossterm::terminal;
use muni_core::backend::BotReply;
use muni_core::config::Config;
use muni_core::markup::render;
use muni_core::markup::reveal::{RevealEvent, begin_reveal};
use muni_core::session::Session;
use tokio::sync::mpsc;

pub async fn run(config: &Config) -> Result<()> {
    // If stdin is piped, answer once and exit
    if !io::stdin().is_terminal() {
        let mut message = String::new();
        io::stdin()
            .lock()
            .read_to_string(&mut message)
            .context("read stdin")?;
        let message = message.trim();
        if message.is_empty() {
            anyhow::bail!("No input provided via pipe");
        }
        return super::ask::run(config, message, false).await;
    }

    let responder = crate::cli::build_responder(config)?;
    let mut session = Session::new(responder, config.history_limit);
    let tick = config.reveal_interval();

    reveal_and_print(&config.greeting, tick).await?;

    let stdin = io::stdin();
    let mut last_suggestions: Vec<String> = Vec::new();
    loop {
        print!("\ntú> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let mut message = line.trim().to_string();
        if message.is_empty() {
            continue;
        }
        if matches!(message.as_str(), "salir" | "exit" | "quit") {
            break;
        }

        // A bare number picks from the last suggestion list.
        if let Ok(n) = message.parse::<usize>() {
            if (1..=last_suggestions.len()).contains(&n) {
                message = last_suggestions[n - 1].clone();
            }
        }

        let reply = session.send(&message).await?;
        let at = session
            .transcript()
            .last()
            .map_or_else(Local::now, |entry| entry.at);
        match reply {
            BotReply::Text { response } => {
                println!("{}", reply_header(at));
                reveal_and_print(&response, tick).await?;
                last_suggestions.clear();
            }
            BotReply::Suggestions {
                message,
                suggestions,
            } => {
                println!("{}", reply_header(at));
                println!("{}", render(&message));
                for (i, title) in suggestions.iter().enumerate() {
                    println!("  {}. {title}", i + 1);
                }
                println!("(escribe el número o el título exacto)");
                last_suggestions = suggestions;
            }
        }
        session.complete_reply();
    }

    Ok(())
}

/// Types `text` out one event at a time, then swaps in the final render.
async fn reveal_and_print(text: &str, tick: Duration) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = begin_reveal(text, tick, tx);

    let mut stdout = io::stdout();
    let mut printed = String::new();
    while let Some(event) = rx.recv().await {
        match event {
            RevealEvent::Tick { markup } => {
                // Cumulative markup only ever grows, so the delta is a
                // plain suffix.
                write!(stdout, "{}", &markup[printed.len()..])?;
                stdout.flush()?;
                printed = markup;
            }
            RevealEvent::Completed { markup } => {
                // The final render coalesces list runs, so replace the
                // whole revealed block rather than appending. Long lines
                // wrap onto extra rows, so the erase distance counts
                // terminal rows, not newlines.
                let width = terminal::size().map_or(80, |(w, _)| usize::from(w));
                let rows = printed_rows(&printed, width);
                if rows > 1 {
                    write!(stdout, "\x1b[{}A", rows - 1)?;
                }
                write!(stdout, "\r\x1b[J{markup}")?;
                writeln!(stdout)?;
                stdout.flush()?;
                break;
            }
        }
    }
    handle.finished().await;
    Ok(())
}

/// Timestamp line shown above each bot reply, HH:MM like a chat bubble.
fn reply_header(at: DateTime<Local>) -> String {
    format!("bot {}>", at.format("%H:%M"))
}

/// Terminal rows occupied by `printed` on a terminal `width` columns
/// wide. Every line takes at least one row; longer lines wrap.
fn printed_rows(printed: &str, width: usize) -> usize {
    printed
        .split('\n')
        .map(|line| {
            let cols = line.chars().count();
            if width == 0 {
                1
            } else {
                cols.saturating_sub(1) / width + 1
            }
        })
        .sum::<usize>()
        .max(1)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn reply_header_is_stamped_with_hour_and_minute() {
        let at = Local.with_ymd_and_hms(2026, 8, 25, 9, 5, 0).unwrap();
        assert_eq!(reply_header(at), "bot 09:05>");
    }

    #[test]
    fn printed_rows_counts_wrapped_lines() {
        assert_eq!(printed_rows("", 80), 1);
        assert_eq!(printed_rows("corto", 80), 1);
        assert_eq!(printed_rows("ab\ncd", 80), 2);
        // 25 chars on a 10-column terminal occupy three rows.
        assert_eq!(printed_rows(&"x".repeat(25), 10), 3);
        // An exact multiple does not spill onto an extra row.
        assert_eq!(printed_rows(&"x".repeat(20), 10), 2);
        // A trailing newline leaves the cursor on an empty row.
        assert_eq!(printed_rows("ab\n", 80), 2);
    }
}
