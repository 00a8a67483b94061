//! Ask command handler: one question, one reply, no animation.

use anyhow::{Context, Result};
use muni_core::backend::BotReply;
use muni_core::config::Config;
use muni_core::markup::render;
use muni_core::session::Session;

pub async fn run(config: &Config, message: &str, json: bool) -> Result<()> {
    let responder = crate::cli::build_responder(config)?;
    let mut session = Session::new(responder, config.history_limit);

    let reply = session.send(message).await.context("send message")?;
    session.complete_reply();

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
        return Ok(());
    }

    match reply {
        BotReply::Text { response } => println!("{}", render(&response)),
        BotReply::Suggestions {
            message,
            suggestions,
        } => {
            println!("{}", render(&message));
            for title in suggestions {
                println!("- {title}");
            }
        }
    }
    Ok(())
}
