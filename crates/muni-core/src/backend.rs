//! Reply wire format and responder backends.
//!
//! A responder turns one user message into one [`BotReply`]. Two backends
//! exist: the local knowledge base and an HTTP chat service speaking the
//! same JSON shape (`{"message": ...}` request, tagged reply).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::kb::KbResponder;

/// A bot reply as it crosses the wire.
///
/// `response_type` selects the variant: plain text to be revealed, or a
/// short message plus clickable alternatives. Suggestions are never
/// routed through the reveal engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "response_type", rename_all = "snake_case")]
pub enum BotReply {
    Text {
        response: String,
    },
    Suggestions {
        message: String,
        suggestions: Vec<String>,
    },
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// Responder backend selection.
#[derive(Debug)]
pub enum Responder {
    Kb(KbResponder),
    Http(HttpResponder),
}

impl Responder {
    /// Produces a reply for one user message.
    ///
    /// The local knowledge base is total; only the HTTP backend can fail,
    /// and the session maps that failure to a static fallback reply.
    pub async fn respond(&self, message: &str) -> Result<BotReply> {
        match self {
            Responder::Kb(kb) => Ok(kb.respond(message)),
            Responder::Http(http) => http.respond(message).await,
        }
    }
}

/// Client for a remote chat backend.
#[derive(Debug)]
pub struct HttpResponder {
    url: String,
    http: reqwest::Client,
}

impl HttpResponder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: reqwest::Client::new(),
        }
    }

    pub async fn respond(&self, message: &str) -> Result<BotReply> {
        tracing::debug!(url = %self.url, "sending chat request");
        let reply = self
            .http
            .post(&self.url)
            .json(&ChatRequest { message })
            .send()
            .await
            .context("send chat request")?
            .error_for_status()
            .context("chat backend returned an error status")?
            .json::<BotReply>()
            .await
            .context("decode chat reply")?;
        Ok(reply)
    }
}
