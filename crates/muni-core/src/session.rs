//! Session controller: transcript, single-flight gating, fallback.
//!
//! The session owns the conversation transcript and an explicit
//! [`SessionState`] value instead of a hidden "is responding" flag, so
//! the single-flight invariant (at most one in-flight request or active
//! reveal per session) is a testable precondition of [`Session::send`].
//!
//! The renderer and reveal engine never see transport errors: a failing
//! responder is mapped to a static fallback reply here.

use anyhow::{Result, bail};
use chrono::{DateTime, Local};

use crate::backend::{BotReply, Responder};

/// Shown when the backend cannot produce a reply. The core only ever
/// learns "no text available", never the transport-level cause.
pub const FALLBACK_REPLY: &str =
    "Lo siento, no pude comunicarme con el asistente en este momento. \
     Inténtalo de nuevo más tarde.";

/// Default transcript cap: three user/bot pairs.
pub const DEFAULT_HISTORY_LIMIT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// A request is in flight or a reply is still being revealed.
    Responding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Bot,
}

/// One transcript entry, stamped like the original chat bubbles.
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Local>,
}

#[derive(Debug)]
pub struct Session {
    responder: Responder,
    transcript: Vec<TranscriptEntry>,
    state: SessionState,
    history_limit: usize,
}

impl Session {
    pub fn new(responder: Responder, history_limit: usize) -> Self {
        Self {
            responder,
            transcript: Vec::new(),
            state: SessionState::Idle,
            history_limit,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// Sends one user message and returns the bot reply.
    ///
    /// Precondition: the session is idle. The session stays `Responding`
    /// after a successful send until the caller has finished displaying
    /// the reply and calls [`Session::complete_reply`] — the reveal
    /// animation is part of the response window.
    ///
    /// Responder failures do not propagate: the reply degrades to
    /// [`FALLBACK_REPLY`].
    pub async fn send(&mut self, message: &str) -> Result<BotReply> {
        if self.state == SessionState::Responding {
            bail!("a reply is already in flight for this session");
        }
        let message = message.trim();
        if message.is_empty() {
            bail!("empty message");
        }

        self.state = SessionState::Responding;
        self.push(Speaker::User, message.to_string());

        let reply = match self.responder.respond(message).await {
            Ok(reply) => reply,
            Err(error) => {
                tracing::warn!(%error, "responder failed, using fallback reply");
                BotReply::Text {
                    response: FALLBACK_REPLY.to_string(),
                }
            }
        };

        match &reply {
            BotReply::Text { response } => self.push(Speaker::Bot, response.clone()),
            BotReply::Suggestions {
                message,
                suggestions,
            } => {
                let logged = format!("{message} Opciones: {}", suggestions.join(", "));
                self.push(Speaker::Bot, logged);
            }
        }

        Ok(reply)
    }

    /// Marks the current reply as fully displayed, returning to idle.
    pub fn complete_reply(&mut self) {
        self.state = SessionState::Idle;
    }

    fn push(&mut self, speaker: Speaker, text: String) {
        self.transcript.push(TranscriptEntry {
            speaker,
            text,
            at: Local::now(),
        });
        if self.transcript.len() > self.history_limit {
            let excess = self.transcript.len() - self.history_limit;
            self.transcript.drain(..excess);
        }
    }
}
