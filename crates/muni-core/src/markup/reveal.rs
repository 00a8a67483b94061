//! Typewriter reveal engine for bot text replies.
//!
//! [`RevealState`] is a pure state machine advancing one character or one
//! whole token per step; [`begin_reveal`] drives it from a tokio interval
//! and streams cumulative markup events to the caller. Cancellation is a
//! first-class operation backed by a [`CancellationToken`]; the chat loop
//! relies on single-flight gating instead, but the handle is there.
//!
//! Multi-character tokens (`**bold**`, headers, lettered prefixes) are
//! matched with the shared grammar anchored at the cursor and emitted
//! atomically, so a reader never sees a half-revealed `**` or a lone `#`.
//! List lines are revealed character by character; grouping them requires
//! the whole document, which is why completion always re-renders the full
//! text in one shot.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{grammar, render};

/// Default tick cadence. Tunable; not correctness-relevant.
pub const DEFAULT_TICK: Duration = Duration::from_millis(4);

/// Events emitted while a reveal is in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealEvent {
    /// Cumulative markup after one step.
    Tick { markup: String },
    /// Final markup from the one-shot render of the entire text.
    ///
    /// This replaces the accumulated markup: incremental emission never
    /// coalesces list runs, so the last word belongs to `render()`.
    Completed { markup: String },
}

/// Reveal progress for one active reply.
///
/// Exclusively owned by the reveal task for the duration of one reveal;
/// ticks execute strictly in increasing cursor order.
#[derive(Debug, Clone)]
pub struct RevealState {
    text: String,
    cursor: usize,
    accumulated: String,
}

impl RevealState {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let accumulated = String::with_capacity(text.len());
        Self {
            text,
            cursor: 0,
            accumulated,
        }
    }

    /// Byte cursor into the source text. Non-decreasing across steps.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_done(&self) -> bool {
        self.cursor >= self.text.len()
    }

    /// Markup accumulated so far.
    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    /// Advances by one character or one whole token.
    ///
    /// Returns `false` once the text is exhausted. Never fails: a suffix
    /// that looks like a token but does not match falls through to
    /// literal single-character emission.
    pub fn step(&mut self) -> bool {
        let rest = &self.text[self.cursor..];
        let Some(c) = rest.chars().next() else {
            return false;
        };

        let at_line_start =
            self.cursor == 0 || self.text.as_bytes()[self.cursor - 1] == b'\n';

        if let Some(scan) = grammar::token_at(rest, at_line_start) {
            // Atomic emission: the matched substring is rendered to its
            // final markup in one step.
            self.accumulated.push_str(&render(&rest[..scan.len]));
            self.cursor += scan.len;
        } else {
            self.accumulated.push(c);
            self.cursor += c.len_utf8();
        }
        true
    }

    /// The final markup: a full one-shot render of the source text.
    pub fn finish(&self) -> String {
        render(&self.text)
    }
}

/// Handle to an in-flight reveal task.
#[derive(Debug)]
pub struct RevealHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl RevealHandle {
    /// Stops ticking immediately. No `Completed` event is emitted; markup
    /// already revealed stays as-is on the consumer side.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the reveal task to wind down (used by tests).
    pub async fn finished(self) {
        let _ = self.task.await;
    }
}

/// Starts revealing `text`, emitting one event per tick on `events`.
///
/// Emits `Tick` with the cumulative markup after every step and a final
/// `Completed` carrying the full-text render. An empty text is a valid
/// no-op reveal that completes immediately. The task also winds down if
/// the receiving side goes away.
pub fn begin_reveal(
    text: impl Into<String>,
    tick: Duration,
    events: UnboundedSender<RevealEvent>,
) -> RevealHandle {
    let mut state = RevealState::new(text);
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick);
        loop {
            tokio::select! {
                () = token.cancelled() => return,
                _ = interval.tick() => {}
            }
            if !state.step() {
                break;
            }
            let tick_event = RevealEvent::Tick {
                markup: state.accumulated().to_string(),
            };
            if events.send(tick_event).is_err() {
                return;
            }
            if state.is_done() {
                break;
            }
        }
        let _ = events.send(RevealEvent::Completed {
            markup: state.finish(),
        });
    });

    RevealHandle { cancel, task }
}
