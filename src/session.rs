//! Chat UI state
//!
//! A [`ChatSession`] owns the visible conversation, the input field and the loading
//! flag. Each submission moves through `Idle -> Sending -> {Appended, Failed} -> Idle`.
//!
//! Submissions are not serialised against each other: [`ChatSession::begin_submit`] may be
//! called again before an earlier [`PendingReply`] is completed, and replies are appended in
//! the order they are completed.

use crate::chat::Message;
use crate::transport::{ChatTransport, TransportError};
use futures::StreamExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Sending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Input was blank; nothing was appended or sent.
    Skipped,
    /// The reply was appended as an AI message.
    Appended,
    /// The call failed; only the user's message remains.
    Failed,
}

/// A submission whose reply has not been resolved yet.
#[derive(Debug)]
#[must_use = "a pending reply must be passed to ChatSession::complete"]
pub struct PendingReply {
    message: String,
}

impl PendingReply {
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<Message>,
    input: String,
    loading: bool,
}

impl ChatSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(
        &mut self,
        text: impl Into<String>,
    ) {
        self.input = text.into();
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.loading { Phase::Sending } else { Phase::Idle }
    }

    /// Starts a submission from the current input.
    ///
    /// Appends the user's message, clears the input and sets the loading flag. Returns
    /// `None` without touching anything when the input is empty or whitespace-only.
    pub fn begin_submit(&mut self) -> Option<PendingReply> {
        if self.input.trim().is_empty() {
            return None;
        }

        let message = std::mem::take(&mut self.input);
        self.messages.push(Message::user(message.clone()));
        self.loading = true;

        Some(PendingReply { message })
    }

    /// Resolves a submission. The loading flag is cleared whatever the outcome.
    pub fn complete(
        &mut self,
        pending: PendingReply,
        outcome: Result<String, TransportError>,
    ) -> SubmissionOutcome {
        self.loading = false;

        match outcome {
            Ok(reply) => {
                self.messages.push(Message::ai(reply));
                SubmissionOutcome::Appended
            }
            Err(e) => {
                tracing::error!("Failed to get a reply for {:?}: {e}", pending.message);
                SubmissionOutcome::Failed
            }
        }
    }

    /// Submits the current input and waits for the whole reply.
    pub async fn submit<T: ChatTransport + ?Sized>(
        &mut self,
        transport: &T,
    ) -> SubmissionOutcome {
        let Some(pending) = self.begin_submit() else {
            return SubmissionOutcome::Skipped;
        };

        let outcome = transport.send(pending.message()).await;
        self.complete(pending, outcome)
    }

    /// Submits the current input, handing each reply fragment to `on_fragment` as it arrives.
    ///
    /// The concatenated fragments become a single AI message once the stream ends. A stream
    /// that fails part-way counts as a failed submission and nothing is appended.
    pub async fn submit_streaming<T, F>(
        &mut self,
        transport: &T,
        mut on_fragment: F,
    ) -> SubmissionOutcome
    where
        T: ChatTransport + ?Sized,
        F: FnMut(&str),
    {
        let Some(pending) = self.begin_submit() else {
            return SubmissionOutcome::Skipped;
        };

        let outcome = match transport.send_streaming(pending.message()).await {
            Ok(mut stream) => {
                let mut reply = String::new();
                let mut failure = None;
                while let Some(fragment) = stream.next().await {
                    match fragment {
                        Ok(text) => {
                            on_fragment(&text);
                            reply.push_str(&text);
                        }
                        Err(e) => {
                            failure = Some(e);
                            break;
                        }
                    }
                }
                failure.map_or(Ok(reply), Err)
            }
            Err(e) => Err(e),
        };

        self.complete(pending, outcome)
    }
}
