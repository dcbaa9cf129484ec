//! Chat session controller
//!
//! Owns the conversation log, the draft, the loading flag and the selected
//! message. Submitting is split in two halves (`begin_submit` / `complete`)
//! so the network call can run on a background task while the state stays
//! on the UI thread.

use tracing::{debug, info};

use crate::agent::{AgentClient, AgentRequest};
use crate::error::AgentError;
use crate::state::{ChatMessage, MessageId, ToolStep};

/// A query that has been recorded in the log and is waiting for the agent.
#[derive(Debug, Clone)]
pub struct PendingQuery {
    generation: u64,
    request: AgentRequest,
}

impl PendingQuery {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> &AgentRequest {
        &self.request
    }
}

/// What `complete` did with an agent outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// A message was appended to the log
    Applied(MessageId),
    /// The session was cleared while the request was in flight
    Stale,
}

#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    draft: String,
    loading: bool,
    selected: Option<MessageId>,
    generation: u64,
    next_id: u64,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True when `begin_submit` would accept the current draft
    pub fn can_submit(&self) -> bool {
        !self.loading && !self.draft.trim().is_empty()
    }

    // Selection

    pub fn selected_id(&self) -> Option<MessageId> {
        self.selected
    }

    pub fn selected_message(&self) -> Option<&ChatMessage> {
        self.selected.and_then(|id| self.find(id))
    }

    /// Tool chain of the selected message; `None` when nothing is selected
    /// or the selected message carries no chain.
    pub fn selected_tool_chain(&self) -> Option<&[ToolStep]> {
        self.selected_message()
            .and_then(|msg| msg.tool_chain.as_deref())
    }

    /// Select a message currently in the log. Returns false for unknown ids.
    pub fn select(&mut self, id: MessageId) -> bool {
        if self.find(id).is_some() {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn select_next(&mut self) {
        let next = match self.selected_index() {
            Some(i) => self.messages.get(i + 1).or_else(|| self.messages.get(i)),
            None => self.messages.first(),
        };
        self.selected = next.map(|m| m.id);
    }

    pub fn select_previous(&mut self) {
        let prev = match self.selected_index() {
            Some(i) => self.messages.get(i.saturating_sub(1)),
            None => self.messages.last(),
        };
        self.selected = prev.map(|m| m.id);
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
            .and_then(|id| self.messages.iter().position(|m| m.id == id))
    }

    /// Empty the log and the selection. An in-flight request is left to
    /// finish; its result is dropped because the generation moves on.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.selected = None;
        self.generation += 1;
        info!(generation = self.generation, "session cleared");
    }

    // Submission

    /// Record the draft as a user message and hand back the request to send.
    ///
    /// Returns `None`, touching nothing, when the draft is blank or a request
    /// is already in flight.
    pub fn begin_submit(&mut self) -> Option<PendingQuery> {
        if !self.can_submit() {
            debug!(loading = self.loading, "submit ignored");
            return None;
        }

        let text = self.draft.trim().to_string();
        let history = self.messages.clone();

        let id = self.next_message_id();
        self.messages.push(ChatMessage::user(id, text.clone()));
        self.draft.clear();
        self.loading = true;

        Some(PendingQuery {
            generation: self.generation,
            request: AgentRequest::new(text, history),
        })
    }

    /// Apply the agent's answer to a query started with `begin_submit`.
    pub fn complete(
        &mut self,
        generation: u64,
        outcome: Result<Vec<ToolStep>, AgentError>,
    ) -> Completion {
        self.loading = false;

        if generation != self.generation {
            info!(
                request_generation = generation,
                current_generation = self.generation,
                "dropping agent response for cleared session"
            );
            return Completion::Stale;
        }

        let id = self.next_message_id();
        match outcome {
            Ok(steps) => {
                let content = format!(
                    "I've prepared a tool chain with {} step(s) to answer your query.",
                    steps.len()
                );
                self.messages.push(ChatMessage::agent(id, content, Some(steps)));
                self.selected = Some(id);
            }
            Err(err) => {
                self.messages
                    .push(ChatMessage::agent(id, format!("Error: {}", err.describe()), None));
            }
        }
        Completion::Applied(id)
    }

    /// Run a whole round trip inline. Front ends that must keep redrawing
    /// while waiting use `begin_submit` and `complete` directly.
    pub async fn submit(&mut self, client: &AgentClient) -> Option<Completion> {
        let pending = self.begin_submit()?;
        let outcome = client.respond(pending.request()).await;
        Some(self.complete(pending.generation(), outcome))
    }

    fn find(&self, id: MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    fn next_message_id(&mut self) -> MessageId {
        self.next_id += 1;
        MessageId(self.next_id)
    }
}
