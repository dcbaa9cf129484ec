use std::path::PathBuf;

use agent007_core::export;
use agent007_core::{
    AgentClient, AgentError, ChatRole, ChatSession, Completion, ToolStep, SAMPLE_QUERIES,
};
use arboard::Clipboard;
use ratatui::layout::Rect;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Landing,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    History,
    ToolChain,
    Input,
}

impl FocusPane {
    pub fn next(self) -> Self {
        match self {
            FocusPane::History => FocusPane::ToolChain,
            FocusPane::ToolChain => FocusPane::Input,
            FocusPane::Input => FocusPane::History,
        }
    }
}

/// Short-lived line in the footer (copy/download results)
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    ticks_left: u8,
}

/// How many ticks a status message stays visible
const STATUS_TICKS: u8 = 10;

/// Shown in the history while a query is in flight, followed by animated dots
pub const LOADING_TEXT: &str = "Analyzing query and preparing tools";

/// The request currently running against the agent
pub struct InFlightQuery {
    generation: u64,
    handle: JoinHandle<Result<Vec<ToolStep>, AgentError>>,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Conversation
    pub session: ChatSession,
    pub draft_cursor: usize, // cursor position in the draft, in chars
    pub query_task: Option<InFlightQuery>,

    // Scrolling
    pub history_scroll: u16,
    pub history_height: u16, // Height of chat area for scroll calculations
    pub history_width: u16,  // Width of chat area for wrap calculations
    pub chain_scroll: u16,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
    pub status: Option<StatusMessage>,

    // Panel areas for mouse hit-testing (updated during render)
    pub history_area: Option<Rect>,
    pub chain_area: Option<Rect>,

    pub client: AgentClient,
    pub export_dir: PathBuf,
    clipboard: Option<Clipboard>,
}

impl App {
    pub fn new(client: AgentClient, export_dir: PathBuf) -> Self {
        let clipboard = Clipboard::new().ok();
        if clipboard.is_none() {
            warn!("Failed to initialize clipboard support");
        }

        Self {
            should_quit: false,
            screen: Screen::Landing,
            input_mode: InputMode::Normal,
            focus: FocusPane::Input,

            session: ChatSession::new(),
            draft_cursor: 0,
            query_task: None,

            history_scroll: 0,
            history_height: 0,
            history_width: 0,
            chain_scroll: 0,

            animation_frame: 0,
            status: None,

            history_area: None,
            chain_area: None,

            client,
            export_dir,
            clipboard,
        }
    }

    pub fn open_chat(&mut self) {
        self.screen = Screen::Chat;
        self.focus = FocusPane::Input;
        self.input_mode = InputMode::Editing;
    }

    // Submission

    /// Send the draft to the agent on a background task.
    pub fn submit_query(&mut self) {
        let Some(pending) = self.session.begin_submit() else {
            return;
        };
        self.draft_cursor = 0;

        let client = self.client.clone();
        let request = pending.request().clone();
        info!(query = %request.query, "submitting query");
        self.query_task = Some(InFlightQuery {
            generation: pending.generation(),
            handle: tokio::spawn(async move { client.respond(&request).await }),
        });

        // Scroll to bottom so the progress line is visible
        self.scroll_history_to_bottom();
    }

    /// Hand a finished request back to the session. Called every loop iteration.
    pub async fn poll_query(&mut self) {
        let finished = self
            .query_task
            .as_ref()
            .is_some_and(|task| task.handle.is_finished());
        if !finished {
            return;
        }
        let Some(task) = self.query_task.take() else {
            return;
        };

        let outcome = match task.handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(AgentError::Transport(e.to_string())),
        };
        if let Err(e) = &outcome {
            warn!(error = %e, "query failed");
        }

        if let Completion::Applied(_) = self.session.complete(task.generation, outcome) {
            self.chain_scroll = 0;
            self.scroll_history_to_bottom();
        }
    }

    pub fn clear_chat(&mut self) {
        self.session.clear();
        self.history_scroll = 0;
        self.chain_scroll = 0;
        self.set_status("Chat cleared", false);
    }

    // Selection

    pub fn select_next_message(&mut self) {
        self.session.select_next();
        self.chain_scroll = 0;
    }

    pub fn select_previous_message(&mut self) {
        self.session.select_previous();
        self.chain_scroll = 0;
    }

    // Export

    pub fn copy_tool_chain(&mut self) {
        let result = export::copy_text(&self.session)
            .map_err(|e| e.to_string())
            .and_then(|text| match self.clipboard.as_mut() {
                Some(clipboard) => clipboard
                    .set_text(text)
                    .map_err(|e| format!("Failed to set clipboard text: {}", e)),
                None => Err("Clipboard not available".to_string()),
            });

        match result {
            Ok(()) => self.set_status("Tool chain copied to clipboard!", false),
            Err(e) => {
                warn!(error = %e, "copy failed");
                self.set_status(e, true);
            }
        }
    }

    pub fn download_tool_chain(&mut self) {
        match export::download(&self.session, &self.export_dir) {
            Ok(path) => self.set_status(format!("Saved {}", path.display()), false),
            Err(e) => {
                warn!(error = %e, "download failed");
                self.set_status(e.to_string(), true);
            }
        }
    }

    /// Put one of the sample queries into the draft
    pub fn load_sample_query(&mut self, index: usize) {
        if let Some(query) = SAMPLE_QUERIES.get(index) {
            self.session.set_draft(*query);
            self.draft_cursor = query.chars().count();
            self.open_chat();
        }
    }

    // Draft editing (cursor counts chars, not bytes)

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(self.session.draft(), self.draft_cursor);
        self.session.draft_mut().insert(byte_pos, c);
        self.draft_cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.draft_cursor > 0 {
            self.draft_cursor -= 1;
            let byte_pos = char_to_byte_index(self.session.draft(), self.draft_cursor);
            self.session.draft_mut().remove(byte_pos);
        }
    }

    pub fn delete_char(&mut self) {
        if self.draft_cursor < self.session.draft().chars().count() {
            let byte_pos = char_to_byte_index(self.session.draft(), self.draft_cursor);
            self.session.draft_mut().remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.draft_cursor = self.draft_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.session.draft().chars().count();
        self.draft_cursor = (self.draft_cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.draft_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.draft_cursor = self.session.draft().chars().count();
    }

    // Status line

    pub fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error,
            ticks_left: STATUS_TICKS,
        });
    }

    /// Tick animation frame and expire the status line (called by Tick event)
    pub fn tick(&mut self) {
        if self.session.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        if let Some(status) = &mut self.status {
            status.ticks_left = status.ticks_left.saturating_sub(1);
            if status.ticks_left == 0 {
                self.status = None;
            }
        }
    }

    // Scrolling

    pub fn scroll_history_down(&mut self, lines: u16) {
        self.history_scroll = self.history_scroll.saturating_add(lines);
    }

    pub fn scroll_history_up(&mut self, lines: u16) {
        self.history_scroll = self.history_scroll.saturating_sub(lines);
    }

    pub fn scroll_chain_down(&mut self, lines: u16) {
        self.chain_scroll = self.chain_scroll.saturating_add(lines);
    }

    pub fn scroll_chain_up(&mut self, lines: u16) {
        self.chain_scroll = self.chain_scroll.saturating_sub(lines);
    }

    /// Scroll chat to bottom so the newest entry is visible
    pub fn scroll_history_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.history_width > 0 {
            self.history_width as usize
        } else {
            50
        };

        let mut total_lines: usize = 0;

        for msg in self.session.messages() {
            // "> You: 12:34:56" label line
            let label = match msg.role {
                ChatRole::User => "You",
                ChatRole::Agent => "Agent",
            };
            total_lines += wrapped_rows(2 + label.len() + 1 + 9, wrap_width);
            for line in msg.content.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                total_lines += wrapped_rows(line.chars().count(), wrap_width);
            }
            if msg.tool_chain.is_some() {
                let marker = format!("[{} steps]", msg.step_count());
                total_lines += wrapped_rows(marker.len(), wrap_width);
            }
            total_lines += 1; // Blank line after message
        }

        if self.session.is_loading() {
            total_lines += 1; // "Agent:"
            total_lines += wrapped_rows(LOADING_TEXT.len() + 3, wrap_width);
        }

        let visible_height = if self.history_height > 0 {
            self.history_height as usize
        } else {
            20
        };

        let bottom = total_lines.saturating_sub(visible_height);
        self.history_scroll = u16::try_from(bottom).unwrap_or(u16::MAX);
    }
}

/// Rows a line of `chars` characters takes when wrapped at `width` columns
fn wrapped_rows(chars: usize, width: usize) -> usize {
    if chars == 0 {
        1
    } else {
        chars.div_ceil(width.max(1))
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
