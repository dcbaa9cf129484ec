pub mod agent;
pub mod config;
pub mod error;
pub mod export;
pub mod samples;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use agent::{AgentClient, AgentRequest, DEFAULT_ENDPOINT};
pub use config::Config;
pub use error::{AgentError, ExportError};
pub use samples::SAMPLE_QUERIES;
pub use session::{ChatSession, Completion, PendingQuery};
pub use state::{ChatMessage, ChatRole, MessageId, ToolStep};
