//! Tool-chain export: pretty JSON for the clipboard and timestamped files.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::ExportError;
use crate::session::ChatSession;
use crate::state::ToolStep;

/// Pretty-print a tool chain with 2-space indentation, keys in received order.
pub fn to_pretty_json(steps: &[ToolStep]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(steps)?)
}

pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("tool-chain-{}.json", at.timestamp_millis())
}

/// Write `steps` to `dir/tool-chain-<millis>.json` and return the path.
pub fn write_to_dir(steps: &[ToolStep], dir: &Path) -> Result<PathBuf, ExportError> {
    let json = to_pretty_json(steps)?;

    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(Utc::now()));
    fs::write(&path, json)?;

    info!(path = %path.display(), steps = steps.len(), "tool chain exported");
    Ok(path)
}

/// The selected message's tool chain, or why there is nothing to export.
pub fn selected_tool_chain(session: &ChatSession) -> Result<&[ToolStep], ExportError> {
    let message = session
        .selected_message()
        .ok_or(ExportError::NothingSelected)?;
    message
        .tool_chain
        .as_deref()
        .ok_or(ExportError::NoToolChain)
}

/// Text placed on the clipboard by the copy action
pub fn copy_text(session: &ChatSession) -> Result<String, ExportError> {
    to_pretty_json(selected_tool_chain(session)?)
}

/// Download action: write the selected chain into `dir`
pub fn download(session: &ChatSession, dir: &Path) -> Result<PathBuf, ExportError> {
    write_to_dir(selected_tool_chain(session)?, dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn session_with_chain(chain: Value) -> ChatSession {
        let steps: Vec<ToolStep> = serde_json::from_value(chain).unwrap();
        let mut session = ChatSession::new();
        session.set_draft("summarize high severity tickets");
        let pending = session.begin_submit().unwrap();
        session.complete(pending.generation(), Ok(steps));
        session
    }

    fn sample_chain() -> Value {
        json!([
            {
                "tool_name": "works_list",
                "arguments": [
                    { "argument_name": "ticket.severity", "argument_value": ["high"] },
                    { "argument_name": "type", "argument_value": ["ticket"] }
                ]
            },
            {
                "tool_name": "summarize_objects",
                "arguments": [
                    { "argument_name": "objects", "argument_value": "$$PREV[0]" }
                ],
                "note": null
            }
        ])
    }

    #[test]
    fn copy_text_parses_back_to_the_chain() {
        let session = session_with_chain(sample_chain());

        let text = copy_text(&session).unwrap();

        assert!(text.contains("\n  {\n    \"tool_name\""));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, sample_chain());
    }

    #[test]
    fn download_writes_timestamped_file() {
        let dir = tempfile::tempdir().unwrap();
        let session = session_with_chain(sample_chain());

        let path = download(&session, dir.path()).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("tool-chain-"));
        assert!(name.ends_with(".json"));
        let parsed: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, sample_chain());
    }

    #[test]
    fn opaque_steps_export_unchanged() {
        let chain = json!([1, "x", { "b": 2, "a": 1 }, null, [true]]);
        let dir = tempfile::tempdir().unwrap();
        let session = session_with_chain(chain.clone());

        let copied: Value = serde_json::from_str(&copy_text(&session).unwrap()).unwrap();
        let path = download(&session, dir.path()).unwrap();
        let written = fs::read_to_string(&path).unwrap();

        assert_eq!(copied, chain);
        assert_eq!(serde_json::from_str::<Value>(&written).unwrap(), chain);
        assert!(written.find("\"b\"").unwrap() < written.find("\"a\"").unwrap());
    }

    #[test]
    fn download_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("exports").join("today");
        let session = session_with_chain(json!([]));

        let path = download(&session, &nested).unwrap();

        assert!(path.starts_with(&nested));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn export_requires_a_selected_chain() {
        let mut session = ChatSession::new();
        assert!(matches!(copy_text(&session), Err(ExportError::NothingSelected)));

        session.set_draft("q");
        let pending = session.begin_submit().unwrap();
        session.complete(pending.generation(), Ok(Vec::new()));
        let user_id = session.messages()[0].id;
        session.select(user_id);

        assert!(matches!(copy_text(&session), Err(ExportError::NoToolChain)));
    }

    #[test]
    fn file_name_uses_millis() {
        let at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(export_file_name(at), "tool-chain-1700000000123.json");
    }
}
