//! UI-agnostic conversation types
//!
//! This module contains the data structures shared between the session
//! controller, the agent client, and any front end (the TUI today). None of
//! them depend on a UI framework.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

static NULL: Value = Value::Null;

/// Identifier of a message within a session. Strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Agent,
}

/// A message in the conversation log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: ChatRole,
    pub content: String,
    /// Only present on agent messages that came back with tool data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_chain: Option<Vec<ToolStep>>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            role: ChatRole::User,
            content: content.into(),
            tool_chain: None,
            timestamp: Utc::now(),
        }
    }

    pub fn agent(id: MessageId, content: impl Into<String>, tool_chain: Option<Vec<ToolStep>>) -> Self {
        Self {
            id,
            role: ChatRole::Agent,
            content: content.into(),
            tool_chain,
            timestamp: Utc::now(),
        }
    }

    /// Number of steps in the attached tool chain (0 when there is none)
    pub fn step_count(&self) -> usize {
        self.tool_chain.as_ref().map_or(0, Vec::len)
    }
}

/// One tool invocation in a tool chain.
///
/// The agent usually describes each step as a JSON object such as
///
/// ```json
/// { "tool_name": "works_list",
///   "arguments": [ { "argument_name": "ticket.severity", "argument_value": ["high"] } ] }
/// ```
///
/// but the step is kept as an opaque value: any JSON is accepted and
/// re-encodes to an equal value. The accessors read the usual shape and fall
/// back to empty results for anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolStep(Value);

impl ToolStep {
    /// The `tool_name` field, or `""` when the step has none
    pub fn tool_name(&self) -> &str {
        self.0
            .get("tool_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// `(argument_name, argument_value)` pairs, skipping entries without a name
    pub fn arguments(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0
            .get("arguments")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|arg| {
                let name = arg.get("argument_name")?.as_str()?;
                Some((name, arg.get("argument_value").unwrap_or(&NULL)))
            })
    }

    /// The step as it was received from the agent
    pub fn value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for ToolStep {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<ToolStep> for Value {
    fn from(step: ToolStep) -> Self {
        step.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_step_exposes_name_and_arguments() {
        let step = ToolStep::from(json!({
            "tool_name": "works_list",
            "arguments": [
                { "argument_name": "ticket.severity", "argument_value": ["high"] },
                { "argument_name": "owned_by" },
                { "argument_value": "orphan" }
            ]
        }));

        assert_eq!(step.tool_name(), "works_list");
        let args: Vec<_> = step.arguments().collect();
        assert_eq!(args.len(), 2);
        assert_eq!(args[0], ("ticket.severity", &json!(["high"])));
        assert_eq!(args[1], ("owned_by", &Value::Null));
    }

    #[test]
    fn tool_step_accepts_any_shape() {
        for raw in [
            json!("works_list"),
            json!(3),
            json!(null),
            json!({ "arguments": [] }),
            json!({ "tool_name": 7 }),
            json!({ "tool_name": "x", "arguments": {} }),
        ] {
            let step: ToolStep = serde_json::from_value(raw.clone()).unwrap();
            assert_eq!(step.value(), &raw);
            assert_eq!(step.arguments().count(), 0);
        }

        assert_eq!(ToolStep::from(json!({ "tool_name": 7 })).tool_name(), "");
        assert_eq!(ToolStep::from(json!({ "tool_name": "x", "arguments": {} })).tool_name(), "x");
    }

    #[test]
    fn tool_step_keeps_unknown_fields_and_order() {
        let raw = r#"{"zeta":1,"tool_name":"summarize_objects","arguments":[],"alpha":{"b":2,"a":1}}"#;
        let step: ToolStep = serde_json::from_str(raw).unwrap();

        assert_eq!(serde_json::to_string(&step).unwrap(), raw);
    }

    #[test]
    fn message_serializes_role_lowercase_and_skips_missing_chain() {
        let msg = ChatMessage::user(MessageId(3), "hello");
        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["id"], json!(3));
        assert_eq!(value["role"], json!("user"));
        assert!(value.get("tool_chain").is_none());
        assert_eq!(msg.step_count(), 0);
    }
}
