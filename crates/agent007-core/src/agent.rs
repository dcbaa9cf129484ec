use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::AgentError;
use crate::state::{ChatMessage, ToolStep};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/respond";

/// Bumped whenever the request body changes shape.
pub const REQUEST_SCHEMA_VERSION: u32 = 1;

/// Body sent to the agent endpoint.
///
/// The shape is the same for the first turn and every later one: `query` is
/// always the latest user text and `history` the log that preceded it.
#[derive(Debug, Clone, Serialize)]
pub struct AgentRequest {
    pub version: u32,
    pub query: String,
    pub history: Vec<ChatMessage>,
}

impl AgentRequest {
    pub fn new(query: impl Into<String>, history: Vec<ChatMessage>) -> Self {
        Self {
            version: REQUEST_SCHEMA_VERSION,
            query: query.into(),
            history,
        }
    }
}

#[derive(Clone)]
pub struct AgentClient {
    client: Client,
    endpoint: String,
}

impl AgentClient {
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, AgentError> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one query and decode the returned tool chain.
    pub async fn respond(&self, request: &AgentRequest) -> Result<Vec<ToolStep>, AgentError> {
        debug!(
            endpoint = %self.endpoint,
            history = request.history.len(),
            "sending query to agent"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "agent request failed");
            return Err(AgentError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let steps = decode_reply(&body)?;
        info!(steps = steps.len(), "agent replied with tool chain");
        Ok(steps)
    }
}

/// Decode a `{ "reply": [...] }` body. A missing or null `reply` is an empty chain;
/// each element becomes a step whatever its shape.
pub fn decode_reply(body: &str) -> Result<Vec<ToolStep>, AgentError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| AgentError::Malformed(e.to_string()))?;

    let Value::Object(mut object) = value else {
        return Err(AgentError::Malformed("response body is not a JSON object".to_string()));
    };

    let reply = match object.remove("reply") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(reply)) => reply,
        Some(_) => return Err(AgentError::Malformed("`reply` is not an array".to_string())),
    };

    Ok(reply.into_iter().map(ToolStep::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MessageId;
    use axum::http::{header, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/respond", addr)
    }

    async fn serve_raw(status: StatusCode, body: &'static str) -> String {
        let router = Router::new().route(
            "/respond",
            post(move || async move { (status, [(header::CONTENT_TYPE, "application/json")], body) }),
        );
        serve(router).await
    }

    fn request(query: &str) -> AgentRequest {
        AgentRequest::new(query, Vec::new())
    }

    #[tokio::test]
    async fn returns_steps_from_reply() {
        let url = serve_raw(
            StatusCode::OK,
            r#"{"reply":[{"tool_name":"a"},{"tool_name":"b"},{"tool_name":"c","arguments":[]}]}"#,
        )
        .await;
        let client = AgentClient::new(&url, None).unwrap();

        let steps = client.respond(&request("q")).await.unwrap();
        let names: Vec<_> = steps.iter().map(ToolStep::tool_name).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn missing_reply_is_empty_chain() {
        let url = serve_raw(StatusCode::OK, r#"{"message":"ok"}"#).await;
        let client = AgentClient::new(&url, None).unwrap();

        assert!(client.respond(&request("q")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let url = serve_raw(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"boom"}"#).await;
        let client = AgentClient::new(&url, None).unwrap();

        let err = client.respond(&request("q")).await.unwrap_err();
        assert!(matches!(err, AgentError::Status(500)));
    }

    #[tokio::test]
    async fn invalid_json_is_malformed() {
        let url = serve_raw(StatusCode::OK, "<html>not json</html>").await;
        let client = AgentClient::new(&url, None).unwrap();

        let err = client.respond(&request("q")).await.unwrap_err();
        assert!(matches!(err, AgentError::Malformed(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = AgentClient::new(&format!("http://{}/respond", addr), None).unwrap();
        let err = client.respond(&request("q")).await.unwrap_err();
        assert!(matches!(err, AgentError::Transport(_)));
        assert!(!err.describe().is_empty());
    }

    #[tokio::test]
    async fn request_body_has_stable_shape() {
        let seen: Arc<Mutex<Vec<Value>>> = Arc::default();
        let sink = seen.clone();
        let router = Router::new().route(
            "/respond",
            post(move |Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    sink.lock().unwrap().push(body);
                    Json(json!({ "reply": [] }))
                }
            }),
        );
        let url = serve(router).await;
        let client = AgentClient::new(&url, None).unwrap();

        client.respond(&request("first")).await.unwrap();
        let history = vec![ChatMessage::user(MessageId(1), "first")];
        client
            .respond(&AgentRequest::new("second", history))
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0]["version"], json!(1));
        assert_eq!(seen[0]["query"], json!("first"));
        assert_eq!(seen[0]["history"], json!([]));
        assert_eq!(seen[1]["query"], json!("second"));
        assert_eq!(seen[1]["history"][0]["content"], json!("first"));
        assert_eq!(seen[1]["history"][0]["role"], json!("user"));
    }

    #[tokio::test]
    async fn session_submit_runs_a_full_round_trip() {
        use crate::session::{ChatSession, Completion};

        let url = serve_raw(
            StatusCode::OK,
            r#"{"reply":[{"tool_name":"who_am_i","arguments":[]}]}"#,
        )
        .await;
        let client = AgentClient::new(&url, None).unwrap();
        let mut session = ChatSession::new();
        session.set_draft("who am I?");

        let done = session.submit(&client).await;

        let agent_id = session.messages()[1].id;
        assert_eq!(done, Some(Completion::Applied(agent_id)));
        assert_eq!(session.selected_tool_chain().map(|c| c[0].tool_name()), Some("who_am_i"));
        assert!(!session.is_loading());
        assert_eq!(session.submit(&client).await, None);
    }

    #[test]
    fn decode_keeps_steps_of_any_shape() {
        let steps = decode_reply(r#"{"reply":[1,2,3]}"#).unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].value(), &json!(1));

        let steps =
            decode_reply(r#"{"reply":[{"name":"a"},{"tool":"b"},{"step":3}]}"#).unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[1].tool_name(), "");
    }

    #[test]
    fn decode_rejects_bad_envelopes() {
        assert!(matches!(
            decode_reply(r#"{"reply":{"tool_name":"x"}}"#),
            Err(AgentError::Malformed(_))
        ));
        assert!(matches!(decode_reply("[]"), Err(AgentError::Malformed(_))));
        assert!(matches!(decode_reply("not json"), Err(AgentError::Malformed(_))));
        assert!(decode_reply(r#"{"reply":null}"#).unwrap().is_empty());
    }
}
