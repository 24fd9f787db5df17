//! Command execution against an agent session.
//!
//! The [`CommandExecutor`] turns a logical [`Command`] into one HTTP exchange
//! and validates the reply:
//!
//! 1. Transport failures (network, timeout) are returned verbatim.
//! 2. A `{value: {error, message}}` body becomes [`Error::Remote`].
//! 3. Any other non-2xx status becomes [`Error::HttpStatus`].
//! 4. Otherwise the raw body is handed back for typed decoding.
//!
//! There is no retry at this layer; see [`crate::wait`] for polling.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, trace};

use crate::error::{Error, Result};
use crate::identifiers::SessionId;
use crate::protocol::reply::remote_error;
use crate::protocol::{Command, Method, RawReply, Scope};

use super::endpoint::{Endpoint, TransportKind};
use super::http::{HttpRequest, HttpTransport};

// ============================================================================
// Constants
// ============================================================================

/// Base path the agent serves its routes under.
pub const BASE_PATH: &str = "/wd/hub";

// ============================================================================
// Session
// ============================================================================

/// One interaction context with the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Agent-assigned session id.
    id: SessionId,
    /// Base endpoint.
    endpoint: Endpoint,
}

impl Session {
    /// Creates a session record.
    #[inline]
    #[must_use]
    pub fn new(id: SessionId, endpoint: Endpoint) -> Self {
        Self { id, endpoint }
    }

    /// Returns the session id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the base endpoint.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the transport kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> TransportKind {
        self.endpoint.kind()
    }
}

/// `value` of the session handshake reply.
#[derive(Debug, Deserialize)]
struct NewSessionValue {
    #[serde(rename = "sessionId", default)]
    session_id: Option<String>,
}

/// Session handshake reply. Older agents put `sessionId` at the top level.
#[derive(Debug, Deserialize)]
struct NewSessionReply {
    #[serde(rename = "sessionId", default)]
    session_id: Option<String>,
    #[serde(default)]
    value: Option<NewSessionValue>,
}

// ============================================================================
// CommandExecutor
// ============================================================================

/// Issues commands scoped to one agent session.
///
/// # Thread Safety
///
/// `CommandExecutor` is `Send + Sync`. Concurrent use is as safe as the
/// underlying [`HttpTransport`]; the executor adds no session-level locking.
pub struct CommandExecutor {
    /// HTTP exchange layer.
    transport: Arc<dyn HttpTransport>,
    /// Session this executor is bound to.
    session: Session,
}

impl fmt::Debug for CommandExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandExecutor")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl CommandExecutor {
    /// Opens a new session with the given capabilities.
    ///
    /// Sends `POST /session {"capabilities": ...}`.
    ///
    /// # Errors
    ///
    /// Any transport, remote or decode error from the handshake, or
    /// [`Error::Decode`] if the reply carries no session id.
    pub async fn open(
        transport: Arc<dyn HttpTransport>,
        endpoint: Endpoint,
        capabilities: &Value,
    ) -> Result<Self> {
        let command = Command::post(json!({ "capabilities": capabilities }), ["session"]).at_root();
        let reply = exchange(transport.as_ref(), &endpoint, None, &command).await?;

        let parsed: NewSessionReply = serde_json::from_slice(reply.as_bytes())?;
        let session_id = parsed
            .value
            .and_then(|v| v.session_id)
            .or(parsed.session_id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::decode("session handshake reply has no sessionId"))?;

        let session = Session::new(SessionId::new(session_id), endpoint);
        info!(
            session_id = %session.id,
            endpoint = %session.endpoint,
            "Agent session opened"
        );

        Ok(Self { transport, session })
    }

    /// Binds an executor to an already existing session.
    #[must_use]
    pub fn attach(transport: Arc<dyn HttpTransport>, session: Session) -> Self {
        Self { transport, session }
    }

    /// Returns the bound session.
    #[inline]
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the session id.
    #[inline]
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session.id
    }

    /// Executes a command and returns the validated raw reply.
    pub async fn execute(&self, command: &Command) -> Result<RawReply> {
        exchange(
            self.transport.as_ref(),
            &self.session.endpoint,
            Some(&self.session.id),
            command,
        )
        .await
    }

    /// Executes a session-scoped GET.
    pub async fn get<I, S>(&self, segments: I) -> Result<RawReply>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.execute(&Command::get(segments)).await
    }

    /// Executes a session-scoped POST with a payload.
    pub async fn post<I, S>(&self, payload: Value, segments: I) -> Result<RawReply>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.execute(&Command::post(payload, segments)).await
    }

    /// Executes a session-scoped POST without a payload.
    pub async fn post_empty<I, S>(&self, segments: I) -> Result<RawReply>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.execute(&Command::post_empty(segments)).await
    }

    /// Executes a session-scoped DELETE.
    pub async fn delete<I, S>(&self, segments: I) -> Result<RawReply>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.execute(&Command::delete(segments)).await
    }
}

// ============================================================================
// Internal
// ============================================================================

/// Builds the absolute URL for a command.
fn command_url(endpoint: &Endpoint, session_id: Option<&SessionId>, command: &Command) -> String {
    let base = endpoint.dial_base();
    match (command.scope, session_id) {
        (Scope::Session, Some(id)) => format!("{base}{BASE_PATH}/session/{id}{}", command.path),
        _ => format!("{base}{BASE_PATH}{}", command.path),
    }
}

/// Performs one exchange and validates status and remote errors.
async fn exchange(
    transport: &dyn HttpTransport,
    endpoint: &Endpoint,
    session_id: Option<&SessionId>,
    command: &Command,
) -> Result<RawReply> {
    let url = command_url(endpoint, session_id, command);
    let body = match command.method {
        Method::Post => Some(command.body()),
        Method::Get | Method::Delete => None,
    };

    trace!(method = %command.method, %url, "Sending command");
    let started = Instant::now();

    let reply = transport
        .execute(HttpRequest {
            method: command.method,
            url,
            body,
        })
        .await?;

    debug!(
        command = %command,
        status = reply.status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Command completed"
    );

    if let Some(err) = remote_error(&reply.body) {
        debug!(command = %command, error = %err, "Agent reported failure");
        return Err(err);
    }

    if !reply.is_success() {
        return Err(Error::HttpStatus {
            status: reply.status,
            body: String::from_utf8_lossy(&reply.body).into_owned(),
        });
    }

    Ok(RawReply::new(reply.body))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::transport::mock::{MockReply, MockTransport};

    fn executor(mock: &Arc<MockTransport>) -> CommandExecutor {
        CommandExecutor::attach(
            mock.clone(),
            Session::new(SessionId::new("s1"), Endpoint::forwarded(40000, 6790)),
        )
    }

    #[tokio::test]
    async fn test_open_reads_session_id_from_value() {
        let mock = MockTransport::new();
        mock.on(
            Method::Post,
            "/wd/hub/session",
            MockReply::ok(r#"{"sessionId":"x","value":{"sessionId":"abc","capabilities":{}}}"#),
        );

        let executor = CommandExecutor::open(mock.clone(), Endpoint::network("10.0.0.2", 6790), &json!({}))
            .await
            .expect("open session");

        assert_eq!(executor.session_id().as_str(), "abc");
        let request = mock.last_request().expect("request sent");
        assert_eq!(request.url, "http://10.0.0.2:6790/wd/hub/session");
        assert_eq!(
            MockTransport::body_json(&request),
            json!({"capabilities": {}})
        );
    }

    #[tokio::test]
    async fn test_open_without_session_id_is_decode_error() {
        let mock = MockTransport::new();
        mock.on(Method::Post, "/wd/hub/session", MockReply::ok(r#"{"value":{}}"#));

        let err = CommandExecutor::open(mock.clone(), Endpoint::forwarded(1, 6790), &json!({}))
            .await
            .unwrap_err();
        assert!(err.is_decode_error());
    }

    #[tokio::test]
    async fn test_get_is_scoped_under_session_and_dials_forwarded_port() {
        let mock = MockTransport::new();
        mock.on(Method::Get, "/element/e1/text", MockReply::ok(r#"{"value":"hi"}"#));

        let reply = executor(&mock)
            .get(["element", "e1", "text"])
            .await
            .expect("get");

        assert_eq!(reply.value_string().expect("decode"), "hi");
        let request = mock.last_request().expect("request sent");
        assert_eq!(
            request.url,
            "http://127.0.0.1:40000/wd/hub/session/s1/element/e1/text"
        );
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn test_remote_error_is_semantic_failure() {
        let mock = MockTransport::new();
        mock.on(
            Method::Post,
            "/element/e1/click",
            MockReply::status(
                404,
                r#"{"value":{"error":"stale element reference","message":"gone"}}"#,
            ),
        );

        let err = executor(&mock)
            .post_empty(["element", "e1", "click"])
            .await
            .unwrap_err();
        assert!(err.is_remote_error());
        assert_eq!(err.to_string(), "stale element reference: gone");
    }

    #[tokio::test]
    async fn test_non_success_status_without_payload() {
        let mock = MockTransport::new();
        mock.on(Method::Get, "/source", MockReply::status(500, "boom"));

        let err = executor(&mock).get(["source"]).await.unwrap_err();
        assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_transport_failure_is_verbatim() {
        let mock = MockTransport::new();
        mock.on(Method::Get, "/source", MockReply::io_error("connection refused"));

        let err = executor(&mock).get(["source"]).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_post_empty_sends_empty_object() {
        let mock = MockTransport::new();
        mock.on(Method::Post, "/back", MockReply::ok(r#"{"value":null}"#));

        executor(&mock).post_empty(["back"]).await.expect("post");
        let request = mock.last_request().expect("request sent");
        assert_eq!(MockTransport::body_json(&request), json!({}));
    }

    #[test]
    fn test_command_url_root_scope() {
        let endpoint = Endpoint::network("host", 6790);
        let command = Command::get(["status"]).at_root();
        assert_eq!(
            command_url(&endpoint, Some(&SessionId::new("s1")), &command),
            "http://host:6790/wd/hub/status"
        );
    }
}
