//! Logical agent commands.
//!
//! A [`Command`] is one request against the agent: an HTTP method, a resource
//! path built from fixed-position segments, and an optional JSON payload for
//! mutating commands.
//!
//! Session-scoped commands are resolved under `/session/:sessionId` by the
//! executor; root commands (status, handshake) are not.
//!
//! # Example
//!
//! ```ignore
//! // GET /session/:sessionId/element/:id/text
//! let command = Command::get(["element", element_id.as_str(), "text"]);
//!
//! // POST /session/:sessionId/element/:id/value
//! let command = Command::post(
//!     json!({"text": "hello", "replace": true}),
//!     ["element", element_id.as_str(), "value"],
//! );
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde_json::{Map, Value};

// ============================================================================
// Method
// ============================================================================

/// HTTP method of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Reads state.
    Get,
    /// Mutates state.
    Post,
    /// Tears down a resource.
    Delete,
}

impl Method {
    /// Returns the method name as sent on the wire.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Scope
// ============================================================================

/// Where a command path is rooted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Directly under the agent base path (`/status`, `/session`).
    Root,
    /// Under `/session/:sessionId`.
    Session,
}

// ============================================================================
// Command
// ============================================================================

/// One logical request against the agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// HTTP method.
    pub method: Method,

    /// Path rooting.
    pub scope: Scope,

    /// Resource path, always starting with `/` (or empty).
    pub path: String,

    /// JSON payload for POST commands.
    pub payload: Option<Value>,
}

impl Command {
    /// Creates a session-scoped GET command.
    #[must_use]
    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(Method::Get, Scope::Session, join_segments(segments), None)
    }

    /// Creates a session-scoped POST command with a payload.
    #[must_use]
    pub fn post<I, S>(payload: Value, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            Method::Post,
            Scope::Session,
            join_segments(segments),
            Some(payload),
        )
    }

    /// Creates a session-scoped POST command without a payload.
    #[must_use]
    pub fn post_empty<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(Method::Post, Scope::Session, join_segments(segments), None)
    }

    /// Creates a session-scoped DELETE command.
    #[must_use]
    pub fn delete<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(Method::Delete, Scope::Session, join_segments(segments), None)
    }

    /// Re-roots the command at the agent base path.
    #[inline]
    #[must_use]
    pub fn at_root(mut self) -> Self {
        self.scope = Scope::Root;
        self
    }

    /// Serializes the payload for the request body.
    ///
    /// Commands without a payload send an empty JSON object.
    #[must_use]
    pub fn body(&self) -> Vec<u8> {
        match &self.payload {
            Some(value) => value.to_string().into_bytes(),
            None => Value::Object(Map::new()).to_string().into_bytes(),
        }
    }

    fn new(method: Method, scope: Scope, path: String, payload: Option<Value>) -> Self {
        Self {
            method,
            scope,
            path,
            payload,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            Scope::Root => write!(f, "{} {}", self.method, self.path),
            Scope::Session => write!(f, "{} /session/:sessionId{}", self.method, self.path),
        }
    }
}

/// Joins fixed-position segments into a `/`-separated path.
///
/// Leading and trailing slashes on each segment are ignored, so
/// `["/appium/element", id, "/scroll_to"]` and `["appium/element", id, "scroll_to"]`
/// produce the same path. Empty segments are skipped.
fn join_segments<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut path = String::new();
    for segment in segments {
        let segment = segment.as_ref().trim_matches('/');
        if segment.is_empty() {
            continue;
        }
        path.push('/');
        path.push_str(segment);
    }
    path
}

// ============================================================================
// Tests
// ============================================================================
