//! In-memory transport for tests.
//!
//! Routes match on method and URL suffix. A route holding several replies
//! hands them out in order and then keeps repeating the last one, which is
//! how polling tests script "fails twice, then succeeds".

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::protocol::Method;

use super::http::{HttpReply, HttpRequest, HttpTransport};

/// One scripted reply.
#[derive(Debug, Clone)]
pub(crate) enum MockReply {
    Reply(HttpReply),
    Io(String),
}

impl MockReply {
    pub(crate) fn ok(body: &str) -> Self {
        Self::status(200, body)
    }

    pub(crate) fn status(status: u16, body: &str) -> Self {
        Self::Reply(HttpReply {
            status,
            body: body.as_bytes().to_vec(),
        })
    }

    pub(crate) fn io_error(message: &str) -> Self {
        Self::Io(message.to_string())
    }

    fn into_result(self) -> Result<HttpReply> {
        match self {
            Self::Reply(reply) => Ok(reply),
            Self::Io(message) => Err(Error::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                message,
            ))),
        }
    }
}

struct Route {
    method: Method,
    suffix: String,
    replies: VecDeque<MockReply>,
}

/// Records every request and answers from scripted routes.
#[derive(Default)]
pub(crate) struct MockTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a route answering with one reply forever.
    pub(crate) fn on(&self, method: Method, suffix: &str, reply: MockReply) {
        self.on_sequence(method, suffix, vec![reply]);
    }

    /// Registers a route answering with `replies` in order.
    pub(crate) fn on_sequence(&self, method: Method, suffix: &str, replies: Vec<MockReply>) {
        self.routes.lock().push(Route {
            method,
            suffix: suffix.to_string(),
            replies: replies.into(),
        });
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub(crate) fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().last().cloned()
    }

    /// Requests whose URL ends with `suffix`.
    pub(crate) fn requests_to(&self, suffix: &str) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.url.ends_with(suffix))
            .cloned()
            .collect()
    }

    pub(crate) fn body_json(request: &HttpRequest) -> Value {
        request
            .body
            .as_deref()
            .map(|b| serde_json::from_slice(b).expect("request body is JSON"))
            .unwrap_or(Value::Null)
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpReply> {
        let reply = {
            let mut routes = self.routes.lock();
            routes
                .iter_mut()
                .find(|route| route.method == request.method && request.url.ends_with(&route.suffix))
                .and_then(|route| {
                    if route.replies.len() > 1 {
                        route.replies.pop_front()
                    } else {
                        route.replies.front().cloned()
                    }
                })
        };

        let url = request.url.clone();
        self.requests.lock().push(request);

        match reply {
            Some(reply) => reply.into_result(),
            None => Ok(HttpReply {
                status: 404,
                body: format!(
                    r#"{{"value":{{"error":"unknown command","message":"no route for {url}"}}}}"#
                )
                .into_bytes(),
            }),
        }
    }
}
