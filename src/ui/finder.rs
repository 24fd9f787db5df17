//! Find and gesture commands shared by the driver and element handles.
//!
//! Root-scoped and element-scoped variants differ only in the optional
//! element id that ends up in the payload (`context`, `elementId` or
//! `origin`).

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::PointF;
use crate::identifiers::ElementId;
use crate::protocol::{LEGACY_ELEMENT_KEY, W3C_ELEMENT_KEY};
use crate::transport::CommandExecutor;

use super::element::Element;
use super::selector::By;

/// Remote error code for a failed lookup.
const NO_SUCH_ELEMENT: &str = "no such element";

// ============================================================================
// Find
// ============================================================================

fn find_payload(by: &By, context: Option<&ElementId>) -> Value {
    let mut payload = json!({
        "strategy": by.strategy(),
        "selector": by.value(),
    });
    if let Some(context) = context {
        payload["context"] = Value::String(context.as_str().to_string());
    }
    payload
}

fn is_no_such_element(err: &Error) -> bool {
    matches!(err, Error::Remote { error, .. } if error == NO_SUCH_ELEMENT)
}

/// Finds the first element matching `by`, optionally under `context`.
///
/// Zero matches is [`Error::ElementNotFound`].
pub(crate) async fn find_element(
    executor: &Arc<CommandExecutor>,
    by: &By,
    context: Option<&ElementId>,
) -> Result<Element> {
    debug!(strategy = by.strategy(), selector = by.value(), ?context, "Finding element");

    let reply = executor
        .post(find_payload(by, context), ["element"])
        .await
        .map_err(|e| {
            if is_no_such_element(&e) {
                Error::element_not_found(by.strategy(), by.value())
            } else {
                e
            }
        })?;

    let id = reply
        .value_element()?
        .ok_or_else(|| Error::element_not_found(by.strategy(), by.value()))?;

    Ok(Element::new(id, Arc::clone(executor)))
}

/// Finds all elements matching `by`, optionally under `context`.
///
/// Zero matches is an empty vector.
pub(crate) async fn find_elements(
    executor: &Arc<CommandExecutor>,
    by: &By,
    context: Option<&ElementId>,
) -> Result<Vec<Element>> {
    debug!(strategy = by.strategy(), selector = by.value(), ?context, "Finding elements");

    let reply = match executor.post(find_payload(by, context), ["elements"]).await {
        Ok(reply) => reply,
        Err(e) if is_no_such_element(&e) => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    Ok(reply
        .value_elements()?
        .into_iter()
        .map(|id| Element::new(id, Arc::clone(executor)))
        .collect())
}

// ============================================================================
// Gestures
// ============================================================================

/// Both element identifier keys pointing at `id`.
pub(crate) fn element_reference(id: &ElementId) -> Value {
    json!({
        LEGACY_ELEMENT_KEY: id.as_str(),
        W3C_ELEMENT_KEY: id.as_str(),
    })
}

/// `POST /touch/perform`.
pub(crate) async fn swipe(
    executor: &CommandExecutor,
    start: PointF,
    end: PointF,
    steps: u32,
    element: Option<&ElementId>,
) -> Result<()> {
    let mut payload = json!({
        "startX": start.x,
        "startY": start.y,
        "endX": end.x,
        "endY": end.y,
        "steps": steps,
    });
    if let Some(id) = element {
        payload["elementId"] = Value::String(id.as_str().to_string());
    }
    executor.post(payload, ["touch", "perform"]).await?;
    Ok(())
}

/// `POST /touch/drag`.
pub(crate) async fn drag(executor: &CommandExecutor, payload: Value) -> Result<()> {
    executor.post(payload, ["touch", "drag"]).await?;
    Ok(())
}

/// `POST /touch/flick`.
pub(crate) async fn flick(executor: &CommandExecutor, payload: Value) -> Result<()> {
    executor.post(payload, ["touch", "flick"]).await?;
    Ok(())
}

/// `POST /touch/scroll`.
///
/// `maxSwipes` is only sent when positive.
pub(crate) async fn scroll_to(
    executor: &CommandExecutor,
    by: &By,
    max_swipes: u32,
    origin: Option<&ElementId>,
) -> Result<()> {
    let mut params = Map::new();
    params.insert("strategy".into(), Value::from(by.strategy()));
    params.insert("selector".into(), Value::from(by.value()));
    if max_swipes > 0 {
        params.insert("maxSwipes".into(), Value::from(max_swipes));
    }

    let mut payload = json!({ "params": params });
    if let Some(id) = origin {
        payload["origin"] = element_reference(id);
    }

    executor.post(payload, ["touch", "scroll"]).await?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
