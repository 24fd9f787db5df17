//! UI element handles.
//!
//! An [`Element`] is a remote reference to one node in the device's UI
//! tree. It caches nothing: every accessor is a fresh round-trip, and a
//! node that has since disappeared surfaces as a remote error
//! (`stale element reference`) on next use.
//!
//! # Example
//!
//! ```ignore
//! use uia2_driver::{By, SendKeysOptions};
//!
//! let field = driver.find_element(By::id("com.example:id/search")).await?;
//!
//! // Read
//! let text = field.text().await?;
//! let bounds = field.rect().await?;
//!
//! // Interact
//! field.click().await?;
//! field.send_keys("hello").await?;
//! field.send_keys_with(" world", SendKeysOptions::append()).await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use image::DynamicImage;
use serde_json::json;
use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::{Point, PointF, Rect, Size};
use crate::identifiers::ElementId;
use crate::transport::CommandExecutor;

use super::finder;
use super::gesture::{DragOptions, ScrollOptions, SendKeysOptions, SwipeOptions};
use super::selector::By;

// ============================================================================
// Attribute names
// ============================================================================

const ATTR_INDEX: &str = "index";
const ATTR_PACKAGE: &str = "package";
const ATTR_CLASS: &str = "class";
const ATTR_RESOURCE_ID: &str = "resource-id";
const ATTR_CHECKABLE: &str = "checkable";
const ATTR_CHECKED: &str = "checked";
const ATTR_CLICKABLE: &str = "clickable";
const ATTR_ENABLED: &str = "enabled";
const ATTR_FOCUSABLE: &str = "focusable";
const ATTR_LONG_CLICKABLE: &str = "long-clickable";
const ATTR_PASSWORD: &str = "password";
const ATTR_SCROLLABLE: &str = "scrollable";
const ATTR_SELECTED: &str = "selected";
const ATTR_DISPLAYED: &str = "displayed";

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for an element.
pub(crate) struct ElementInner {
    /// Agent-assigned element id.
    pub id: ElementId,

    /// Executor of the owning session.
    pub executor: Arc<CommandExecutor>,
}

// ============================================================================
// Element
// ============================================================================

/// A handle to a UI node on the device.
///
/// Cheap to clone; clones refer to the same node.
#[derive(Clone)]
pub struct Element {
    /// Shared inner state.
    pub(crate) inner: Arc<ElementInner>,
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.inner.id)
            .field("session_id", self.inner.executor.session_id())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Element - Constructor
// ============================================================================

impl Element {
    /// Creates a new element handle.
    pub(crate) fn new(id: ElementId, executor: Arc<CommandExecutor>) -> Self {
        Self {
            inner: Arc::new(ElementInner { id, executor }),
        }
    }

    /// Returns this element's id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &ElementId {
        &self.inner.id
    }

    fn executor(&self) -> &CommandExecutor {
        &self.inner.executor
    }

    fn id_str(&self) -> &str {
        self.inner.id.as_str()
    }
}

// ============================================================================
// Element - Properties
// ============================================================================

impl Element {
    /// Gets the visible text.
    ///
    /// An element without text yields an empty string.
    pub async fn text(&self) -> Result<String> {
        self.executor()
            .get(["element", self.id_str(), "text"])
            .await?
            .value_string()
    }

    /// Gets an attribute value by name (`resource-id`, `checked`, ...).
    pub async fn attribute(&self, name: &str) -> Result<String> {
        let encoded = urlencoding::encode(name);
        self.executor()
            .get(["element", self.id_str(), "attribute", encoded.as_ref()])
            .await?
            .value_string()
    }

    /// Gets the content description.
    pub async fn content_description(&self) -> Result<String> {
        self.executor()
            .get(["element", self.id_str(), "name"])
            .await?
            .value_string()
    }

    /// Gets the element size.
    ///
    /// Callers that prefer a value over an error can fall back with
    /// `.unwrap_or(Size::INVALID)`.
    pub async fn size(&self) -> Result<Size> {
        self.executor()
            .get(["element", self.id_str(), "size"])
            .await?
            .value()
    }

    /// Gets the top-left corner on screen.
    pub async fn location(&self) -> Result<Point> {
        self.executor()
            .get(["element", self.id_str(), "location"])
            .await?
            .value()
    }

    /// Gets the bounding box on screen.
    pub async fn rect(&self) -> Result<Rect> {
        self.executor()
            .get(["element", self.id_str(), "rect"])
            .await?
            .value()
    }

    /// Captures the element as PNG bytes.
    pub async fn screenshot_bytes(&self) -> Result<Vec<u8>> {
        self.executor()
            .get(["element", self.id_str(), "screenshot"])
            .await?
            .value_base64()
    }

    /// Captures the element as a decoded image.
    pub async fn screenshot(&self) -> Result<DynamicImage> {
        let bytes = self.screenshot_bytes().await?;
        Ok(image::load_from_memory(&bytes)?)
    }
}

// ============================================================================
// Element - Attribute helpers
// ============================================================================

impl Element {
    /// Node index within its parent.
    pub async fn index(&self) -> Result<i32> {
        let raw = self.attribute(ATTR_INDEX).await?;
        raw.trim()
            .parse()
            .map_err(|_| Error::decode(format!("index attribute is not an integer: '{raw}'")))
    }

    /// Owning application package.
    pub async fn package(&self) -> Result<String> {
        self.attribute(ATTR_PACKAGE).await
    }

    /// Widget class name.
    pub async fn class(&self) -> Result<String> {
        self.attribute(ATTR_CLASS).await
    }

    /// Resource id.
    pub async fn resource_id(&self) -> Result<String> {
        self.attribute(ATTR_RESOURCE_ID).await
    }

    /// Reads a flag attribute. Only the literal `true` is true.
    async fn flag(&self, name: &str) -> Result<bool> {
        Ok(self.attribute(name).await? == "true")
    }

    pub async fn checkable(&self) -> Result<bool> {
        self.flag(ATTR_CHECKABLE).await
    }

    pub async fn checked(&self) -> Result<bool> {
        self.flag(ATTR_CHECKED).await
    }

    pub async fn clickable(&self) -> Result<bool> {
        self.flag(ATTR_CLICKABLE).await
    }

    pub async fn enabled(&self) -> Result<bool> {
        self.flag(ATTR_ENABLED).await
    }

    pub async fn focusable(&self) -> Result<bool> {
        self.flag(ATTR_FOCUSABLE).await
    }

    pub async fn long_clickable(&self) -> Result<bool> {
        self.flag(ATTR_LONG_CLICKABLE).await
    }

    pub async fn password(&self) -> Result<bool> {
        self.flag(ATTR_PASSWORD).await
    }

    pub async fn scrollable(&self) -> Result<bool> {
        self.flag(ATTR_SCROLLABLE).await
    }

    pub async fn selected(&self) -> Result<bool> {
        self.flag(ATTR_SELECTED).await
    }

    pub async fn is_displayed(&self) -> Result<bool> {
        self.flag(ATTR_DISPLAYED).await
    }

    /// Returns `true` if the element is enabled, displayed and clickable.
    ///
    /// Each flag is queried fresh and in that order. Any failure or `false`
    /// answer short-circuits to `false`.
    pub async fn can_click(&self) -> bool {
        for flag in [ATTR_ENABLED, ATTR_DISPLAYED, ATTR_CLICKABLE] {
            match self.flag(flag).await {
                Ok(true) => {}
                Ok(false) => return false,
                Err(e) => {
                    debug!(element_id = %self.inner.id, flag, error = %e, "Click check failed");
                    return false;
                }
            }
        }
        true
    }
}

// ============================================================================
// Element - Actions
// ============================================================================

impl Element {
    /// Clicks the element.
    pub async fn click(&self) -> Result<()> {
        debug!(element_id = %self.inner.id, "Clicking element");
        self.executor()
            .post_empty(["element", self.id_str(), "click"])
            .await?;
        Ok(())
    }

    /// Clears editable content.
    pub async fn clear(&self) -> Result<()> {
        debug!(element_id = %self.inner.id, "Clearing element");
        self.executor()
            .post_empty(["element", self.id_str(), "clear"])
            .await?;
        Ok(())
    }

    /// Replaces the content with `text`.
    pub async fn send_keys(&self, text: &str) -> Result<()> {
        self.send_keys_with(text, SendKeysOptions::default()).await
    }

    /// Types `text`, replacing or appending per `options`.
    pub async fn send_keys_with(&self, text: &str, options: SendKeysOptions) -> Result<()> {
        debug!(
            element_id = %self.inner.id,
            len = text.len(),
            replace = options.replace,
            "Sending keys"
        );
        self.executor()
            .post(
                json!({ "text": text, "replace": options.replace }),
                ["element", self.id_str(), "value"],
            )
            .await?;
        Ok(())
    }
}

// ============================================================================
// Element - Find
// ============================================================================

impl Element {
    /// Finds the first descendant matching `by`.
    ///
    /// # Errors
    ///
    /// [`Error::ElementNotFound`] when nothing matches.
    pub async fn find_element(&self, by: impl Into<By>) -> Result<Element> {
        finder::find_element(&self.inner.executor, &by.into(), Some(&self.inner.id)).await
    }

    /// Finds all descendants matching `by`.
    pub async fn find_elements(&self, by: impl Into<By>) -> Result<Vec<Element>> {
        finder::find_elements(&self.inner.executor, &by.into(), Some(&self.inner.id)).await
    }
}

// ============================================================================
// Element - Gestures
// ============================================================================

impl Element {
    /// Swipes between two points within this element.
    pub async fn swipe(&self, start: Point, end: Point, options: SwipeOptions) -> Result<()> {
        self.swipe_float(start.into(), end.into(), options).await
    }

    /// Swipes between two fractional points within this element.
    pub async fn swipe_float(
        &self,
        start: PointF,
        end: PointF,
        options: SwipeOptions,
    ) -> Result<()> {
        debug!(element_id = %self.inner.id, ?start, ?end, steps = options.steps, "Swiping");
        finder::swipe(
            self.executor(),
            start,
            end,
            options.steps,
            Some(&self.inner.id),
        )
        .await
    }

    /// Drags this element to `end`.
    ///
    /// Sends `options.steps × 10` steps.
    pub async fn drag(&self, end: Point, options: DragOptions) -> Result<()> {
        self.drag_float(end.into(), options).await
    }

    /// Drags this element to a fractional point.
    pub async fn drag_float(&self, end: PointF, options: DragOptions) -> Result<()> {
        debug!(element_id = %self.inner.id, ?end, steps = options.wire_steps(), "Dragging");
        finder::drag(
            self.executor(),
            json!({
                "elementId": self.id_str(),
                "endX": end.x,
                "endY": end.y,
                "steps": options.wire_steps(),
            }),
        )
        .await
    }

    /// Drags this element onto `destination`.
    ///
    /// Steps are sent as given.
    pub async fn drag_to(&self, destination: &Element, options: DragOptions) -> Result<()> {
        debug!(
            element_id = %self.inner.id,
            destination = %destination.inner.id,
            steps = options.steps,
            "Dragging to element"
        );
        finder::drag(
            self.executor(),
            json!({
                "elementId": self.id_str(),
                "destElId": destination.id_str(),
                "steps": options.steps,
            }),
        )
        .await
    }

    /// Flicks from this element by the given offset.
    pub async fn flick(&self, xoffset: i32, yoffset: i32, speed: i32) -> Result<()> {
        let mut payload = finder::element_reference(&self.inner.id);
        payload["xoffset"] = json!(xoffset);
        payload["yoffset"] = json!(yoffset);
        payload["speed"] = json!(speed);
        finder::flick(self.executor(), payload).await
    }

    /// Scrolls this container until an element matching `by` is visible.
    pub async fn scroll_to(&self, by: impl Into<By>, options: ScrollOptions) -> Result<()> {
        let by = by.into();
        debug!(element_id = %self.inner.id, %by, max_swipes = options.max_swipes, "Scrolling to");
        finder::scroll_to(self.executor(), &by, options.max_swipes, Some(&self.inner.id)).await
    }

    /// Scrolls this container until `other` is visible.
    pub async fn scroll_to_element(&self, other: &Element) -> Result<()> {
        self.executor()
            .post_empty([
                "appium",
                "element",
                self.id_str(),
                "scroll_to",
                other.id_str(),
            ])
            .await?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::Value;

    use crate::identifiers::SessionId;
    use crate::protocol::Method;
    use crate::transport::Session;
    use crate::transport::endpoint::Endpoint;
    use crate::transport::mock::{MockReply, MockTransport};

    fn element(mock: &Arc<MockTransport>) -> Element {
        let executor = CommandExecutor::attach(
            mock.clone(),
            Session::new(SessionId::new("s1"), Endpoint::network("device", 6790)),
        );
        Element::new(ElementId::new("e1"), Arc::new(executor))
    }

    fn last_body(mock: &MockTransport) -> Value {
        MockTransport::body_json(&mock.last_request().expect("request sent"))
    }

    #[test]
    fn test_element_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<Element>();
    }

    #[test]
    fn test_element_is_debug() {
        fn assert_debug<T: std::fmt::Debug>() {}
        assert_debug::<Element>();
    }

    #[tokio::test]
    async fn test_text_round_trip_each_call() {
        let mock = MockTransport::new();
        mock.on(Method::Get, "/element/e1/text", MockReply::ok(r#"{"value":"Wi-Fi"}"#));

        let el = element(&mock);
        assert_eq!(el.text().await.expect("text"), "Wi-Fi");
        assert_eq!(el.text().await.expect("text"), "Wi-Fi");
        assert_eq!(mock.requests_to("/element/e1/text").len(), 2);
    }

    #[tokio::test]
    async fn test_empty_text_is_not_an_error() {
        let mock = MockTransport::new();
        mock.on(Method::Get, "/element/e1/text", MockReply::ok(r#"{"value":""}"#));
        assert_eq!(element(&mock).text().await.expect("text"), "");
    }

    #[tokio::test]
    async fn test_attribute_name_is_encoded() {
        let mock = MockTransport::new();
        mock.on(
            Method::Get,
            "/element/e1/attribute/content%20desc",
            MockReply::ok(r#"{"value":"x"}"#),
        );
        assert_eq!(
            element(&mock).attribute("content desc").await.expect("attr"),
            "x"
        );
    }

    #[tokio::test]
    async fn test_rect_decodes_flat_shape() {
        let mock = MockTransport::new();
        mock.on(
            Method::Get,
            "/element/e1/rect",
            MockReply::ok(r#"{"value":{"x":10,"y":20,"width":30,"height":40}}"#),
        );
        let rect = element(&mock).rect().await.expect("rect");
        assert_eq!(rect, Rect::new(Point::new(10, 20), Size::new(30, 40)));
    }

    #[tokio::test]
    async fn test_size_failure_falls_back_to_sentinel() {
        let mock = MockTransport::new();
        mock.on(
            Method::Get,
            "/element/e1/size",
            MockReply::status(404, r#"{"value":{"error":"stale element reference","message":"gone"}}"#),
        );
        let size = element(&mock).size().await.unwrap_or(Size::INVALID);
        assert_eq!(size, Size::new(-1, -1));
    }

    #[tokio::test]
    async fn test_flag_requires_literal_true() {
        let mock = MockTransport::new();
        mock.on(Method::Get, "/attribute/checked", MockReply::ok(r#"{"value":"TRUE"}"#));
        mock.on(Method::Get, "/attribute/enabled", MockReply::ok(r#"{"value":"true"}"#));
        mock.on(Method::Get, "/attribute/checkable", MockReply::ok(r#"{"value":"True"}"#));
        mock.on(Method::Get, "/attribute/clickable", MockReply::ok(r#"{"value":"1"}"#));
        mock.on(Method::Get, "/attribute/focusable", MockReply::ok(r#"{"value":""}"#));
        mock.on(Method::Get, "/attribute/selected", MockReply::ok(r#"{"value":null}"#));

        let el = element(&mock);
        assert!(!el.checked().await.expect("checked"));
        assert!(el.enabled().await.expect("enabled"));
        assert!(!el.checkable().await.expect("checkable"));
        assert!(!el.clickable().await.expect("clickable"));
        assert!(!el.focusable().await.expect("focusable"));
        assert!(!el.selected().await.expect("selected"));
    }

    #[tokio::test]
    async fn test_can_click_short_circuits() {
        let mock = MockTransport::new();
        mock.on(Method::Get, "/attribute/enabled", MockReply::ok(r#"{"value":"true"}"#));
        mock.on(Method::Get, "/attribute/displayed", MockReply::ok(r#"{"value":"false"}"#));
        mock.on(Method::Get, "/attribute/clickable", MockReply::ok(r#"{"value":"true"}"#));

        assert!(!element(&mock).can_click().await);
        assert!(mock.requests_to("/attribute/clickable").is_empty());
    }

    #[tokio::test]
    async fn test_can_click_swallows_errors() {
        let mock = MockTransport::new();
        mock.on(Method::Get, "/attribute/enabled", MockReply::io_error("reset"));
        assert!(!element(&mock).can_click().await);
    }

    #[tokio::test]
    async fn test_can_click_all_true() {
        let mock = MockTransport::new();
        for flag in ["enabled", "displayed", "clickable"] {
            mock.on(
                Method::Get,
                &format!("/attribute/{flag}"),
                MockReply::ok(r#"{"value":"true"}"#),
            );
        }
        assert!(element(&mock).can_click().await);
    }

    #[tokio::test]
    async fn test_index_parses_integer() {
        let mock = MockTransport::new();
        mock.on_sequence(
            Method::Get,
            "/attribute/index",
            vec![
                MockReply::ok(r#"{"value":"3"}"#),
                MockReply::ok(r#"{"value":"x"}"#),
            ],
        );
        let el = element(&mock);
        assert_eq!(el.index().await.expect("index"), 3);
        assert!(el.index().await.unwrap_err().is_decode_error());
    }

    #[tokio::test]
    async fn test_send_keys_defaults_to_replace() {
        let mock = MockTransport::new();
        mock.on(Method::Post, "/element/e1/value", MockReply::ok(r#"{"value":null}"#));

        let el = element(&mock);
        el.send_keys("abc").await.expect("send keys");
        assert_eq!(last_body(&mock), json!({"text": "abc", "replace": true}));

        el.send_keys_with("d", SendKeysOptions::append())
            .await
            .expect("send keys");
        assert_eq!(last_body(&mock), json!({"text": "d", "replace": false}));
    }

    #[tokio::test]
    async fn test_scoped_find_sends_context() {
        let mock = MockTransport::new();
        mock.on(
            Method::Post,
            "/session/s1/element",
            MockReply::ok(r#"{"value":{"ELEMENT":"child"}}"#),
        );

        let child = element(&mock)
            .find_element(By::class_name("android.widget.TextView"))
            .await
            .expect("find");
        assert_eq!(child.id().as_str(), "child");
        assert_eq!(last_body(&mock)["context"], "e1");
    }

    #[tokio::test]
    async fn test_scoped_find_zero_matches_is_error() {
        let mock = MockTransport::new();
        mock.on(
            Method::Post,
            "/session/s1/element",
            MockReply::status(404, r#"{"value":{"error":"no such element","message":"none"}}"#),
        );
        mock.on(
            Method::Post,
            "/session/s1/elements",
            MockReply::status(404, r#"{"value":{"error":"no such element","message":"none"}}"#),
        );

        let el = element(&mock);
        let err = el.find_element(By::id("missing")).await.unwrap_err();
        assert!(matches!(err, Error::ElementNotFound { .. }));
        assert!(el.find_elements(By::id("missing")).await.expect("find all").is_empty());
    }

    #[tokio::test]
    async fn test_find_elements_reads_both_key_forms() {
        let mock = MockTransport::new();
        mock.on(
            Method::Post,
            "/session/s1/elements",
            MockReply::ok(
                r#"{"value":[{"ELEMENT":"a"},{"element-6066-11e4-a52e-4f735466cecf":"b"}]}"#,
            ),
        );

        let found = element(&mock)
            .find_elements(By::xpath("//*"))
            .await
            .expect("find all");
        let ids: Vec<_> = found.iter().map(|e| e.id().as_str().to_string()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn test_drag_multiplies_steps() {
        let mock = MockTransport::new();
        mock.on(Method::Post, "/touch/drag", MockReply::ok(r#"{"value":true}"#));

        let el = element(&mock);
        el.drag(Point::new(5, 6), DragOptions::default())
            .await
            .expect("drag");
        assert_eq!(
            last_body(&mock),
            json!({"elementId": "e1", "endX": 5.0, "endY": 6.0, "steps": 120})
        );

        el.drag(Point::new(5, 6), DragOptions::new().with_steps(2))
            .await
            .expect("drag");
        assert_eq!(last_body(&mock)["steps"], 20);
    }

    #[tokio::test]
    async fn test_drag_to_keeps_steps() {
        let mock = MockTransport::new();
        mock.on(Method::Post, "/touch/drag", MockReply::ok(r#"{"value":true}"#));

        let el = element(&mock);
        let dest = Element::new(ElementId::new("e2"), Arc::clone(&el.inner.executor));
        el.drag_to(&dest, DragOptions::default()).await.expect("drag to");
        assert_eq!(
            last_body(&mock),
            json!({"elementId": "e1", "destElId": "e2", "steps": 12})
        );
    }

    #[tokio::test]
    async fn test_swipe_defaults_to_twelve_steps() {
        let mock = MockTransport::new();
        mock.on(Method::Post, "/touch/perform", MockReply::ok(r#"{"value":true}"#));

        element(&mock)
            .swipe(Point::new(1, 2), Point::new(3, 4), SwipeOptions::default())
            .await
            .expect("swipe");
        let body = last_body(&mock);
        assert_eq!(body["steps"], 12);
        assert_eq!(body["elementId"], "e1");
        assert_eq!(body["startX"], 1.0);
    }

    #[tokio::test]
    async fn test_scroll_to_omits_zero_max_swipes() {
        let mock = MockTransport::new();
        mock.on(Method::Post, "/touch/scroll", MockReply::ok(r#"{"value":null}"#));

        let el = element(&mock);
        el.scroll_to(By::accessibility_id("About"), ScrollOptions::default())
            .await
            .expect("scroll");
        let body = last_body(&mock);
        assert_eq!(
            body["params"],
            json!({"strategy": "accessibility id", "selector": "About"})
        );
        assert_eq!(body["origin"]["ELEMENT"], "e1");

        el.scroll_to(By::id("x"), ScrollOptions::new().with_max_swipes(5))
            .await
            .expect("scroll");
        assert_eq!(last_body(&mock)["params"]["maxSwipes"], 5);
    }

    #[tokio::test]
    async fn test_flick_and_scroll_to_element_paths() {
        let mock = MockTransport::new();
        mock.on(Method::Post, "/touch/flick", MockReply::ok(r#"{"value":true}"#));
        mock.on(
            Method::Post,
            "/appium/element/e1/scroll_to/e2",
            MockReply::ok(r#"{"value":null}"#),
        );

        let el = element(&mock);
        el.flick(10, -20, 300).await.expect("flick");
        let body = last_body(&mock);
        assert_eq!(body["element-6066-11e4-a52e-4f735466cecf"], "e1");
        assert_eq!(body["yoffset"], -20);

        let other = Element::new(ElementId::new("e2"), Arc::clone(&el.inner.executor));
        el.scroll_to_element(&other).await.expect("scroll to element");
    }

    #[tokio::test]
    async fn test_screenshot_decodes_base64() {
        let mock = MockTransport::new();
        // "PNG" is not a decodable image, but the bytes path must still work.
        mock.on(Method::Get, "/element/e1/screenshot", MockReply::ok(r#"{"value":"UE5H"}"#));

        let el = element(&mock);
        assert_eq!(el.screenshot_bytes().await.expect("bytes"), b"PNG");
        assert!(el.screenshot().await.unwrap_err().is_decode_error());
    }
}
