//! Session-level commands.
//!
//! Operations on the whole screen rather than a single element: health,
//! screenshots, the UI hierarchy, coordinate gestures, hardware keys and
//! root-scoped element lookup.

// ============================================================================
// Imports
// ============================================================================

use image::DynamicImage;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::geometry::{Point, PointF, Size};
use crate::protocol::Command;
use crate::ui::{By, DragOptions, Element, ScrollOptions, SwipeOptions, finder};

use super::core::Driver;

// ============================================================================
// Driver - Session
// ============================================================================

impl Driver {
    /// Queries agent health.
    ///
    /// Not scoped to the session, so it also answers after
    /// [`delete_session`](Self::delete_session).
    pub async fn status(&self) -> Result<Value> {
        self.executor()
            .execute(&Command::get(["status"]).at_root())
            .await?
            .value()
    }

    /// Returns the capabilities the agent reports for this session.
    pub async fn session_details(&self) -> Result<Value> {
        self.executor().get::<[&str; 0], &str>([]).await?.value()
    }

    /// Ends the session on the agent.
    ///
    /// Does not release the forwarded port; call [`dispose`](Self::dispose)
    /// for that.
    pub async fn delete_session(&self) -> Result<()> {
        self.executor().delete::<[&str; 0], &str>([]).await?;
        info!(session_id = %self.session_id(), "Session deleted");
        Ok(())
    }
}

// ============================================================================
// Driver - Screen
// ============================================================================

impl Driver {
    /// Captures the screen as PNG bytes.
    pub async fn screenshot_bytes(&self) -> Result<Vec<u8>> {
        self.executor().get(["screenshot"]).await?.value_base64()
    }

    /// Captures the screen as a decoded image.
    pub async fn screenshot(&self) -> Result<DynamicImage> {
        let bytes = self.screenshot_bytes().await?;
        Ok(image::load_from_memory(&bytes)?)
    }

    /// Dumps the current UI hierarchy as XML.
    pub async fn source(&self) -> Result<String> {
        self.executor().get(["source"]).await?.value_string()
    }

    /// Returns the size of the current window.
    pub async fn device_size(&self) -> Result<Size> {
        self.executor()
            .get(["window", "current", "size"])
            .await?
            .value()
    }
}

// ============================================================================
// Driver - Gestures
// ============================================================================

impl Driver {
    /// Taps at a screen coordinate.
    pub async fn tap(&self, x: i32, y: i32) -> Result<()> {
        self.tap_float(f64::from(x), f64::from(y)).await
    }

    /// Taps at a fractional screen coordinate.
    pub async fn tap_float(&self, x: f64, y: f64) -> Result<()> {
        debug!(x, y, "Tapping");
        self.executor()
            .post(json!({ "x": x, "y": y }), ["appium", "tap"])
            .await?;
        Ok(())
    }

    /// Swipes between two screen coordinates.
    pub async fn swipe(&self, start: Point, end: Point, options: SwipeOptions) -> Result<()> {
        self.swipe_float(start.into(), end.into(), options).await
    }

    /// Swipes between two fractional screen coordinates.
    pub async fn swipe_float(
        &self,
        start: PointF,
        end: PointF,
        options: SwipeOptions,
    ) -> Result<()> {
        debug!(?start, ?end, steps = options.steps, "Swiping");
        finder::swipe(self.executor(), start, end, options.steps, None).await
    }

    /// Drags from `start` to `end`.
    ///
    /// Sends `options.steps × 10` steps.
    pub async fn drag(&self, start: Point, end: Point, options: DragOptions) -> Result<()> {
        self.drag_float(start.into(), end.into(), options).await
    }

    /// Drags between two fractional screen coordinates.
    pub async fn drag_float(&self, start: PointF, end: PointF, options: DragOptions) -> Result<()> {
        debug!(?start, ?end, steps = options.wire_steps(), "Dragging");
        finder::drag(
            self.executor(),
            json!({
                "startX": start.x,
                "startY": start.y,
                "endX": end.x,
                "endY": end.y,
                "steps": options.wire_steps(),
            }),
        )
        .await
    }

    /// Scrolls the screen until an element matching `by` is visible.
    pub async fn scroll_to(&self, by: impl Into<By>, options: ScrollOptions) -> Result<()> {
        let by = by.into();
        debug!(%by, max_swipes = options.max_swipes, "Scrolling to");
        finder::scroll_to(self.executor(), &by, options.max_swipes, None).await
    }
}

// ============================================================================
// Driver - Keys
// ============================================================================

impl Driver {
    /// Presses the back button.
    pub async fn press_back(&self) -> Result<()> {
        self.executor().post_empty(["back"]).await?;
        Ok(())
    }

    /// Presses an Android key code with a meta-state mask.
    pub async fn press_keycode(&self, keycode: i32, metastate: i32) -> Result<()> {
        debug!(keycode, metastate, "Pressing key code");
        self.executor()
            .post(
                json!({ "keycode": keycode, "metastate": metastate }),
                ["appium", "device", "press_keycode"],
            )
            .await?;
        Ok(())
    }
}

// ============================================================================
// Driver - Find
// ============================================================================

impl Driver {
    /// Finds the first element on screen matching `by`.
    ///
    /// # Errors
    ///
    /// [`Error::ElementNotFound`] when nothing matches.
    pub async fn find_element(&self, by: impl Into<By>) -> Result<Element> {
        finder::find_element(self.executor(), &by.into(), None).await
    }

    /// Finds all elements on screen matching `by`.
    ///
    /// Zero matches is an empty vector.
    pub async fn find_elements(&self, by: impl Into<By>) -> Result<Vec<Element>> {
        finder::find_elements(self.executor(), &by.into(), None).await
    }

    /// Returns the element that currently has focus.
    pub async fn active_element(&self) -> Result<Element> {
        let id = self
            .executor()
            .get(["element", "active"])
            .await?
            .value_element()?
            .ok_or_else(|| Error::element_not_found("active", ""))?;
        Ok(Element::new(id, self.executor().clone()))
    }
}

// ============================================================================
// Tests
// ============================================================================
