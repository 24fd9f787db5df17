//! Element locator strategies.
//!
//! # Example
//!
//! ```ignore
//! use uia2_driver::{By, UiSelector};
//!
//! // Resource id
//! let login = driver.find_element(By::id("com.example:id/login")).await?;
//!
//! // Content description
//! let menu = driver.find_element(By::accessibility_id("More options")).await?;
//!
//! // UiSelector expression
//! let ok = driver
//!     .find_element(UiSelector::new().text("OK").clickable(true))
//!     .await?;
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ui_selector::UiSelector;

// ============================================================================
// By Enum
// ============================================================================

/// Element locator strategy.
///
/// Each variant maps to one strategy name understood by the agent's find
/// command.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "selector")]
pub enum By {
    /// Resource id, e.g. `com.android.settings:id/search`.
    #[serde(rename = "id")]
    Id(String),

    /// Content description.
    #[serde(rename = "accessibility id")]
    AccessibilityId(String),

    /// XPath over the UI hierarchy.
    ///
    /// # Example
    /// ```ignore
    /// By::xpath("//android.widget.Button[@text='OK']")
    /// ```
    #[serde(rename = "xpath")]
    XPath(String),

    /// Fully qualified widget class name.
    #[serde(rename = "class name")]
    ClassName(String),

    /// Serialized `UiSelector` expression.
    #[serde(rename = "-android uiautomator")]
    UiAutomator(String),
}

impl By {
    /// Creates a resource id locator.
    #[inline]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Creates a content description locator.
    #[inline]
    pub fn accessibility_id(description: impl Into<String>) -> Self {
        Self::AccessibilityId(description.into())
    }

    /// Creates an XPath locator.
    #[inline]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Creates a class name locator.
    #[inline]
    pub fn class_name(class: impl Into<String>) -> Self {
        Self::ClassName(class.into())
    }

    /// Creates a locator from a raw `UiSelector` expression.
    #[inline]
    pub fn ui_automator(expr: impl Into<String>) -> Self {
        Self::UiAutomator(expr.into())
    }

    /// Returns the strategy name sent to the agent.
    #[must_use]
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::Id(_) => "id",
            Self::AccessibilityId(_) => "accessibility id",
            Self::XPath(_) => "xpath",
            Self::ClassName(_) => "class name",
            Self::UiAutomator(_) => "-android uiautomator",
        }
    }

    /// Returns the selector value.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Id(v)
            | Self::AccessibilityId(v)
            | Self::XPath(v)
            | Self::ClassName(v)
            | Self::UiAutomator(v) => v,
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy(), self.value())
    }
}

impl From<UiSelector> for By {
    fn from(selector: UiSelector) -> Self {
        Self::UiAutomator(selector.to_string())
    }
}

impl From<&UiSelector> for By {
    fn from(selector: &UiSelector) -> Self {
        Self::UiAutomator(selector.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_names() {
        assert_eq!(By::id("a").strategy(), "id");
        assert_eq!(By::accessibility_id("a").strategy(), "accessibility id");
        assert_eq!(By::xpath("//a").strategy(), "xpath");
        assert_eq!(By::class_name("a").strategy(), "class name");
        assert_eq!(By::ui_automator("a").strategy(), "-android uiautomator");
    }

    #[test]
    fn test_value() {
        assert_eq!(By::xpath("//node").value(), "//node");
    }

    #[test]
    fn test_from_ui_selector() {
        let by = By::from(UiSelector::new().text("OK"));
        assert_eq!(by, By::UiAutomator(r#"new UiSelector().text("OK");"#.to_string()));
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(By::accessibility_id("Back")).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"strategy": "accessibility id", "selector": "Back"})
        );
    }
}
