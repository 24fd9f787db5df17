//! `UiSelector` expression compiler.
//!
//! Builds the textual expression consumed by the `-android uiautomator`
//! find strategy:
//!
//! ```text
//! new UiSelector().className("android.widget.Button").text("OK");
//! ```
//!
//! Every predicate method takes `&self` and returns a new selector, so a
//! partially built selector can be reused as the prefix of several
//! independent selectors. Clauses are rendered in call order.
//!
//! Nothing is validated or escaped here. A malformed expression (negative
//! index, unbalanced quotes in a value) is rejected by the agent when it is
//! used in a find command.
//!
//! # Example
//!
//! ```ignore
//! use uia2_driver::UiSelector;
//!
//! let list = UiSelector::new().resource_id("android:id/list");
//! let first = list.child_selector(&UiSelector::new().index(0));
//! let settings = list.child_selector(&UiSelector::new().text("Settings"));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// Clause
// ============================================================================

/// Argument of one clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Arg {
    /// Rendered inside double quotes.
    Str(String),
    /// Rendered as a decimal integer.
    Int(i32),
    /// Rendered as `true` / `false`.
    Bool(bool),
    /// Nested selector, rendered without the trailing `;`.
    Nested(Box<UiSelector>),
}

/// One `.method(arg)` clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Clause {
    method: &'static str,
    arg: Arg,
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.arg {
            Arg::Str(s) => write!(f, ".{}(\"{}\")", self.method, s),
            Arg::Int(n) => write!(f, ".{}({})", self.method, n),
            Arg::Bool(b) => write!(f, ".{}({})", self.method, b),
            Arg::Nested(selector) => write!(f, ".{}({})", self.method, selector.expression()),
        }
    }
}

// ============================================================================
// UiSelector
// ============================================================================

/// Immutable, append-only `UiSelector` expression.
///
/// `Display` renders the complete statement, terminated by `;`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UiSelector {
    clauses: Vec<Clause>,
}

impl UiSelector {
    /// Creates an empty selector (`new UiSelector()`).
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of clauses.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Returns `true` if no clause has been appended.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Renders the expression without the trailing `;`.
    ///
    /// This is the form embedded by the nesting clauses.
    #[must_use]
    pub fn expression(&self) -> String {
        let mut out = String::from("new UiSelector()");
        for clause in &self.clauses {
            out.push_str(&clause.to_string());
        }
        out
    }

    fn with(&self, method: &'static str, arg: Arg) -> Self {
        let mut clauses = Vec::with_capacity(self.clauses.len() + 1);
        clauses.extend_from_slice(&self.clauses);
        clauses.push(Clause { method, arg });
        Self { clauses }
    }

    fn with_str(&self, method: &'static str, value: &str) -> Self {
        self.with(method, Arg::Str(value.to_string()))
    }

    fn with_nested(&self, method: &'static str, selector: &UiSelector) -> Self {
        self.with(method, Arg::Nested(Box::new(selector.clone())))
    }
}

// ============================================================================
// UiSelector - Text and description
// ============================================================================

impl UiSelector {
    /// Visible text equals `text` (case-sensitive).
    #[must_use]
    pub fn text(&self, text: &str) -> Self {
        self.with_str("text", text)
    }

    /// Visible text matches the regular expression.
    #[must_use]
    pub fn text_matches(&self, regex: &str) -> Self {
        self.with_str("textMatches", regex)
    }

    /// Visible text starts with `text` (case-insensitive).
    #[must_use]
    pub fn text_starts_with(&self, text: &str) -> Self {
        self.with_str("textStartsWith", text)
    }

    /// Visible text contains `text` (case-sensitive).
    #[must_use]
    pub fn text_contains(&self, text: &str) -> Self {
        self.with_str("textContains", text)
    }

    /// Content description equals `desc`.
    #[must_use]
    pub fn description(&self, desc: &str) -> Self {
        self.with_str("description", desc)
    }

    /// Content description matches the regular expression.
    #[must_use]
    pub fn description_matches(&self, regex: &str) -> Self {
        self.with_str("descriptionMatches", regex)
    }

    /// Content description starts with `desc` (case-insensitive).
    #[must_use]
    pub fn description_starts_with(&self, desc: &str) -> Self {
        self.with_str("descriptionStartsWith", desc)
    }

    /// Content description contains `desc` (case-insensitive).
    #[must_use]
    pub fn description_contains(&self, desc: &str) -> Self {
        self.with_str("descriptionContains", desc)
    }
}

// ============================================================================
// UiSelector - Identity
// ============================================================================

impl UiSelector {
    /// Widget class equals `class_name`, e.g. `android.widget.Button`.
    #[must_use]
    pub fn class_name(&self, class_name: &str) -> Self {
        self.with_str("className", class_name)
    }

    /// Widget class matches the regular expression.
    #[must_use]
    pub fn class_name_matches(&self, regex: &str) -> Self {
        self.with_str("classNameMatches", regex)
    }

    /// Resource id equals `id`.
    #[must_use]
    pub fn resource_id(&self, id: &str) -> Self {
        self.with_str("resourceId", id)
    }

    /// Resource id matches the regular expression.
    #[must_use]
    pub fn resource_id_matches(&self, regex: &str) -> Self {
        self.with_str("resourceIdMatches", regex)
    }

    /// Owning application package equals `name`.
    #[must_use]
    pub fn package_name(&self, name: &str) -> Self {
        self.with_str("packageName", name)
    }

    /// Owning application package matches the regular expression.
    #[must_use]
    pub fn package_name_matches(&self, regex: &str) -> Self {
        self.with_str("packageNameMatches", regex)
    }

    /// Zero-based node index within the parent layout.
    ///
    /// Fragile; prefer [`instance`](Self::instance).
    #[must_use]
    pub fn index(&self, index: i32) -> Self {
        self.with("index", Arg::Int(index))
    }

    /// Zero-based instance number among all matches.
    #[must_use]
    pub fn instance(&self, instance: i32) -> Self {
        self.with("instance", Arg::Int(instance))
    }
}

// ============================================================================
// UiSelector - State flags
// ============================================================================

impl UiSelector {
    #[must_use]
    pub fn enabled(&self, b: bool) -> Self {
        self.with("enabled", Arg::Bool(b))
    }

    #[must_use]
    pub fn focused(&self, b: bool) -> Self {
        self.with("focused", Arg::Bool(b))
    }

    #[must_use]
    pub fn focusable(&self, b: bool) -> Self {
        self.with("focusable", Arg::Bool(b))
    }

    #[must_use]
    pub fn scrollable(&self, b: bool) -> Self {
        self.with("scrollable", Arg::Bool(b))
    }

    #[must_use]
    pub fn selected(&self, b: bool) -> Self {
        self.with("selected", Arg::Bool(b))
    }

    #[must_use]
    pub fn checked(&self, b: bool) -> Self {
        self.with("checked", Arg::Bool(b))
    }

    #[must_use]
    pub fn checkable(&self, b: bool) -> Self {
        self.with("checkable", Arg::Bool(b))
    }

    #[must_use]
    pub fn clickable(&self, b: bool) -> Self {
        self.with("clickable", Arg::Bool(b))
    }

    #[must_use]
    pub fn long_clickable(&self, b: bool) -> Self {
        self.with("longClickable", Arg::Bool(b))
    }
}

// ============================================================================
// UiSelector - Composition
// ============================================================================

impl UiSelector {
    /// Narrows the search to descendants matching `selector`.
    #[must_use]
    pub fn child_selector(&self, selector: &UiSelector) -> Self {
        self.with_nested("childSelector", selector)
    }

    /// Adds a pattern sub-selector.
    #[must_use]
    pub fn pattern_selector(&self, selector: &UiSelector) -> Self {
        self.with_nested("patternSelector", selector)
    }

    /// Adds a container sub-selector.
    #[must_use]
    pub fn container_selector(&self, selector: &UiSelector) -> Self {
        self.with_nested("containerSelector", selector)
    }

    /// Starts the search from the parent: siblings and their descendants.
    #[must_use]
    pub fn from_parent(&self, selector: &UiSelector) -> Self {
        self.with_nested("fromParent", selector)
    }
}

impl fmt::Display for UiSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};", self.expression())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_empty_selector() {
        let selector = UiSelector::new();
        assert!(selector.is_empty());
        assert_eq!(selector.to_string(), "new UiSelector();");
    }

    #[test]
    fn test_clause_rendering() {
        let selector = UiSelector::new()
            .class_name("android.widget.ImageView")
            .enabled(true)
            .instance(2);
        assert_eq!(
            selector.to_string(),
            r#"new UiSelector().className("android.widget.ImageView").enabled(true).instance(2);"#
        );
    }

    #[test]
    fn test_package_name_is_quoted() {
        let selector = UiSelector::new().package_name("com.android.settings");
        assert_eq!(
            selector.expression(),
            r#"new UiSelector().packageName("com.android.settings")"#
        );
    }

    #[test]
    fn test_nested_embeds_expression_without_terminator() {
        let child = UiSelector::new().text("Wi-Fi");
        let selector = UiSelector::new()
            .scrollable(true)
            .child_selector(&child);
        assert_eq!(
            selector.to_string(),
            r#"new UiSelector().scrollable(true).childSelector(new UiSelector().text("Wi-Fi"));"#
        );
    }

    #[test]
    fn test_no_validation_of_index() {
        assert_eq!(
            UiSelector::new().index(-1).to_string(),
            "new UiSelector().index(-1);"
        );
    }

    #[test]
    fn test_prefix_reuse_is_independent() {
        let base = UiSelector::new().class_name("android.widget.TextView");
        let a = base.text("A");
        let b = base.text("B");

        assert_eq!(base.len(), 1);
        assert_eq!(
            a.to_string(),
            r#"new UiSelector().className("android.widget.TextView").text("A");"#
        );
        assert_eq!(
            b.to_string(),
            r#"new UiSelector().className("android.widget.TextView").text("B");"#
        );
    }

    #[test]
    fn test_all_compositions() {
        let inner = UiSelector::new().index(0);
        let expr = UiSelector::new()
            .pattern_selector(&inner)
            .container_selector(&inner)
            .from_parent(&inner)
            .expression();
        assert_eq!(
            expr,
            "new UiSelector().patternSelector(new UiSelector().index(0))\
             .containerSelector(new UiSelector().index(0))\
             .fromParent(new UiSelector().index(0))"
        );
    }

    proptest! {
        #[test]
        fn prop_clauses_render_in_call_order(texts in proptest::collection::vec("[a-zA-Z0-9 ]{0,8}", 0..6)) {
            let selector = texts
                .iter()
                .fold(UiSelector::new(), |s, t| s.text(t));

            let expected: String = texts
                .iter()
                .map(|t| format!(".text(\"{t}\")"))
                .collect();
            prop_assert_eq!(selector.to_string(), format!("new UiSelector(){expected};"));
        }

        #[test]
        fn prop_nested_is_verbatim(desc in "[a-z]{1,10}", n in -5i32..50) {
            let inner = UiSelector::new().description(&desc).instance(n);
            let outer = UiSelector::new().from_parent(&inner);
            let rendered = outer.to_string();
            prop_assert!(rendered.contains(&inner.expression()));
            prop_assert!(rendered.ends_with(");"));
        }
    }
}
