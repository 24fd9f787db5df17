//! UI element access.
//!
//! | Module | Description |
//! |--------|-------------|
//! | `selector` | [`By`] locator strategies |
//! | `ui_selector` | [`UiSelector`] expression compiler |
//! | `element` | [`Element`] remote node handles |
//! | `gesture` | Swipe, drag, scroll and typing options |

// ============================================================================
// Submodules
// ============================================================================

/// Element handles.
pub mod element;

/// Gesture and input options.
pub mod gesture;

/// Locator strategies.
pub mod selector;

/// `UiSelector` expression compiler.
pub mod ui_selector;

pub(crate) mod finder;

// ============================================================================
// Re-exports
// ============================================================================

pub use element::Element;
pub use gesture::{
    DEFAULT_DRAG_STEPS, DEFAULT_SWIPE_STEPS, DRAG_STEP_MULTIPLIER, DragOptions, ScrollOptions,
    SendKeysOptions, SwipeOptions,
};
pub use selector::By;
pub use ui_selector::UiSelector;
