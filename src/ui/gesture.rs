//! Gesture and input options.
//!
//! | Option | Field | Default |
//! |--------|-------|---------|
//! | [`SwipeOptions`] | `steps` | 12 |
//! | [`DragOptions`] | `steps` | 12 (sent as `steps × 10` for coordinate drags) |
//! | [`ScrollOptions`] | `max_swipes` | 0 (agent default) |
//! | [`SendKeysOptions`] | `replace` | `true` |
//!
//! Steps control granularity: more steps move slower and more smoothly.

// ============================================================================
// Constants
// ============================================================================

/// Default swipe step count.
pub const DEFAULT_SWIPE_STEPS: u32 = 12;

/// Default drag step count, before the drag multiplier.
pub const DEFAULT_DRAG_STEPS: u32 = 12;

/// Multiplier the agent expects on coordinate drag steps.
pub const DRAG_STEP_MULTIPLIER: u32 = 10;

// ============================================================================
// SwipeOptions
// ============================================================================

/// Options for swipe gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeOptions {
    /// Step count.
    pub steps: u32,
}

impl Default for SwipeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SwipeOptions {
    /// Creates options with the default step count.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            steps: DEFAULT_SWIPE_STEPS,
        }
    }

    /// Sets the step count.
    #[inline]
    #[must_use]
    pub const fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }
}

// ============================================================================
// DragOptions
// ============================================================================

/// Options for drag gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragOptions {
    /// Step count before the multiplier.
    pub steps: u32,
}

impl Default for DragOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl DragOptions {
    /// Creates options with the default step count.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            steps: DEFAULT_DRAG_STEPS,
        }
    }

    /// Sets the step count.
    #[inline]
    #[must_use]
    pub const fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    /// Steps sent on the wire for coordinate drags.
    #[inline]
    #[must_use]
    pub const fn wire_steps(&self) -> u32 {
        self.steps.saturating_mul(DRAG_STEP_MULTIPLIER)
    }
}

// ============================================================================
// ScrollOptions
// ============================================================================

/// Options for scroll-to searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollOptions {
    /// Maximum swipes before giving up; 0 leaves it to the agent.
    pub max_swipes: u32,
}

impl ScrollOptions {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { max_swipes: 0 }
    }

    /// Sets the maximum swipe count.
    #[inline]
    #[must_use]
    pub const fn with_max_swipes(mut self, max_swipes: u32) -> Self {
        self.max_swipes = max_swipes;
        self
    }
}

// ============================================================================
// SendKeysOptions
// ============================================================================

/// Options for typing into an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendKeysOptions {
    /// Replace existing content; `false` appends.
    pub replace: bool,
}

impl Default for SendKeysOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SendKeysOptions {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { replace: true }
    }

    /// Appends instead of replacing.
    #[inline]
    #[must_use]
    pub const fn append() -> Self {
        Self { replace: false }
    }
}

// ============================================================================
// Tests
// ============================================================================
