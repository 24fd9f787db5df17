//! Agent command protocol types.
//!
//! The agent speaks an HTTP+JSON command protocol:
//!
//! | Piece | Direction | Purpose |
//! |-------|-----------|---------|
//! | [`Command`] | Client → Agent | Method, resource path, optional payload |
//! | [`RawReply`] | Agent → Client | `{value: T}` envelope, decoded per command |
//!
//! # Paths
//!
//! Paths are fixed literal segments interleaved with the session id and,
//! where applicable, one or two element ids:
//!
//! - `GET /session/:sessionId/element/:id/text`
//! - `POST /session/:sessionId/element/:id/click`
//! - `POST /session/:sessionId/appium/element/:id/scroll_to/:id2`

// ============================================================================
// Submodules
// ============================================================================

/// Command definitions.
pub mod command;

/// Reply envelopes and decoding.
pub mod reply;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{Command, Method, Scope};
pub use reply::{Envelope, LEGACY_ELEMENT_KEY, RawReply, W3C_ELEMENT_KEY};
