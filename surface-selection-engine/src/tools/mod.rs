//! Interactive selection tools.
//!
//! The `ToolManager` resource keeps one tool active at a time. Tools are
//! switched with keyboard shortcuts on native builds (`L` lasso, `C` circle,
//! `X` clear) or by the host writing `ToolSelectionEvent` / `ClearToolEvent`.
//!
//! ```text
//! Keyboard/host input
//!   └─> ToolSelectionEvent
//!       └─> handle_tool_selection_events()
//!           ├─> Discard the previous selection
//!           └─> Switch the gesture mode and enable capture
//! ```

/// Pointer gesture state machine for lasso and circle shapes.
pub mod gesture;

/// Bevy plugin wiring gestures, the selection pipeline and the patch overlay.
pub mod surface_select;

/// Exclusive tool activation and the events that drive it.
pub mod tool_manager;
