//! Pointer input: raw pointer events in, highlight toggles on scene nodes out.
//!
//! # Invariants
//! - The picker never owns scene nodes; it tracks them by `NodeId`.
//! - A gesture with any pointer motion between press and release never picks.
//! - A pointer outside the window never hits anything.

pub mod pick;
pub mod pointer;

pub use pick::{PickController, PickMode, PickOutcome};
pub use pointer::{POINTER_SENTINEL, PointerEvent, ndc_from_pixels};

pub fn crate_info() -> &'static str {
    "outrun-input v0.1.0"
}
