//! The off-screen canvas, color math, and per-kind draw routines.

/// The off-screen pixel canvas.
pub mod canvas;
/// RGB color math.
pub mod color;
pub(crate) mod draw;
