//! The hard-real-time frame pump and its deadline clock.

/// Deadline clock for the real-time frame pump.
pub mod clock;
/// The frame pump / sender.
pub mod sender;
