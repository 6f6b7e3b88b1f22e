//! Domain rules for Emu-Input.
//!
//! This module contains pure logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! The innermost layer of the workspace.  Domain code has **no** imports
//! from OS APIs, network libraries or async runtimes, and can be tested on any
//! platform without external setup.  Outer layers (the capture adapter, the
//! session driver) depend on it; it never depends on them.

/// Capture-surface geometry and scaling onto the device resolution.
pub mod geometry;

/// Binding of ephemeral touch identifiers to fixed device slots.
///
/// See [`slots::SlotTracker`] for the main type.
pub mod slots;
