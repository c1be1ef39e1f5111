//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Message definitions for equipment (goal sources, marker trackers, mechanisms)
pub mod eqpt;

/// Network module
pub mod net;
