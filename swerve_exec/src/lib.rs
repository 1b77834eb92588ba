//! # Swerve library.
//!
//! This library allows other crates in the workspace, and the benchmarks, to
//! access items defined inside the swerve executable crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Data store - global data of the executable, shared between cycles
pub mod data_store;

/// Desaturated discretization - limits chassis commands so no module exceeds its speed limit
pub mod desat;

/// Kinematics - chassis speeds and SE(2) exp/log maps
pub mod kinematics;

/// Swerve control module - converts velocity commands into per-cycle chassis demands
pub mod swerve_ctrl;
