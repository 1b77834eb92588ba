//! Utility library for the swerve drive software
//!
//! Contains the items shared between executables: session and logging setup,
//! parameter loading, archiving, the module interface and the script
//! interpreter.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod archive;
pub mod host;
pub mod logger;
pub mod maths;
pub mod module;
pub mod params;
pub mod script_interpreter;
pub mod session;
pub mod time;
