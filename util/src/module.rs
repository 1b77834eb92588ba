//! Control module interface
//!
//! An executable owns each control module in its data store, initialises it
//! from a parameter file, then calls `proc` once per cycle. When the
//! executable detects a fault it calls `make_safe`, after which the module
//! must command the robot to stop.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// A cyclic control module.
pub trait State {
    /// Data required during initialisation, typically the parameter file
    /// name relative to `params/`.
    type InitData;
    /// An error which can occur during initialisation.
    type InitError;

    /// Data required for cyclic processing.
    type InputData;
    /// Data produced by cyclic processing.
    type OutputData;
    /// A report on the status of the cyclic processing.
    type StatusReport;
    /// An error which can occur during cyclic processing.
    type ProcError;

    /// Load parameters and open the module's archives in the session.
    ///
    /// # Inputs
    /// - `init_data`: See `InitData`.
    /// - `session`: The current session, archives are created under its
    ///   `arch_root`.
    ///
    /// # Outputs
    /// - On success `Ok(())`.
    /// - On error an `InitError` instance.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Run one control cycle.
    ///
    /// # Outputs
    /// - On success a tuple of the output data and status report.
    /// - On error a `ProcError` instance. The module should leave itself in
    ///   a state which stops the robot.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;

    /// Drop any active command and stop the robot.
    fn make_safe(&mut self);
}
