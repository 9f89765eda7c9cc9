//! Pass trait and types for routing passes.

use qmap_ir::Circuit;

use crate::error::RouteResult;
use crate::property::PropertySet;

/// The kind of pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Reads the circuit and writes to the `PropertySet`.
    Analysis,
    /// Replaces or edits the circuit.
    Transformation,
}

/// A step of the placement/routing pipeline.
///
/// Passes communicate through the [`PropertySet`]: placement writes the
/// initial map, routing reads it and writes the final map, rewriting and
/// verification read the device.
pub trait Pass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Get the kind of this pass.
    fn kind(&self) -> PassKind;

    /// Run the pass on `circuit`.
    ///
    /// Analysis passes must leave the circuit untouched.
    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> RouteResult<()>;

    /// Check if this pass should run based on current state.
    fn should_run(&self, _circuit: &Circuit, _properties: &PropertySet) -> bool {
        true
    }
}
