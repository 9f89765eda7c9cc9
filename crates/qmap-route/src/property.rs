//! `PropertySet`: shared state between passes.
//!
//! Standard properties cover the target device, the native gate set and
//! the maps produced by placement and routing. Passes may also exchange
//! arbitrary typed values, e.g. the [`RoutingStats`](crate::RoutingStats)
//! stored by the routing pass.
//!
//! ```
//! use qmap_route::{DeviceGraph, PropertySet};
//!
//! #[derive(Debug, PartialEq)]
//! struct Budget(usize);
//!
//! let mut props = PropertySet::new().with_device(DeviceGraph::ring(6));
//! props.insert(Budget(3));
//!
//! assert_eq!(props.device().unwrap().num_nodes(), 6);
//! assert_eq!(props.get::<Budget>(), Some(&Budget(3)));
//! ```

use std::any::{Any, TypeId};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::device::DeviceGraph;
use crate::error::{RouteError, RouteResult};
use crate::layout::QubitMap;
use crate::rewrite::NativeGates;

/// Properties shared by the passes of one pipeline run.
#[derive(Debug, Default)]
pub struct PropertySet {
    /// Target device; shared read-only.
    pub device: Option<Arc<DeviceGraph>>,

    /// Native gates used when rewriting; CX without native SWAP if unset.
    pub native_gates: Option<NativeGates>,

    /// Logical-to-physical map before routing.
    ///
    /// Set by placement, read by routing.
    pub initial_map: Option<QubitMap>,

    /// Logical-to-physical map after routing.
    pub final_map: Option<QubitMap>,

    /// Custom properties storage (type-erased).
    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertySet {
    /// Create a new empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target device.
    #[must_use]
    pub fn with_device(mut self, device: impl Into<Arc<DeviceGraph>>) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Set the native gate set.
    #[must_use]
    pub fn with_native_gates(mut self, native: NativeGates) -> Self {
        self.native_gates = Some(native);
        self
    }

    /// Set the initial map, skipping placement.
    #[must_use]
    pub fn with_initial_map(mut self, map: QubitMap) -> Self {
        self.initial_map = Some(map);
        self
    }

    /// The target device, or `MissingDevice`.
    pub fn device(&self) -> RouteResult<&DeviceGraph> {
        self.device.as_deref().ok_or(RouteError::MissingDevice)
    }

    /// Insert a custom property.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a custom property.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Get a mutable custom property.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.custom
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Remove a custom property.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }
}
