// src/registry.rs

//! Device-to-controller registry: the adapter's attach/detach surface.
//!
//! A device-matching collaborator classifies devices by compatible
//! string and delivers attach and detach events here. The registry is an
//! explicit value the embedding host owns; nothing in this crate hides
//! one in a global.

use crate::binding::{BindError, BindingController};
use crate::config::AdapterConfig;
use crate::pipeline::CompositionContext;
use log::debug;
use std::collections::HashMap;

/// Compatible string identifying devices this adapter drives.
pub const COMPATIBLE: &str = "fixed-output,display-sink";

/// True when `compatible` names this adapter type.
pub fn matches(compatible: &str) -> bool {
    compatible == COMPATIBLE
}

/// Maps bound device identities to their binding controllers.
///
/// One controller per bound device, and a fresh controller for every
/// attach cycle, so a device may attach, detach, and attach again
/// indefinitely.
#[derive(Default)]
pub struct AdapterRegistry {
    bound: HashMap<String, BindingController>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        AdapterRegistry {
            bound: HashMap::new(),
        }
    }

    /// Handles an attach event for `device`.
    ///
    /// A fresh controller is bound into `host` and recorded under the
    /// device identity. A failed bind records nothing.
    pub fn attach(
        &mut self,
        device: &str,
        host: &mut dyn CompositionContext,
        config: &AdapterConfig,
    ) -> Result<(), BindError> {
        if self.bound.contains_key(device) {
            return Err(BindError::AlreadyBound {
                device: device.to_string(),
            });
        }

        let mut controller = BindingController::new(device);
        controller.attach(host, config)?;

        debug!("device {} bound into registry", device);
        self.bound.insert(device.to_string(), controller);
        Ok(())
    }

    /// Handles a detach event for `device`: the controller is removed,
    /// torn down against `host`, and retired.
    pub fn detach(
        &mut self,
        device: &str,
        host: &mut dyn CompositionContext,
    ) -> Result<(), BindError> {
        let mut controller = self.bound.remove(device).ok_or_else(|| BindError::NotBound {
            device: device.to_string(),
        })?;

        debug!("device {} removed from registry", device);
        controller.detach(host)
    }

    pub fn is_bound(&self, device: &str) -> bool {
        self.bound.contains_key(device)
    }

    /// Read access to a bound device's controller.
    pub fn controller(&self, device: &str) -> Option<&BindingController> {
        self.bound.get(device)
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}
