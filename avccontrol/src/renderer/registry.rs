use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::RendererDevice;
use crate::model::DeviceId;

/// Directory of known renderers, keyed by their stable identifier.
#[derive(Default)]
pub struct DeviceRegistry {
    devices: HashMap<DeviceId, Arc<dyn RendererDevice>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a renderer. Returns the previous handle with the same
    /// identifier, if any.
    pub fn insert(&mut self, device: Arc<dyn RendererDevice>) -> Option<Arc<dyn RendererDevice>> {
        let id = device.id();
        debug!(renderer = %id, name = device.friendly_name(), "Registering renderer");
        self.devices.insert(id, device)
    }

    pub fn get(&self, id: &DeviceId) -> Option<Arc<dyn RendererDevice>> {
        self.devices.get(id).cloned()
    }

    pub fn remove(&mut self, id: &DeviceId) -> Option<Arc<dyn RendererDevice>> {
        self.devices.remove(id)
    }

    /// All renderers, sorted by friendly name.
    pub fn list(&self) -> Vec<Arc<dyn RendererDevice>> {
        let mut devices: Vec<_> = self.devices.values().cloned().collect();
        devices.sort_by(|a, b| a.friendly_name().cmp(b.friendly_name()));
        devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
