use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::{RemoteConnectionManager, RemoteTransport, RendererDevice};
use crate::errors::ControlPointError;
use crate::model::DeviceId;

/// A renderer accepted by the control loop, together with the clients the
/// loop drives it through. Both clients are resolved once, at bind time.
#[derive(Clone)]
pub struct BoundRenderer {
    device: Arc<dyn RendererDevice>,
    transport: Arc<dyn RemoteTransport>,
    manager: Arc<dyn RemoteConnectionManager>,
}

impl BoundRenderer {
    /// Validates that `device` answers to AVTransport and ConnectionManager.
    pub fn bind(device: Arc<dyn RendererDevice>) -> Result<Self, ControlPointError> {
        let transport = device.transport().ok_or_else(|| {
            ControlPointError::missing_capability(device.udn(), "AVTransport")
        })?;
        let manager = device.connection_manager().ok_or_else(|| {
            ControlPointError::missing_capability(device.udn(), "ConnectionManager")
        })?;

        debug!(renderer = %device.udn(), name = device.friendly_name(), "Renderer validated for binding");
        Ok(Self {
            device,
            transport,
            manager,
        })
    }

    pub fn id(&self) -> DeviceId {
        self.device.id()
    }

    pub fn device(&self) -> &Arc<dyn RendererDevice> {
        &self.device
    }

    pub fn transport(&self) -> &dyn RemoteTransport {
        self.transport.as_ref()
    }

    pub fn manager(&self) -> &dyn RemoteConnectionManager {
        self.manager.as_ref()
    }
}

impl fmt::Debug for BoundRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundRenderer")
            .field("udn", &self.device.udn())
            .field("friendly_name", &self.device.friendly_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDevice;

    #[test]
    fn complete_device_binds() {
        let bound = BoundRenderer::bind(Arc::new(FakeDevice::new("uuid:1", "Kitchen"))).unwrap();
        assert_eq!(bound.id(), DeviceId("uuid:1".into()));
        assert!(bound.manager().protocol_info().is_ok());
    }

    #[test]
    fn missing_capabilities_are_rejected() {
        let err = BoundRenderer::bind(Arc::new(
            FakeDevice::new("uuid:1", "Kitchen").without_transport(),
        ))
        .unwrap_err();
        assert!(matches!(err, ControlPointError::MissingCapability(_, ref s) if s == "AVTransport"));

        let err = BoundRenderer::bind(Arc::new(
            FakeDevice::new("uuid:1", "Kitchen").without_manager(),
        ))
        .unwrap_err();
        assert!(
            matches!(err, ControlPointError::MissingCapability(_, ref s) if s == "ConnectionManager")
        );
    }
}
