//! Remote renderer capabilities.
//!
//! The control loop only talks to a renderer through two capabilities:
//!   - [`RemoteTransport`], the AVTransport side (play, pause, seek, URI),
//!   - [`RemoteConnectionManager`], the formats the renderer accepts.
//!
//! A [`RendererDevice`] is a handle from the device directory that can hand
//! out bound clients for both. Binding one to the loop goes through
//! [`BoundRenderer::bind`], which rejects devices lacking either capability.

mod binding;
mod registry;
mod upnp_renderer;

use std::sync::Arc;
use std::time::Duration;

use crate::errors::ControlPointError;
use crate::model::{DeviceId, DeviceState, PositionInfo};
use crate::protocol_info::ProtocolInfo;

pub use binding::BoundRenderer;
pub use registry::DeviceRegistry;
pub use upnp_renderer::UpnpRenderer;

pub const AVTRANSPORT_SERVICE_PREFIX: &str = "urn:schemas-upnp-org:service:AVTransport:";
pub const CONNECTION_MANAGER_SERVICE_PREFIX: &str =
    "urn:schemas-upnp-org:service:ConnectionManager:";

/// AVTransport operations used by the reconciliation engine. Every call is a
/// blocking round trip bounded by the client's timeout.
pub trait RemoteTransport: Send + Sync {
    fn play(&self) -> Result<(), ControlPointError>;
    fn pause(&self) -> Result<(), ControlPointError>;
    fn stop(&self) -> Result<(), ControlPointError>;
    fn seek(&self, position: Duration) -> Result<(), ControlPointError>;
    fn set_current_uri(&self, uri: &str, metadata: &str) -> Result<(), ControlPointError>;
    fn transport_info(&self) -> Result<DeviceState, ControlPointError>;
    fn position_info(&self) -> Result<PositionInfo, ControlPointError>;
}

pub trait RemoteConnectionManager: Send + Sync {
    /// `(sources, sinks)` as advertised by `GetProtocolInfo`.
    fn protocol_info(&self)
    -> Result<(Vec<ProtocolInfo>, Vec<ProtocolInfo>), ControlPointError>;
}

pub trait DeviceIdentity {
    fn id(&self) -> DeviceId;
    fn udn(&self) -> &str;
    fn friendly_name(&self) -> &str;
    fn model_name(&self) -> &str {
        ""
    }
    fn manufacturer(&self) -> &str {
        ""
    }
    fn location(&self) -> &str {
        ""
    }
}

/// A renderer handle from the device directory.
pub trait RendererDevice: DeviceIdentity + Send + Sync {
    /// AVTransport client, if the device advertises the service.
    fn transport(&self) -> Option<Arc<dyn RemoteTransport>>;

    /// ConnectionManager client, if the device advertises the service.
    fn connection_manager(&self) -> Option<Arc<dyn RemoteConnectionManager>>;
}
