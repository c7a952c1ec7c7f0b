use std::sync::Arc;
use std::time::Duration;

use avcsoap::SoapClient;

use super::{
    AVTRANSPORT_SERVICE_PREFIX, CONNECTION_MANAGER_SERVICE_PREFIX, DeviceIdentity,
    RemoteConnectionManager, RemoteTransport, RendererDevice,
};
use crate::model::{DeviceId, RendererInfo};
use crate::upnp_clients::{AvTransportClient, ConnectionManagerClient};

/// A UPnP AV MediaRenderer known from its device description.
#[derive(Debug, Clone)]
pub struct UpnpRenderer {
    info: RendererInfo,
    soap: SoapClient,
    instance_id: u32,
}

impl UpnpRenderer {
    pub fn new(info: RendererInfo, http_timeout: Duration, instance_id: u32) -> Self {
        Self {
            info,
            soap: SoapClient::new(http_timeout),
            instance_id,
        }
    }

    pub fn info(&self) -> &RendererInfo {
        &self.info
    }

    pub fn avtransport(&self) -> Option<AvTransportClient> {
        self.info.service(AVTRANSPORT_SERVICE_PREFIX).map(|s| {
            AvTransportClient::new(
                s.control_url.clone(),
                s.service_type.clone(),
                self.instance_id,
                self.soap.clone(),
            )
        })
    }

    pub fn connection_manager_client(&self) -> Option<ConnectionManagerClient> {
        self.info.service(CONNECTION_MANAGER_SERVICE_PREFIX).map(|s| {
            ConnectionManagerClient::new(
                s.control_url.clone(),
                s.service_type.clone(),
                self.soap.clone(),
            )
        })
    }
}

impl DeviceIdentity for UpnpRenderer {
    fn id(&self) -> DeviceId {
        self.info.id.clone()
    }

    fn udn(&self) -> &str {
        &self.info.udn
    }

    fn friendly_name(&self) -> &str {
        &self.info.friendly_name
    }

    fn model_name(&self) -> &str {
        &self.info.model_name
    }

    fn manufacturer(&self) -> &str {
        &self.info.manufacturer
    }

    fn location(&self) -> &str {
        &self.info.location
    }
}

impl RendererDevice for UpnpRenderer {
    fn transport(&self) -> Option<Arc<dyn RemoteTransport>> {
        self.avtransport()
            .map(|c| Arc::new(c) as Arc<dyn RemoteTransport>)
    }

    fn connection_manager(&self) -> Option<Arc<dyn RemoteConnectionManager>> {
        self.connection_manager_client()
            .map(|c| Arc::new(c) as Arc<dyn RemoteConnectionManager>)
    }
}
