use avcsoap::SoapError;
use thiserror::Error;

use crate::provider::DescriptionError;

#[derive(Error, Debug)]
pub enum ControlPointError {
    #[error("{0} failed: {1}")]
    RemoteAction(String, #[source] SoapError),
    #[error("Device {0} does not support {1}")]
    MissingCapability(String, String),
    #[error("Missing {0} element in SOAP body")]
    UpnpMissingReturnValue(String),
    #[error("Invalid {0} value: {1}")]
    UpnpBadReturnValue(String, String),
    #[error("Got 0 sink protocols for device, expected at least 1")]
    NoSinkProtocols,
    #[error("Invalid protocolInfo: {0}")]
    InvalidProtocolInfo(String),
    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),
    #[error("Queue Error: {0}")]
    QueueError(String),
    #[error("Description Error: {0}")]
    Description(#[from] DescriptionError),
}

impl ControlPointError {
    pub fn remote_action(action: &str, source: SoapError) -> Self {
        ControlPointError::RemoteAction(action.to_string(), source)
    }

    pub fn missing_capability(device: &str, service: &str) -> Self {
        ControlPointError::MissingCapability(device.to_string(), service.to_string())
    }

    pub fn upnp_missing_return_value(value: &str) -> Self {
        ControlPointError::UpnpMissingReturnValue(value.to_string())
    }

    pub fn upnp_bad_return_value(name: &str, value: &str) -> Self {
        ControlPointError::UpnpBadReturnValue(name.to_string(), value.to_string())
    }

    /// UPnP error code of a remote action refused by the device.
    pub fn upnp_code(&self) -> Option<u32> {
        match self {
            ControlPointError::RemoteAction(_, source) => source.upnp_code(),
            _ => None,
        }
    }
}
