use avcsoap::SoapClient;
use tracing::debug;

use super::required_value;
use crate::errors::ControlPointError;
use crate::protocol_info::{ProtocolInfo, parse_protocol_info_list};
use crate::renderer::RemoteConnectionManager;

#[derive(Debug, Clone)]
pub struct ConnectionManagerClient {
    pub control_url: String,
    pub service_type: String,
    soap: SoapClient,
}

impl ConnectionManagerClient {
    pub fn new(control_url: String, service_type: String, soap: SoapClient) -> Self {
        Self {
            control_url,
            service_type,
            soap,
        }
    }
}

impl RemoteConnectionManager for ConnectionManagerClient {
    fn protocol_info(
        &self,
    ) -> Result<(Vec<ProtocolInfo>, Vec<ProtocolInfo>), ControlPointError> {
        let values = self
            .soap
            .invoke(&self.control_url, &self.service_type, "GetProtocolInfo", &[])
            .map_err(|err| ControlPointError::remote_action("GetProtocolInfo", err))?;

        let sources = parse_protocol_info_list(required_value(&values, "Source")?);
        let sinks = parse_protocol_info_list(required_value(&values, "Sink")?);
        debug!(
            url = %self.control_url,
            sources = sources.len(),
            sinks = sinks.len(),
            "GetProtocolInfo"
        );
        Ok((sources, sinks))
    }
}
