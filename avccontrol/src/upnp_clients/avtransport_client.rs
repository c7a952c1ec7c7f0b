use std::collections::HashMap;
use std::time::Duration;

use avcsoap::SoapClient;
use tracing::{debug, info};

use super::required_value;
use crate::errors::ControlPointError;
use crate::model::{DeviceState, PositionInfo};
use crate::renderer::RemoteTransport;
use crate::time_utils::{format_hhmmss, parse_upnp_duration};

/// AVTransport:1 client for one transport instance.
#[derive(Debug, Clone)]
pub struct AvTransportClient {
    pub control_url: String,
    pub service_type: String,
    pub instance_id: u32,
    soap: SoapClient,
}

impl AvTransportClient {
    pub fn new(control_url: String, service_type: String, instance_id: u32, soap: SoapClient) -> Self {
        Self {
            control_url,
            service_type,
            instance_id,
            soap,
        }
    }

    fn invoke(
        &self,
        action: &str,
        extra_args: &[(&str, &str)],
    ) -> Result<HashMap<String, String>, ControlPointError> {
        let instance_id = self.instance_id.to_string();
        let mut args = Vec::with_capacity(extra_args.len() + 1);
        args.push(("InstanceID", instance_id.as_str()));
        args.extend_from_slice(extra_args);

        self.soap
            .invoke(&self.control_url, &self.service_type, action, &args)
            .map_err(|err| ControlPointError::remote_action(action, err))
    }
}

impl RemoteTransport for AvTransportClient {
    fn play(&self) -> Result<(), ControlPointError> {
        info!(url = %self.control_url, action = "Play", "AVTransport action");
        self.invoke("Play", &[("Speed", "1")]).map(|_| ())
    }

    fn pause(&self) -> Result<(), ControlPointError> {
        info!(url = %self.control_url, action = "Pause", "AVTransport action");
        self.invoke("Pause", &[]).map(|_| ())
    }

    fn stop(&self) -> Result<(), ControlPointError> {
        info!(url = %self.control_url, action = "Stop", "AVTransport action");
        self.invoke("Stop", &[]).map(|_| ())
    }

    fn seek(&self, position: Duration) -> Result<(), ControlPointError> {
        let target = format_hhmmss(position);
        info!(url = %self.control_url, action = "Seek", target = %target, "AVTransport action");
        self.invoke("Seek", &[("Unit", "REL_TIME"), ("Target", target.as_str())])
            .map(|_| ())
    }

    fn set_current_uri(&self, uri: &str, metadata: &str) -> Result<(), ControlPointError> {
        info!(url = %self.control_url, action = "SetAVTransportURI", uri, "AVTransport action");
        self.invoke(
            "SetAVTransportURI",
            &[("CurrentURI", uri), ("CurrentURIMetaData", metadata)],
        )
        .map(|_| ())
    }

    fn transport_info(&self) -> Result<DeviceState, ControlPointError> {
        let values = self.invoke("GetTransportInfo", &[])?;
        let state = required_value(&values, "CurrentTransportState")?;
        debug!(url = %self.control_url, state, "GetTransportInfo");
        Ok(DeviceState::parse(state))
    }

    fn position_info(&self) -> Result<PositionInfo, ControlPointError> {
        let values = self.invoke("GetPositionInfo", &[])?;
        position_info_from_values(&values)
    }
}

fn position_info_from_values(
    values: &HashMap<String, String>,
) -> Result<PositionInfo, ControlPointError> {
    let track_uri = values.get("TrackURI").cloned().unwrap_or_default();
    let track_metadata = values.get("TrackMetaData").cloned().unwrap_or_default();

    let track_duration = match values.get("TrackDuration") {
        Some(raw) => parse_upnp_duration(raw)
            .map_err(|_| ControlPointError::upnp_bad_return_value("TrackDuration", raw))?,
        None => Duration::ZERO,
    };
    let rel_time = required_value(values, "RelTime")?;
    let rel_time = parse_upnp_duration(rel_time)
        .map_err(|_| ControlPointError::upnp_bad_return_value("RelTime", rel_time))?;

    Ok(PositionInfo {
        track_uri,
        track_metadata,
        track_duration,
        rel_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn position_info_is_decoded() {
        let info = position_info_from_values(&values(&[
            ("Track", "1"),
            ("TrackDuration", "0:04:10"),
            ("TrackMetaData", "<DIDL-Lite/>"),
            ("TrackURI", "http://nas/a.mp3"),
            ("RelTime", "0:01:02.300"),
        ]))
        .unwrap();

        assert_eq!(info.track_uri, "http://nas/a.mp3");
        assert_eq!(info.track_metadata, "<DIDL-Lite/>");
        assert_eq!(info.track_duration, Duration::from_secs(250));
        assert_eq!(info.rel_time, Duration::from_secs(62));
    }

    #[test]
    fn unknown_times_are_zero() {
        let info = position_info_from_values(&values(&[
            ("TrackDuration", "NOT_IMPLEMENTED"),
            ("RelTime", "NOT_IMPLEMENTED"),
        ]))
        .unwrap();
        assert_eq!(info.rel_time, Duration::ZERO);
        assert!(info.track_uri.is_empty());
    }

    #[test]
    fn missing_or_bad_rel_time_is_an_error() {
        assert!(matches!(
            position_info_from_values(&values(&[("TrackURI", "x")])),
            Err(ControlPointError::UpnpMissingReturnValue(_))
        ));
        assert!(matches!(
            position_info_from_values(&values(&[("RelTime", "soon")])),
            Err(ControlPointError::UpnpBadReturnValue(_, _))
        ));
        assert!(matches!(
            position_info_from_values(&values(&[("RelTime", "9999999999999999:00:00")])),
            Err(ControlPointError::UpnpBadReturnValue(_, _))
        ));
    }
}
