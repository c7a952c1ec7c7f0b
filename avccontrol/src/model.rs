use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Stable identifier of a remote device (its UDN).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct DeviceId(pub String);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Target playback state of the controller.
///
/// Only operator commands set it; the reconciliation engine may hand back a
/// different value when it adopts a change made on the device itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum PlaybackIntent {
    #[default]
    Stopped,
    Paused,
    Playing,
}

impl fmt::Display for PlaybackIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlaybackIntent::Stopped => "Stopped",
            PlaybackIntent::Paused => "Paused",
            PlaybackIntent::Playing => "Playing",
        };
        f.write_str(s)
    }
}

/// Transport state as reported by `GetTransportInfo`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum DeviceState {
    #[default]
    Stopped,
    Paused,
    Playing,
    Transitioning,
    /// Any state string outside the AVTransport standard set.
    Vendor(String),
}

impl DeviceState {
    /// Maps a `CurrentTransportState` value.
    ///
    /// `NO_MEDIA_PRESENT` is reported by renderers with nothing loaded and
    /// behaves as `Stopped`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "STOPPED" | "NO_MEDIA_PRESENT" => DeviceState::Stopped,
            "PAUSED_PLAYBACK" => DeviceState::Paused,
            "PLAYING" => DeviceState::Playing,
            "TRANSITIONING" => DeviceState::Transitioning,
            _ => DeviceState::Vendor(raw.trim().to_string()),
        }
    }

    /// True for `Stopped`, `Paused` and `Playing`. Everything else is a
    /// state the controller must wait out.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            DeviceState::Stopped | DeviceState::Paused | DeviceState::Playing
        )
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceState::Stopped => f.write_str("STOPPED"),
            DeviceState::Paused => f.write_str("PAUSED_PLAYBACK"),
            DeviceState::Playing => f.write_str("PLAYING"),
            DeviceState::Transitioning => f.write_str("TRANSITIONING"),
            DeviceState::Vendor(s) => f.write_str(s),
        }
    }
}

/// One poll of the remote transport.
///
/// `resource_uri` and `elapsed` are only meaningful when the state is not
/// `Stopped`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TransportSnapshot {
    pub state: DeviceState,
    pub resource_uri: String,
    pub elapsed: Duration,
}

impl TransportSnapshot {
    pub fn new(state: DeviceState, resource_uri: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            state,
            resource_uri: resource_uri.into(),
            elapsed,
        }
    }

    pub fn stopped() -> Self {
        Self::default()
    }
}

/// Result of `GetPositionInfo`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionInfo {
    pub track_uri: String,
    pub track_metadata: String,
    pub track_duration: Duration,
    pub rel_time: Duration,
}

/// A service advertised in a device description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceEndpoint {
    /// e.g. `urn:schemas-upnp-org:service:AVTransport:1`
    pub service_type: String,
    pub service_id: String,
    /// Absolute control URL
    pub control_url: String,
}

/// What a renderer tells about itself in its `description.xml`.
#[derive(Clone, Debug)]
pub struct RendererInfo {
    pub id: DeviceId,
    pub udn: String,
    pub friendly_name: String,
    pub model_name: String,
    pub manufacturer: String,
    pub location: String,
    pub services: Vec<ServiceEndpoint>,
}

impl RendererInfo {
    /// First service whose type starts with `prefix` (version-agnostic lookup).
    pub fn service(&self, prefix: &str) -> Option<&ServiceEndpoint> {
        self.services
            .iter()
            .find(|s| s.service_type.starts_with(prefix))
    }
}
