use crate::errors::ControlPointError;
use crate::protocol_info::ProtocolInfo;
use serde::Serialize;
use std::time::Duration;

/// One way to fetch a queue item: a URI plus the format it is served in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub uri: String,
    #[serde(serialize_with = "serialize_protocol_info")]
    pub protocol_info: ProtocolInfo,
    pub duration: Option<Duration>,
}

fn serialize_protocol_info<S: serde::Serializer>(
    info: &ProtocolInfo,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(info)
}

impl Resource {
    pub fn new(uri: impl Into<String>, protocol_info: ProtocolInfo) -> Self {
        Self {
            uri: uri.into(),
            protocol_info,
            duration: None,
        }
    }
}

/// A playable unit of the queue, as it would come out of a DIDL-Lite
/// `<item>`: descriptive metadata plus its resource variants in declaration
/// order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QueueItem {
    pub id: String,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// UPnP class, e.g. `object.item.audioItem.musicTrack`
    pub class: String,
    pub resources: Vec<Resource>,
}

pub const MUSIC_TRACK_CLASS: &str = "object.item.audioItem.musicTrack";

impl QueueItem {
    /// Builds a single-resource item from a bare URI, guessing the
    /// protocolInfo from the extension and the title from the last path
    /// segment.
    pub fn from_uri(uri: &str) -> Result<Self, ControlPointError> {
        let protocol_info = ProtocolInfo::for_uri(uri)?;
        let path = uri.split(['?', '#']).next().unwrap_or(uri);
        let title = path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(uri)
            .to_string();

        Ok(Self {
            id: uri.to_string(),
            title,
            artist: None,
            album: None,
            class: MUSIC_TRACK_CLASS.to_string(),
            resources: vec![Resource::new(uri, protocol_info)],
        })
    }

    /// True iff one of the resource variants is served at `uri`.
    pub fn has_uri(&self, uri: &str) -> bool {
        self.resources.iter().any(|r| r.uri == uri)
    }

    /// First resource, in declaration order, whose format is accepted by one
    /// of `sinks`.
    pub fn resolvable_resource(&self, sinks: &[ProtocolInfo]) -> Option<&Resource> {
        self.resources
            .iter()
            .find(|r| sinks.iter().any(|sink| r.protocol_info.matches(sink)))
    }

    pub fn resolvable_uri(&self, sinks: &[ProtocolInfo]) -> Option<&str> {
        self.resolvable_resource(sinks).map(|r| r.uri.as_str())
    }
}
