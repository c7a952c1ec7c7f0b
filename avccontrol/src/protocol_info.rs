//! UPnP AV `protocolInfo` strings (`protocol:network:contentFormat:additionalInfo`).

use crate::errors::ControlPointError;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

pub const PROTOCOL_HTTP_GET: &str = "http-get";
pub const PROTOCOL_RTSP_RTP_UDP: &str = "rtsp-rtp-udp";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProtocolInfo {
    pub protocol: String,
    /// `*` for http-get and rtsp-rtp-udp
    pub network: String,
    /// MIME type for http-get, RTP payload type for rtsp-rtp-udp
    pub content_format: String,
    /// Often `*`, DLNA puts its `DLNA.ORG_*` flags here
    pub additional_info: String,
}

impl ProtocolInfo {
    pub fn new(protocol: &str, network: &str, content_format: &str, additional_info: &str) -> Self {
        Self {
            protocol: protocol.to_string(),
            network: network.to_string(),
            content_format: content_format.to_string(),
            additional_info: additional_info.to_string(),
        }
    }

    /// `http-get:*:<mime>:*` for a MIME type.
    pub fn http_get(mime: &str) -> Self {
        Self::new(PROTOCOL_HTTP_GET, "*", mime, "*")
    }

    /// Guesses the protocolInfo of an HTTP resource from its file extension.
    pub fn for_uri(uri: &str) -> Result<Self, ControlPointError> {
        let ext = extension_of(uri).ok_or_else(|| {
            ControlPointError::InvalidProtocolInfo(format!("no file extension in {}", uri))
        })?;
        let mime = mime_for_extension(&ext).ok_or_else(|| {
            ControlPointError::InvalidProtocolInfo(format!("unknown MIME type for {}", uri))
        })?;
        Ok(Self::http_get(mime))
    }

    /// Compatibility test used when negotiating with a renderer: only
    /// protocol, network and content format take part.
    pub fn matches(&self, other: &ProtocolInfo) -> bool {
        self.protocol == other.protocol
            && self.network == other.network
            && self.content_format == other.content_format
    }
}

impl FromStr for ProtocolInfo {
    type Err = ControlPointError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = raw.trim().split(':').collect();
        match parts.as_slice() {
            [protocol, network, content_format, additional_info] => Ok(ProtocolInfo::new(
                protocol,
                network,
                content_format,
                additional_info,
            )),
            _ => Err(ControlPointError::InvalidProtocolInfo(format!(
                "{} has {} parts, expected 4",
                raw,
                parts.len()
            ))),
        }
    }
}

impl fmt::Display for ProtocolInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let network = if self.network.is_empty() { "*" } else { &self.network };
        let additional = if self.additional_info.is_empty() {
            "*"
        } else {
            &self.additional_info
        };
        write!(
            f,
            "{}:{}:{}:{}",
            self.protocol, network, self.content_format, additional
        )
    }
}

/// Parses a comma separated `GetProtocolInfo` list. Invalid entries are
/// logged and skipped.
pub fn parse_protocol_info_list(raw: &str) -> Vec<ProtocolInfo> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|entry| match entry.parse::<ProtocolInfo>() {
            Ok(info) => Some(info),
            Err(err) => {
                warn!(entry, error = %err, "Skipping invalid protocolInfo");
                None
            }
        })
        .collect()
}

fn extension_of(uri: &str) -> Option<String> {
    let path = uri.split(['?', '#']).next().unwrap_or(uri);
    let segment = path.rsplit('/').next().unwrap_or(path);
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn mime_for_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext {
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "ogg" | "oga" => "audio/ogg",
        "opus" => "audio/opus",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => return None,
    };
    Some(mime)
}
