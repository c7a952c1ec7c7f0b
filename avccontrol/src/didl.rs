//! DIDL-Lite metadata sent along with `SetAVTransportURI`.

use crate::queue::QueueItem;
use crate::time_utils::format_hhmmss;
use quick_xml::escape::escape;

/// Builds a DIDL-Lite document describing `item`, with a single `<res>`
/// pointing at `uri` (the variant chosen for the renderer).
pub fn didl_metadata(item: &QueueItem, uri: &str) -> String {
    let resource = item.resources.iter().find(|r| r.uri == uri);

    let mut xml = String::from(
        r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/">"#,
    );
    xml.push_str(&format!(
        r#"<item id="{}" parentID="-1" restricted="1">"#,
        escape(item.id.as_str())
    ));
    xml.push_str(&format!("<dc:title>{}</dc:title>", escape(item.title.as_str())));

    if let Some(artist) = item.artist.as_deref() {
        let escaped = escape(artist);
        xml.push_str(&format!("<upnp:artist>{}</upnp:artist>", escaped));
        xml.push_str(&format!("<dc:creator>{}</dc:creator>", escaped));
    }
    if let Some(album) = item.album.as_deref() {
        xml.push_str(&format!("<upnp:album>{}</upnp:album>", escape(album)));
    }

    let protocol_info = resource
        .map(|r| r.protocol_info.to_string())
        .unwrap_or_else(|| "http-get:*:*:*".to_string());
    match resource.and_then(|r| r.duration) {
        Some(duration) => xml.push_str(&format!(
            r#"<res protocolInfo="{}" duration="{}">{}</res>"#,
            escape(protocol_info.as_str()),
            format_hhmmss(duration),
            escape(uri)
        )),
        None => xml.push_str(&format!(
            r#"<res protocolInfo="{}">{}</res>"#,
            escape(protocol_info.as_str()),
            escape(uri)
        )),
    }

    xml.push_str(&format!(
        "<upnp:class>{}</upnp:class></item></DIDL-Lite>",
        escape(item.class.as_str())
    ));
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol_info::ProtocolInfo;
    use crate::queue::{MUSIC_TRACK_CLASS, Resource};
    use std::time::Duration;

    #[test]
    fn metadata_describes_chosen_resource() {
        let mut flac = Resource::new("http://nas/a.flac?x=1&y=2", ProtocolInfo::http_get("audio/flac"));
        flac.duration = Some(Duration::from_secs(185));
        let item = QueueItem {
            id: "track-1".into(),
            title: "Rock & Roll".into(),
            artist: Some("Band <live>".into()),
            album: None,
            class: MUSIC_TRACK_CLASS.into(),
            resources: vec![
                Resource::new("http://nas/a.mp3", ProtocolInfo::http_get("audio/mpeg")),
                flac,
            ],
        };

        let xml = didl_metadata(&item, "http://nas/a.flac?x=1&y=2");
        assert!(xml.contains("<dc:title>Rock &amp; Roll</dc:title>"));
        assert!(xml.contains("<upnp:artist>Band &lt;live&gt;</upnp:artist>"));
        assert!(!xml.contains("<upnp:album>"));
        assert!(xml.contains(
            r#"<res protocolInfo="http-get:*:audio/flac:*" duration="0:03:05">http://nas/a.flac?x=1&amp;y=2</res>"#
        ));
        assert!(xml.contains("<upnp:class>object.item.audioItem.musicTrack</upnp:class>"));
        assert!(!xml.contains("a.mp3"));
    }
}
