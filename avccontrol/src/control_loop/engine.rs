//! The reconciliation step.
//!
//! [`tick`] compares what the controller wants ([`PlaybackIntent`]) with two
//! consecutive observations of the renderer and issues the remote calls that
//! bring them together. It is a state machine keyed on the intent:
//!
//!   - `Stopped`: stop the device unless it already is;
//!   - `Paused`: pause the device, unless someone resumed it from outside
//!     since the last tick, in which case `Playing` is adopted;
//!   - `Playing`: make the device play the current queue item, adopting an
//!     external pause, advancing the queue when the device finished a track
//!     by itself, and skipping items the device cannot decode.
//!
//! The returned intent is the one the caller must keep. On error it is always
//! the intent that was passed in, so the same goal is retried next tick.

use std::time::Duration;

use avcsoap::error_codes::{ILLEGAL_MIME_TYPE, TRANSITION_NOT_AVAILABLE};
use tracing::{debug, warn};

use crate::didl::didl_metadata;
use crate::errors::ControlPointError;
use crate::model::{DeviceState, PlaybackIntent, TransportSnapshot};
use crate::queue::TrackQueue;
use crate::renderer::{RemoteConnectionManager, RemoteTransport};

pub fn tick(
    prev: &TransportSnapshot,
    curr: &TransportSnapshot,
    desired: PlaybackIntent,
    transport: Option<&dyn RemoteTransport>,
    manager: Option<&dyn RemoteConnectionManager>,
    queue: Option<&mut dyn TrackQueue>,
    device_changed: bool,
) -> Result<PlaybackIntent, ControlPointError> {
    let Some(transport) = transport else {
        debug!("No current transport, doing nothing");
        return Ok(desired);
    };
    let Some(queue) = queue else {
        debug!("No current queue, doing nothing");
        return Ok(desired);
    };
    if !curr.state.is_settled() {
        debug!(state = %curr.state, "Transport in transition, doing nothing");
        return Ok(desired);
    }

    match desired {
        PlaybackIntent::Stopped => {
            if curr.state != DeviceState::Stopped {
                debug!("Stopping transport");
                transport.stop()?;
            }
            Ok(PlaybackIntent::Stopped)
        }

        PlaybackIntent::Paused => {
            if curr.state == DeviceState::Paused {
                return Ok(desired);
            }
            if prev.state == DeviceState::Paused && curr.state == DeviceState::Playing {
                debug!("Transport was resumed externally, adopting Playing");
                return Ok(PlaybackIntent::Playing);
            }
            debug!("Pausing transport");
            transport.pause()?;
            Ok(desired)
        }

        PlaybackIntent::Playing => {
            tick_playing(prev, curr, desired, transport, manager, queue, device_changed)
        }
    }
}

fn tick_playing(
    prev: &TransportSnapshot,
    curr: &TransportSnapshot,
    desired: PlaybackIntent,
    transport: &dyn RemoteTransport,
    manager: Option<&dyn RemoteConnectionManager>,
    queue: &mut dyn TrackQueue,
    device_changed: bool,
) -> Result<PlaybackIntent, ControlPointError> {
    if prev.state == DeviceState::Playing && curr.state == DeviceState::Paused {
        debug!("Transport was paused externally, adopting Paused");
        return Ok(PlaybackIntent::Paused);
    }

    let Some(item) = queue.current() else {
        debug!("Reached end of queue");
        return Ok(PlaybackIntent::Stopped);
    };

    if item.has_uri(&curr.resource_uri) {
        if curr.state != DeviceState::Playing {
            debug!(state = %curr.state, "Transport URI matches, starting playback");
            transport.play()?;
        }
        return Ok(desired);
    }

    // The device moved off the item we were tracking: it finished it.
    let mut current = Some(item);
    if !device_changed
        && prev.state != DeviceState::Paused
        && current
            .as_ref()
            .is_some_and(|i| i.has_uri(&prev.resource_uri))
    {
        debug!("Controller has fallen behind, skipping track");
        current = queue.skip();
    }

    let mut seek = prev.elapsed;
    if !device_changed
        && !current
            .as_ref()
            .is_some_and(|i| i.has_uri(&curr.resource_uri))
    {
        seek = Duration::ZERO;
    }

    let manager = manager.ok_or_else(|| {
        ControlPointError::missing_capability("bound renderer", "ConnectionManager")
    })?;
    let (_, sinks) = manager.protocol_info()?;
    if sinks.is_empty() {
        return Err(ControlPointError::NoSinkProtocols);
    }

    let (item, uri) = loop {
        let Some(item) = current else {
            debug!("Reached end of queue while looking for a playable track");
            return Ok(PlaybackIntent::Stopped);
        };
        if let Some(uri) = item.resolvable_uri(&sinks) {
            let uri = uri.to_string();
            break (item, uri);
        }
        debug!(item = %item.id, title = %item.title, "No resource accepted by the transport, skipping");
        current = queue.skip();
        seek = Duration::ZERO;
    };

    if curr.state != DeviceState::Stopped {
        debug!("Temporarily stopping transport");
        match transport.stop() {
            Ok(()) => {}
            Err(err) if err.upnp_code() == Some(TRANSITION_NOT_AVAILABLE) => {
                debug!("Transport refused to stop from its current state, continuing");
            }
            Err(err) => warn!(error = %err, "Preparatory stop failed, continuing"),
        }
    }

    debug!(uri = %uri, "Setting transport URI");
    if let Err(err) = transport.set_current_uri(&uri, &didl_metadata(&item, &uri)) {
        if err.upnp_code() == Some(ILLEGAL_MIME_TYPE) {
            warn!(uri = %uri, item = %item.id, "Transport rejected a format it advertised");
        }
        return Err(err);
    }
    transport.play()?;

    if device_changed && !seek.is_zero() {
        debug!(position = ?seek, "Resuming position on the new transport");
        transport.seek(seek)?;
    }

    Ok(desired)
}
