use tracing::debug;

use crate::errors::ControlPointError;
use crate::model::{DeviceState, TransportSnapshot};
use crate::renderer::RemoteTransport;

/// Polls the transport once.
///
/// - no transport: the zero snapshot, not an error;
/// - `GetTransportInfo` failure: the error, the sample is lost;
/// - `Stopped`: position is not queried;
/// - otherwise position is queried best-effort, a failure leaves the
///   state-only snapshot.
pub fn sample(
    transport: Option<&dyn RemoteTransport>,
) -> Result<TransportSnapshot, ControlPointError> {
    let Some(transport) = transport else {
        return Ok(TransportSnapshot::stopped());
    };

    let state = transport.transport_info()?;
    let mut snapshot = TransportSnapshot {
        state,
        ..Default::default()
    };

    if snapshot.state != DeviceState::Stopped {
        match transport.position_info() {
            Ok(position) => {
                snapshot.resource_uri = position.track_uri;
                snapshot.elapsed = position.rel_time;
            }
            Err(err) => {
                debug!(error = %err, state = %snapshot.state, "Position unavailable, keeping state only");
            }
        }
    }

    Ok(snapshot)
}
