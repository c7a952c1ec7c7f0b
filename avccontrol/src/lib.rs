pub mod control_loop;
pub mod didl;
pub mod errors;
pub mod model;
pub mod protocol_info;
pub mod provider;
pub mod queue;
pub mod renderer;
pub mod time_utils;
pub mod upnp_clients;

#[cfg(test)]
mod testing;

pub use control_loop::{ControlLoop, Driver, LoopSettings, sample, tick};
pub use errors::ControlPointError;
pub use model::{
    DeviceId, DeviceState, PlaybackIntent, PositionInfo, RendererInfo, ServiceEndpoint,
    TransportSnapshot,
};
pub use protocol_info::ProtocolInfo;
pub use provider::{DescriptionError, HttpDescriptionProvider};
pub use queue::{
    QueueItem, Resource, SharedQueue, ShuffledTrackList, TrackList, TrackQueue, shared_queue,
};
pub use renderer::{
    BoundRenderer, DeviceIdentity, DeviceRegistry, RemoteConnectionManager, RemoteTransport,
    RendererDevice, UpnpRenderer,
};
pub use upnp_clients::{AvTransportClient, ConnectionManagerClient};
