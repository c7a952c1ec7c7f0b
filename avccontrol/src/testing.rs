//! Recording fakes of the renderer capabilities, for unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use avcsoap::SoapError;

use crate::errors::ControlPointError;
use crate::model::{DeviceId, DeviceState, PositionInfo};
use crate::protocol_info::ProtocolInfo;
use crate::queue::{QueueItem, Resource};
use crate::renderer::{DeviceIdentity, RemoteConnectionManager, RemoteTransport, RendererDevice};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Play,
    Pause,
    Stop,
    Seek(Duration),
    SetCurrentUri(String),
    TransportInfo,
    PositionInfo,
    ProtocolInfo,
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

fn failure(name: &str) -> ControlPointError {
    ControlPointError::remote_action(name, SoapError::MissingResponse(name.to_string()))
}

#[derive(Default)]
pub struct RecordingTransport {
    pub log: CallLog,
    pub state: Mutex<DeviceState>,
    pub position: Mutex<PositionInfo>,
    /// Names of the calls that must fail ("Play", "TransportInfo", ...)
    pub failing: Mutex<Vec<&'static str>>,
}

impl RecordingTransport {
    pub fn with_log(log: CallLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    pub fn set_state(&self, state: DeviceState, uri: &str, elapsed: Duration) {
        *self.state.lock().unwrap() = state;
        let mut position = self.position.lock().unwrap();
        position.track_uri = uri.to_string();
        position.rel_time = elapsed;
    }

    pub fn fail(&self, name: &'static str) {
        self.failing.lock().unwrap().push(name);
    }

    fn record(&self, name: &'static str, call: Call) -> Result<(), ControlPointError> {
        self.log.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(&name) {
            return Err(failure(name));
        }
        Ok(())
    }
}

impl RemoteTransport for RecordingTransport {
    fn play(&self) -> Result<(), ControlPointError> {
        self.record("Play", Call::Play)
    }

    fn pause(&self) -> Result<(), ControlPointError> {
        self.record("Pause", Call::Pause)
    }

    fn stop(&self) -> Result<(), ControlPointError> {
        self.record("Stop", Call::Stop)
    }

    fn seek(&self, position: Duration) -> Result<(), ControlPointError> {
        self.record("Seek", Call::Seek(position))
    }

    fn set_current_uri(&self, uri: &str, _metadata: &str) -> Result<(), ControlPointError> {
        self.record("SetCurrentUri", Call::SetCurrentUri(uri.to_string()))
    }

    fn transport_info(&self) -> Result<DeviceState, ControlPointError> {
        self.record("TransportInfo", Call::TransportInfo)?;
        Ok(self.state.lock().unwrap().clone())
    }

    fn position_info(&self) -> Result<PositionInfo, ControlPointError> {
        self.record("PositionInfo", Call::PositionInfo)?;
        Ok(self.position.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct FakeManager {
    pub log: CallLog,
    pub sinks: Mutex<Vec<ProtocolInfo>>,
    pub failing: Mutex<bool>,
}

impl FakeManager {
    pub fn with_log(log: CallLog, sinks: Vec<ProtocolInfo>) -> Self {
        Self {
            log,
            sinks: Mutex::new(sinks),
            failing: Mutex::new(false),
        }
    }
}

impl RemoteConnectionManager for FakeManager {
    fn protocol_info(
        &self,
    ) -> Result<(Vec<ProtocolInfo>, Vec<ProtocolInfo>), ControlPointError> {
        self.log.lock().unwrap().push(Call::ProtocolInfo);
        if *self.failing.lock().unwrap() {
            return Err(failure("ProtocolInfo"));
        }
        Ok((Vec::new(), self.sinks.lock().unwrap().clone()))
    }
}

pub struct FakeDevice {
    pub udn: String,
    pub name: String,
    pub transport: Option<Arc<RecordingTransport>>,
    pub manager: Option<Arc<FakeManager>>,
}

impl FakeDevice {
    /// A renderer with both capabilities, sharing one call log, accepting
    /// `audio/mpeg` over http-get.
    pub fn new(udn: &str, name: &str) -> Self {
        let log = CallLog::default();
        Self {
            udn: udn.to_string(),
            name: name.to_string(),
            transport: Some(Arc::new(RecordingTransport::with_log(log.clone()))),
            manager: Some(Arc::new(FakeManager::with_log(log, vec![mp3()]))),
        }
    }

    pub fn without_transport(mut self) -> Self {
        self.transport = None;
        self
    }

    pub fn without_manager(mut self) -> Self {
        self.manager = None;
        self
    }

    pub fn recorder(&self) -> Arc<RecordingTransport> {
        self.transport.clone().unwrap()
    }
}

impl DeviceIdentity for FakeDevice {
    fn id(&self) -> DeviceId {
        DeviceId(self.udn.clone())
    }

    fn udn(&self) -> &str {
        &self.udn
    }

    fn friendly_name(&self) -> &str {
        &self.name
    }
}

impl RendererDevice for FakeDevice {
    fn transport(&self) -> Option<Arc<dyn RemoteTransport>> {
        self.transport
            .clone()
            .map(|t| t as Arc<dyn RemoteTransport>)
    }

    fn connection_manager(&self) -> Option<Arc<dyn RemoteConnectionManager>> {
        self.manager
            .clone()
            .map(|m| m as Arc<dyn RemoteConnectionManager>)
    }
}

pub fn mp3() -> ProtocolInfo {
    ProtocolInfo::http_get("audio/mpeg")
}

pub fn flac() -> ProtocolInfo {
    ProtocolInfo::http_get("audio/flac")
}

/// An item with one resource served at `uri` in `format`.
pub fn track(uri: &str, format: ProtocolInfo) -> QueueItem {
    QueueItem {
        id: uri.to_string(),
        title: uri.to_string(),
        resources: vec![Resource::new(uri, format)],
        ..Default::default()
    }
}
