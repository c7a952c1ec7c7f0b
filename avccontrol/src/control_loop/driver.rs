use std::sync::{Arc, Mutex};
use std::thread;

use tracing::{debug, info, warn};

use super::{LoopState, lock, sample, tick};
use crate::model::{DeviceId, TransportSnapshot};
use crate::renderer::BoundRenderer;

/// Single-threaded side of the control loop.
///
/// Owns the previous observation and the previous binding; everything the
/// operator can change is read from the shared [`LoopState`] at the start of
/// each iteration.
pub struct Driver {
    state: Arc<Mutex<LoopState>>,
    prev: TransportSnapshot,
    prev_renderer: Option<BoundRenderer>,
    // A swap was seen but no engine call has consumed it yet.
    pending_change: bool,
}

impl Driver {
    pub(crate) fn new(state: Arc<Mutex<LoopState>>) -> Self {
        let prev_renderer = lock(&state).renderer.clone();
        Self {
            state,
            prev: TransportSnapshot::stopped(),
            prev_renderer,
            pending_change: false,
        }
    }

    /// Last snapshot handed to the engine.
    pub fn previous(&self) -> &TransportSnapshot {
        &self.prev
    }

    /// One reconciliation step.
    pub fn iterate(&mut self) {
        let (desired, renderer, queue) = {
            let state = lock(&self.state);
            (state.desired, state.renderer.clone(), state.queue.clone())
        };

        let current_id = renderer.as_ref().map(BoundRenderer::id);
        let previous_id = self.prev_renderer.as_ref().map(BoundRenderer::id);
        if current_id != previous_id {
            debug!(
                from = ?previous_id.as_ref().map(|id| id.to_string()),
                to = ?current_id.as_ref().map(|id| id.to_string()),
                "Bound renderer changed"
            );
            if let Some(old) = self.prev_renderer.take() {
                stop_superseded(old);
            }
            self.pending_change = true;
        }
        self.prev_renderer = renderer.clone();

        let Some(renderer) = renderer else {
            return;
        };

        let curr = match sample(Some(renderer.transport())) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(renderer = %renderer.id(), error = %err, "Cannot sample transport, skipping tick");
                return;
            }
        };

        let device_changed = self.pending_change;
        let result = match &queue {
            Some(queue) => {
                let mut queue = lock(queue.as_ref());
                tick(
                    &self.prev,
                    &curr,
                    desired,
                    Some(renderer.transport()),
                    Some(renderer.manager()),
                    Some(&mut *queue),
                    device_changed,
                )
            }
            None => tick(
                &self.prev,
                &curr,
                desired,
                Some(renderer.transport()),
                Some(renderer.manager()),
                None,
                device_changed,
            ),
        };
        self.pending_change = false;

        match result {
            Ok(next) if next != desired => {
                let mut state = lock(&self.state);
                if state.desired == desired {
                    debug!(from = %desired, to = %next, "Adopting playback intent");
                    state.desired = next;
                } else {
                    debug!(
                        adopted = %next,
                        requested = %state.desired,
                        "Intent changed during tick, keeping the requested one"
                    );
                }
            }
            Ok(_) => {}
            Err(err) => {
                warn!(renderer = %renderer.id(), intent = %desired, error = %err, "Reconciliation failed");
            }
        }

        lock(&self.state).last_snapshot = Some(curr.clone());
        self.prev = curr;
    }
}

/// Stops a renderer that is no longer bound without holding up the loop.
fn stop_superseded(old: BoundRenderer) {
    let id: DeviceId = old.id();
    let spawned = thread::Builder::new()
        .name("avc-stop-superseded".into())
        .spawn(move || match old.transport().stop() {
            Ok(()) => info!(renderer = %id, "Stopped superseded renderer"),
            Err(err) => warn!(renderer = %id, error = %err, "Cannot stop superseded renderer"),
        });

    if let Err(err) = spawned {
        warn!(error = %err, "Cannot spawn thread to stop superseded renderer");
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::errors::ControlPointError;
    use crate::model::{DeviceState, PlaybackIntent, PositionInfo};
    use crate::queue::{QueueItem, TrackList, shared_queue};
    use crate::renderer::{DeviceIdentity, RemoteConnectionManager, RemoteTransport, RendererDevice};
    use crate::testing::{Call, CallLog, FakeDevice, FakeManager, RecordingTransport, mp3, track};

    fn state_with(device: &Arc<FakeDevice>, items: Vec<QueueItem>) -> Arc<Mutex<LoopState>> {
        let renderer = BoundRenderer::bind(Arc::clone(device) as Arc<dyn RendererDevice>).unwrap();
        Arc::new(Mutex::new(LoopState {
            desired: PlaybackIntent::Playing,
            renderer: Some(renderer),
            queue: Some(shared_queue(TrackList::from_items(items))),
            last_snapshot: None,
        }))
    }

    fn wait_for(transport: &RecordingTransport, call: Call) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if transport.calls().contains(&call) {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn starts_first_track_and_records_snapshot() {
        let device = Arc::new(FakeDevice::new("uuid:a", "A"));
        let state = state_with(&device, vec![track("http://h/1.mp3", mp3())]);
        let mut driver = Driver::new(Arc::clone(&state));

        driver.iterate();

        let calls = device.recorder().calls();
        assert!(calls.contains(&Call::SetCurrentUri("http://h/1.mp3".into())));
        assert_eq!(calls.last(), Some(&Call::Play));
        assert_eq!(
            lock(&state).last_snapshot,
            Some(TransportSnapshot::stopped())
        );
    }

    #[test]
    fn sampling_failure_keeps_previous_snapshot() {
        let device = Arc::new(FakeDevice::new("uuid:a", "A"));
        let state = state_with(&device, vec![track("http://h/1.mp3", mp3())]);
        let mut driver = Driver::new(Arc::clone(&state));

        device.recorder().set_state(DeviceState::Playing, "http://h/1.mp3", Duration::from_secs(4));
        driver.iterate();
        assert_eq!(driver.previous().elapsed, Duration::from_secs(4));

        device.recorder().fail("TransportInfo");
        driver.iterate();
        assert_eq!(driver.previous().elapsed, Duration::from_secs(4));
        assert_eq!(lock(&state).desired, PlaybackIntent::Playing);
    }

    #[test]
    fn exhausted_queue_adopts_stopped() {
        let device = Arc::new(FakeDevice::new("uuid:a", "A"));
        let state = state_with(&device, Vec::new());
        let mut driver = Driver::new(Arc::clone(&state));

        driver.iterate();
        assert_eq!(lock(&state).desired, PlaybackIntent::Stopped);
    }

    #[test]
    fn unbinding_stops_the_old_renderer() {
        let device = Arc::new(FakeDevice::new("uuid:a", "A"));
        let state = state_with(&device, Vec::new());
        let mut driver = Driver::new(Arc::clone(&state));

        lock(&state).renderer = None;
        driver.iterate();

        assert!(wait_for(&device.recorder(), Call::Stop));
        assert!(!device.recorder().calls().contains(&Call::TransportInfo));
    }

    #[test]
    fn rebinding_same_udn_is_not_a_change() {
        let device = Arc::new(FakeDevice::new("uuid:a", "A"));
        let state = state_with(&device, Vec::new());
        let mut driver = Driver::new(Arc::clone(&state));

        let again = Arc::new(FakeDevice::new("uuid:a", "A again"));
        lock(&state).renderer =
            Some(BoundRenderer::bind(Arc::clone(&again) as Arc<dyn RendererDevice>).unwrap());
        driver.iterate();

        thread::sleep(Duration::from_millis(50));
        assert!(!device.recorder().calls().contains(&Call::Stop));
    }

    #[test]
    fn swap_seen_during_failed_sample_still_seeks() {
        let kitchen = Arc::new(FakeDevice::new("uuid:a", "Kitchen"));
        let state = state_with(&kitchen, vec![track("http://h/1.mp3", mp3())]);
        let mut driver = Driver::new(Arc::clone(&state));

        kitchen
            .recorder()
            .set_state(DeviceState::Playing, "http://h/1.mp3", Duration::from_secs(30));
        driver.iterate();

        let office = Arc::new(FakeDevice::new("uuid:b", "Office"));
        office.recorder().fail("TransportInfo");
        lock(&state).renderer =
            Some(BoundRenderer::bind(Arc::clone(&office) as Arc<dyn RendererDevice>).unwrap());
        driver.iterate();
        assert!(!office.recorder().calls().contains(&Call::Play));

        office.recorder().failing.lock().unwrap().clear();
        driver.iterate();

        let calls = office.recorder().calls();
        assert!(calls.contains(&Call::SetCurrentUri("http://h/1.mp3".into())));
        assert_eq!(calls.last(), Some(&Call::Seek(Duration::from_secs(30))));
        assert!(wait_for(&kitchen.recorder(), Call::Stop));
    }

    /// Issues an operator `Stop` while the driver is polling the position.
    struct StopDuringPoll {
        inner: RecordingTransport,
        state: Mutex<Option<Arc<Mutex<LoopState>>>>,
    }

    impl RemoteTransport for StopDuringPoll {
        fn play(&self) -> Result<(), ControlPointError> {
            self.inner.play()
        }

        fn pause(&self) -> Result<(), ControlPointError> {
            self.inner.pause()
        }

        fn stop(&self) -> Result<(), ControlPointError> {
            self.inner.stop()
        }

        fn seek(&self, position: Duration) -> Result<(), ControlPointError> {
            self.inner.seek(position)
        }

        fn set_current_uri(&self, uri: &str, metadata: &str) -> Result<(), ControlPointError> {
            self.inner.set_current_uri(uri, metadata)
        }

        fn transport_info(&self) -> Result<DeviceState, ControlPointError> {
            self.inner.transport_info()
        }

        fn position_info(&self) -> Result<PositionInfo, ControlPointError> {
            if let Some(state) = self.state.lock().unwrap().as_ref() {
                lock(state).desired = PlaybackIntent::Stopped;
            }
            self.inner.position_info()
        }
    }

    struct InterferingDevice {
        transport: Arc<StopDuringPoll>,
        manager: Arc<FakeManager>,
    }

    impl DeviceIdentity for InterferingDevice {
        fn id(&self) -> DeviceId {
            DeviceId("uuid:busy".into())
        }

        fn udn(&self) -> &str {
            "uuid:busy"
        }

        fn friendly_name(&self) -> &str {
            "Busy"
        }
    }

    impl RendererDevice for InterferingDevice {
        fn transport(&self) -> Option<Arc<dyn RemoteTransport>> {
            Some(Arc::clone(&self.transport) as Arc<dyn RemoteTransport>)
        }

        fn connection_manager(&self) -> Option<Arc<dyn RemoteConnectionManager>> {
            Some(Arc::clone(&self.manager) as Arc<dyn RemoteConnectionManager>)
        }
    }

    #[test]
    fn operator_command_during_tick_beats_adoption() {
        let log = CallLog::default();
        let device = Arc::new(InterferingDevice {
            transport: Arc::new(StopDuringPoll {
                inner: RecordingTransport::with_log(log.clone()),
                state: Mutex::new(None),
            }),
            manager: Arc::new(FakeManager::with_log(log, vec![mp3()])),
        });
        let renderer = BoundRenderer::bind(Arc::clone(&device) as Arc<dyn RendererDevice>).unwrap();
        let state = Arc::new(Mutex::new(LoopState {
            desired: PlaybackIntent::Playing,
            renderer: Some(renderer),
            queue: Some(shared_queue(TrackList::from_items(vec![track(
                "http://h/1.mp3",
                mp3(),
            )]))),
            last_snapshot: None,
        }));
        let mut driver = Driver::new(Arc::clone(&state));

        device
            .transport
            .inner
            .set_state(DeviceState::Playing, "http://h/1.mp3", Duration::from_secs(5));
        driver.iterate();
        assert_eq!(lock(&state).desired, PlaybackIntent::Playing);

        // Paused on the device: the engine wants to adopt Paused.
        device
            .transport
            .inner
            .set_state(DeviceState::Paused, "http://h/1.mp3", Duration::from_secs(6));
        *device.transport.state.lock().unwrap() = Some(Arc::clone(&state));
        driver.iterate();

        assert_eq!(lock(&state).desired, PlaybackIntent::Stopped);
    }

    #[test]
    fn adoption_is_stored_without_interference() {
        let device = Arc::new(FakeDevice::new("uuid:a", "A"));
        let state = state_with(&device, vec![track("http://h/1.mp3", mp3())]);
        let mut driver = Driver::new(Arc::clone(&state));

        device
            .recorder()
            .set_state(DeviceState::Playing, "http://h/1.mp3", Duration::from_secs(5));
        driver.iterate();
        device
            .recorder()
            .set_state(DeviceState::Paused, "http://h/1.mp3", Duration::from_secs(6));
        driver.iterate();

        assert_eq!(lock(&state).desired, PlaybackIntent::Paused);
    }
}
