//! Background reconciliation of one renderer against the controller's intent.
//!
//! [`ControlLoop`] is the operator-facing handle: commands only touch the
//! shared loop state, never the network. A single [`Driver`], running on its
//! own thread, samples the bound renderer once per poll interval and hands
//! the observation to the engine ([`tick`]).

mod driver;
mod engine;
mod sampler;

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Sender, bounded, select};
use tracing::{debug, info, warn};

use crate::errors::ControlPointError;
use crate::model::{PlaybackIntent, TransportSnapshot};
use crate::queue::{QueueItem, SharedQueue};
use crate::renderer::{BoundRenderer, DeviceIdentity, RendererDevice};

pub use driver::Driver;
pub use engine::tick;
pub use sampler::sample;

#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub poll_interval: Duration,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// State shared between operator commands and the driver.
#[derive(Default)]
pub(crate) struct LoopState {
    pub(crate) desired: PlaybackIntent,
    pub(crate) renderer: Option<BoundRenderer>,
    pub(crate) queue: Option<SharedQueue>,
    pub(crate) last_snapshot: Option<TransportSnapshot>,
}

pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle on the control loop.
///
/// Built idle with [`ControlLoop::new`] (drive it by hand through
/// [`ControlLoop::driver`]) or running with [`ControlLoop::spawn`].
pub struct ControlLoop {
    state: Arc<Mutex<LoopState>>,
    settings: LoopSettings,
    shutdown_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ControlLoop {
    pub fn new(settings: LoopSettings) -> Self {
        Self {
            state: Arc::new(Mutex::new(LoopState::default())),
            settings,
            shutdown_tx: None,
            handle: None,
        }
    }

    /// Starts the driver thread, ticking every `settings.poll_interval`.
    pub fn spawn(settings: LoopSettings) -> io::Result<Self> {
        let mut control = Self::new(settings);
        let mut driver = control.driver();
        let interval = control.settings.poll_interval;
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("avc-control-loop".into())
            .spawn(move || {
                let ticker = crossbeam_channel::tick(interval);
                loop {
                    select! {
                        recv(ticker) -> _ => driver.iterate(),
                        recv(shutdown_rx) -> _ => break,
                    }
                }
                debug!("Control loop thread exiting");
            })?;

        info!(interval = ?interval, "Control loop started");
        control.shutdown_tx = Some(shutdown_tx);
        control.handle = Some(handle);
        Ok(control)
    }

    /// A driver over this loop's state. Only one driver must run at a time.
    pub fn driver(&self) -> Driver {
        Driver::new(Arc::clone(&self.state))
    }

    pub fn settings(&self) -> &LoopSettings {
        &self.settings
    }

    pub fn play(&self) {
        self.set_intent(PlaybackIntent::Playing);
    }

    pub fn pause(&self) {
        self.set_intent(PlaybackIntent::Paused);
    }

    pub fn stop(&self) {
        self.set_intent(PlaybackIntent::Stopped);
    }

    fn set_intent(&self, intent: PlaybackIntent) {
        debug!(intent = %intent, "Operator intent");
        lock(&self.state).desired = intent;
    }

    pub fn state(&self) -> PlaybackIntent {
        lock(&self.state).desired
    }

    pub fn set_queue(&self, queue: Option<SharedQueue>) {
        lock(&self.state).queue = queue;
    }

    pub fn queue(&self) -> Option<SharedQueue> {
        lock(&self.state).queue.clone()
    }

    /// Binds `device`, or unbinds with `None`. A device lacking AVTransport
    /// or ConnectionManager is rejected and the current binding is kept.
    pub fn set_transport(
        &self,
        device: Option<Arc<dyn RendererDevice>>,
    ) -> Result<(), ControlPointError> {
        let renderer = device.map(BoundRenderer::bind).transpose()?;
        match &renderer {
            Some(r) => info!(renderer = %r.id(), name = r.device().friendly_name(), "Renderer bound"),
            None => info!("Renderer unbound"),
        }
        lock(&self.state).renderer = renderer;
        Ok(())
    }

    pub fn transport(&self) -> Option<Arc<dyn RendererDevice>> {
        lock(&self.state)
            .renderer
            .as_ref()
            .map(|r| Arc::clone(r.device()))
    }

    /// Appends to the bound queue.
    pub fn enqueue(&self, item: QueueItem) -> Result<(), ControlPointError> {
        let queue = self
            .queue()
            .ok_or_else(|| ControlPointError::QueueError("no queue bound".into()))?;
        debug!(item = %item.id, title = %item.title, "Enqueue");
        lock(queue.as_ref()).append(item);
        Ok(())
    }

    /// Last observation of the bound renderer, if any tick got that far.
    pub fn snapshot(&self) -> Option<TransportSnapshot> {
        lock(&self.state).last_snapshot.clone()
    }

    /// Stops the driver thread and waits for the tick in progress, if any.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.try_send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Control loop thread panicked");
            }
        }
    }
}

impl Drop for ControlLoop {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.try_send(());
        }
    }
}
