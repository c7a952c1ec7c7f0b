use std::env;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result, bail};
use avcconfig::get_config;
use avccontrol::{
    ControlLoop, DeviceIdentity, DeviceRegistry, HttpDescriptionProvider, LoopSettings,
    PlaybackIntent, QueueItem, TrackList, TrackQueue, TransportSnapshot,
    shared_queue,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// One line of the status stream printed on stdout.
#[derive(Serialize)]
struct Status {
    renderer: String,
    intent: PlaybackIntent,
    snapshot: Option<TransportSnapshot>,
    cursor: usize,
    queued: usize,
}

fn main() -> Result<()> {
    let config = get_config();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.get_log_filter()))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let mut args = env::args().skip(1);
    let Some(location) = args.next() else {
        bail!("usage: avcplayer <description-url> <media-uri>...");
    };
    let uris: Vec<String> = args.collect();
    if uris.is_empty() {
        bail!("no media URI given");
    }

    let provider = HttpDescriptionProvider::new(config.get_http_timeout(), config.get_instance_id());
    let renderer = provider
        .fetch_renderer(&location)
        .with_context(|| format!("cannot load renderer description from {location}"))?;

    let id = renderer.id();
    let mut registry = DeviceRegistry::new();
    registry.insert(Arc::new(renderer));
    let device = registry
        .get(&id)
        .with_context(|| format!("renderer {id} missing from the registry"))?;
    info!(
        renderer = %device.udn(),
        name = device.friendly_name(),
        model = device.model_name(),
        "Renderer found"
    );

    let settings = LoopSettings {
        poll_interval: config.get_poll_interval(),
    };
    let mut control = ControlLoop::spawn(settings.clone()).context("cannot start control loop")?;
    control.set_queue(Some(shared_queue(TrackList::new())));
    for uri in &uris {
        let item = QueueItem::from_uri(uri).with_context(|| format!("cannot enqueue {uri}"))?;
        control.enqueue(item)?;
    }
    control
        .set_transport(Some(Arc::clone(&device)))
        .context("renderer cannot be driven")?;
    control.play();

    loop {
        thread::sleep(settings.poll_interval);

        let (cursor, queued) = match control.queue() {
            Some(queue) => {
                let queue = queue.lock().unwrap_or_else(|e| e.into_inner());
                (queue.cursor(), queue.len())
            }
            None => (0, 0),
        };
        let status = Status {
            renderer: device.friendly_name().to_string(),
            intent: control.state(),
            snapshot: control.snapshot(),
            cursor,
            queued,
        };
        println!("{}", serde_json::to_string(&status)?);

        if status.intent == PlaybackIntent::Stopped {
            break;
        }
    }

    info!("Queue exhausted, shutting down");
    control.shutdown();
    Ok(())
}
