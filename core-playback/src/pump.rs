//! Device event pump

use bridge_traits::playback::DeviceEvent;
use futures::{Stream, StreamExt};
use tracing::debug;

use crate::engine::PlaybackEngine;

/// Feed device events into `engine` until the stream ends.
///
/// Returns the number of events delivered. Hosts spawn this next to the
/// engine with the receiving half of their device event channel.
pub async fn pump_device_events<S>(engine: &PlaybackEngine, events: S) -> usize
where
    S: Stream<Item = DeviceEvent>,
{
    futures::pin_mut!(events);

    let mut delivered = 0;
    while let Some(event) = events.next().await {
        engine.handle_device_event(event);
        delivered += 1;
    }

    debug!(delivered, "Device event stream closed");
    delivered
}
