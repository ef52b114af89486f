use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{interval, Duration, Interval};

use crate::store::StatusField;

pub enum AppEvent {
    Input(Event),
    Status(StatusField),
    Tick,
}

pub struct EventHandler {
    event_stream: EventStream,
    tick_interval: Interval,
    status_rx: UnboundedReceiver<StatusField>,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64, status_rx: UnboundedReceiver<StatusField>) -> Self {
        Self {
            event_stream: EventStream::new(),
            tick_interval: interval(Duration::from_millis(tick_rate_ms)),
            status_rx,
        }
    }

    pub async fn next(&mut self) -> AppEvent {
        tokio::select! {
            _ = self.tick_interval.tick() => AppEvent::Tick,
            Some(field) = self.status_rx.recv() => AppEvent::Status(field),
            event = self.event_stream.next() => {
                match event {
                    Some(Ok(evt)) => AppEvent::Input(evt),
                    _ => AppEvent::Tick, // Fallback to tick on error or None
                }
            }
        }
    }
}
