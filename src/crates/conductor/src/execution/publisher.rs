//! Status stream publisher
//!
//! Fans execution-update events out to the callers awaiting a given
//! execution identifier, preserving emission order. Each execution gets its
//! own broadcast channel; a lagging subscriber loses the oldest buffered
//! events (drop-oldest backpressure) and never blocks the coordinator or
//! other subscribers. The channel is torn down when the terminal event is
//! published, so re-subscribing after completion yields nothing; late
//! readers recover the latest state through the record store instead.

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;

use crate::model::ExecutionUpdateEvent;

/// Per-execution fan-out of status transition events
pub struct StatusPublisher {
    channels: DashMap<String, broadcast::Sender<ExecutionUpdateEvent>>,
    capacity: usize,
}

impl StatusPublisher {
    /// Create a publisher whose per-subscriber buffers hold `capacity` events
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Open the event channel for a new execution and return its first
    /// receiver.
    ///
    /// Called before the coordinator starts emitting, so the returned
    /// receiver observes every transition of the run.
    pub fn register(&self, execution_id: &str) -> broadcast::Receiver<ExecutionUpdateEvent> {
        let (tx, rx) = broadcast::channel(self.capacity);
        self.channels.insert(execution_id.to_string(), tx);
        rx
    }

    /// Subscribe to a live execution.
    ///
    /// Returns None once the run has reached a terminal status (or was never
    /// registered); the sequence is not restartable.
    pub fn subscribe(
        &self,
        execution_id: &str,
    ) -> Option<broadcast::Receiver<ExecutionUpdateEvent>> {
        self.channels.get(execution_id).map(|tx| tx.subscribe())
    }

    /// Deliver an event to all current subscribers of the execution.
    ///
    /// Returns the number of subscribers reached. Publishing the terminal
    /// event closes the channel.
    pub fn publish(&self, execution_id: &str, event: ExecutionUpdateEvent) -> usize {
        let terminal = event.status.is_terminal();

        let delivered = if let Some(tx) = self.channels.get(execution_id) {
            tx.send(event).unwrap_or(0)
        } else {
            0
        };

        if terminal {
            self.channels.remove(execution_id);
            debug!("closed status stream for execution {}", execution_id);
        }

        delivered
    }

    /// Number of executions currently streaming
    pub fn active_streams(&self) -> usize {
        self.channels.len()
    }
}
