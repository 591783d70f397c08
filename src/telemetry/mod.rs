//! Live telemetry channel for running server instances.
//!
//! A running server emits three kinds of events to its observers: console
//! output lines, lifecycle transitions, and resource-usage samples. The
//! [`Envelope`] is the tagged wire form carried over the live channel;
//! consumers dispatch on the variant before touching the payload.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Buffered messages per subscriber before drops begin.
pub const SUBSCRIBER_BUFFER: usize = 100;

/// Console lines retained for late subscribers.
const LOG_HISTORY_LIMIT: usize = 100;

/// Lifecycle state of a managed server process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerStatus {
    /// Process is not running.
    Stopped,
    /// Process launched, not yet accepting players.
    Starting,
    /// Process is up.
    Running,
    /// Shutdown in progress.
    Stopping,
}

/// A resource-usage sample from a running server process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsSample {
    /// CPU utilization, percent normalized across cores.
    pub cpu: f64,
    /// Current resident memory, bytes.
    pub ram: u64,
    /// Configured maximum memory, bytes.
    pub ram_max: u64,
}

/// A tagged telemetry message, serialized as `{"type": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Envelope {
    /// A free-form line of process output.
    Log(String),
    /// A lifecycle state transition.
    Status(ServerStatus),
    /// A resource-usage sample.
    Stats(StatsSample),
}

/// Fan-out point between one server process and its observers.
///
/// Subscribers receive every envelope published after they subscribe, up
/// to their buffer capacity; a subscriber that falls more than
/// [`SUBSCRIBER_BUFFER`] messages behind loses messages rather than
/// stalling the process reader. The hub also tracks the current lifecycle
/// state and keeps a bounded console history for late joiners.
pub struct TelemetryHub {
    inner: Mutex<HubState>,
}

struct HubState {
    subscribers: Vec<mpsc::Sender<Envelope>>,
    status: ServerStatus,
    log_history: VecDeque<String>,
}

impl TelemetryHub {
    /// Create a hub for a stopped server.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HubState {
                subscribers: Vec::new(),
                status: ServerStatus::Stopped,
                log_history: VecDeque::new(),
            }),
        }
    }

    /// Subscribe to the live channel.
    ///
    /// Dropping the receiver unsubscribes; the hub prunes closed
    /// subscribers on the next publish.
    pub fn subscribe(&self) -> mpsc::Receiver<Envelope> {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        self.lock().subscribers.push(tx);
        rx
    }

    /// Current lifecycle state.
    pub fn status(&self) -> ServerStatus {
        self.lock().status
    }

    /// Record a lifecycle transition and broadcast it.
    pub fn set_status(&self, status: ServerStatus) {
        let mut state = self.lock();
        state.status = status;
        Self::broadcast(&mut state, Envelope::Status(status));
    }

    /// Record a console line and broadcast it.
    pub fn publish_log(&self, line: impl Into<String>) {
        let line = line.into();
        let mut state = self.lock();

        state.log_history.push_back(line.clone());
        while state.log_history.len() > LOG_HISTORY_LIMIT {
            state.log_history.pop_front();
        }

        Self::broadcast(&mut state, Envelope::Log(line));
    }

    /// Broadcast a resource-usage sample.
    pub fn publish_stats(&self, sample: StatsSample) {
        let mut state = self.lock();
        Self::broadcast(&mut state, Envelope::Stats(sample));
    }

    /// Console lines retained for late subscribers, oldest first.
    pub fn log_history(&self) -> Vec<String> {
        self.lock().log_history.iter().cloned().collect()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn broadcast(state: &mut HubState, envelope: Envelope) {
        state.subscribers.retain(|tx| {
            match tx.try_send(envelope.clone()) {
                Ok(()) => true,
                // Slow subscriber: drop this message for it, keep it.
                Err(mpsc::error::TrySendError::Full(_)) => true,
                // Receiver dropped: unsubscribe.
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            }
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HubState> {
        // Never held across an await; poisoning can only come from a
        // panicking publisher mid-push.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for TelemetryHub {
    fn default() -> Self {
        Self::new()
    }
}
