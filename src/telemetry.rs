//! Fire-and-forget notification of computed directives to a remote endpoint.
//!
//! The request path only pushes onto a bounded channel; a detached worker
//! task performs the HTTP calls. When the worker falls behind, new events
//! are dropped with a warning rather than queued. Worker failures are
//! logged and never reach the caller.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::pipeline::types::OutputDirective;
use crate::service::Operation;

/// `func` query value the remote logger expects.
pub const LOG_FUNC: &str = "log_datarium";

/// Events held while the worker is busy; further events are dropped.
pub const TELEMETRY_QUEUE_CAPACITY: usize = 16;

/// One computed directive to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryEvent {
    /// Operation that produced the directive.
    pub operation: Operation,
    /// The directive returned to the caller.
    pub directive: OutputDirective,
}

/// Handle for queueing telemetry events. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct TelemetryNotifier {
    tx: Option<mpsc::Sender<TelemetryEvent>>,
}

impl TelemetryNotifier {
    /// A notifier that drops every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// A notifier feeding an existing channel.
    pub fn from_sender(tx: mpsc::Sender<TelemetryEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Spawns the HTTP worker on the current tokio runtime.
    ///
    /// The worker exits once every clone of the returned notifier is dropped.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error if the HTTP client cannot be built.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(
        endpoint: String,
        timeout: Duration,
    ) -> Result<(Self, JoinHandle<()>), reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let (tx, rx) = mpsc::channel(TELEMETRY_QUEUE_CAPACITY);
        let handle = tokio::spawn(run_worker(client, endpoint, rx));
        Ok((Self::from_sender(tx), handle))
    }

    /// `true` if events are forwarded anywhere.
    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Number of events waiting for the worker.
    pub fn pending(&self) -> usize {
        self.tx
            .as_ref()
            .map_or(0, |tx| tx.max_capacity() - tx.capacity())
    }

    /// Queues an event without waiting for delivery.
    ///
    /// Drops the event if the queue is full or the worker has stopped.
    pub fn notify(&self, event: TelemetryEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(
                    capacity = tx.max_capacity(),
                    "telemetry queue full; dropping event"
                );
            }
            Err(TrySendError::Closed(_)) => {
                warn!("telemetry worker has stopped; dropping event");
            }
        }
    }
}

async fn run_worker(
    client: reqwest::Client,
    endpoint: String,
    mut rx: mpsc::Receiver<TelemetryEvent>,
) {
    while let Some(event) = rx.recv().await {
        let d = event.directive;
        let result = client
            .get(&endpoint)
            .query(&[
                ("func", LOG_FUNC.to_string()),
                ("operation", event.operation.as_str().to_string()),
                ("red", d.red_intensity.to_string()),
                ("green", d.green_intensity.to_string()),
                ("move_profile", d.movement_profile.to_string()),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);

        match result {
            Ok(resp) => debug!(status = %resp.status(), "telemetry delivered"),
            Err(e) => warn!(error = %e, "telemetry delivery failed"),
        }
    }
    debug!("telemetry worker stopped");
}
