use crate::application::processor::Processor;
use crate::domain::policy;
use crate::domain::ports::{MessageQueueBox, QueuedMessage};
use crate::error::WorkerError;
use crate::interfaces::json::decode_event;
use chrono::{Duration, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// How far out a faulted message is scheduled before the schedule is
/// cancelled again (see [`Worker::run`]).
const FAULT_RETRY_MINUTES: i64 = 10;

/// Where a decoded message was routed within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    DeadLetter,
    Processing,
}

/// Why the worker stopped consuming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltCause {
    /// `peek` found no visible message; the loop does not keep polling.
    QueueDrained,
    /// An error escaped a cycle.
    Fault,
    /// The shutdown token was cancelled.
    Cancelled,
}

/// Observable position of the worker within its consume cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Peeked,
    Decoded,
    Routed(Route),
    Acked,
    Abandoned,
    Halted(HaltCause),
}

/// How a completed cycle disposed of its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleOutcome {
    Drained,
    DeadLettered,
    Acknowledged,
    Abandoned,
}

/// An error that escaped a cycle, together with the in-flight message (if
/// one had been peeked) for the reschedule path.
struct CycleFault {
    message: Option<QueuedMessage>,
    error: WorkerError,
}

impl CycleFault {
    fn new(message: Option<QueuedMessage>, error: impl Into<WorkerError>) -> Self {
        Self {
            message,
            error: error.into(),
        }
    }
}

/// Sequential consumer driving the peek → decode → route → apply →
/// acknowledge cycle.
///
/// Exactly one message is in flight at a time. The shutdown token is observed
/// only at the top of a cycle; in-flight work is never interrupted.
pub struct Worker {
    queue: MessageQueueBox,
    processor: Processor,
    shutdown: CancellationToken,
    state: WorkerState,
}

impl Worker {
    pub fn new(queue: MessageQueueBox, processor: Processor, shutdown: CancellationToken) -> Self {
        Self {
            queue,
            processor,
            shutdown,
            state: WorkerState::Idle,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Runs consume cycles until the queue drains, the shutdown token is
    /// cancelled, or a fault escapes a cycle.
    ///
    /// On a fault the worker logs it, schedules the in-flight message for
    /// redelivery in ten minutes, immediately cancels that schedule, and
    /// stops. Scheduling then cancelling is a net no-op; it stays this way
    /// until the intended retry behavior is confirmed with the product team.
    pub async fn run(&mut self) -> Result<(), WorkerError> {
        loop {
            if self.shutdown.is_cancelled() {
                info!("shutdown requested; stopping consumer");
                self.state = WorkerState::Halted(HaltCause::Cancelled);
                return Ok(());
            }

            match self.run_cycle().await {
                Ok(CycleOutcome::Drained) => {
                    info!("no message available; stopping consumer");
                    self.state = WorkerState::Halted(HaltCause::QueueDrained);
                    return Ok(());
                }
                Ok(_) => {
                    self.state = WorkerState::Idle;
                }
                Err(fault) => {
                    error!(error = %fault.error, "unrecoverable fault; halting consumer");
                    if let Some(message) = fault.message {
                        self.reschedule_inert(&message).await;
                    }
                    self.state = WorkerState::Halted(HaltCause::Fault);
                    return Err(fault.error);
                }
            }
        }
    }

    async fn run_cycle(&mut self) -> Result<CycleOutcome, CycleFault> {
        let Some(message) = self
            .queue
            .peek()
            .await
            .map_err(|e| CycleFault::new(None, e))?
        else {
            return Ok(CycleOutcome::Drained);
        };
        self.state = WorkerState::Peeked;

        let event = decode_event(&message.payload)
            .map_err(|e| CycleFault::new(Some(message.clone()), e))?;
        self.state = WorkerState::Decoded;
        debug!(
            event_id = %event.id(),
            kind = event.kind(),
            attempts = message.delivery_attempts,
            "decoded message"
        );

        if policy::should_dead_letter(&event, message.delivery_attempts) {
            self.state = WorkerState::Routed(Route::DeadLetter);
            let (reason, description) =
                policy::dead_letter_reason(&event, message.delivery_attempts);
            warn!(
                event_id = %event.id(),
                kind = event.kind(),
                attempts = message.delivery_attempts,
                reason,
                "routing message to dead-letter queue"
            );
            self.queue
                .dead_letter(&message, reason, &description)
                .await
                .map_err(|e| CycleFault::new(Some(message.clone()), e))?;
            return Ok(CycleOutcome::DeadLettered);
        }
        self.state = WorkerState::Routed(Route::Processing);

        let outcome = match self.processor.apply(&event).await {
            Ok(()) => {
                self.queue
                    .acknowledge(&message)
                    .await
                    .map_err(|e| CycleFault::new(Some(message.clone()), e))?;
                self.state = WorkerState::Acked;
                CycleOutcome::Acknowledged
            }
            Err(e) => {
                warn!(
                    event_id = %event.id(),
                    error = %e,
                    "processing failed; abandoning message for redelivery"
                );
                self.queue
                    .abandon(&message)
                    .await
                    .map_err(|e| CycleFault::new(Some(message.clone()), e))?;
                self.state = WorkerState::Abandoned;
                CycleOutcome::Abandoned
            }
        };

        // Acknowledge runs once more regardless of the branch above. After an
        // abandon the receipt is stale and the transport treats the call as a
        // no-op.
        self.queue
            .acknowledge(&message)
            .await
            .map_err(|e| CycleFault::new(Some(message.clone()), e))?;

        Ok(outcome)
    }

    /// Schedules the faulted message for redelivery, then immediately cancels
    /// that schedule. Failures here are logged and swallowed; the worker is
    /// already halting.
    async fn reschedule_inert(&self, message: &QueuedMessage) {
        let visible_at = Utc::now() + Duration::minutes(FAULT_RETRY_MINUTES);
        match self.queue.schedule_after(message, visible_at).await {
            Ok(token) => {
                if let Err(e) = self.queue.cancel_scheduled(token).await {
                    warn!(error = %e, "failed to cancel scheduled redelivery");
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to schedule redelivery for faulted message");
            }
        }
    }
}
