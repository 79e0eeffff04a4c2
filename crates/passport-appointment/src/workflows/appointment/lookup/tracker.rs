use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::domain::{BookingSummary, LookupError, LookupQuery};
use super::ledger::AppointmentLedger;

pub const DEFAULT_LOOKUP_LATENCY: Duration = Duration::from_millis(800);

/// What the lookup panel should currently show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LookupStatus {
    Idle,
    Pending,
    Found { appointment: BookingSummary },
    NotFound,
    Failed { message: String },
}

/// Result seen by the caller that issued a particular request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(BookingSummary),
    NotFound,
    /// A newer request was issued before this one resolved; its result was discarded.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTicket {
    generation: u64,
}

#[derive(Debug, Clone)]
struct Snapshot {
    generation: u64,
    status: LookupStatus,
}

/// Runs appointment lookups with simulated latency. The most recently issued request owns the
/// visible status; issuing a new request aborts the one in flight.
///
/// `issue` spawns onto the ambient tokio runtime.
pub struct LookupTracker<L> {
    ledger: Arc<L>,
    latency: Duration,
    state: Arc<watch::Sender<Snapshot>>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl<L> LookupTracker<L>
where
    L: AppointmentLedger + 'static,
{
    pub fn new(ledger: Arc<L>, latency: Duration) -> Self {
        let (sender, _) = watch::channel(Snapshot {
            generation: 0,
            status: LookupStatus::Idle,
        });

        Self {
            ledger,
            latency,
            state: Arc::new(sender),
            in_flight: Mutex::new(None),
        }
    }

    pub fn status(&self) -> LookupStatus {
        self.state.borrow().status.clone()
    }

    pub fn issue(&self, query: LookupQuery) -> Result<LookupTicket, LookupError> {
        query.validate()?;

        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = in_flight.take() {
            previous.abort();
        }

        let mut generation = 0;
        self.state.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.status = LookupStatus::Pending;
            generation = snapshot.generation;
        });

        let ledger = Arc::clone(&self.ledger);
        let state = Arc::clone(&self.state);
        let latency = self.latency;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(latency).await;

            let status = match ledger.find(&query) {
                Ok(Some(appointment)) => LookupStatus::Found { appointment },
                Ok(None) => LookupStatus::NotFound,
                Err(err) => LookupStatus::Failed {
                    message: err.to_string(),
                },
            };

            let applied = state.send_if_modified(|snapshot| {
                if snapshot.generation != generation {
                    return false;
                }
                snapshot.status = status;
                true
            });
            if !applied {
                debug!(generation, "discarding stale lookup result");
            }
        });
        *in_flight = Some(handle);

        Ok(LookupTicket { generation })
    }

    /// Waits for the request behind `ticket` to settle.
    pub async fn wait(&self, ticket: LookupTicket) -> Result<LookupOutcome, LookupError> {
        let mut receiver = self.state.subscribe();

        loop {
            {
                let snapshot = receiver.borrow_and_update();
                if snapshot.generation != ticket.generation {
                    return Ok(LookupOutcome::Superseded);
                }
                match &snapshot.status {
                    LookupStatus::Found { appointment } => {
                        return Ok(LookupOutcome::Found(appointment.clone()))
                    }
                    LookupStatus::NotFound => return Ok(LookupOutcome::NotFound),
                    LookupStatus::Failed { message } => {
                        return Err(LookupError::Unavailable(message.clone()))
                    }
                    LookupStatus::Idle | LookupStatus::Pending => {}
                }
            }

            if receiver.changed().await.is_err() {
                return Ok(LookupOutcome::Superseded);
            }
        }
    }

    pub async fn lookup(&self, query: LookupQuery) -> Result<LookupOutcome, LookupError> {
        let ticket = self.issue(query)?;
        self.wait(ticket).await
    }
}

impl<L> Drop for LookupTracker<L> {
    fn drop(&mut self) {
        let in_flight = self
            .in_flight
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = in_flight.take() {
            handle.abort();
        }
    }
}

impl<L> std::fmt::Debug for LookupTracker<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupTracker")
            .field("latency", &self.latency)
            .field("status", &self.state.borrow().status)
            .finish()
    }
}
