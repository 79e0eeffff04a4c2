use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::BookingConfig;

use super::confirmation::{ConfirmationGenerator, DEFAULT_REFERENCE_PREFIX};
use super::directory::LocationDirectory;
use super::domain::{AppointmentType, StepInput};
use super::lookup::{
    AppointmentLedger, BookingSummary, LedgerError, LookupError, LookupOutcome, LookupQuery,
    LookupStatus, LookupTracker, DEFAULT_LOOKUP_LATENCY,
};
use super::modal::ModalKind;
use super::schedule::SchedulePolicy;
use super::session::{BookingSession, SessionError, SessionId, SessionRepository, SessionView};
use super::wizard::{StepOutcome, WizardController, WizardError};

/// Source of the calendar date used for schedule checks.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub policy: SchedulePolicy,
    pub reference_prefix: String,
    pub lookup_latency: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            policy: SchedulePolicy::default(),
            reference_prefix: DEFAULT_REFERENCE_PREFIX.to_string(),
            lookup_latency: DEFAULT_LOOKUP_LATENCY,
        }
    }
}

impl From<&BookingConfig> for ServiceSettings {
    fn from(config: &BookingConfig) -> Self {
        Self {
            policy: SchedulePolicy::new(config.horizon_days),
            reference_prefix: config.reference_prefix.clone(),
            lookup_latency: config.lookup_latency,
        }
    }
}

/// Landing-page choice that opens a new booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub appointment_type: AppointmentType,
    #[serde(default)]
    pub accepted_terms: bool,
}

/// Answer to "would this input be accepted right now?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepCheck {
    pub can_advance: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StepCheck {
    fn from_result(result: Result<(), WizardError>) -> Self {
        match result {
            Ok(()) => Self {
                can_advance: true,
                field: None,
                message: None,
            },
            Err(error) => Self {
                can_advance: false,
                field: match &error {
                    WizardError::Invalid(invalid) => Some(invalid.field()),
                    _ => None,
                },
                message: Some(error.to_string()),
            },
        }
    }
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("session-{id:06}"))
}

/// Service composing the session store, the office directory, and the booking ledger.
pub struct AppointmentService<R, L> {
    sessions: Arc<R>,
    ledger: Arc<L>,
    directory: Arc<LocationDirectory>,
    settings: ServiceSettings,
    clock: Arc<dyn Clock>,
    lookups: Mutex<HashMap<SessionId, Arc<LookupTracker<L>>>>,
}

impl<R, L> AppointmentService<R, L>
where
    R: SessionRepository + 'static,
    L: AppointmentLedger + 'static,
{
    pub fn new(
        sessions: Arc<R>,
        ledger: Arc<L>,
        directory: Arc<LocationDirectory>,
        settings: ServiceSettings,
    ) -> Self {
        Self::with_clock(sessions, ledger, directory, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(
        sessions: Arc<R>,
        ledger: Arc<L>,
        directory: Arc<LocationDirectory>,
        settings: ServiceSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions,
            ledger,
            directory,
            settings,
            clock,
            lookups: Mutex::new(HashMap::new()),
        }
    }

    pub fn directory(&self) -> &LocationDirectory {
        &self.directory
    }

    pub fn policy(&self) -> SchedulePolicy {
        self.settings.policy
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Opens a wizard for the chosen appointment type once the terms have been accepted.
    pub fn start_session(
        &self,
        request: StartSessionRequest,
    ) -> Result<SessionView, AppointmentServiceError> {
        if !request.accepted_terms {
            return Err(AppointmentServiceError::TermsNotAccepted);
        }

        let wizard = WizardController::new(
            Arc::clone(&self.directory),
            self.settings.policy,
            ConfirmationGenerator::new(self.settings.reference_prefix.clone()),
        );
        let session = BookingSession::new(next_session_id(), request.appointment_type, wizard);
        let stored = self.sessions.insert(session)?;

        info!(
            session = %stored.id,
            appointment_type = stored.appointment_type.label(),
            "booking session started"
        );
        Ok(stored.view())
    }

    pub fn session(&self, id: &SessionId) -> Result<SessionView, AppointmentServiceError> {
        Ok(self.load(id)?.view())
    }

    /// Validates and merges one step. On the review step the booking is confirmed and recorded
    /// in the ledger before the session is saved. A ledger failure leaves the wizard on Review,
    /// with the generator advanced so a retry draws another code.
    pub fn submit_step(
        &self,
        id: &SessionId,
        input: StepInput,
    ) -> Result<SessionView, AppointmentServiceError> {
        let mut session = self.load(id)?;
        let outcome = session.wizard.submit_step(input, self.clock.today())?;

        match &outcome {
            StepOutcome::Advanced(step) => {
                info!(session = %session.id, step = step.number(), "step accepted");
            }
            StepOutcome::Confirmed(record) => {
                if let Some(summary) =
                    BookingSummary::from_confirmation(record, session.appointment_type)
                {
                    if let Err(error) = self.ledger.record(summary) {
                        warn!(
                            session = %session.id,
                            reference = %record.reference_code(),
                            %error,
                            "booking could not be recorded; confirmation withdrawn"
                        );
                        session.wizard.reopen();
                        self.sessions.update(session)?;
                        return Err(error.into());
                    }
                }
                info!(
                    session = %session.id,
                    reference = %record.reference_code(),
                    "booking confirmed"
                );
            }
        }

        self.sessions.update(session.clone())?;
        Ok(session.view())
    }

    pub fn check_step(
        &self,
        id: &SessionId,
        input: &StepInput,
    ) -> Result<StepCheck, AppointmentServiceError> {
        let session = self.load(id)?;
        let result = session.wizard.validate(input, self.clock.today());
        Ok(StepCheck::from_result(result))
    }

    pub fn go_back(&self, id: &SessionId) -> Result<SessionView, AppointmentServiceError> {
        let mut session = self.load(id)?;
        session.wizard.go_back()?;
        self.sessions.update(session.clone())?;
        Ok(session.view())
    }

    pub fn reset(&self, id: &SessionId) -> Result<SessionView, AppointmentServiceError> {
        let mut session = self.load(id)?;
        session.wizard.reset();
        self.sessions.update(session.clone())?;
        info!(session = %session.id, "booking reset");
        Ok(session.view())
    }

    /// Abandons the booking from the first page: clears the wizard and any open overlay.
    pub fn cancel(&self, id: &SessionId) -> Result<SessionView, AppointmentServiceError> {
        let mut session = self.load(id)?;
        session.wizard.cancel();
        session.modals.close();
        self.sessions.update(session.clone())?;
        info!(session = %session.id, "booking cancelled");
        Ok(session.view())
    }

    pub fn open_modal(
        &self,
        id: &SessionId,
        kind: ModalKind,
    ) -> Result<SessionView, AppointmentServiceError> {
        let mut session = self.load(id)?;
        session.modals.open(kind);
        self.sessions.update(session.clone())?;
        Ok(session.view())
    }

    pub fn close_modal(&self, id: &SessionId) -> Result<SessionView, AppointmentServiceError> {
        let mut session = self.load(id)?;
        session.modals.close();
        self.sessions.update(session.clone())?;
        Ok(session.view())
    }

    /// Drops the session together with any lookup still in flight for it.
    pub fn end_session(&self, id: &SessionId) -> Result<(), AppointmentServiceError> {
        self.load(id)?;
        self.sessions.remove(id)?;
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        info!(session = %id, "booking session ended");
        Ok(())
    }

    /// Runs a view-appointment lookup for the session. A newer lookup on the same session
    /// supersedes this one.
    pub async fn lookup(
        &self,
        id: &SessionId,
        query: LookupQuery,
    ) -> Result<LookupOutcome, AppointmentServiceError> {
        self.load(id)?;
        let tracker = self.tracker(id);
        let outcome = tracker.lookup(query).await;

        match &outcome {
            Ok(LookupOutcome::Found(summary)) => {
                info!(session = %id, code = %summary.code, "appointment found")
            }
            Ok(LookupOutcome::NotFound) => info!(session = %id, "appointment not found"),
            Ok(LookupOutcome::Superseded) => info!(session = %id, "lookup superseded"),
            Err(error) => warn!(session = %id, %error, "lookup failed"),
        }

        Ok(outcome?)
    }

    /// Lookup for callers without a booking session. Each call gets its own tracker, so
    /// concurrent requests never supersede each other.
    pub async fn find_appointment(
        &self,
        query: LookupQuery,
    ) -> Result<LookupOutcome, AppointmentServiceError> {
        let tracker = LookupTracker::new(Arc::clone(&self.ledger), self.settings.lookup_latency);
        let outcome = tracker.lookup(query).await;

        match &outcome {
            Ok(LookupOutcome::Found(summary)) => {
                info!(code = %summary.code, "appointment found")
            }
            Ok(LookupOutcome::NotFound) => info!("appointment not found"),
            Ok(LookupOutcome::Superseded) => info!("lookup superseded"),
            Err(error) => warn!(%error, "lookup failed"),
        }

        Ok(outcome?)
    }

    pub fn lookup_status(&self, id: &SessionId) -> Result<LookupStatus, AppointmentServiceError> {
        self.load(id)?;
        let status = self
            .lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .map(|tracker| tracker.status())
            .unwrap_or(LookupStatus::Idle);
        Ok(status)
    }

    fn tracker(&self, id: &SessionId) -> Arc<LookupTracker<L>> {
        let mut lookups = self.lookups.lock().unwrap_or_else(PoisonError::into_inner);
        let tracker = lookups.entry(id.clone()).or_insert_with(|| {
            Arc::new(LookupTracker::new(
                Arc::clone(&self.ledger),
                self.settings.lookup_latency,
            ))
        });
        Arc::clone(tracker)
    }

    fn load(&self, id: &SessionId) -> Result<BookingSession, AppointmentServiceError> {
        let session = self.sessions.fetch(id)?.ok_or(SessionError::NotFound)?;
        Ok(session)
    }
}

/// Error raised by the appointment service.
#[derive(Debug, thiserror::Error)]
pub enum AppointmentServiceError {
    #[error("the terms and conditions must be accepted before booking")]
    TermsNotAccepted,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
}
