use serde::{Deserialize, Serialize};
use std::fmt;

use super::domain::{AppointmentType, BookingDraft, StepInput, WizardStep};
use super::modal::{ModalCoordinator, ModalKind};
use super::wizard::WizardController;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything one applicant has open: the wizard, its overlays, and the chosen appointment type.
#[derive(Debug, Clone)]
pub struct BookingSession {
    pub id: SessionId,
    pub appointment_type: AppointmentType,
    pub wizard: WizardController,
    pub modals: ModalCoordinator,
}

impl BookingSession {
    pub fn new(id: SessionId, appointment_type: AppointmentType, wizard: WizardController) -> Self {
        Self {
            id,
            appointment_type,
            wizard,
            modals: ModalCoordinator::default(),
        }
    }

    pub fn view(&self) -> SessionView {
        let step = self.wizard.current_step();
        let confirmation = self.wizard.confirmation();

        SessionView {
            session_id: self.id.clone(),
            appointment_type: self.appointment_type,
            step: StepView {
                number: step.number(),
                key: step,
                label: step.label(),
                total: WizardStep::COUNT,
            },
            progress_percent: step.progress_percent(),
            draft: self.wizard.draft().clone(),
            terminal: self.wizard.is_terminal(),
            reference_code: confirmation.map(|record| record.reference_code().to_string()),
            confirmation_email: confirmation
                .and_then(|record| record.email())
                .map(str::to_string),
            active_modal: self.modals.active(),
            prefill: self.wizard.prefill(step),
            can_go_back: !self.wizard.is_terminal() && step.previous().is_some(),
        }
    }
}

/// Read model returned to renderers after every session operation.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub appointment_type: AppointmentType,
    pub step: StepView,
    pub progress_percent: u8,
    pub draft: BookingDraft,
    pub terminal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_email: Option<String>,
    pub active_modal: Option<ModalKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefill: Option<StepInput>,
    pub can_go_back: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepView {
    pub number: u8,
    pub key: WizardStep,
    pub label: &'static str,
    pub total: u8,
}

/// Storage abstraction for open booking sessions.
pub trait SessionRepository: Send + Sync {
    fn insert(&self, session: BookingSession) -> Result<BookingSession, SessionError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<BookingSession>, SessionError>;
    fn update(&self, session: BookingSession) -> Result<(), SessionError>;
    fn remove(&self, id: &SessionId) -> Result<(), SessionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}
