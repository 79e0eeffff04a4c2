use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::confirmation::{ConfirmationGenerator, ConfirmationRecord};
use super::directory::LocationDirectory;
use super::domain::{BookingDraft, StepInput, WizardStep};
use super::schedule::SchedulePolicy;
use super::validation::{StepRules, ValidatedStep, ValidationError};

/// Snapshot of where the applicant is in the booking flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardState {
    pub current_step: WizardStep,
    pub draft: BookingDraft,
    pub terminal: bool,
    pub confirmation: Option<ConfirmationRecord>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            current_step: WizardStep::Location,
            draft: BookingDraft::default(),
            terminal: false,
            confirmation: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced(WizardStep),
    Confirmed(ConfirmationRecord),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("input for {received} submitted while the wizard is at {expected}")]
    WrongStep {
        expected: WizardStep,
        received: WizardStep,
    },
    #[error("booking already confirmed; reset to start a new one")]
    AlreadyConfirmed,
    #[error("already at the first step")]
    AtFirstStep,
}

/// Step state machine for one applicant's booking.
#[derive(Debug, Clone)]
pub struct WizardController {
    directory: Arc<LocationDirectory>,
    policy: SchedulePolicy,
    generator: ConfirmationGenerator,
    state: WizardState,
}

impl WizardController {
    pub fn new(
        directory: Arc<LocationDirectory>,
        policy: SchedulePolicy,
        generator: ConfirmationGenerator,
    ) -> Self {
        Self {
            directory,
            policy,
            generator,
            state: WizardState::default(),
        }
    }

    pub fn current_step(&self) -> WizardStep {
        self.state.current_step
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.state.draft
    }

    pub fn is_terminal(&self) -> bool {
        self.state.terminal
    }

    pub fn confirmation(&self) -> Option<&ConfirmationRecord> {
        self.state.confirmation.as_ref()
    }

    pub fn policy(&self) -> SchedulePolicy {
        self.policy
    }

    /// Stored input for `step`, used to pre-populate a page the applicant returns to.
    pub fn prefill(&self, step: WizardStep) -> Option<StepInput> {
        self.state.draft.prefill(step)
    }

    /// Whether `input` would be accepted by [`submit_step`](Self::submit_step) right now.
    pub fn can_advance(&self, input: &StepInput, today: NaiveDate) -> bool {
        self.validate(input, today).is_ok()
    }

    pub fn validate(&self, input: &StepInput, today: NaiveDate) -> Result<(), WizardError> {
        self.check(input, today).map(|_| ())
    }

    pub fn submit_step(
        &mut self,
        input: StepInput,
        today: NaiveDate,
    ) -> Result<StepOutcome, WizardError> {
        let validated = self.check(&input, today)?;

        match validated {
            ValidatedStep::Location(location) => self.state.draft.location = Some(location),
            ValidatedStep::Schedule(schedule) => self.state.draft.schedule = Some(schedule),
            ValidatedStep::Personal(personal) => self.state.draft.personal = Some(personal),
            ValidatedStep::Contact(contact) => self.state.draft.contact = Some(contact),
            ValidatedStep::Review => {
                let record = self.generator.confirm(&self.state.draft);
                self.state.terminal = true;
                self.state.confirmation = Some(record.clone());
                debug!(reference = %record.reference_code(), "booking confirmed");
                return Ok(StepOutcome::Confirmed(record));
            }
        }

        // Only Review lacks a successor and it returned above.
        if let Some(next) = self.state.current_step.next() {
            self.state.current_step = next;
        }
        debug!(step = self.state.current_step.number(), "wizard advanced");
        Ok(StepOutcome::Advanced(self.state.current_step))
    }

    pub fn go_back(&mut self) -> Result<WizardStep, WizardError> {
        if self.state.terminal {
            return Err(WizardError::AlreadyConfirmed);
        }

        let previous = self
            .state
            .current_step
            .previous()
            .ok_or(WizardError::AtFirstStep)?;
        self.state.current_step = previous;
        Ok(previous)
    }

    pub fn reset(&mut self) {
        self.state = WizardState::default();
    }

    pub fn cancel(&mut self) {
        self.reset();
    }

    /// Withdraws a confirmation that could not be recorded. The draft and step stay on Review and
    /// the generator keeps its advanced state, so the next submit draws a fresh code.
    pub(crate) fn reopen(&mut self) {
        self.state.terminal = false;
        self.state.confirmation = None;
    }

    fn check(&self, input: &StepInput, today: NaiveDate) -> Result<ValidatedStep, WizardError> {
        if self.state.terminal {
            return Err(WizardError::AlreadyConfirmed);
        }

        let expected = self.state.current_step;
        let received = input.step();
        if expected != received {
            return Err(WizardError::WrongStep { expected, received });
        }

        let rules = StepRules::new(&self.directory, self.policy, today);
        Ok(rules.check(input)?)
    }
}
