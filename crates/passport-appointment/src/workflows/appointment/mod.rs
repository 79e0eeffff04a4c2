//! Passport appointment booking: the office directory, calendar rules, the five-step wizard,
//! informational overlays, confirmation codes, and the view-appointment lookup.

pub mod confirmation;
pub mod directory;
pub mod domain;
pub mod lookup;
pub mod modal;
pub mod router;
pub mod schedule;
pub mod service;
pub mod session;
pub(crate) mod validation;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use confirmation::{ConfirmationGenerator, ConfirmationRecord, ReferenceCode};
pub use directory::{DirectoryError, LocationDirectory, Office, OfficeListing};
pub use domain::{
    AppointmentType, BookingDraft, CivilStatus, ContactDetails, ContactInput, Gender,
    LocationInput, LocationSelection, PersonalDetails, PersonalInput, ScheduleInput,
    ScheduleSelection, StepInput, TimeSlot, WizardStep,
};
pub use lookup::{
    demo_summary, AppointmentLedger, AppointmentStatus, BookingSummary, DemoLedger, LedgerError,
    LookupError, LookupOutcome, LookupQuery, LookupStatus, LookupTracker, NOT_FOUND_MESSAGE,
};
pub use modal::{ModalCoordinator, ModalKind};
pub use router::appointment_router;
pub use schedule::SchedulePolicy;
pub use service::{
    AppointmentService, AppointmentServiceError, Clock, FixedClock, ServiceSettings,
    StartSessionRequest, StepCheck, SystemClock,
};
pub use session::{
    BookingSession, SessionError, SessionId, SessionRepository, SessionView, StepView,
};
pub use validation::ValidationError;
pub use wizard::{StepOutcome, WizardController, WizardError, WizardState};
