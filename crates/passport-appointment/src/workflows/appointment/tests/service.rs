use super::common::*;
use std::sync::Arc;

use crate::workflows::appointment::domain::{AppointmentType, StepInput, WizardStep};
use crate::workflows::appointment::lookup::{AppointmentStatus, LedgerError};
use crate::workflows::appointment::modal::ModalKind;
use crate::workflows::appointment::service::{
    AppointmentService, AppointmentServiceError, FixedClock, StartSessionRequest,
};
use crate::workflows::appointment::session::{SessionError, SessionId, SessionRepository};
use crate::workflows::appointment::validation::ValidationError;
use crate::workflows::appointment::wizard::WizardError;

#[test]
fn start_requires_accepted_terms() {
    let (service, sessions, _) = build_service();

    let error = service
        .start_session(StartSessionRequest {
            appointment_type: AppointmentType::Group,
            accepted_terms: false,
        })
        .expect_err("terms gate");

    assert!(matches!(error, AppointmentServiceError::TermsNotAccepted));
    assert!(sessions.records.lock().expect("lock").is_empty());
}

#[test]
fn new_sessions_open_at_the_location_step() {
    let (service, sessions, _) = build_service();
    let view = service
        .start_session(StartSessionRequest {
            appointment_type: AppointmentType::Group,
            accepted_terms: true,
        })
        .expect("session starts");

    assert!(view.session_id.0.starts_with("session-"));
    assert_eq!(view.appointment_type, AppointmentType::Group);
    assert_eq!(view.step.key, WizardStep::Location);
    assert_eq!(view.step.number, 1);
    assert_eq!(view.progress_percent, 20);
    assert!(!view.can_go_back);
    assert!(sessions
        .fetch(&view.session_id)
        .expect("fetch succeeds")
        .is_some());
}

#[test]
fn completed_booking_is_recorded_in_the_ledger() {
    let (service, _, ledger) = build_service();
    let id = start(&service);

    for input in details() {
        service.submit_step(&id, input).expect("step accepted");
    }
    let view = service
        .submit_step(&id, StepInput::Review)
        .expect("booking confirmed");

    assert!(view.terminal);
    assert_eq!(view.confirmation_email.as_deref(), Some("juan@example.ph"));
    let code = view.reference_code.expect("reference code issued");

    let bookings = ledger.bookings();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].code, code);
    assert_eq!(bookings[0].name, "Juan Dela Cruz");
    assert_eq!(bookings[0].site, MANILA);
    assert_eq!(bookings[0].date, "December 3, 2025");
    assert_eq!(bookings[0].time, "09:00 AM");
    assert_eq!(bookings[0].appointment_type, "Individual");
    assert_eq!(bookings[0].status, AppointmentStatus::Confirmed);
}

#[test]
fn ledger_failure_leaves_the_wizard_unconfirmed() {
    let sessions = Arc::new(MemorySessions::default());
    let service = AppointmentService::with_clock(
        sessions.clone(),
        Arc::new(UnavailableLedger),
        directory(),
        settings(),
        Arc::new(FixedClock(today())),
    );
    let id = start(&service);
    for input in details() {
        service.submit_step(&id, input).expect("step accepted");
    }

    let error = service
        .submit_step(&id, StepInput::Review)
        .expect_err("ledger offline");

    assert!(matches!(
        error,
        AppointmentServiceError::Ledger(LedgerError::Unavailable(_))
    ));
    let view = service.session(&id).expect("session readable");
    assert!(!view.terminal);
    assert_eq!(view.step.key, WizardStep::Review);
}

#[test]
fn code_collision_can_be_retried_with_a_fresh_code() {
    let ledger = Arc::new(TakenCodeLedger::default());
    let service = AppointmentService::with_clock(
        Arc::new(MemorySessions::default()),
        ledger.clone(),
        directory(),
        settings(),
        Arc::new(FixedClock(today())),
    );
    let id = start(&service);
    for input in details() {
        service.submit_step(&id, input).expect("step accepted");
    }

    let error = service
        .submit_step(&id, StepInput::Review)
        .expect_err("first code is taken");
    assert!(matches!(
        error,
        AppointmentServiceError::Ledger(LedgerError::Conflict(_))
    ));
    let view = service.session(&id).expect("session readable");
    assert!(!view.terminal);
    assert_eq!(view.step.key, WizardStep::Review);
    assert!(view.reference_code.is_none());

    let view = service
        .submit_step(&id, StepInput::Review)
        .expect("retry confirms");
    assert!(view.terminal);

    let attempted = ledger.attempted.lock().expect("lock").clone();
    assert_eq!(attempted.len(), 2);
    assert_ne!(attempted[0], attempted[1]);
    let bookings = ledger.inner.bookings();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].code, attempted[1]);
    assert_eq!(view.reference_code.as_deref(), Some(attempted[1].as_str()));
}

#[test]
fn validation_errors_do_not_touch_the_stored_session() {
    let (service, _, _) = build_service();
    let id = start(&service);

    let error = service
        .submit_step(
            &id,
            StepInput::Location(crate::workflows::appointment::domain::LocationInput {
                region: "ASIA PACIFIC".to_string(),
                country: "PHILIPPINES".to_string(),
                site: "DFA Atlantis".to_string(),
            }),
        )
        .expect_err("unknown office rejected");

    assert!(matches!(
        error,
        AppointmentServiceError::Wizard(WizardError::Invalid(ValidationError::UnknownOffice { .. }))
    ));
    let view = service.session(&id).expect("session readable");
    assert_eq!(view.step.key, WizardStep::Location);
    assert!(view.draft.location.is_none());
}

#[test]
fn check_step_reports_the_failing_field() {
    let (service, _, _) = build_service();
    let id = start(&service);
    service.submit_step(&id, location()).expect("location accepted");

    let check = service
        .check_step(
            &id,
            &StepInput::Schedule(crate::workflows::appointment::domain::ScheduleInput {
                date: None,
                time_slot: "09:00 AM - 10:00 AM".to_string(),
            }),
        )
        .expect("check runs");
    assert!(!check.can_advance);
    assert_eq!(check.field, Some("date"));

    let check = service.check_step(&id, &schedule()).expect("check runs");
    assert!(check.can_advance);
    assert_eq!(service.session(&id).expect("view").step.key, WizardStep::Schedule);
}

#[test]
fn navigation_and_modals_round_trip_through_the_store() {
    let (service, _, _) = build_service();
    let id = start(&service);

    let view = service.open_modal(&id, ModalKind::Faq).expect("faq opens");
    assert_eq!(view.active_modal, Some(ModalKind::Faq));
    let view = service
        .open_modal(&id, ModalKind::Requirements)
        .expect("requirements opens");
    assert_eq!(view.active_modal, Some(ModalKind::Requirements));

    service.submit_step(&id, location()).expect("location accepted");
    let view = service.go_back(&id).expect("back to location");
    assert_eq!(view.step.key, WizardStep::Location);
    assert_eq!(view.prefill, Some(location()));
    assert_eq!(view.active_modal, Some(ModalKind::Requirements));

    let view = service.cancel(&id).expect("cancelled");
    assert_eq!(view.active_modal, None);
    assert!(view.draft.location.is_none());
}

#[test]
fn reset_after_confirmation_starts_over() {
    let (service, _, _) = build_service();
    let id = start(&service);
    for input in details() {
        service.submit_step(&id, input).expect("step accepted");
    }
    service
        .submit_step(&id, StepInput::Review)
        .expect("booking confirmed");

    let error = service.go_back(&id).expect_err("terminal wizard");
    assert!(matches!(
        error,
        AppointmentServiceError::Wizard(WizardError::AlreadyConfirmed)
    ));

    let view = service.reset(&id).expect("reset");
    assert!(!view.terminal);
    assert!(view.reference_code.is_none());
    assert_eq!(view.step.key, WizardStep::Location);
}

#[test]
fn unknown_sessions_are_not_found() {
    let (service, _, _) = build_service();
    let error = service
        .session(&SessionId("session-missing".to_string()))
        .expect_err("missing session");
    assert!(matches!(
        error,
        AppointmentServiceError::Session(SessionError::NotFound)
    ));
}

#[test]
fn ending_a_session_removes_it() {
    let (service, sessions, _) = build_service();
    let id = start(&service);

    service.end_session(&id).expect("session ends");
    assert!(sessions.fetch(&id).expect("fetch succeeds").is_none());
    assert!(service.end_session(&id).is_err());
}

#[test]
fn store_outage_surfaces_as_session_error() {
    let service = AppointmentService::with_clock(
        Arc::new(UnavailableSessions),
        Arc::new(MemoryLedger::default()),
        directory(),
        settings(),
        Arc::new(FixedClock(today())),
    );

    let error = service
        .start_session(StartSessionRequest {
            appointment_type: AppointmentType::Individual,
            accepted_terms: true,
        })
        .expect_err("store offline");
    assert!(matches!(
        error,
        AppointmentServiceError::Session(SessionError::Unavailable(_))
    ));
}
