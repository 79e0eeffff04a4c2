//! End-to-end booking scenarios driven through the public service facade, the way a renderer
//! would walk an applicant from the landing page to the success notice.

mod common {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::NaiveDate;

    use passport_appointment::workflows::appointment::{
        AppointmentLedger, BookingSession, BookingSummary, CivilStatus, ContactInput, Gender,
        LedgerError, LocationInput, LookupQuery, PersonalInput, ScheduleInput, SessionError,
        SessionId, SessionRepository, StepInput,
    };

    pub(super) fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date")
    }

    pub(super) fn steps() -> Vec<StepInput> {
        vec![
            StepInput::Location(LocationInput {
                region: "ASIA PACIFIC".to_string(),
                country: "PHILIPPINES".to_string(),
                site: "Cebu (Robinsons Galleria, Cebu City)".to_string(),
            }),
            StepInput::Schedule(ScheduleInput {
                date: NaiveDate::from_ymd_opt(2026, 3, 6),
                time_slot: "01:00 PM - 02:00 PM".to_string(),
            }),
            StepInput::Personal(PersonalInput {
                first_name: "Maria".to_string(),
                middle_name: None,
                last_name: "Reyes".to_string(),
                birth_date: NaiveDate::from_ymd_opt(1988, 2, 29),
                gender: Some(Gender::Female),
                civil_status: Some(CivilStatus::Married),
                birth_place: "Cebu City".to_string(),
            }),
            StepInput::Contact(ContactInput {
                mobile_number: "09175550199".to_string(),
                email: "maria.reyes@example.ph".to_string(),
                confirm_email: "maria.reyes@example.ph".to_string(),
                address: "45 Osmeña Boulevard".to_string(),
                city: "Cebu City".to_string(),
                province: "Cebu".to_string(),
                zip_code: Some("6000".to_string()),
            }),
        ]
    }

    #[derive(Default)]
    pub(super) struct Sessions {
        records: Mutex<HashMap<SessionId, BookingSession>>,
    }

    impl SessionRepository for Sessions {
        fn insert(&self, session: BookingSession) -> Result<BookingSession, SessionError> {
            let mut guard = self.records.lock().expect("session mutex poisoned");
            if guard.contains_key(&session.id) {
                return Err(SessionError::Conflict);
            }
            guard.insert(session.id.clone(), session.clone());
            Ok(session)
        }

        fn fetch(&self, id: &SessionId) -> Result<Option<BookingSession>, SessionError> {
            Ok(self
                .records
                .lock()
                .expect("session mutex poisoned")
                .get(id)
                .cloned())
        }

        fn update(&self, session: BookingSession) -> Result<(), SessionError> {
            self.records
                .lock()
                .expect("session mutex poisoned")
                .insert(session.id.clone(), session);
            Ok(())
        }

        fn remove(&self, id: &SessionId) -> Result<(), SessionError> {
            self.records
                .lock()
                .expect("session mutex poisoned")
                .remove(id);
            Ok(())
        }
    }

    #[derive(Default)]
    pub(super) struct Ledger {
        bookings: Mutex<Vec<BookingSummary>>,
    }

    impl AppointmentLedger for Ledger {
        fn record(&self, summary: BookingSummary) -> Result<(), LedgerError> {
            let mut guard = self.bookings.lock().expect("ledger mutex poisoned");
            if guard.iter().any(|existing| existing.code == summary.code) {
                return Err(LedgerError::Conflict(summary.code));
            }
            guard.push(summary);
            Ok(())
        }

        fn find(&self, query: &LookupQuery) -> Result<Option<BookingSummary>, LedgerError> {
            let guard = self.bookings.lock().expect("ledger mutex poisoned");
            Ok(guard.iter().find(|summary| summary.matches(query)).cloned())
        }
    }
}

use std::sync::Arc;
use std::time::Duration;

use common::*;
use passport_appointment::workflows::appointment::{
    AppointmentService, AppointmentType, FixedClock, LocationDirectory, LookupOutcome,
    LookupQuery, ModalKind, SchedulePolicy, ServiceSettings, StartSessionRequest, StepInput,
    WizardStep,
};

fn service() -> AppointmentService<Sessions, Ledger> {
    AppointmentService::with_clock(
        Arc::new(Sessions::default()),
        Arc::new(Ledger::default()),
        Arc::new(LocationDirectory::standard().expect("bundled offices load")),
        ServiceSettings {
            policy: SchedulePolicy::default(),
            reference_prefix: "DFA".to_string(),
            lookup_latency: Duration::from_millis(800),
        },
        Arc::new(FixedClock(today())),
    )
}

#[tokio::test(start_paused = true)]
async fn group_booking_is_confirmed_and_retrievable() {
    let service = service();
    let view = service
        .start_session(StartSessionRequest {
            appointment_type: AppointmentType::Group,
            accepted_terms: true,
        })
        .expect("session starts");
    let id = view.session_id;

    service
        .open_modal(&id, ModalKind::Requirements)
        .expect("requirements opens");

    let mut progress = Vec::new();
    for input in steps() {
        let view = service.submit_step(&id, input).expect("step accepted");
        progress.push(view.progress_percent);
    }
    assert_eq!(progress, vec![40, 60, 80, 100]);

    let review = service.session(&id).expect("session readable");
    assert_eq!(review.step.key, WizardStep::Review);
    let personal = review.draft.personal.as_ref().expect("personal stored");
    assert_eq!(personal.formal_name(), "Reyes, Maria");
    let contact = review.draft.contact.as_ref().expect("contact stored");
    assert_eq!(
        contact.mailing_address(),
        "45 Osmeña Boulevard, Cebu City, Cebu 6000"
    );

    let confirmed = service
        .submit_step(&id, StepInput::Review)
        .expect("booking confirmed");
    let code = confirmed.reference_code.expect("reference code issued");
    assert_eq!(confirmed.draft, review.draft);

    let outcome = service
        .lookup(&id, LookupQuery::new(code.clone(), "maria.reyes@example.ph"))
        .await
        .expect("lookup runs");
    let LookupOutcome::Found(summary) = outcome else {
        panic!("booking expected, got {outcome:?}");
    };
    assert_eq!(summary.code, code);
    assert_eq!(summary.appointment_type, "Group");
    assert_eq!(summary.site, "Cebu (Robinsons Galleria, Cebu City)");
    assert_eq!(summary.date, "March 6, 2026");
    assert_eq!(summary.time, "01:00 PM");
}

#[test]
fn weekend_dates_block_the_schedule_step() {
    let service = service();
    let id = service
        .start_session(StartSessionRequest {
            appointment_type: AppointmentType::Individual,
            accepted_terms: true,
        })
        .expect("session starts")
        .session_id;
    let mut steps = steps().into_iter();
    service
        .submit_step(&id, steps.next().expect("location input"))
        .expect("location accepted");

    let saturday = StepInput::Schedule(passport_appointment::workflows::appointment::ScheduleInput {
        date: chrono::NaiveDate::from_ymd_opt(2026, 3, 7),
        time_slot: "01:00 PM - 02:00 PM".to_string(),
    });
    let check = service.check_step(&id, &saturday).expect("check runs");
    assert!(!check.can_advance);
    assert_eq!(check.field, Some("date"));
    assert!(service.submit_step(&id, saturday).is_err());
    assert_eq!(
        service.session(&id).expect("session readable").step.key,
        WizardStep::Schedule
    );
}
