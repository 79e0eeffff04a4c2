use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::appointment::confirmation::ConfirmationGenerator;
use crate::workflows::appointment::directory::LocationDirectory;
use crate::workflows::appointment::domain::{
    AppointmentType, CivilStatus, ContactInput, Gender, LocationInput, PersonalInput,
    ScheduleInput, StepInput,
};
use crate::workflows::appointment::lookup::{
    demo_summary, AppointmentLedger, BookingSummary, LedgerError, LookupQuery,
};
use crate::workflows::appointment::schedule::SchedulePolicy;
use crate::workflows::appointment::service::{
    AppointmentService, FixedClock, ServiceSettings, StartSessionRequest,
};
use crate::workflows::appointment::session::{
    BookingSession, SessionError, SessionId, SessionRepository,
};
use crate::workflows::appointment::wizard::WizardController;

pub(super) const MANILA: &str = "DFA Manila (Aseana)";

/// Monday.
pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 1).expect("valid date")
}

pub(super) fn directory() -> Arc<LocationDirectory> {
    Arc::new(LocationDirectory::standard().expect("bundled offices load"))
}

pub(super) fn wizard() -> WizardController {
    WizardController::new(
        directory(),
        SchedulePolicy::default(),
        ConfirmationGenerator::seeded("DFA", 42),
    )
}

pub(super) fn location() -> StepInput {
    StepInput::Location(LocationInput {
        region: "ASIA PACIFIC".to_string(),
        country: "PHILIPPINES".to_string(),
        site: MANILA.to_string(),
    })
}

pub(super) fn schedule() -> StepInput {
    StepInput::Schedule(ScheduleInput {
        date: NaiveDate::from_ymd_opt(2025, 12, 3),
        time_slot: "09:00 AM - 10:00 AM".to_string(),
    })
}

pub(super) fn personal() -> StepInput {
    StepInput::Personal(PersonalInput {
        first_name: "Juan".to_string(),
        middle_name: Some("Santos".to_string()),
        last_name: "Dela Cruz".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1990, 6, 15),
        gender: Some(Gender::Male),
        civil_status: Some(CivilStatus::Single),
        birth_place: "Quezon City".to_string(),
    })
}

pub(super) fn contact_input() -> ContactInput {
    ContactInput {
        mobile_number: "+63 917 555 0101".to_string(),
        email: "juan@example.ph".to_string(),
        confirm_email: "juan@example.ph".to_string(),
        address: "12 Mabini Street".to_string(),
        city: "Quezon City".to_string(),
        province: "Metro Manila".to_string(),
        zip_code: None,
    }
}

pub(super) fn contact() -> StepInput {
    StepInput::Contact(contact_input())
}

/// Inputs for steps one through four, in order.
pub(super) fn details() -> Vec<StepInput> {
    vec![location(), schedule(), personal(), contact()]
}

pub(super) fn settings() -> ServiceSettings {
    ServiceSettings {
        policy: SchedulePolicy::default(),
        reference_prefix: "DFA".to_string(),
        lookup_latency: Duration::from_millis(800),
    }
}

pub(super) fn build_service() -> (
    AppointmentService<MemorySessions, MemoryLedger>,
    Arc<MemorySessions>,
    Arc<MemoryLedger>,
) {
    let sessions = Arc::new(MemorySessions::default());
    let ledger = Arc::new(MemoryLedger::default());
    let service = AppointmentService::with_clock(
        sessions.clone(),
        ledger.clone(),
        directory(),
        settings(),
        Arc::new(FixedClock(today())),
    );
    (service, sessions, ledger)
}

pub(super) fn start<R, L>(service: &AppointmentService<R, L>) -> SessionId
where
    R: SessionRepository + 'static,
    L: AppointmentLedger + 'static,
{
    service
        .start_session(StartSessionRequest {
            appointment_type: AppointmentType::Individual,
            accepted_terms: true,
        })
        .expect("session starts")
        .session_id
}

#[derive(Default, Clone)]
pub(super) struct MemorySessions {
    pub(super) records: Arc<Mutex<HashMap<SessionId, BookingSession>>>,
}

impl SessionRepository for MemorySessions {
    fn insert(&self, session: BookingSession) -> Result<BookingSession, SessionError> {
        let mut guard = self.records.lock().expect("session mutex poisoned");
        if guard.contains_key(&session.id) {
            return Err(SessionError::Conflict);
        }
        guard.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<BookingSession>, SessionError> {
        let guard = self.records.lock().expect("session mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update(&self, session: BookingSession) -> Result<(), SessionError> {
        let mut guard = self.records.lock().expect("session mutex poisoned");
        guard.insert(session.id.clone(), session);
        Ok(())
    }

    fn remove(&self, id: &SessionId) -> Result<(), SessionError> {
        let mut guard = self.records.lock().expect("session mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(SessionError::NotFound)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryLedger {
    bookings: Arc<Mutex<Vec<BookingSummary>>>,
}

impl MemoryLedger {
    pub(super) fn bookings(&self) -> Vec<BookingSummary> {
        self.bookings.lock().expect("ledger mutex poisoned").clone()
    }
}

impl AppointmentLedger for MemoryLedger {
    fn record(&self, summary: BookingSummary) -> Result<(), LedgerError> {
        self.bookings
            .lock()
            .expect("ledger mutex poisoned")
            .push(summary);
        Ok(())
    }

    fn find(&self, query: &LookupQuery) -> Result<Option<BookingSummary>, LedgerError> {
        let guard = self.bookings.lock().expect("ledger mutex poisoned");
        let stored = guard.iter().find(|summary| summary.matches(query)).cloned();
        Ok(stored.or_else(|| demo_summary(query)))
    }
}

/// Treats the first code it is offered as already taken by another booking.
#[derive(Default)]
pub(super) struct TakenCodeLedger {
    pub(super) inner: MemoryLedger,
    pub(super) attempted: Mutex<Vec<String>>,
}

impl AppointmentLedger for TakenCodeLedger {
    fn record(&self, summary: BookingSummary) -> Result<(), LedgerError> {
        let mut attempted = self.attempted.lock().expect("ledger mutex poisoned");
        attempted.push(summary.code.clone());
        if attempted[0] == summary.code {
            return Err(LedgerError::Conflict(summary.code));
        }
        self.inner.record(summary)
    }

    fn find(&self, query: &LookupQuery) -> Result<Option<BookingSummary>, LedgerError> {
        self.inner.find(query)
    }
}

pub(super) struct UnavailableLedger;

impl AppointmentLedger for UnavailableLedger {
    fn record(&self, _summary: BookingSummary) -> Result<(), LedgerError> {
        Err(LedgerError::Unavailable("ledger offline".to_string()))
    }

    fn find(&self, _query: &LookupQuery) -> Result<Option<BookingSummary>, LedgerError> {
        Err(LedgerError::Unavailable("ledger offline".to_string()))
    }
}

pub(super) struct UnavailableSessions;

impl SessionRepository for UnavailableSessions {
    fn insert(&self, _session: BookingSession) -> Result<BookingSession, SessionError> {
        Err(SessionError::Unavailable("store offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<BookingSession>, SessionError> {
        Err(SessionError::Unavailable("store offline".to_string()))
    }

    fn update(&self, _session: BookingSession) -> Result<(), SessionError> {
        Err(SessionError::Unavailable("store offline".to_string()))
    }

    fn remove(&self, _id: &SessionId) -> Result<(), SessionError> {
        Err(SessionError::Unavailable("store offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn json_request(
    method: &str,
    uri: &str,
    body: &Value,
) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(body).expect("serialize body"),
        ))
        .expect("request builds")
}

pub(super) fn empty_request(method: &str, uri: &str) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .expect("request builds")
}
