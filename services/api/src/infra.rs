use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use passport_appointment::config::BookingConfig;
use passport_appointment::workflows::appointment::{
    demo_summary, AppointmentLedger, AppointmentService, BookingSession, BookingSummary, Clock,
    DirectoryError, LedgerError, LocationDirectory, LookupQuery, ServiceSettings, SessionError,
    SessionId, SessionRepository,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

pub(crate) type BookingService = AppointmentService<InMemorySessionRepository, InMemoryLedger>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySessionRepository {
    records: Arc<Mutex<HashMap<SessionId, BookingSession>>>,
}

impl SessionRepository for InMemorySessionRepository {
    fn insert(&self, session: BookingSession) -> Result<BookingSession, SessionError> {
        let mut guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.contains_key(&session.id) {
            return Err(SessionError::Conflict);
        }
        guard.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<BookingSession>, SessionError> {
        let guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(id).cloned())
    }

    fn update(&self, session: BookingSession) -> Result<(), SessionError> {
        let mut guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.contains_key(&session.id) {
            guard.insert(session.id.clone(), session);
            Ok(())
        } else {
            Err(SessionError::NotFound)
        }
    }

    fn remove(&self, id: &SessionId) -> Result<(), SessionError> {
        let mut guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        guard.remove(id).map(|_| ()).ok_or(SessionError::NotFound)
    }
}

/// Bookings confirmed by this process. Unknown codes fall back to the `demo` sample booking.
#[derive(Default, Clone)]
pub(crate) struct InMemoryLedger {
    bookings: Arc<Mutex<Vec<BookingSummary>>>,
}

impl AppointmentLedger for InMemoryLedger {
    fn record(&self, summary: BookingSummary) -> Result<(), LedgerError> {
        let mut guard = self.bookings.lock().unwrap_or_else(PoisonError::into_inner);
        if guard
            .iter()
            .any(|existing| existing.code.eq_ignore_ascii_case(&summary.code))
        {
            return Err(LedgerError::Conflict(summary.code));
        }
        guard.push(summary);
        Ok(())
    }

    fn find(&self, query: &LookupQuery) -> Result<Option<BookingSummary>, LedgerError> {
        let guard = self.bookings.lock().unwrap_or_else(PoisonError::into_inner);
        let stored = guard.iter().find(|summary| summary.matches(query)).cloned();
        Ok(stored.or_else(|| demo_summary(query)))
    }
}

impl InMemoryLedger {
    pub(crate) fn len(&self) -> usize {
        self.bookings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

pub(crate) fn load_directory(config: &BookingConfig) -> Result<LocationDirectory, DirectoryError> {
    let directory = match &config.offices_csv {
        Some(path) => LocationDirectory::from_path(path)?,
        None => LocationDirectory::standard()?,
    };
    let source = config
        .offices_csv
        .as_deref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "bundled".to_string());
    info!(offices = directory.office_count(), %source, "office directory loaded");
    Ok(directory)
}

pub(crate) fn booking_service(
    config: &BookingConfig,
    clock: Arc<dyn Clock>,
) -> Result<(BookingService, Arc<InMemoryLedger>), DirectoryError> {
    let directory = Arc::new(load_directory(config)?);
    let ledger = Arc::new(InMemoryLedger::default());
    let service = AppointmentService::with_clock(
        Arc::new(InMemorySessionRepository::default()),
        ledger.clone(),
        directory,
        ServiceSettings::from(config),
        clock,
    );
    Ok((service, ledger))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
