use super::domain::{demo_summary, BookingSummary, LookupQuery};

/// Source of bookings for the view-appointment lookup. Implementations stand in for the
/// remote appointment service.
pub trait AppointmentLedger: Send + Sync {
    fn record(&self, summary: BookingSummary) -> Result<(), LedgerError>;
    fn find(&self, query: &LookupQuery) -> Result<Option<BookingSummary>, LedgerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("booking {0} already recorded")]
    Conflict(String),
    #[error("appointment service unavailable: {0}")]
    Unavailable(String),
}

/// Ledger that only knows the `demo` sample booking and discards new ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoLedger;

impl AppointmentLedger for DemoLedger {
    fn record(&self, _summary: BookingSummary) -> Result<(), LedgerError> {
        Ok(())
    }

    fn find(&self, query: &LookupQuery) -> Result<Option<BookingSummary>, LedgerError> {
        Ok(demo_summary(query))
    }
}
