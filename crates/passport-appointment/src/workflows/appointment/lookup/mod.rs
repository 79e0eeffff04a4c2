//! View-appointment lookup: the query boundary, the booking ledger behind it, and the tracker
//! that lets the newest request win.

pub mod domain;
pub mod ledger;
pub mod tracker;

pub use domain::{
    demo_summary, AppointmentStatus, BookingSummary, LookupError, LookupQuery, NOT_FOUND_MESSAGE,
};
pub use ledger::{AppointmentLedger, DemoLedger, LedgerError};
pub use tracker::{
    LookupOutcome, LookupStatus, LookupTicket, LookupTracker, DEFAULT_LOOKUP_LATENCY,
};
