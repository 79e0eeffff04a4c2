use serde::{Deserialize, Serialize};

use crate::workflows::appointment::confirmation::ConfirmationRecord;
use crate::workflows::appointment::domain::AppointmentType;

const DEMO_CODE: &str = "demo";

pub const NOT_FOUND_MESSAGE: &str =
    "Appointment not found. Please check your appointment code and email address.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Confirmed,
    Pending,
    Cancelled,
}

impl AppointmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Confirmed => "Confirmed",
            Self::Pending => "Pending",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// Booking details returned by the view-appointment lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSummary {
    pub code: String,
    pub email: String,
    pub name: String,
    #[serde(rename = "type")]
    pub appointment_type: String,
    pub site: String,
    pub date: String,
    pub time: String,
    pub status: AppointmentStatus,
}

impl BookingSummary {
    /// Summary of a booking the wizard just confirmed. `None` if the snapshot is incomplete.
    pub fn from_confirmation(
        record: &ConfirmationRecord,
        appointment_type: AppointmentType,
    ) -> Option<Self> {
        let draft = record.draft();
        let location = draft.location.as_ref()?;
        let schedule = draft.schedule.as_ref()?;
        let personal = draft.personal.as_ref()?;
        let contact = draft.contact.as_ref()?;

        Some(Self {
            code: record.reference_code().to_string(),
            email: contact.email.clone(),
            name: personal.display_name(),
            appointment_type: appointment_type.label().to_string(),
            site: location.site.clone(),
            date: schedule.date.format("%B %-d, %Y").to_string(),
            time: schedule.time_slot.start_label().to_string(),
            status: AppointmentStatus::Confirmed,
        })
    }

    pub fn matches(&self, query: &LookupQuery) -> bool {
        self.code.eq_ignore_ascii_case(query.code.trim())
            && self.email.eq_ignore_ascii_case(query.email.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupQuery {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub email: String,
}

impl LookupQuery {
    pub fn new(code: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            email: email.into(),
        }
    }

    pub fn validate(&self) -> Result<(), LookupError> {
        if self.code.trim().is_empty() || self.email.trim().is_empty() {
            return Err(LookupError::MissingCredentials);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("Please enter both appointment code and email address.")]
    MissingCredentials,
    #[error("Error retrieving appointment. Please try again. ({0})")]
    Unavailable(String),
}

/// Fixed sample booking served for the `demo` code so the lookup page can be tried out.
pub fn demo_summary(query: &LookupQuery) -> Option<BookingSummary> {
    let code = query.code.trim();
    let email = query.email.trim();
    if !code.eq_ignore_ascii_case(DEMO_CODE) || !email.contains('@') {
        return None;
    }

    Some(BookingSummary {
        code: code.to_uppercase(),
        email: email.to_string(),
        name: "Juan Dela Cruz".to_string(),
        appointment_type: AppointmentType::Individual.label().to_string(),
        site: "DFA Manila (Aseana)".to_string(),
        date: "December 20, 2025".to_string(),
        time: "10:00 AM".to_string(),
        status: AppointmentStatus::Confirmed,
    })
}
