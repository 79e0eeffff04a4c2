use chrono::NaiveDate;

use super::directory::LocationDirectory;
use super::domain::{
    ContactDetails, ContactInput, LocationInput, LocationSelection, PersonalDetails,
    PersonalInput, ScheduleInput, ScheduleSelection, StepInput, TimeSlot,
};
use super::schedule::SchedulePolicy;

/// Reasons a step's input cannot be accepted. Always recoverable by resubmitting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("site '{site}' is not offered under {region} / {country}")]
    UnknownOffice {
        region: String,
        country: String,
        site: String,
    },
    #[error("{date} is not an available appointment date")]
    DateNotSelectable { date: NaiveDate },
    #[error("'{label}' is not one of the offered time slots")]
    UnknownTimeSlot { label: String },
    #[error("email addresses do not match")]
    EmailMismatch,
}

impl ValidationError {
    /// Input field the error should be reported against.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field } => field,
            Self::UnknownOffice { .. } => "site",
            Self::DateNotSelectable { .. } => "date",
            Self::UnknownTimeSlot { .. } => "time_slot",
            Self::EmailMismatch => "confirm_email",
        }
    }
}

/// Sanitized result of a step that passed its rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ValidatedStep {
    Location(LocationSelection),
    Schedule(ScheduleSelection),
    Personal(PersonalDetails),
    Contact(ContactDetails),
    Review,
}

/// Per-step rules bound to the directory, calendar policy, and evaluation date.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StepRules<'a> {
    directory: &'a LocationDirectory,
    policy: SchedulePolicy,
    today: NaiveDate,
}

impl<'a> StepRules<'a> {
    pub(crate) fn new(
        directory: &'a LocationDirectory,
        policy: SchedulePolicy,
        today: NaiveDate,
    ) -> Self {
        Self {
            directory,
            policy,
            today,
        }
    }

    pub(crate) fn check(&self, input: &StepInput) -> Result<ValidatedStep, ValidationError> {
        match input {
            StepInput::Location(location) => self.location(location).map(ValidatedStep::Location),
            StepInput::Schedule(schedule) => self.schedule(schedule).map(ValidatedStep::Schedule),
            StepInput::Personal(personal) => personal_details(personal).map(ValidatedStep::Personal),
            StepInput::Contact(contact) => contact_details(contact).map(ValidatedStep::Contact),
            StepInput::Review => Ok(ValidatedStep::Review),
        }
    }

    fn location(&self, input: &LocationInput) -> Result<LocationSelection, ValidationError> {
        let region = required("region", &input.region)?;
        let country = required("country", &input.country)?;
        let site = required("site", &input.site)?;

        if self.directory.find(region, country, site).is_none() {
            return Err(ValidationError::UnknownOffice {
                region: region.to_string(),
                country: country.to_string(),
                site: site.to_string(),
            });
        }

        Ok(LocationSelection {
            region: region.to_string(),
            country: country.to_string(),
            site: site.to_string(),
        })
    }

    fn schedule(&self, input: &ScheduleInput) -> Result<ScheduleSelection, ValidationError> {
        let date = input
            .date
            .ok_or(ValidationError::MissingField { field: "date" })?;
        let label = required("time_slot", &input.time_slot)?;

        if !self.policy.is_selectable(date, self.today) {
            return Err(ValidationError::DateNotSelectable { date });
        }

        let time_slot =
            TimeSlot::from_label(label).ok_or_else(|| ValidationError::UnknownTimeSlot {
                label: label.to_string(),
            })?;

        Ok(ScheduleSelection { date, time_slot })
    }
}

fn personal_details(input: &PersonalInput) -> Result<PersonalDetails, ValidationError> {
    let first_name = required("first_name", &input.first_name)?;
    let last_name = required("last_name", &input.last_name)?;
    let birth_date = input
        .birth_date
        .ok_or(ValidationError::MissingField {
            field: "birth_date",
        })?;
    let gender = input
        .gender
        .ok_or(ValidationError::MissingField { field: "gender" })?;
    let civil_status = input.civil_status.ok_or(ValidationError::MissingField {
        field: "civil_status",
    })?;
    let birth_place = required("birth_place", &input.birth_place)?;

    Ok(PersonalDetails {
        first_name: first_name.to_string(),
        middle_name: optional(input.middle_name.as_deref()),
        last_name: last_name.to_string(),
        birth_date,
        gender,
        civil_status,
        birth_place: birth_place.to_string(),
    })
}

fn contact_details(input: &ContactInput) -> Result<ContactDetails, ValidationError> {
    let mobile_number = required("mobile_number", &input.mobile_number)?;
    let email = required("email", &input.email)?;
    let confirm_email = required("confirm_email", &input.confirm_email)?;
    let address = required("address", &input.address)?;
    let city = required("city", &input.city)?;
    let province = required("province", &input.province)?;

    if email != confirm_email {
        return Err(ValidationError::EmailMismatch);
    }

    Ok(ContactDetails {
        mobile_number: mobile_number.to_string(),
        email: email.to_string(),
        confirm_email: confirm_email.to_string(),
        address: address.to_string(),
        city: city.to_string(),
        province: province.to_string(),
        zip_code: optional(input.zip_code.as_deref()),
    })
}

// Blank means missing; the value itself is kept as entered.
fn required<'v>(field: &'static str, value: &'v str) -> Result<&'v str, ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField { field })
    } else {
        Ok(value)
    }
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::appointment::domain::{CivilStatus, Gender};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 1).expect("valid date")
    }

    fn personal() -> PersonalInput {
        PersonalInput {
            first_name: "Juan".to_string(),
            middle_name: Some("  ".to_string()),
            last_name: "Dela Cruz".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 6, 12),
            gender: Some(Gender::Male),
            civil_status: Some(CivilStatus::Single),
            birth_place: "Quezon City, Metro Manila".to_string(),
        }
    }

    #[test]
    fn blank_middle_name_is_stored_as_absent() {
        let details = personal_details(&personal()).expect("valid personal input");
        assert!(details.middle_name.is_none());
        assert_eq!(details.formal_name(), "Dela Cruz, Juan");
    }

    #[test]
    fn whitespace_only_required_field_is_missing() {
        let mut input = personal();
        input.birth_place = "   ".to_string();
        assert_eq!(
            personal_details(&input),
            Err(ValidationError::MissingField {
                field: "birth_place"
            })
        );
    }

    #[test]
    fn unset_enumerations_are_reported_by_field() {
        let mut input = personal();
        input.civil_status = None;
        let error = personal_details(&input).expect_err("civil status missing");
        assert_eq!(error.field(), "civil_status");
    }

    #[test]
    fn email_comparison_is_case_sensitive() {
        let input = ContactInput {
            mobile_number: "0912 345 6789".to_string(),
            email: "juan@gmail.com".to_string(),
            confirm_email: "Juan@gmail.com".to_string(),
            address: "123 Rizal Street".to_string(),
            city: "Quezon City".to_string(),
            province: "Metro Manila".to_string(),
            zip_code: None,
        };
        assert_eq!(contact_details(&input), Err(ValidationError::EmailMismatch));
    }

    #[test]
    fn schedule_rejects_unknown_slot_labels() {
        let directory = LocationDirectory::default();
        let rules = StepRules::new(&directory, SchedulePolicy::default(), today());
        let input = StepInput::Schedule(ScheduleInput {
            date: Some(today()),
            time_slot: "12:00 PM - 01:00 PM".to_string(),
        });

        match rules.check(&input) {
            Err(ValidationError::UnknownTimeSlot { label }) => {
                assert_eq!(label, "12:00 PM - 01:00 PM")
            }
            other => panic!("expected unknown slot, got {other:?}"),
        }
    }

    #[test]
    fn location_rejects_sites_outside_the_directory() {
        let directory = LocationDirectory::default();
        let rules = StepRules::new(&directory, SchedulePolicy::default(), today());
        let input = StepInput::Location(LocationInput {
            region: "ASIA PACIFIC".to_string(),
            country: "PHILIPPINES".to_string(),
            site: "DFA Manila (Aseana)".to_string(),
        });

        let error = rules.check(&input).expect_err("empty directory has no sites");
        assert_eq!(error.field(), "site");
    }
}
