use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Page of the booking form, in the order the wizard walks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Location,
    Schedule,
    Personal,
    Contact,
    Review,
}

impl WizardStep {
    pub const COUNT: u8 = 5;

    pub const fn ordered() -> [Self; 5] {
        [
            Self::Location,
            Self::Schedule,
            Self::Personal,
            Self::Contact,
            Self::Review,
        ]
    }

    /// One-based position shown to applicants ("Step 2 of 5").
    pub const fn number(self) -> u8 {
        match self {
            Self::Location => 1,
            Self::Schedule => 2,
            Self::Personal => 3,
            Self::Contact => 4,
            Self::Review => 5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Location => "Select Location",
            Self::Schedule => "Date & Time",
            Self::Personal => "Personal Information",
            Self::Contact => "Contact Information",
            Self::Review => "Review & Confirm",
        }
    }

    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Location => Some(Self::Schedule),
            Self::Schedule => Some(Self::Personal),
            Self::Personal => Some(Self::Contact),
            Self::Contact => Some(Self::Review),
            Self::Review => None,
        }
    }

    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Location => None,
            Self::Schedule => Some(Self::Location),
            Self::Personal => Some(Self::Schedule),
            Self::Contact => Some(Self::Personal),
            Self::Review => Some(Self::Contact),
        }
    }

    pub fn progress_percent(self) -> u8 {
        let ratio = f32::from(self.number()) / f32::from(Self::COUNT);
        (ratio * 100.0).round() as u8
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({})", self.number(), self.label())
    }
}

/// Hour-long appointment windows offered every bookable day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    EightAm,
    NineAm,
    TenAm,
    ElevenAm,
    OnePm,
    TwoPm,
    ThreePm,
    FourPm,
}

impl TimeSlot {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::EightAm,
            Self::NineAm,
            Self::TenAm,
            Self::ElevenAm,
            Self::OnePm,
            Self::TwoPm,
            Self::ThreePm,
            Self::FourPm,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::EightAm => "08:00 AM - 09:00 AM",
            Self::NineAm => "09:00 AM - 10:00 AM",
            Self::TenAm => "10:00 AM - 11:00 AM",
            Self::ElevenAm => "11:00 AM - 12:00 PM",
            Self::OnePm => "01:00 PM - 02:00 PM",
            Self::TwoPm => "02:00 PM - 03:00 PM",
            Self::ThreePm => "03:00 PM - 04:00 PM",
            Self::FourPm => "04:00 PM - 05:00 PM",
        }
    }

    pub const fn start_label(self) -> &'static str {
        match self {
            Self::EightAm => "08:00 AM",
            Self::NineAm => "09:00 AM",
            Self::TenAm => "10:00 AM",
            Self::ElevenAm => "11:00 AM",
            Self::OnePm => "01:00 PM",
            Self::TwoPm => "02:00 PM",
            Self::ThreePm => "03:00 PM",
            Self::FourPm => "04:00 PM",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ordered()
            .into_iter()
            .find(|slot| slot.label() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CivilStatus {
    Single,
    Married,
    Widowed,
    Separated,
    Annulled,
}

impl CivilStatus {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Single,
            Self::Married,
            Self::Widowed,
            Self::Separated,
            Self::Annulled,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::Married => "Married",
            Self::Widowed => "Widowed",
            Self::Separated => "Separated",
            Self::Annulled => "Annulled",
        }
    }
}

/// Chosen on the landing page before the wizard opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    Individual,
    Group,
}

impl AppointmentType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Individual => "Individual",
            Self::Group => "Group",
        }
    }
}

/// Raw form input for the location page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInput {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub site: String,
}

/// Raw form input for the date/time page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleInput {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time_slot: String,
}

/// Raw form input for the personal information page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub civil_status: Option<CivilStatus>,
    #[serde(default)]
    pub birth_place: String,
}

/// Raw form input for the contact information page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInput {
    #[serde(default)]
    pub mobile_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub confirm_email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub zip_code: Option<String>,
}

/// Input submitted by a step page. Each variant carries only the fields that page owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepInput {
    Location(LocationInput),
    Schedule(ScheduleInput),
    Personal(PersonalInput),
    Contact(ContactInput),
    Review,
}

impl StepInput {
    pub const fn step(&self) -> WizardStep {
        match self {
            Self::Location(_) => WizardStep::Location,
            Self::Schedule(_) => WizardStep::Schedule,
            Self::Personal(_) => WizardStep::Personal,
            Self::Contact(_) => WizardStep::Contact,
            Self::Review => WizardStep::Review,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSelection {
    pub region: String,
    pub country: String,
    pub site: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSelection {
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalDetails {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub civil_status: CivilStatus,
    pub birth_place: String,
}

impl PersonalDetails {
    /// "Dela Cruz, Juan Santos" as printed on the review page.
    pub fn formal_name(&self) -> String {
        match &self.middle_name {
            Some(middle) => format!("{}, {} {}", self.last_name, self.first_name, middle),
            None => format!("{}, {}", self.last_name, self.first_name),
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub mobile_number: String,
    pub email: String,
    pub confirm_email: String,
    pub address: String,
    pub city: String,
    pub province: String,
    pub zip_code: Option<String>,
}

impl ContactDetails {
    pub fn mailing_address(&self) -> String {
        match &self.zip_code {
            Some(zip) => format!("{}, {}, {} {}", self.address, self.city, self.province, zip),
            None => format!("{}, {}, {}", self.address, self.city, self.province),
        }
    }
}

/// Accumulated booking data. A section is filled once its step validates and stays filled
/// until the wizard is reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub location: Option<LocationSelection>,
    pub schedule: Option<ScheduleSelection>,
    pub personal: Option<PersonalDetails>,
    pub contact: Option<ContactDetails>,
}

impl BookingDraft {
    pub fn site(&self) -> Option<&str> {
        self.location.as_ref().map(|location| location.site.as_str())
    }

    pub fn email(&self) -> Option<&str> {
        self.contact.as_ref().map(|contact| contact.email.as_str())
    }

    pub fn is_complete(&self) -> bool {
        self.location.is_some()
            && self.schedule.is_some()
            && self.personal.is_some()
            && self.contact.is_some()
    }

    /// Reconstructs the form input a step page should be pre-populated with.
    pub fn prefill(&self, step: WizardStep) -> Option<StepInput> {
        match step {
            WizardStep::Location => self.location.as_ref().map(|location| {
                StepInput::Location(LocationInput {
                    region: location.region.clone(),
                    country: location.country.clone(),
                    site: location.site.clone(),
                })
            }),
            WizardStep::Schedule => self.schedule.map(|schedule| {
                StepInput::Schedule(ScheduleInput {
                    date: Some(schedule.date),
                    time_slot: schedule.time_slot.label().to_string(),
                })
            }),
            WizardStep::Personal => self.personal.as_ref().map(|personal| {
                StepInput::Personal(PersonalInput {
                    first_name: personal.first_name.clone(),
                    middle_name: personal.middle_name.clone(),
                    last_name: personal.last_name.clone(),
                    birth_date: Some(personal.birth_date),
                    gender: Some(personal.gender),
                    civil_status: Some(personal.civil_status),
                    birth_place: personal.birth_place.clone(),
                })
            }),
            WizardStep::Contact => self.contact.as_ref().map(|contact| {
                StepInput::Contact(ContactInput {
                    mobile_number: contact.mobile_number.clone(),
                    email: contact.email.clone(),
                    confirm_email: contact.confirm_email.clone(),
                    address: contact.address.clone(),
                    city: contact.city.clone(),
                    province: contact.province.clone(),
                    zip_code: contact.zip_code.clone(),
                })
            }),
            WizardStep::Review => None,
        }
    }
}
