use super::domain::TimeSlot;
use chrono::{Datelike, Duration, NaiveDate, Weekday};

pub const DEFAULT_BOOKING_HORIZON_DAYS: u32 = 90;
/// Ten years; wider windows are clamped.
pub const MAX_BOOKING_HORIZON_DAYS: u32 = 3650;

/// Calendar rules for the date/time step.
///
/// Every function takes `today` explicitly so callers decide which clock applies. Slots are the
/// same for every office and every day; no per-slot capacity is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulePolicy {
    horizon_days: u32,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BOOKING_HORIZON_DAYS)
    }
}

impl SchedulePolicy {
    pub const fn new(horizon_days: u32) -> Self {
        let horizon_days = if horizon_days > MAX_BOOKING_HORIZON_DAYS {
            MAX_BOOKING_HORIZON_DAYS
        } else {
            horizon_days
        };
        Self { horizon_days }
    }

    pub const fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    /// Inclusive end of the window. Saturates at the last representable date.
    pub fn last_bookable(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_add_signed(Duration::days(i64::from(self.horizon_days)))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn is_selectable(&self, date: NaiveDate, today: NaiveDate) -> bool {
        date >= today && date <= self.last_bookable(today) && !is_weekend(date)
    }

    /// All selectable dates from `today` through the end of the horizon.
    pub fn selectable_dates(&self, today: NaiveDate) -> Vec<NaiveDate> {
        let last = self.last_bookable(today);
        std::iter::successors(Some(today), |date| date.succ_opt())
            .take_while(|date| *date <= last)
            .filter(|date| !is_weekend(*date))
            .collect()
    }

    pub const fn time_slots(&self) -> [TimeSlot; 8] {
        TimeSlot::ordered()
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
