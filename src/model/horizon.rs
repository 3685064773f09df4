use std::collections::HashSet;

use chrono::{Days, NaiveDate};

use crate::availability::error::AvailabilityError;

/// Ordered, duplicate-free run of calendar days under consideration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Horizon {
    days: Vec<NaiveDate>,
}

pub const DEFAULT_HORIZON_DAYS: usize = 28;
pub const DAYS_PER_WEEK: usize = 7;

impl Horizon {
    /// Contiguous run of `len` days starting at `start`.
    pub fn anchored(start: NaiveDate, len: usize) -> Result<Self, AvailabilityError> {
        let days = (0..len)
            .map(|offset| start.checked_add_days(Days::new(offset as u64)))
            .collect::<Option<Vec<_>>>()
            .ok_or(AvailabilityError::HorizonOutOfRange(start))?;
        Self::from_days(days)
    }

    pub fn from_days(days: Vec<NaiveDate>) -> Result<Self, AvailabilityError> {
        if days.is_empty() {
            return Err(AvailabilityError::EmptyHorizon);
        }
        let mut seen = HashSet::with_capacity(days.len());
        for day in &days {
            if !seen.insert(*day) {
                return Err(AvailabilityError::DuplicateDay(*day));
            }
        }
        Ok(Self { days })
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn start(&self) -> NaiveDate {
        self.days[0]
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Rows of seven days counted from the first day of the horizon, whatever
    /// weekday that is. The last row may be shorter.
    pub fn weeks(&self) -> impl Iterator<Item = &[NaiveDate]> {
        self.days.chunks(DAYS_PER_WEEK)
    }
}

/// Short column label, e.g. `Mon 01/01`.
pub fn day_label(day: NaiveDate) -> String {
    day.format("%a %d/%m").to_string()
}
