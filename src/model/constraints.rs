use std::collections::HashSet;

use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_ACTIVITIES: [&str; 5] =
    ["Téléphone", "Renseignement", "Dérogation", "Impayés", "Libre"];

pub const WEEK_LEN: usize = 7;
pub const DEFAULT_MIN_STAFF: u32 = 1;
pub const DEFAULT_MAX_STAFF: u32 = 5;
pub const STAFF_UPPER_BOUND: u32 = 100;
pub const DEFAULT_MAX_CONSECUTIVE_DAYS: u32 = 5;
pub const MAX_CONSECUTIVE_DAYS_RANGE: (u32, u32) = (1, 14);
pub const DEFAULT_ACTIVITIES_PER_EMPLOYEE: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ConstraintError {
    #[display(fmt = "unknown activity '{}'", _0)]
    UnknownActivity(String),
    #[display(fmt = "activity '{}' is listed twice", _0)]
    DuplicateActivity(String),
    #[display(fmt = "activity '{}' is missing", _0)]
    MissingActivity(String),
    #[display(fmt = "activity '{}': expected {} daily values, got {}", activity, WEEK_LEN, len)]
    WrongWeekLength { activity: String, len: usize },
    #[display(fmt = "activity '{}': staffing value {} is outside 0..={}", activity, value, STAFF_UPPER_BOUND)]
    StaffingOutOfRange { activity: String, value: u32 },
    #[display(fmt = "activity '{}': max consecutive days {} is outside 1..=14", activity, value)]
    ConsecutiveDaysOutOfRange { activity: String, value: u32 },
    #[display(fmt = "activities per employee {} is outside 1..={}", value, max)]
    ActivitiesPerEmployeeOutOfRange { value: u32, max: u32 },
}

impl std::error::Error for ConstraintError {}

/// Staffing bounds and rotation limit for a single activity.
///
/// `min` and `max` hold one value per weekday, Monday first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActivityConstraints {
    #[schema(example = "Téléphone")]
    pub activity: String,
    #[schema(example = json!([1, 1, 1, 1, 1, 1, 1]))]
    pub min: Vec<u32>,
    #[schema(example = json!([5, 5, 5, 5, 5, 5, 5]))]
    pub max: Vec<u32>,
    #[schema(example = 5)]
    pub max_consecutive_days: u32,
}

impl ActivityConstraints {
    pub fn with_defaults(activity: impl Into<String>) -> Self {
        Self {
            activity: activity.into(),
            min: vec![DEFAULT_MIN_STAFF; WEEK_LEN],
            max: vec![DEFAULT_MAX_STAFF; WEEK_LEN],
            max_consecutive_days: DEFAULT_MAX_CONSECUTIVE_DAYS,
        }
    }

    fn validate(&self) -> Result<(), ConstraintError> {
        for values in [&self.min, &self.max] {
            if values.len() != WEEK_LEN {
                return Err(ConstraintError::WrongWeekLength {
                    activity: self.activity.clone(),
                    len: values.len(),
                });
            }
            if let Some(value) = values.iter().find(|v| **v > STAFF_UPPER_BOUND) {
                return Err(ConstraintError::StaffingOutOfRange {
                    activity: self.activity.clone(),
                    value: *value,
                });
            }
        }

        let (lo, hi) = MAX_CONSECUTIVE_DAYS_RANGE;
        if !(lo..=hi).contains(&self.max_consecutive_days) {
            return Err(ConstraintError::ConsecutiveDaysOutOfRange {
                activity: self.activity.clone(),
                value: self.max_consecutive_days,
            });
        }
        Ok(())
    }
}

/// Numeric planning parameters captured next to the availability grid.
/// Only widget-level bounds are checked; nothing here is interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PlanningConstraints {
    pub activities: Vec<ActivityConstraints>,
    #[schema(example = 3)]
    pub activities_per_employee: u32,
}

impl PlanningConstraints {
    pub fn with_defaults<S: AsRef<str>>(activities: &[S]) -> Self {
        let activities: Vec<ActivityConstraints> = activities
            .iter()
            .map(|a| ActivityConstraints::with_defaults(a.as_ref()))
            .collect();
        let activities_per_employee =
            DEFAULT_ACTIVITIES_PER_EMPLOYEE.min(activities.len() as u32).max(1);
        Self {
            activities,
            activities_per_employee,
        }
    }

    pub fn activity_names(&self) -> impl Iterator<Item = &str> {
        self.activities.iter().map(|a| a.activity.as_str())
    }

    pub fn validate(&self) -> Result<(), ConstraintError> {
        let mut seen = HashSet::new();
        for activity in &self.activities {
            if !seen.insert(activity.activity.as_str()) {
                return Err(ConstraintError::DuplicateActivity(activity.activity.clone()));
            }
            activity.validate()?;
        }

        let max = self.activities.len() as u32;
        if self.activities_per_employee < 1 || self.activities_per_employee > max {
            return Err(ConstraintError::ActivitiesPerEmployeeOutOfRange {
                value: self.activities_per_employee,
                max,
            });
        }
        Ok(())
    }

    /// Replaces every value with `next`, which must cover exactly the same
    /// activity set. Nothing changes on error.
    pub fn replace(&mut self, mut next: PlanningConstraints) -> Result<(), ConstraintError> {
        next.validate()?;

        let current: HashSet<&str> = self.activity_names().collect();
        if let Some(unknown) = next.activity_names().find(|a| !current.contains(a)) {
            return Err(ConstraintError::UnknownActivity(unknown.to_string()));
        }
        let incoming: HashSet<&str> = next.activity_names().collect();
        if let Some(missing) = self.activity_names().find(|a| !incoming.contains(a)) {
            return Err(ConstraintError::MissingActivity(missing.to_string()));
        }

        // keep the configured activity order
        next.activities.sort_by_key(|a| {
            self.activities
                .iter()
                .position(|c| c.activity == a.activity)
                .unwrap_or(usize::MAX)
        });
        *self = next;
        Ok(())
    }
}

impl Default for PlanningConstraints {
    fn default() -> Self {
        Self::with_defaults(&DEFAULT_ACTIVITIES)
    }
}
