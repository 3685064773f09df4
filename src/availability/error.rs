use chrono::NaiveDate;
use derive_more::Display;

use crate::model::work_state::Segment;

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum AvailabilityError {
    #[display(fmt = "roster must contain at least one employee")]
    EmptyRoster,
    #[display(fmt = "employee '{}' appears twice in the roster", _0)]
    DuplicateEmployee(String),
    #[display(fmt = "horizon must contain at least one day")]
    EmptyHorizon,
    #[display(fmt = "horizon starting {} runs past the last representable date", _0)]
    HorizonOutOfRange(NaiveDate),
    #[display(fmt = "day {} appears twice in the horizon", _0)]
    DuplicateDay(NaiveDate),
    #[display(fmt = "no cell for employee '{}' on {} ({})", employee, day, segment)]
    UnknownCellKey {
        employee: String,
        day: NaiveDate,
        segment: Segment,
    },
    #[display(fmt = "unknown employee '{}'", _0)]
    UnknownEmployee(String),
    #[display(fmt = "'{}' is not a recognised availability marker", _0)]
    InvalidDisplayValue(String),
    #[display(fmt = "edited grid does not match the current grid: {}", _0)]
    ShapeMismatch(String),
}

impl std::error::Error for AvailabilityError {}
