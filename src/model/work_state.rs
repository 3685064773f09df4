use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Whether an employee works a given segment or is on leave.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumIter,
)]
pub enum WorkState {
    #[default]
    Working,
    Leave,
}

impl WorkState {
    pub fn toggled(self) -> Self {
        match self {
            WorkState::Working => WorkState::Leave,
            WorkState::Leave => WorkState::Working,
        }
    }
}

/// Granularity unit of a day.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Segment {
    WholeDay,
    Morning,
    Afternoon,
}

/// Fixed per session; never mixed inside one grid.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Granularity {
    #[default]
    WholeDay,
    HalfDay,
}

const WHOLE_DAY_SEGMENTS: [Segment; 1] = [Segment::WholeDay];
const HALF_DAY_SEGMENTS: [Segment; 2] = [Segment::Morning, Segment::Afternoon];

impl Granularity {
    pub fn segments(self) -> &'static [Segment] {
        match self {
            Granularity::WholeDay => &WHOLE_DAY_SEGMENTS,
            Granularity::HalfDay => &HALF_DAY_SEGMENTS,
        }
    }

    pub fn segment_index(self, segment: Segment) -> Option<usize> {
        self.segments().iter().position(|s| *s == segment)
    }
}

/// Vocabulary used when the grid leaves the process.
///
/// `Legacy` is the French wording consumed by the existing planning tools and
/// must stay byte-exact. `Canonical` is the English-keyed form.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Wording {
    #[default]
    Legacy,
    Canonical,
}

impl Wording {
    pub fn state(self, state: WorkState) -> &'static str {
        match (self, state) {
            (Wording::Legacy, WorkState::Working) => "Travail",
            (Wording::Legacy, WorkState::Leave) => "Congé",
            (Wording::Canonical, WorkState::Working) => "Working",
            (Wording::Canonical, WorkState::Leave) => "Leave",
        }
    }

    /// Key of a half-day segment inside a day entry.
    pub fn segment(self, segment: Segment) -> &'static str {
        match (self, segment) {
            (Wording::Legacy, Segment::WholeDay) => "Journée",
            (Wording::Legacy, Segment::Morning) => "Matin",
            (Wording::Legacy, Segment::Afternoon) => "Après-midi",
            (Wording::Canonical, Segment::WholeDay) => "WholeDay",
            (Wording::Canonical, Segment::Morning) => "Morning",
            (Wording::Canonical, Segment::Afternoon) => "Afternoon",
        }
    }
}
