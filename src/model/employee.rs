use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Stable employee identifier, e.g. `"Employé 7"`.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    From,
)]
#[serde(transparent)]
pub struct Employee(String);

impl Employee {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numbered roster `"<prefix> 1" ..= "<prefix> size"`.
    pub fn roster(prefix: &str, size: usize) -> Vec<Employee> {
        (1..=size)
            .map(|n| Employee(format!("{} {}", prefix, n)))
            .collect()
    }
}

impl From<&str> for Employee {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
