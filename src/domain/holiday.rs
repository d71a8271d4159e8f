use serde::{Deserialize, Serialize};

/// Holiday that recurs on the same day every year, as kept in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedHoliday {
    pub day: u32,
    pub month: u32,
    #[serde(default)]
    pub name: String,
}

impl FixedHoliday {
    pub fn new(day: u32, month: u32, name: impl Into<String>) -> Self {
        Self {
            day,
            month,
            name: name.into(),
        }
    }
}

/// Holiday resolved for a concrete year. `date` is `DD/MM/YYYY`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: String,
    pub name: String,
}
