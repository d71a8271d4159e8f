use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{DueDate, Money, MonthKey};

/// Result of spreading a total over due dates.
///
/// Both maps are ordered chronologically and serialize with the keys the
/// downstream report and backup consumers expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    #[serde(rename = "montosAsignados")]
    pub per_date: BTreeMap<DueDate, Money>,
    #[serde(rename = "resumenMensual")]
    pub per_month: BTreeMap<MonthKey, Money>,
}

impl Distribution {
    pub fn total(&self) -> Money {
        self.per_date.values().sum()
    }

    pub fn monthly_total(&self) -> Money {
        self.per_month.values().sum()
    }
}
