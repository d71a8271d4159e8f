//! Public holidays per year and the business-day rule used to vet due dates.
//!
//! Fixed holidays come from a [`FixedHolidaySource`] and are loaded once per
//! process; Holy Thursday and Good Friday are computed for each year. Resolved
//! years are kept in memory for the lifetime of the calendar.

pub mod easter;
pub mod sources;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Weekday};
use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::domain::{DueDate, Error, FixedHoliday, FixedHolidaySource, Holiday};

pub use sources::{JsonFileHolidays, StaticFixedHolidays};

pub const MIN_YEAR: i32 = 1583;
pub const MAX_YEAR: i32 = 9999;

/// Why a date cannot be used as a due date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NonBusinessDay {
    Sunday,
    Saturday,
    Holiday(String),
}

impl core::fmt::Display for NonBusinessDay {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NonBusinessDay::Sunday => write!(f, "Sunday"),
            NonBusinessDay::Saturday => write!(f, "Saturday"),
            NonBusinessDay::Holiday(name) if name.is_empty() => write!(f, "holiday"),
            NonBusinessDay::Holiday(name) => write!(f, "holiday: {}", name),
        }
    }
}

pub struct HolidayCalendar {
    source: Arc<dyn FixedHolidaySource>,
    fixed: OnceCell<Arc<Vec<FixedHoliday>>>,
    by_year: DashMap<i32, Arc<Vec<Holiday>>>,
    reject_saturdays: bool,
}

impl HolidayCalendar {
    pub fn new(source: Arc<dyn FixedHolidaySource>) -> Self {
        Self {
            source,
            fixed: OnceCell::new(),
            by_year: DashMap::new(),
            reject_saturdays: false,
        }
    }

    pub fn with_reject_saturdays(mut self, reject: bool) -> Self {
        self.reject_saturdays = reject;
        self
    }

    pub async fn holidays_for_year(&self, year: i32) -> Result<Arc<Vec<Holiday>>, Error> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(Error::validation(format!(
                "Year must be between {} and {}, got {}",
                MIN_YEAR, MAX_YEAR, year
            )));
        }
        if let Some(cached) = self.by_year.get(&year) {
            return Ok(Arc::clone(cached.value()));
        }

        let fixed = self.fixed_holidays().await?;
        let resolved = Arc::new(resolve_year(year, &fixed)?);
        self.by_year.insert(year, Arc::clone(&resolved));
        tracing::debug!(year, holidays = resolved.len(), "Resolved holidays for year");
        Ok(resolved)
    }

    async fn fixed_holidays(&self) -> Result<Arc<Vec<FixedHoliday>>, Error> {
        let fixed = self
            .fixed
            .get_or_try_init(|| async {
                tracing::info!("Loading fixed holidays (first use)");
                match self.source.load().await {
                    Ok(holidays) => Ok(Arc::new(holidays)),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to load fixed holidays");
                        Err(match e {
                            Error::Upstream(msg) => Error::Upstream(msg),
                            other => Error::Upstream(format!(
                                "Failed to retrieve holiday data: {}",
                                other
                            )),
                        })
                    }
                }
            })
            .await?;
        Ok(Arc::clone(fixed))
    }

    /// Returns `Some(reason)` when `date` is not a valid due date.
    pub async fn non_business_reason(&self, date: DueDate) -> Result<Option<NonBusinessDay>, Error> {
        match date.weekday() {
            Weekday::Sun => return Ok(Some(NonBusinessDay::Sunday)),
            Weekday::Sat if self.reject_saturdays => return Ok(Some(NonBusinessDay::Saturday)),
            _ => {}
        }
        let year = date.month_key().year;
        let holidays = self.holidays_for_year(year).await?;
        let formatted = date.to_string();
        Ok(holidays
            .iter()
            .find(|h| h.date == formatted)
            .map(|h| NonBusinessDay::Holiday(h.name.clone())))
    }

    /// Rejects the first date that falls on a Sunday or a holiday.
    pub async fn ensure_business_days(&self, dates: &[DueDate]) -> Result<(), Error> {
        for date in dates {
            if let Some(reason) = self.non_business_reason(*date).await? {
                return Err(Error::validation(format!(
                    "Date {} is not a business day ({})",
                    date, reason
                )));
            }
        }
        Ok(())
    }
}

/// Merges fixed holidays with the year's Holy Week. Holy Week wins on a clash;
/// fixed dates that do not exist in `year` (29/02) are skipped.
fn resolve_year(year: i32, fixed: &[FixedHoliday]) -> Result<Vec<Holiday>, Error> {
    let mut merged: BTreeMap<NaiveDate, String> = BTreeMap::new();
    for holiday in fixed {
        match NaiveDate::from_ymd_opt(year, holiday.month, holiday.day) {
            Some(date) => {
                merged.insert(date, holiday.name.clone());
            }
            None => tracing::debug!(
                year,
                day = holiday.day,
                month = holiday.month,
                "Skipping fixed holiday absent from year"
            ),
        }
    }

    let holy_week = easter::holy_week(year)
        .ok_or_else(|| Error::Internal(format!("Could not compute Easter for {}", year)))?;
    for (date, name) in holy_week {
        merged.insert(date, name.to_string());
    }

    Ok(merged
        .into_iter()
        .map(|(date, name)| Holiday {
            date: DueDate::new(date).to_string(),
            name,
        })
        .collect())
}
