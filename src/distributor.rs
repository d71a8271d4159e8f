//! Exact-cent apportionment of a total over a set of due dates.
//!
//! The total is split into integer cents; every date receives `total / n`
//! cents and the first `total % n` dates, in chronological order, receive one
//! extra cent. Amounts for repeated dates accumulate, and the monthly summary
//! is summed from the per-date cents, so both views add up to the total.

use std::collections::BTreeMap;

use crate::domain::{Distribution, DueDate, Error, Money};

pub fn distribute(total: Money, dates: &[DueDate]) -> Result<Distribution, Error> {
    if dates.is_empty() {
        return Err(Error::validation("The list of dates cannot be empty"));
    }
    if !total.is_positive() {
        return Err(Error::validation(format!(
            "Total amount must be greater than zero, got {}",
            total
        )));
    }

    let mut sorted = dates.to_vec();
    sorted.sort(); // stable; duplicates stay adjacent

    let n = i64::try_from(sorted.len())
        .map_err(|_| Error::validation("Too many dates to distribute over"))?;
    let base = total.as_minor() / n;
    let remainder = total.as_minor() % n;

    let mut per_date: BTreeMap<DueDate, Money> = BTreeMap::new();
    for (idx, date) in (0_i64..).zip(sorted) {
        let share = if idx < remainder { base + 1 } else { base };
        *per_date.entry(date).or_default() += Money::from_minor(share);
    }

    let mut per_month = BTreeMap::new();
    for (date, amount) in &per_date {
        *per_month.entry(date.month_key()).or_default() += *amount;
    }

    tracing::debug!(
        total = %total,
        dates = n,
        base_cents = base,
        extra_cents = remainder,
        months = per_month.len(),
        "Distributed amount"
    );

    Ok(Distribution {
        per_date,
        per_month,
    })
}

/// Validates raw caller input (decimal total, `DD/MM/YYYY` strings) and
/// distributes it.
pub fn distribute_raw<S: AsRef<str>>(total: &str, dates: &[S]) -> Result<Distribution, Error> {
    if dates.is_empty() {
        return Err(Error::validation("The list of dates cannot be empty"));
    }
    let total = Money::from_decimal_str(total)
        .ok_or_else(|| Error::validation(format!("Invalid total amount: {}", total)))?;
    let dates = parse_dates(dates)?;
    distribute(total, &dates)
}

pub fn parse_dates<S: AsRef<str>>(dates: &[S]) -> Result<Vec<DueDate>, Error> {
    dates
        .iter()
        .map(|raw| {
            let raw = raw.as_ref();
            DueDate::parse(raw).ok_or_else(|| {
                Error::validation(format!("Invalid date '{}': expected DD/MM/YYYY", raw))
            })
        })
        .collect()
}
