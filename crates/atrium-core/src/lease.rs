//! Lease cycle calculator.
//!
//! Rent is billed in fixed 30-day cycles anchored to the first payment
//! date, independent of calendar month lengths. Occupancy, on the other
//! hand, is counted in whole calendar months. Results are display
//! estimates: no prorating, no leap-cycle handling.

use chrono::{Datelike, Months, NaiveDate, TimeDelta};
use serde::Serialize;

use crate::models::tenant::LeaseRecord;

/// Length of one rent cycle in days.
pub const RENT_CYCLE_DAYS: i64 = 30;

/// Whole calendar months from `registration` to `now`.
///
/// A month counts once the same day-of-month is reached (clamped to the
/// end of shorter months). Returns 0 when `now` precedes
/// `registration`.
pub fn occupancy_months(registration: NaiveDate, now: NaiveDate) -> u32 {
    if now <= registration {
        return 0;
    }

    let span = (now.year() - registration.year()) * 12 + now.month() as i32
        - registration.month() as i32;
    let mut months = span.max(0) as u32;

    while months > 0 {
        match registration.checked_add_months(Months::new(months)) {
            Some(anniversary) if anniversary <= now => break,
            _ => months -= 1,
        }
    }

    months
}

/// Projected rent due date as of `now`.
///
/// The cycle number is `ceil(days_elapsed / 30)` with a floor of 1, so
/// on the first payment day itself the next due date is 30 days out.
pub fn rent_due_date(first_payment: Option<NaiveDate>, now: NaiveDate) -> Option<NaiveDate> {
    let first = first_payment?;
    let days_since_first = (now - first).num_days();
    let cycle = div_ceil(days_since_first, RENT_CYCLE_DAYS).max(1);
    first.checked_add_signed(TimeDelta::days(cycle * RENT_CYCLE_DAYS))
}

/// The date the earliest unpaid cycle falls due.
///
/// `cycles_paid` counts the first payment, which covers the first cycle;
/// values below 1 are treated as 1.
pub fn outstanding_due_date(first_payment: NaiveDate, cycles_paid: u32) -> Option<NaiveDate> {
    let cycles = i64::from(cycles_paid.max(1));
    first_payment.checked_add_signed(TimeDelta::days(cycles * RENT_CYCLE_DAYS))
}

/// Is rent overdue, assuming only the first payment has been recorded?
pub fn is_rent_overdue(first_payment: Option<NaiveDate>, now: NaiveDate) -> bool {
    is_rent_overdue_with_payments(first_payment, 1, now)
}

/// Is rent overdue given `cycles_paid` recorded cycle payments?
pub fn is_rent_overdue_with_payments(
    first_payment: Option<NaiveDate>,
    cycles_paid: u32,
    now: NaiveDate,
) -> bool {
    first_payment
        .and_then(|first| outstanding_due_date(first, cycles_paid))
        .is_some_and(|due| now > due)
}

fn div_ceil(n: i64, d: i64) -> i64 {
    let q = n.div_euclid(d);
    if n.rem_euclid(d) == 0 { q } else { q + 1 }
}

/// Derived lease figures for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LeaseSummary {
    pub occupancy_months: u32,
    /// Projected cycle boundary as of `now`.
    pub rent_due_date: Option<NaiveDate>,
    /// Due date of the earliest unpaid cycle; `rent_overdue` is judged
    /// against this one.
    pub outstanding_due_date: Option<NaiveDate>,
    pub rent_overdue: bool,
    pub cycles_paid: u32,
    pub monthly_rent_cents: u64,
}

impl LeaseSummary {
    pub fn compute(lease: &LeaseRecord, now: NaiveDate) -> Self {
        let first = lease.first_payment_date;
        Self {
            occupancy_months: occupancy_months(lease.registration_date, now),
            rent_due_date: rent_due_date(first, now),
            outstanding_due_date: first
                .and_then(|first| outstanding_due_date(first, lease.cycles_paid)),
            rent_overdue: is_rent_overdue_with_payments(first, lease.cycles_paid, now),
            cycles_paid: lease.cycles_paid,
            monthly_rent_cents: lease.monthly_rent_cents,
        }
    }
}
