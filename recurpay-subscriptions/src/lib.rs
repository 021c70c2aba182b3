//! # Recurring Billing Schedules
//!
//! This crate computes the concrete billing periods of subscription phases.
//! A phase owns a [`ProratingRule`]; the rule answers "what is the next
//! anchor date after this reference date?", and [`PeriodSequence`] turns
//! successive answers into a lazy stream of dated [`Period`] values.
//!
//! All types are plain values: no I/O, no global state, no synchronization.

pub mod period;
pub mod phase;
pub mod prorating;

pub use period::{Period, PeriodSequence};
pub use phase::{Subscription, SubscriptionId, SubscriptionPhase};
pub use prorating::{Frequency, ProratingRule};

use chrono::{DateTime, Utc};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("no valid calendar date for year {year}, month {month}, day {day}")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[error("invalid anchor: {0}")]
    InvalidAnchor(String),
    #[error("period start {start} is after period end {end}")]
    InvalidPeriod {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}
