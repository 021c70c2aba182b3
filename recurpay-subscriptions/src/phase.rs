//! Subscription and phase collaborator surface
//!
//! Subscriptions and their phases are platform records; this crate only
//! needs the slice of them that drives period computation: the phase's
//! start date, prorating rule, amount, trial flag and end condition.

use chrono::{DateTime, Utc};
use recurpay_money::TaxedMoney;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ProratingRule, ScheduleError};

/// Identifier of a subscription record owned by the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub String);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named stage of a subscription's lifecycle (e.g. trial vs. regular).
///
/// A phase owns its prorating rule and the amount due per period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPhase {
    pub start_date: DateTime<Utc>,
    pub rule: ProratingRule,
    pub amount: TaxedMoney,
    pub trial: bool,
    /// Number of periods after which the phase ends; unbounded when unset.
    pub total_periods: Option<u32>,
    /// Date at which the phase ends; unbounded when unset.
    pub end_date: Option<DateTime<Utc>>,
}

impl SubscriptionPhase {
    /// Create an unbounded, non-trial phase.
    pub fn new(start_date: DateTime<Utc>, rule: ProratingRule, amount: TaxedMoney) -> Self {
        Self {
            start_date,
            rule,
            amount,
            trial: false,
            total_periods: None,
            end_date: None,
        }
    }

    /// Mark the phase as a trial phase.
    pub fn with_trial(mut self, trial: bool) -> Self {
        self.trial = trial;
        self
    }

    /// Bound the phase to a number of periods.
    pub fn with_total_periods(mut self, total_periods: u32) -> Self {
        self.total_periods = Some(total_periods);
        self
    }

    /// Bound the phase to an end date.
    pub fn with_end_date(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Check if this is a trial phase.
    pub fn is_trial(&self) -> bool {
        self.trial
    }

    /// Validate the phase bounds.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if let Some(end_date) = self.end_date {
            if end_date < self.start_date {
                return Err(ScheduleError::InvalidPeriod {
                    start: self.start_date,
                    end: end_date,
                });
            }
        }
        Ok(())
    }
}

/// A subscription owning an ordered list of phases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub phases: Vec<SubscriptionPhase>,
}

impl Subscription {
    /// Create a subscription with no phases.
    pub fn new(id: SubscriptionId) -> Self {
        Self {
            id,
            phases: Vec::new(),
        }
    }

    /// Append a phase.
    pub fn add_phase(&mut self, phase: SubscriptionPhase) {
        self.phases.push(phase);
    }

    /// Append a phase, builder style.
    pub fn with_phase(mut self, phase: SubscriptionPhase) -> Self {
        self.add_phase(phase);
        self
    }

    /// Validate the subscription and all its phases.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        for phase in &self.phases {
            phase.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Frequency;
    use chrono::TimeZone;
    use recurpay_money::{Currency, TaxedMoney};
    use rust_decimal_macros::dec;

    fn test_phase() -> SubscriptionPhase {
        SubscriptionPhase::new(
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            ProratingRule::new(Frequency::Monthly).by_day_of_month(1),
            TaxedMoney::new(dec!(12.10), dec!(2.10), Currency::new("EUR")),
        )
    }

    #[test]
    fn test_phase_defaults() {
        let phase = test_phase();
        assert!(!phase.is_trial());
        assert_eq!(phase.total_periods, None);
        assert_eq!(phase.end_date, None);
        assert!(phase.validate().is_ok());
    }

    #[test]
    fn test_phase_builders() {
        let end = Utc.with_ymd_and_hms(2020, 7, 1, 0, 0, 0).unwrap();
        let phase = test_phase()
            .with_trial(true)
            .with_total_periods(6)
            .with_end_date(end);
        assert!(phase.is_trial());
        assert_eq!(phase.total_periods, Some(6));
        assert_eq!(phase.end_date, Some(end));
    }

    #[test]
    fn test_phase_end_before_start_is_invalid() {
        let phase = test_phase().with_end_date(Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap());
        assert!(matches!(
            phase.validate(),
            Err(ScheduleError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn test_subscription_phases_keep_order() {
        let subscription = Subscription::new(SubscriptionId("sub_1001".to_string()))
            .with_phase(test_phase().with_trial(true))
            .with_phase(test_phase());
        assert_eq!(subscription.phases.len(), 2);
        assert!(subscription.phases[0].is_trial());
        assert!(!subscription.phases[1].is_trial());
        assert!(subscription.validate().is_ok());
    }
}
