//! Concrete billing periods
//!
//! A [`Period`] binds a subscription phase to one dated interval and the
//! amount due for it. [`PeriodSequence`] materializes periods lazily by
//! feeding each period's end date back into the phase's prorating rule.

use chrono::{DateTime, Utc};
use recurpay_money::TaxedMoney;
use serde::{Deserialize, Serialize};

use crate::{ScheduleError, SubscriptionId, SubscriptionPhase};

/// One concrete, dated billing interval of a subscription phase.
///
/// Immutable after construction; a period is never updated, only
/// superseded by the next one in the sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    subscription_id: SubscriptionId,
    phase: SubscriptionPhase,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    amount: TaxedMoney,
}

impl Period {
    /// Create a period.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidPeriod`] when the start date is
    /// after the end date.
    pub fn new(
        subscription_id: SubscriptionId,
        phase: SubscriptionPhase,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        amount: TaxedMoney,
    ) -> Result<Self, ScheduleError> {
        if start_date > end_date {
            return Err(ScheduleError::InvalidPeriod {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            subscription_id,
            phase,
            start_date,
            end_date,
            amount,
        })
    }

    /// Get the owning subscription's identifier.
    pub fn subscription_id(&self) -> &SubscriptionId {
        &self.subscription_id
    }

    /// Get the owning phase.
    pub fn phase(&self) -> &SubscriptionPhase {
        &self.phase
    }

    /// Get the start date.
    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    /// Get the end date.
    pub fn end_date(&self) -> DateTime<Utc> {
        self.end_date
    }

    /// Get the amount due for this period.
    pub fn amount(&self) -> &TaxedMoney {
        &self.amount
    }

    /// Check if this period belongs to a trial phase.
    pub fn is_trial(&self) -> bool {
        self.phase.is_trial()
    }
}

/// Lazy stream of successive periods for one subscription phase.
///
/// Each step asks the phase's rule for the next anchor date, using the
/// previous period's end date as the reference, until the phase's end
/// condition is reached. The stream can be restarted from any prior
/// period's end date with [`PeriodSequence::resume`].
#[derive(Debug, Clone)]
pub struct PeriodSequence {
    subscription_id: SubscriptionId,
    phase: SubscriptionPhase,
    cursor: DateTime<Utc>,
    periods_created: u32,
    failed: bool,
}

impl PeriodSequence {
    /// Start the stream at the phase's start date.
    pub fn new(subscription_id: SubscriptionId, phase: SubscriptionPhase) -> Self {
        let cursor = phase.start_date;
        Self {
            subscription_id,
            phase,
            cursor,
            periods_created: 0,
            failed: false,
        }
    }

    /// Restart the stream from a prior period's end date.
    ///
    /// `periods_created` is the number of periods already materialized
    /// before `cursor`; it counts against the phase's `total_periods`
    /// bound.
    pub fn resume(
        subscription_id: SubscriptionId,
        phase: SubscriptionPhase,
        cursor: DateTime<Utc>,
        periods_created: u32,
    ) -> Self {
        Self {
            subscription_id,
            phase,
            cursor,
            periods_created,
            failed: false,
        }
    }

    fn exhausted(&self) -> bool {
        if self.failed {
            return true;
        }
        if let Some(total) = self.phase.total_periods {
            if self.periods_created >= total {
                return true;
            }
        }
        if let Some(end_date) = self.phase.end_date {
            if self.cursor >= end_date {
                return true;
            }
        }
        false
    }
}

impl Iterator for PeriodSequence {
    type Item = Result<Period, ScheduleError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted() {
            return None;
        }

        let start_date = self.cursor;
        let end_date = match self.phase.rule.next_date(start_date) {
            Ok(end_date) => end_date,
            Err(e) => {
                self.failed = true;
                return Some(Err(e));
            }
        };

        let period = match Period::new(
            self.subscription_id.clone(),
            self.phase.clone(),
            start_date,
            end_date,
            self.phase.amount.clone(),
        ) {
            Ok(period) => period,
            Err(e) => {
                self.failed = true;
                return Some(Err(e));
            }
        };

        self.cursor = end_date;
        self.periods_created += 1;

        tracing::trace!(
            subscription = %self.subscription_id,
            %start_date,
            %end_date,
            "materialized billing period"
        );

        Some(Ok(period))
    }
}
