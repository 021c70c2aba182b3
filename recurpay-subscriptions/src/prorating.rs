//! Rule-driven anchor date computation
//!
//! A prorating rule snaps a reference date forward to the next concrete
//! anchor: a day of the month, a month of the year, a weekday, or a
//! combination. Phases use it to align billing periods to calendar
//! boundaries, e.g. "always bill on the 1st" or "always bill on Monday".

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::ScheduleError;

/// Recurrence class of a subscription phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    /// Every day.
    Daily,
    /// Every week, anchored to a weekday.
    ///
    /// Without an explicit weekday anchor, the computed candidate date's
    /// own weekday is used and rolled forward a full week.
    Weekly,
    /// Every month.
    Monthly,
    /// Every year.
    Yearly,
}

/// Rule computing the next anchor date from a reference date.
///
/// The rule is immutable once built; all anchors are set through the
/// consuming builder methods before first use.
///
/// # Examples
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use recurpay_subscriptions::{Frequency, ProratingRule};
///
/// // Bill on the last day of shorter months rather than skipping into
/// // the next month.
/// let rule = ProratingRule::new(Frequency::Monthly).by_day_of_month(31);
///
/// let reference = Utc.with_ymd_and_hms(2020, 6, 15, 0, 0, 0).unwrap();
/// let next = rule.next_date(reference).unwrap();
/// assert_eq!(next, Utc.with_ymd_and_hms(2020, 6, 30, 0, 0, 0).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProratingRule {
    frequency: Frequency,
    month_overflow: bool,
    day_of_week: Option<Weekday>,
    day_of_month: Option<u32>,
    month: Option<u32>,
}

impl ProratingRule {
    /// Create a rule with no anchors set.
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            month_overflow: false,
            day_of_week: None,
            day_of_month: None,
            month: None,
        }
    }

    /// Allow a day-of-month anchor to roll into the next month instead of
    /// clamping to the last day of a shorter month.
    pub fn with_month_overflow(mut self, allow: bool) -> Self {
        self.month_overflow = allow;
        self
    }

    /// Anchor to a weekday.
    pub fn by_day_of_week(mut self, weekday: Weekday) -> Self {
        self.day_of_week = Some(weekday);
        self
    }

    /// Anchor to a day of the month (1 through 31).
    pub fn by_day_of_month(mut self, day: u32) -> Self {
        self.day_of_month = Some(day);
        self
    }

    /// Anchor to a month (1 = January through 12 = December).
    pub fn by_month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    /// Get the recurrence class.
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Compute the next anchor date from the current moment.
    pub fn next_date_from_now(&self) -> Result<DateTime<Utc>, ScheduleError> {
        self.next_date(Utc::now())
    }

    /// Compute the next anchor date from a reference date.
    ///
    /// The time of day of the reference is preserved in the result.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidAnchor`] for an out-of-range anchor
    /// and [`ScheduleError::InvalidDate`] when the working year, month and
    /// day do not assemble into a representable calendar date.
    pub fn next_date(&self, reference: DateTime<Utc>) -> Result<DateTime<Utc>, ScheduleError> {
        self.validate_anchors()?;

        let mut year = reference.year();
        let mut month = i64::from(reference.month());
        let mut day = reference.day();

        // A missing day-of-month anchor counts as already reached, so the
        // month advances on every invocation.
        let day_anchor_reached = self.day_of_month.map_or(true, |anchor| day >= anchor);

        if day_anchor_reached && self.frequency != Frequency::Weekly {
            month += 1;
        }

        if let Some(anchor) = self.day_of_month {
            day = anchor;
        }

        if !self.month_overflow {
            // Clamp against the working month's length before the date is
            // assembled, so day 31 in a 30-day month lands on day 30. A
            // working month of 13 normalizes into January of the next year
            // here.
            let (normalized_year, normalized_month) = normalize_month(year, month);
            let days_in_month = month_length(normalized_year, normalized_month).ok_or(
                ScheduleError::InvalidDate {
                    year: normalized_year,
                    month: normalized_month,
                    day: 1,
                },
            )?;
            if day > days_in_month {
                day = days_in_month;
            }
            year = normalized_year;
            month = i64::from(normalized_month);
        }

        if let Some(anchor) = self.month {
            if month > i64::from(anchor) {
                year += 1;
            }
            month = i64::from(anchor);
        }

        let date = assemble_date(year, month, day, self.month_overflow)?;

        // Weekday resolution: the explicit anchor, or for weekly rules the
        // candidate's own weekday.
        let target_weekday = match self.day_of_week {
            Some(weekday) => Some(weekday),
            None if self.frequency == Frequency::Weekly => Some(date.weekday()),
            None => None,
        };

        let date = match target_weekday {
            Some(weekday) => {
                next_weekday(date, weekday).ok_or(ScheduleError::InvalidDate {
                    year: date.year(),
                    month: date.month(),
                    day: date.day(),
                })?
            }
            None => date,
        };

        let result = date.and_time(reference.time()).and_utc();

        tracing::trace!(frequency = ?self.frequency, %reference, %result, "resolved next anchor date");

        Ok(result)
    }

    fn validate_anchors(&self) -> Result<(), ScheduleError> {
        if let Some(day) = self.day_of_month {
            if !(1..=31).contains(&day) {
                return Err(ScheduleError::InvalidAnchor(format!(
                    "day of month {day} outside 1..=31"
                )));
            }
        }
        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return Err(ScheduleError::InvalidAnchor(format!(
                    "month {month} outside 1..=12"
                )));
            }
        }
        Ok(())
    }
}

/// Fold months beyond December into the following years.
fn normalize_month(year: i32, month: i64) -> (i32, u32) {
    let zero_based = month - 1;
    let year_offset = zero_based.div_euclid(12);
    let normalized = zero_based.rem_euclid(12) + 1;
    (year + year_offset as i32, normalized as u32)
}

/// Number of days in the given month.
fn month_length(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    Some(next.signed_duration_since(first).num_days() as u32)
}

/// Assemble a calendar date from working year, month and day.
///
/// With `allow_day_overflow`, excess days carry into the following months;
/// otherwise the combination must be an exact calendar date.
fn assemble_date(
    year: i32,
    month: i64,
    day: u32,
    allow_day_overflow: bool,
) -> Result<NaiveDate, ScheduleError> {
    let (year, month) = normalize_month(year, month);

    if allow_day_overflow {
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(ScheduleError::InvalidDate {
            year,
            month,
            day,
        })?;
        first
            .checked_add_days(Days::new(u64::from(day.max(1)) - 1))
            .ok_or(ScheduleError::InvalidDate { year, month, day })
    } else {
        NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(ScheduleError::InvalidDate { year, month, day })
    }
}

/// Next occurrence of `target` strictly after `date`.
///
/// A date already on the target weekday advances a full week.
fn next_weekday(date: NaiveDate, target: Weekday) -> Option<NaiveDate> {
    let ahead = (i64::from(target.num_days_from_monday())
        - i64::from(date.weekday().num_days_from_monday()))
    .rem_euclid(7);
    let ahead = if ahead == 0 { 7 } else { ahead };
    date.checked_add_days(Days::new(ahead as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc_date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_day_anchor_ahead_in_same_month() {
        let rule = ProratingRule::new(Frequency::Monthly).by_day_of_month(20);
        let next = rule.next_date(utc_date(2020, 6, 10)).unwrap();
        assert_eq!(next, utc_date(2020, 6, 20));
    }

    #[test]
    fn test_day_anchor_reached_advances_month() {
        let rule = ProratingRule::new(Frequency::Monthly).by_day_of_month(10);
        let next = rule.next_date(utc_date(2020, 6, 10)).unwrap();
        assert_eq!(next, utc_date(2020, 7, 10));
    }

    #[test]
    fn test_monthly_without_day_anchor_advances_month() {
        // The missing anchor counts as reached, so a bare monthly rule
        // strides one month per invocation.
        let rule = ProratingRule::new(Frequency::Monthly);
        let next = rule.next_date(utc_date(2020, 1, 15)).unwrap();
        assert_eq!(next, utc_date(2020, 2, 15));
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        let rule = ProratingRule::new(Frequency::Monthly);
        let next = rule.next_date(utc_date(2020, 12, 15)).unwrap();
        assert_eq!(next, utc_date(2021, 1, 15));
    }

    #[test]
    fn test_month_overflow_clamp() {
        let rule = ProratingRule::new(Frequency::Monthly).by_day_of_month(31);
        let next = rule.next_date(utc_date(2020, 6, 15)).unwrap();
        assert_eq!(next, utc_date(2020, 6, 30));
    }

    #[test]
    fn test_month_overflow_clamp_february() {
        let rule = ProratingRule::new(Frequency::Monthly).by_day_of_month(31);
        assert_eq!(
            rule.next_date(utc_date(2020, 2, 10)).unwrap(),
            utc_date(2020, 2, 29)
        );
        assert_eq!(
            rule.next_date(utc_date(2021, 2, 10)).unwrap(),
            utc_date(2021, 2, 28)
        );
    }

    #[test]
    fn test_month_overflow_allowed_rolls_forward() {
        let rule = ProratingRule::new(Frequency::Monthly)
            .by_day_of_month(31)
            .with_month_overflow(true);
        let next = rule.next_date(utc_date(2020, 6, 15)).unwrap();
        assert_eq!(next, utc_date(2020, 7, 1));
    }

    #[test]
    fn test_weekday_rolls_to_following_week() {
        // 2020-06-01 is a Monday; anchoring to Monday must land on the
        // following Monday, not the same day.
        let rule = ProratingRule::new(Frequency::Weekly).by_day_of_week(Weekday::Mon);
        let next = rule.next_date(utc_date(2020, 6, 1)).unwrap();
        assert_eq!(next, utc_date(2020, 6, 8));
    }

    #[test]
    fn test_weekday_anchor_mid_week() {
        // 2020-06-01 is a Monday; the next Thursday is June 4.
        let rule = ProratingRule::new(Frequency::Weekly).by_day_of_week(Weekday::Thu);
        let next = rule.next_date(utc_date(2020, 6, 1)).unwrap();
        assert_eq!(next, utc_date(2020, 6, 4));
    }

    #[test]
    fn test_weekly_defaults_to_reference_weekday() {
        // 2020-06-03 is a Wednesday; a weekly rule with no explicit anchor
        // advances to the next Wednesday.
        let rule = ProratingRule::new(Frequency::Weekly);
        let next = rule.next_date(utc_date(2020, 6, 3)).unwrap();
        assert_eq!(next, utc_date(2020, 6, 10));
    }

    #[test]
    fn test_month_anchor_year_rollover() {
        let rule = ProratingRule::new(Frequency::Yearly)
            .by_month(3)
            .by_day_of_month(1);
        let next = rule.next_date(utc_date(2020, 6, 10)).unwrap();
        assert_eq!(next, utc_date(2021, 3, 1));
    }

    #[test]
    fn test_month_anchor_still_ahead() {
        let rule = ProratingRule::new(Frequency::Yearly)
            .by_month(9)
            .by_day_of_month(1);
        let next = rule.next_date(utc_date(2020, 6, 10)).unwrap();
        assert_eq!(next, utc_date(2020, 9, 1));
    }

    #[test]
    fn test_time_of_day_preserved() {
        let rule = ProratingRule::new(Frequency::Monthly).by_day_of_month(1);
        let reference = Utc.with_ymd_and_hms(2020, 6, 10, 9, 30, 45).unwrap();
        let next = rule.next_date(reference).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2020, 7, 1, 9, 30, 45).unwrap());
    }

    #[test]
    fn test_out_of_range_anchor_is_rejected() {
        let rule = ProratingRule::new(Frequency::Monthly).by_day_of_month(42);
        let err = rule.next_date(utc_date(2020, 6, 10)).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidAnchor(_)));

        let rule = ProratingRule::new(Frequency::Yearly).by_month(13);
        let err = rule.next_date(utc_date(2020, 6, 10)).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidAnchor(_)));
    }

    #[test]
    fn test_unrepresentable_combination_errors() {
        // The clamp runs against the working month before the month anchor
        // forces February, so day 31 survives and the assembly must report
        // the invalid date instead of drifting into March.
        let rule = ProratingRule::new(Frequency::Yearly)
            .by_day_of_month(31)
            .by_month(2);
        let err = rule.next_date(utc_date(2020, 1, 5)).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::InvalidDate {
                year: 2020,
                month: 2,
                day: 31,
            }
        );
    }

    #[test]
    fn test_successive_dates_stride_months() {
        let rule = ProratingRule::new(Frequency::Monthly).by_day_of_month(1);
        let mut date = utc_date(2020, 1, 1);
        let mut dates = Vec::new();
        for _ in 0..4 {
            date = rule.next_date(date).unwrap();
            dates.push(date);
        }
        assert_eq!(
            dates,
            vec![
                utc_date(2020, 2, 1),
                utc_date(2020, 3, 1),
                utc_date(2020, 4, 1),
                utc_date(2020, 5, 1),
            ]
        );
    }
}
