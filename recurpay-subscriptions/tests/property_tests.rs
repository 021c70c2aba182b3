//! Property-based tests for recurpay-subscriptions
//!
//! These tests use proptest to verify invariants across a wide range of inputs.

#[cfg(test)]
mod prorating_properties {
    use chrono::{DateTime, Datelike, Utc, Weekday};
    use proptest::prelude::*;
    use recurpay_subscriptions::{Frequency, ProratingRule};

    const WEEKDAYS: [Weekday; 7] = [
        Weekday::Sun,
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ];

    fn reference(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    proptest! {
        /// The next anchor date is strictly after the reference date.
        #[test]
        fn next_date_strictly_after_reference(
            secs in 0i64..4_000_000_000i64,
            day in 1u32..=28u32,
        ) {
            let rule = ProratingRule::new(Frequency::Monthly).by_day_of_month(day);
            let reference = reference(secs);
            let next = rule.next_date(reference).unwrap();

            prop_assert!(next > reference);
        }

        /// A day-of-month anchor below 29 always lands on the anchor day.
        #[test]
        fn day_anchor_is_honored(
            secs in 0i64..4_000_000_000i64,
            day in 1u32..=28u32,
        ) {
            let rule = ProratingRule::new(Frequency::Monthly).by_day_of_month(day);
            let next = rule.next_date(reference(secs)).unwrap();

            prop_assert_eq!(next.day(), day);
        }

        /// A weekly rule always lands on its anchor weekday, strictly ahead.
        #[test]
        fn weekly_lands_on_anchor_weekday(
            secs in 0i64..4_000_000_000i64,
            weekday_index in 0usize..7,
        ) {
            let weekday = WEEKDAYS[weekday_index];
            let rule = ProratingRule::new(Frequency::Weekly).by_day_of_week(weekday);
            let reference = reference(secs);
            let next = rule.next_date(reference).unwrap();

            prop_assert_eq!(next.weekday(), weekday);
            prop_assert!(next > reference);
        }

        /// A month anchor always lands in the anchor month.
        #[test]
        fn month_anchor_is_honored(
            secs in 0i64..4_000_000_000i64,
            month in 1u32..=12u32,
            day in 1u32..=28u32,
        ) {
            let rule = ProratingRule::new(Frequency::Yearly)
                .by_month(month)
                .by_day_of_month(day);
            let next = rule.next_date(reference(secs)).unwrap();

            prop_assert_eq!(next.month(), month);
            prop_assert_eq!(next.day(), day);
        }

        /// Repeated application yields a strictly increasing sequence.
        #[test]
        fn repeated_application_is_increasing(
            secs in 0i64..4_000_000_000i64,
            day in 1u32..=28u32,
            steps in 1usize..24,
        ) {
            let rule = ProratingRule::new(Frequency::Monthly).by_day_of_month(day);
            let mut date = reference(secs);

            for _ in 0..steps {
                let next = rule.next_date(date).unwrap();
                prop_assert!(next > date);
                date = next;
            }
        }

        /// With overflow disabled the result never leaves the working
        /// month boundary for the anchor day, even for day 29 through 31.
        #[test]
        fn clamped_anchor_never_overflows(
            secs in 0i64..4_000_000_000i64,
            day in 29u32..=31u32,
        ) {
            let rule = ProratingRule::new(Frequency::Monthly).by_day_of_month(day);
            let next = rule.next_date(reference(secs)).unwrap();

            // Clamping keeps the day at or below the anchor; rolling into
            // the next month would reset it to 1.
            prop_assert!(next.day() <= day);
            prop_assert!(next.day() >= 28);
        }
    }
}
