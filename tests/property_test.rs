mod common;

use chrono::{DateTime, Days, FixedOffset, NaiveDate};
use closure_sync::domain::closure::ClosureDate;
use closure_sync::domain::money::Amount;
use common::make_register;
use proptest::prelude::*;

proptest! {
    /// A register closes on `d` iff the UTC calendar date of its close
    /// timestamp is `d`, whatever offset the vendor wrote it with.
    #[test]
    fn inclusion_iff_utc_date_matches(
        secs in 0i64..4_102_444_800,
        offset_hours in -12i32..=14,
        day_shift in -2i64..=2,
    ) {
        let utc = DateTime::from_timestamp(secs, 0).unwrap();
        let offset = FixedOffset::east_opt(offset_hours * 3600).unwrap();
        let written = utc.with_timezone(&offset).to_rfc3339();
        let register = make_register("r", Some("o"), Some(&written));

        let utc_date = utc.date_naive();
        let requested = if day_shift >= 0 {
            utc_date.checked_add_days(Days::new(day_shift as u64))
        } else {
            utc_date.checked_sub_days(Days::new(day_shift.unsigned_abs()))
        };
        let requested = ClosureDate::from(requested.unwrap());

        prop_assert_eq!(register.closes_on(&requested), day_shift == 0);
    }

    /// Summing the same records in any order agrees within rounding.
    #[test]
    fn summation_is_order_independent(
        (original, shuffled) in prop::collection::vec(-100_000_000i64..100_000_000, 0..60)
            .prop_flat_map(|cents| (Just(cents.clone()), Just(cents).prop_shuffle()))
    ) {
        let to_amounts = |cents: &[i64]| -> Vec<Amount> {
            cents.iter().map(|c| Amount::new(*c as f64 / 100.0)).collect()
        };
        let a: Amount = to_amounts(&original).iter().sum();
        let b: Amount = to_amounts(&shuffled).iter().sum();
        let exact = original.iter().sum::<i64>() as f64 / 100.0;

        let tolerance = 1e-9 * exact.abs().max(1.0);
        prop_assert!((a.value() - b.value()).abs() <= tolerance, "{} vs {}", a.value(), b.value());
        prop_assert!((a.value() - exact).abs() <= 1e-6, "{} vs exact {}", a.value(), exact);
    }

    /// Whatever the vendor puts in `total`, the amount is finite.
    #[test]
    fn lenient_amount_is_always_finite(raw in ".*") {
        let amount = Amount::from_json(&serde_json::Value::String(raw));
        prop_assert!(amount.value().is_finite());
    }

    /// Valid zero-padded dates parse and print back unchanged.
    #[test]
    fn closure_date_display_matches_input(y in 1000i32..=9999, m in 1u32..=12, d in 1u32..=28) {
        let raw = format!("{y:04}-{m:02}-{d:02}");
        let parsed = ClosureDate::parse(&raw).unwrap();
        prop_assert_eq!(parsed.to_string(), raw);
        prop_assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(y, m, d).unwrap());
    }
}
