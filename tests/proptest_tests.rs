#![cfg(feature = "pain008")]

use chrono::{Datelike, Days, NaiveDate, Weekday};
use lastschrift::core::*;
use lastschrift::pain008::{amount_to_cents, format_cents};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    // Roughly 2020 through 2033.
    (0u64..5000).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Days::new(offset)
    })
}

fn settings(days: u32, earliest: Option<NaiveDate>) -> DebitSettings {
    DebitSettings {
        creditor_name: "Demo GmbH".into(),
        creditor_iban: "DE89370400440532013000".into(),
        creditor_bic: "COBADEFFXXX".into(),
        creditor_id: "DE98ZZZ09999999999".into(),
        reference_prefix: None,
        prenotification_days: Some(days),
        earliest_due_date: earliest,
        iban_blocklist: Vec::new(),
        reminder_templates_configured: earliest.is_some(),
        default_mode: ExportMode::Split,
    }
}

proptest! {
    #[test]
    fn collection_day_is_never_a_weekend_or_holiday(date in arb_date()) {
        let day = next_collection_day(date);
        prop_assert!(day.weekday() != Weekday::Sat && day.weekday() != Weekday::Sun);
        prop_assert!(![
            (1, 1), (5, 1), (12, 24), (12, 25), (12, 26), (12, 31),
        ].contains(&(day.month(), day.day())));
    }

    #[test]
    fn collection_day_never_precedes_the_input(date in arb_date()) {
        prop_assert!(next_collection_day(date) >= date);
    }

    #[test]
    fn collection_day_is_idempotent(date in arb_date()) {
        let day = next_collection_day(date);
        prop_assert_eq!(next_collection_day(day), day);
    }

    #[test]
    fn due_date_is_order_date_plus_days_or_the_override(
        order in arb_date(),
        days in 0u32..60,
        earliest in proptest::option::of(arb_date()),
    ) {
        let due = compute_due_date(order, &settings(days, earliest)).unwrap();
        let relative = order + Days::new(u64::from(days));
        match earliest {
            Some(e) if e > relative => {
                prop_assert_eq!(due.date, e);
                prop_assert!(due.reminder_owed);
            }
            _ => {
                prop_assert_eq!(due.date, relative);
                prop_assert!(!due.reminder_owed);
            }
        }
    }

    #[test]
    fn cents_formatting_parses_back_exactly(cents in 1i64..1_000_000_000) {
        let formatted = format_cents(cents);
        let parsed = Decimal::from_str(&formatted).unwrap();
        prop_assert_eq!(amount_to_cents(parsed).unwrap(), cents);
        prop_assert!(parsed.scale() == 2);
    }

    #[test]
    fn generated_mandate_references_pass_the_charset_rules(
        slug in "[a-z0-9]{1,12}",
        code in "[A-Z0-9]{5}",
    ) {
        let reference = mandate_reference(None, &slug, &code).unwrap();
        prop_assert!(reference.len() <= MAX_REFERENCE_LEN);
        prop_assert!(validation::validate_reference_charset(&reference).is_ok());
    }
}
