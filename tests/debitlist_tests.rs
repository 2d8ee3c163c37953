#![cfg(feature = "debitlist")]

use chrono::{DateTime, NaiveDate, Utc};
use lastschrift::core::*;
use lastschrift::debitlist::render_debit_list;
use lastschrift::export::{AcceptedPartition, EntryDraft, ExportDraft, ExportRepository, MemoryStore};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn instant(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn partition_with(
    created_at: DateTime<Utc>,
    entries: Vec<(u64, &str, &str, Vec<&str>, Decimal)>,
) -> AcceptedPartition {
    AcceptedPartition {
        export: ExportDraft {
            scope: ScopeRef::Event("democon".into()),
            xml: "<Document/>".into(),
            created_at,
            testmode: false,
            currency: "EUR".into(),
            collection_date: Some(date(2024, 7, 11)),
        },
        entries: entries
            .into_iter()
            .map(|(id, code, order_date, invoices, amount)| EntryDraft {
                payment: PaymentId(id),
                order_code: code.into(),
                order_date: instant(order_date),
                invoice_numbers: invoices.into_iter().map(Into::into).collect(),
                amount,
            })
            .collect(),
    }
}

#[test]
fn debit_list_rows_follow_export_order() {
    let mut store = MemoryStore::new();
    // Committed newest-first here to prove the list re-sorts ascending.
    store
        .commit_batch(vec![partition_with(
            instant("2024-07-10T12:00:00Z"),
            vec![(2, "B2222", "2024-07-02T09:00:00Z", vec!["INV-2"], dec!(9.99))],
        )])
        .unwrap();
    store
        .commit_batch(vec![partition_with(
            instant("2024-07-01T08:30:00Z"),
            vec![(1, "A1111", "2024-06-20T10:00:00Z", vec!["INV-1a", "INV-1b"], dec!(23.50))],
        )])
        .unwrap();

    let csv = render_debit_list(&store, &ScopeRef::Event("democon".into()), chrono_tz::UTC).unwrap();
    let lines: Vec<&str> = csv.split("\r\n").collect();

    assert_eq!(
        lines[0],
        r#""Order code","Order date","Invoices","SEPA export date","Payment amount""#
    );
    assert_eq!(
        lines[1],
        r#""A1111","2024-06-20","INV-1a, INV-1b","2024-07-01 08:30:00",23.50"#
    );
    assert_eq!(
        lines[2],
        r#""B2222","2024-07-02","INV-2","2024-07-10 12:00:00",9.99"#
    );
    assert_eq!(lines[3], "");
}

#[test]
fn debit_list_renders_dates_in_the_given_timezone() {
    let mut store = MemoryStore::new();
    store
        .commit_batch(vec![partition_with(
            // 23:30 UTC is already the next day in Berlin.
            instant("2024-07-01T23:30:00Z"),
            vec![(1, "A1111", "2024-06-30T23:30:00Z", vec![], dec!(10.00))],
        )])
        .unwrap();

    let csv = render_debit_list(
        &store,
        &ScopeRef::Event("democon".into()),
        chrono_tz::Europe::Berlin,
    )
    .unwrap();
    assert!(csv.contains(r#""2024-07-01""#)); // order date
    assert!(csv.contains(r#""2024-07-02 01:30:00""#)); // export date
}

#[test]
fn empty_scope_renders_only_the_header() {
    let store = MemoryStore::new();
    let csv = render_debit_list(&store, &ScopeRef::Event("democon".into()), chrono_tz::UTC).unwrap();
    assert_eq!(
        csv,
        "\"Order code\",\"Order date\",\"Invoices\",\"SEPA export date\",\"Payment amount\"\r\n"
    );
}
