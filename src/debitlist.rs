//! Tabular debit-list report over historical export entries.
//!
//! A read-only reporting view for accounting: one CSV row per export entry,
//! ordered by export timestamp. Non-numeric fields are quoted.

use chrono_tz::Tz;

use crate::core::{DebitError, ScopeRef};
use crate::export::ExportRepository;

const HEADERS: [&str; 5] = [
    "Order code",
    "Order date",
    "Invoices",
    "SEPA export date",
    "Payment amount",
];

fn push_quoted(out: &mut String, field: &str) {
    out.push('"');
    for c in field.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
}

/// Render the debit list of a scope as CSV.
///
/// Timestamps are formatted in the given timezone (the event's, or the
/// organizer's for organizer-wide reports).
pub fn render_debit_list<R: ExportRepository>(
    repo: &R,
    scope: &ScopeRef,
    timezone: Tz,
) -> Result<String, DebitError> {
    let mut exports = repo.exports(scope)?;
    exports.sort_by_key(|e| e.created_at);

    let mut out = String::new();
    for (i, header) in HEADERS.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_quoted(&mut out, header);
    }
    out.push_str("\r\n");

    for export in &exports {
        for entry in repo.entries(export.id)? {
            push_quoted(&mut out, &entry.order_code);
            out.push(',');
            push_quoted(
                &mut out,
                &entry
                    .order_date
                    .with_timezone(&timezone)
                    .format("%Y-%m-%d")
                    .to_string(),
            );
            out.push(',');
            push_quoted(&mut out, &entry.invoice_numbers.join(", "));
            out.push(',');
            push_quoted(
                &mut out,
                &export
                    .created_at
                    .with_timezone(&timezone)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
            );
            out.push(',');
            // Amount is numeric and stays unquoted.
            out.push_str(&entry.amount.to_string());
            out.push_str("\r\n");
        }
    }

    Ok(out)
}
