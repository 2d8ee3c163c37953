//! Banking-day adjustment for collection dates.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Fixed bank holidays as (month, day), based on the TARGET2/Bundesbank list.
/// Movable holidays such as Easter are intentionally omitted; the
/// calculation is cumbersome and banks auto-correct the odd missed day.
const FIXED_HOLIDAYS: [(u32, u32); 6] = [(1, 1), (5, 1), (12, 24), (12, 25), (12, 26), (12, 31)];

fn is_banking_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
        && !FIXED_HOLIDAYS.contains(&(date.month(), date.day()))
}

/// Shift a candidate collection date forward to the next banking day.
///
/// Returns the date unchanged if it already is one; idempotent.
pub fn next_collection_day(mut date: NaiveDate) -> NaiveDate {
    while !is_banking_day(date) {
        // Days::new(1) cannot overflow for any representable business date.
        date = date.checked_add_days(Days::new(1)).expect("date overflow");
    }
    date
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekday_passes_through() {
        // 2024-07-10 is a Wednesday
        assert_eq!(next_collection_day(date(2024, 7, 10)), date(2024, 7, 10));
    }

    #[test]
    fn weekend_moves_to_monday() {
        // 2024-07-13/14 are Sat/Sun
        assert_eq!(next_collection_day(date(2024, 7, 13)), date(2024, 7, 15));
        assert_eq!(next_collection_day(date(2024, 7, 14)), date(2024, 7, 15));
    }

    #[test]
    fn christmas_chain() {
        // Wed 2024-12-25 → holiday, Thu 26 → holiday, Fri 27 is clear.
        assert_eq!(next_collection_day(date(2024, 12, 25)), date(2024, 12, 27));
    }

    #[test]
    fn new_year_over_weekend() {
        // Sat 2022-12-31 → holiday+weekend, Sun 2023-01-01 → holiday+weekend,
        // Mon 2023-01-02 is clear.
        assert_eq!(next_collection_day(date(2022, 12, 31)), date(2023, 1, 2));
    }

    #[test]
    fn may_day() {
        // Thu 2025-05-01 → Fri 2025-05-02.
        assert_eq!(next_collection_day(date(2025, 5, 1)), date(2025, 5, 2));
    }

    #[test]
    fn idempotent() {
        for offset in 0..400u64 {
            let d = date(2024, 1, 1) + chrono::Days::new(offset);
            let adjusted = next_collection_day(d);
            assert_eq!(next_collection_day(adjusted), adjusted);
        }
    }
}
