use chrono::{Datelike, NaiveDate};

fn month_index(day: NaiveDate) -> i64 {
    i64::from(day.year()) * 12 + i64::from(day.month0())
}

fn from_month_index(index: i64) -> Option<NaiveDate> {
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month0 = u32::try_from(index.rem_euclid(12)).ok()?;
    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
}

/// First day of the month containing `day`.
pub fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// First day of the month `months` away from `day`'s month.
///
/// Returns `None` only past the end of the representable date range.
pub fn add_months(day: NaiveDate, months: i32) -> Option<NaiveDate> {
    from_month_index(month_index(day) + i64::from(months))
}

/// Whole months from `from`'s month to `to`'s month (negative if `to` is earlier).
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    month_index(to) - month_index(from)
}
