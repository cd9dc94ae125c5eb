use time::{Date, Duration, Weekday, macros::format_description};

/// Label used wherever a deadline cannot be derived from the input.
pub const UNKNOWN_DEADLINE: &str = "TBD";

const DATE_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Parses a `YYYY-MM-DD` delivery date. Surrounding whitespace is ignored.
pub fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value.trim(), DATE_FORMAT).ok()
}

/// Formats a date as `YYYY-MM-DD`, the key format shared with the sheet.
pub fn format_date(date: Date) -> String {
    // The format only contains numeric components so it cannot fail.
    date.format(DATE_FORMAT).unwrap_or_default()
}

/// Deliveries only happen on Monday, Tuesday and Wednesday.
pub fn is_delivery_day(date: Date) -> bool {
    matches!(
        date.weekday(),
        Weekday::Monday | Weekday::Tuesday | Weekday::Wednesday
    )
}

/// Sunday that opens the ordering week used to look up the menu of `delivery`.
///
/// Always strictly before `delivery`; a Sunday delivery maps to the Sunday one
/// week earlier rather than to itself.
pub fn sunday_anchor(delivery: Date) -> Date {
    let weekday = delivery.weekday().number_days_from_monday() as i64;
    let offset = match (weekday + 1) % 7 {
        0 => 7,
        offset => offset,
    };

    delivery - Duration::days(offset)
}

/// Wednesday on which ordering for `delivery` closes.
pub fn wednesday_deadline(delivery: Date) -> Date {
    let weekday = delivery.weekday().number_days_from_monday() as i64;
    let mut offset = (weekday - 2).rem_euclid(7);
    if offset <= 2 {
        offset += 7;
    }

    delivery - Duration::days(offset)
}

/// [`sunday_anchor`] over raw input; `None` means no menu can be looked up.
pub fn anchor_for(value: &str) -> Option<Date> {
    parse_date(value).map(sunday_anchor)
}

/// [`wednesday_deadline`] over raw input.
pub fn deadline_for(value: &str) -> Option<Date> {
    parse_date(value).map(wednesday_deadline)
}

/// Human readable deadline such as `Wednesday, Feb 25 at 4:00 PM`, or `TBD`.
pub fn deadline_label(value: &str, cutoff_hour: u8) -> String {
    match deadline_for(value) {
        Some(deadline) => format!(
            "{} at {}",
            crate::display_date(deadline),
            crate::display_hour(cutoff_hour)
        ),
        None => UNKNOWN_DEADLINE.to_owned(),
    }
}
