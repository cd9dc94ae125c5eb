//! Delivery-week arithmetic for lunch bookings and teacher orders.

mod calendar;
mod clock;
mod week;
mod window;

pub use calendar::*;
pub use clock::*;
pub use week::*;
pub use window::*;

use time::{Date, macros::format_description};

/// Formats a date the way pages show it, e.g. `Monday, Mar 02`.
pub fn display_date(date: Date) -> String {
    date.format(format_description!(
        "[weekday], [month repr:short] [day]"
    ))
    .unwrap_or_else(|_| format_date(date))
}

/// Formats a whole hour on a 12-hour clock, e.g. `4:00 PM`.
pub fn display_hour(hour: u8) -> String {
    let suffix = if hour % 24 < 12 { "AM" } else { "PM" };
    let hour = match hour % 12 {
        0 => 12,
        h => h,
    };

    format!("{hour}:00 {suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_display_hour() {
        assert_eq!(display_hour(16), "4:00 PM");
        assert_eq!(display_hour(12), "12:00 PM");
        assert_eq!(display_hour(0), "12:00 AM");
        assert_eq!(display_hour(9), "9:00 AM");
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date(date!(2026 - 02 - 25)), "Wednesday, Feb 25");
    }
}
