use std::collections::HashSet;

use serde::Serialize;
use time::{Date, Month};

use crate::{display_date, format_date, is_delivery_day};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DeliveryDay {
    pub raw_date: String,
    pub display: String,
    pub taken: bool,
    pub past: bool,
}

impl DeliveryDay {
    pub fn bookable(&self) -> bool {
        !self.taken && !self.past
    }
}

/// One month of bookable delivery days plus navigation to its neighbours.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryMonth {
    pub year: i32,
    pub month: Month,
    pub days: Vec<DeliveryDay>,
    pub slots: usize,
}

impl DeliveryMonth {
    /// Lists Monday-Wednesday dates of `year`/`month`.
    ///
    /// `taken` holds `YYYY-MM-DD` keys that are already booked or blocked,
    /// `today` decides which dates are in the past.
    pub fn build(year: i32, month: Month, taken: &HashSet<String>, today: Date) -> Option<Self> {
        let mut day = Date::from_calendar_date(year, month, 1).ok()?;
        let mut days = Vec::new();

        while day.month() == month {
            if is_delivery_day(day) {
                let raw_date = format_date(day);
                days.push(DeliveryDay {
                    taken: taken.contains(&raw_date),
                    past: day < today,
                    display: display_date(day),
                    raw_date,
                });
            }

            day = match day.next_day() {
                Some(next) => next,
                None => break,
            };
        }

        let slots = days.iter().filter(|d| d.bookable()).count();

        Some(Self {
            year,
            month,
            days,
            slots,
        })
    }

    /// Resolves `?m=&y=` query values, falling back to the month of `today`.
    pub fn resolve(month: Option<u8>, year: Option<i32>, today: Date) -> (i32, Month) {
        let month = month
            .and_then(|m| Month::try_from(m).ok())
            .unwrap_or(today.month());
        let year = year
            .filter(|y| (2000..=2100).contains(y))
            .unwrap_or(today.year());

        (year, month)
    }

    pub fn previous(&self) -> (i32, Month) {
        match self.month {
            Month::January => (self.year - 1, Month::December),
            month => (self.year, month.previous()),
        }
    }

    pub fn next(&self) -> (i32, Month) {
        match self.month {
            Month::December => (self.year + 1, Month::January),
            month => (self.year, month.next()),
        }
    }

    pub fn previous_url(&self) -> String {
        let (year, month) = self.previous();
        format!("/?m={}&y={year}", month as u8)
    }

    pub fn next_url(&self) -> String {
        let (year, month) = self.next();
        format!("/?m={}&y={year}", month as u8)
    }

    pub fn month_name(&self) -> String {
        self.month.to_string()
    }
}
