use serde::Serialize;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use time_tz::{ToTimezone, timezones};

use crate::{OrderWindow, display_date, display_hour, sunday_anchor, wednesday_deadline};

pub const DEFAULT_CUTOFF_HOUR: u8 = 16;

/// Local wall clock of the school district.
#[derive(Debug, Clone)]
pub struct Clock {
    timezone: String,
    cutoff_hour: u8,
    fixed: Option<PrimitiveDateTime>,
}

impl Clock {
    /// Unknown timezone names fall back to UTC.
    pub fn new(timezone: impl Into<String>, cutoff_hour: u8) -> Self {
        Self {
            timezone: timezone.into(),
            cutoff_hour,
            fixed: None,
        }
    }

    /// Freezes the clock at a local time.
    pub fn fixed(mut self, now: PrimitiveDateTime) -> Self {
        self.fixed = Some(now);
        self
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    pub fn cutoff(&self) -> Time {
        Time::from_hms(self.cutoff_hour, 0, 0).unwrap_or(Time::MIDNIGHT)
    }

    pub fn now(&self) -> PrimitiveDateTime {
        if let Some(now) = self.fixed {
            return now;
        }

        let mut now = OffsetDateTime::now_utc();
        if let Some(tz) = timezones::get_by_name(&self.timezone) {
            now = now.to_timezone(tz);
        }

        PrimitiveDateTime::new(now.date(), now.time())
    }

    pub fn today(&self) -> Date {
        self.now().date()
    }

    /// Anchor, deadline and current window for one delivery date.
    pub fn ordering_week(&self, delivery: Date) -> OrderingWeek {
        let deadline = wednesday_deadline(delivery);

        OrderingWeek {
            delivery,
            anchor: sunday_anchor(delivery),
            deadline,
            deadline_label: format!(
                "{} at {}",
                display_date(deadline),
                display_hour(self.cutoff_hour)
            ),
            window: OrderWindow::classify(deadline, self.cutoff(), self.now()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderingWeek {
    pub delivery: Date,
    pub anchor: Date,
    pub deadline: Date,
    pub deadline_label: String,
    pub window: OrderWindow,
}
