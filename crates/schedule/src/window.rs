use serde::Serialize;
use time::{Date, PrimitiveDateTime, Time};

/// Ordering window of a single delivery date relative to "now".
///
/// Transitions only move forward in time: `Open -> ClosesToday -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OrderWindow {
    Open { days_left: i64 },
    ClosesToday,
    Closed,
}

impl OrderWindow {
    /// Classifies `now` against a deadline day closing at `cutoff`.
    pub fn classify(deadline: Date, cutoff: Time, now: PrimitiveDateTime) -> Self {
        let days_left = (deadline - now.date()).whole_days();

        match days_left {
            d if d < 0 => OrderWindow::Closed,
            0 if now.time() < cutoff => OrderWindow::ClosesToday,
            0 => OrderWindow::Closed,
            days_left => OrderWindow::Open { days_left },
        }
    }

    pub fn accepts_orders(&self) -> bool {
        !matches!(self, OrderWindow::Closed)
    }

    /// Short status line shown next to order forms.
    pub fn message(&self) -> String {
        match self {
            OrderWindow::Open { days_left: 1 } => "1 day left to order".to_owned(),
            OrderWindow::Open { days_left } => format!("{days_left} days left to order"),
            OrderWindow::ClosesToday => "Ordering ends today".to_owned(),
            OrderWindow::Closed => "Orders closed".to_owned(),
        }
    }

    /// CSS modifier used by the templates.
    pub fn tone(&self) -> &'static str {
        match self {
            OrderWindow::Open { days_left } if *days_left <= 2 => "warning",
            OrderWindow::Open { .. } => "open",
            OrderWindow::ClosesToday => "urgent",
            OrderWindow::Closed => "closed",
        }
    }
}
