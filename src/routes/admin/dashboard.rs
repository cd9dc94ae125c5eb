use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use lunchbook_schedule::{Clock, DeliveryMonth, display_date, format_date};
use lunchbook_sheet::{BlockedDate, Booking, Order};
use serde::Deserialize;
use time::{Date, Month};

use crate::auth::AuthAdmin;
use crate::routes::AppState;
use crate::template::{
    NotFoundTemplate, Template, ToastErrorTemplate, ToastSuccessTemplate, filters,
};

#[derive(askama::Template)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub notice: String,
    pub stats: Stats,
    pub upcoming: Vec<UpcomingRow>,
    pub days: Vec<AdminDay>,
    pub month_name: String,
    pub year: i32,
    pub prev_url: String,
    pub next_url: String,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub bookings: usize,
    pub orders: usize,
    pub meals: u32,
    pub blocked: usize,
}

/// One booked delivery date that has not happened yet.
#[derive(Debug)]
pub struct UpcomingRow {
    pub raw_date: String,
    pub display: String,
    pub school: String,
    pub principal: String,
    pub students: u32,
    pub orders: usize,
    pub meals: u32,
    pub deadline_label: String,
    pub window: String,
    pub tone: &'static str,
}

/// A delivery date of the admin calendar.
#[derive(Debug)]
pub struct AdminDay {
    pub raw_date: String,
    pub display: String,
    pub school: Option<String>,
    pub blocked: bool,
    pub past: bool,
}

#[derive(Deserialize, Default)]
pub struct DashboardQuery {
    pub m: Option<String>,
    pub y: Option<String>,
    pub notice: Option<String>,
}

fn upcoming(bookings: &[Booking], orders: &[Order], clock: &Clock, today: Date) -> Vec<UpcomingRow> {
    let mut per_date: HashMap<Date, (usize, u32)> = HashMap::new();
    for order in orders {
        let entry = per_date.entry(order.date).or_default();
        entry.0 += 1;
        entry.1 = entry.1.saturating_add(order.quantity);
    }

    let mut rows: Vec<&Booking> = bookings.iter().filter(|b| b.date >= today).collect();
    rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.school.cmp(&b.school)));

    rows.into_iter()
        .map(|booking| {
            let week = clock.ordering_week(booking.date);
            let (orders, meals) = per_date.get(&booking.date).copied().unwrap_or_default();

            UpcomingRow {
                raw_date: booking.date_key(),
                display: display_date(booking.date),
                school: booking.school.to_owned(),
                principal: booking.principal.to_owned(),
                students: booking.students,
                orders,
                meals,
                deadline_label: week.deadline_label,
                window: week.window.message(),
                tone: week.window.tone(),
            }
        })
        .collect()
}

fn admin_days(
    calendar: &DeliveryMonth,
    bookings: &[Booking],
    blocked: &HashSet<String>,
) -> Vec<AdminDay> {
    let schools: HashMap<String, &str> = bookings
        .iter()
        .map(|b| (b.date_key(), b.school.as_str()))
        .collect();

    calendar
        .days
        .iter()
        .map(|day| AdminDay {
            raw_date: day.raw_date.to_owned(),
            display: day.display.to_owned(),
            school: schools.get(&day.raw_date).map(|s| (*s).to_owned()),
            blocked: blocked.contains(&day.raw_date),
            past: day.past,
        })
        .collect()
}

fn stats(upcoming: &[UpcomingRow], blocked: &[BlockedDate], today: Date) -> Stats {
    Stats {
        bookings: upcoming.len(),
        orders: upcoming.iter().map(|r| r.orders).sum(),
        meals: upcoming
            .iter()
            .fold(0u32, |acc, r| acc.saturating_add(r.meals)),
        blocked: blocked.iter().filter(|b| b.0 >= today).count(),
    }
}

pub fn month_url(year: i32, month: Month) -> String {
    format!("/admin?m={}&y={year}", month as u8)
}

fn notice(template: &Template, notice: Option<&str>) -> String {
    match notice {
        Some("blocked") => template.to_string(ToastSuccessTemplate {
            message: "Date blocked",
            description: Some("Schools can no longer book it."),
        }),
        Some("unblocked") => template.to_string(ToastSuccessTemplate {
            message: "Date reopened",
            description: Some("Schools can book it again."),
        }),
        Some("failed") => template.to_string(ToastErrorTemplate {
            message: "Could not update the date",
            description: Some("The sheet did not answer. Please try again."),
        }),
        _ => String::new(),
    }
}

/// GET /admin
#[tracing::instrument(skip_all, fields(admin = %admin.sub))]
pub async fn page(
    template: Template,
    admin: AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> impl IntoResponse {
    let today = state.clock.today();
    let (year, month) = DeliveryMonth::resolve(
        query.m.and_then(|m| m.trim().parse().ok()),
        query.y.and_then(|y| y.trim().parse().ok()),
        today,
    );

    let (bookings, orders, blocked) = tokio::join!(
        state.sheet.bookings(),
        state.sheet.orders(),
        state.sheet.blocked_dates()
    );
    let bookings: Vec<Booking> = crate::or_default!(sync: bookings, "bookings");
    let orders: Vec<Order> = crate::or_default!(sync: orders, "orders");
    let blocked: Vec<BlockedDate> = crate::or_default!(sync: blocked, "blocked dates");

    let Some(calendar) = DeliveryMonth::build(year, month, &HashSet::new(), today) else {
        return template.render_status(StatusCode::NOT_FOUND, NotFoundTemplate);
    };

    let blocked_keys: HashSet<String> = blocked.iter().map(|b| format_date(b.0)).collect();
    let upcoming = upcoming(&bookings, &orders, &state.clock, today);
    let (prev_year, prev_month) = calendar.previous();
    let (next_year, next_month) = calendar.next();

    template.render(DashboardTemplate {
        notice: notice(&template, query.notice.as_deref()),
        stats: stats(&upcoming, &blocked, today),
        days: admin_days(&calendar, &bookings, &blocked_keys),
        upcoming,
        month_name: calendar.month_name(),
        year: calendar.year,
        prev_url: month_url(prev_year, prev_month),
        next_url: month_url(next_year, next_month),
    })
}
