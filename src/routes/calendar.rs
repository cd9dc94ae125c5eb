use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use lunchbook_schedule::DeliveryMonth;
use serde::Deserialize;

use crate::routes::AppState;
use crate::template::{NotFoundTemplate, Template, filters};

#[derive(askama::Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub calendar: DeliveryMonth,
    pub month_name: String,
    pub prev_url: String,
    pub next_url: String,
}

#[derive(Deserialize, Default)]
pub struct PageQuery {
    pub m: Option<String>,
    pub y: Option<String>,
}

/// GET / - bookable Monday-Wednesday dates of one month.
#[tracing::instrument(skip_all, fields(m = ?query.m, y = ?query.y))]
pub async fn page(
    template: Template,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> impl IntoResponse {
    let today = state.clock.today();
    let (year, month) = DeliveryMonth::resolve(
        query.m.and_then(|m| m.trim().parse().ok()),
        query.y.and_then(|y| y.trim().parse().ok()),
        today,
    );

    let taken = crate::or_default!(state.sheet.taken_dates(), "taken dates");

    let Some(calendar) = DeliveryMonth::build(year, month, &taken, today) else {
        return template.render_status(StatusCode::NOT_FOUND, NotFoundTemplate);
    };

    template.render(IndexTemplate {
        month_name: calendar.month_name(),
        prev_url: calendar.previous_url(),
        next_url: calendar.next_url(),
        calendar,
    })
}
