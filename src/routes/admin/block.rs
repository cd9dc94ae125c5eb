use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use lunchbook_schedule::parse_date;

use crate::auth::AuthAdmin;
use crate::routes::AppState;
use crate::routes::admin::dashboard::month_url;

/// POST /admin/block/{date} - flips a date between blocked and bookable.
#[tracing::instrument(skip_all, fields(date = %date))]
pub async fn toggle(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> impl IntoResponse {
    let Some(day) = parse_date(&date) else {
        return (StatusCode::BAD_REQUEST, "Invalid date, expected YYYY-MM-DD").into_response();
    };

    let notice = match state.sheet.toggle_block(day).await {
        Ok(true) => "blocked",
        Ok(false) => "unblocked",
        Err(err) => {
            tracing::error!("failed to toggle blocked date: {err}");
            "failed"
        }
    };

    tracing::info!(notice, "block toggled");

    Redirect::to(&format!("{}&notice={notice}", month_url(day.year(), day.month()))).into_response()
}
