use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use lunchbook_schedule::{display_date, format_date, parse_date};
use lunchbook_sheet::Order;
use serde::Deserialize;
use time::Date;

use crate::auth::AuthAdmin;
use crate::export::{Picklist, orders_csv};
use crate::routes::AppState;
use crate::template::{Template, filters};

#[derive(askama::Template)]
#[template(path = "admin/picklist.html")]
pub struct PicklistTemplate {
    pub date: String,
    pub display: String,
    pub picklist: Option<Picklist>,
    pub error: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct DateQuery {
    pub date: Option<String>,
}

impl DateQuery {
    /// `Ok(None)` when no date was given, `Err` when it does not parse.
    fn date(&self) -> Result<Option<Date>, ()> {
        match self.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            None => Ok(None),
            Some(value) => parse_date(value).map(Some).ok_or(()),
        }
    }
}

fn attachment_name(date: Option<Date>) -> String {
    match date {
        Some(date) => format!("orders-{}.csv", format_date(date)),
        None => "orders.csv".to_owned(),
    }
}

/// GET /admin/export.csv?date=
#[tracing::instrument(skip_all, fields(date = ?query.date))]
pub async fn csv(
    template: Template,
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> impl IntoResponse {
    let Ok(date) = query.date() else {
        return (StatusCode::BAD_REQUEST, "Invalid date, expected YYYY-MM-DD").into_response();
    };

    let orders: Vec<Order> = crate::or_default!(state.sheet.orders(), "orders");
    let body = crate::try_page_response!(sync: orders_csv(&orders, date), template);

    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", attachment_name(date)),
            ),
        ],
        body,
    )
        .into_response()
}

/// GET /admin/picklist?date= - printable kitchen sheet of one delivery date.
#[tracing::instrument(skip_all, fields(date = ?query.date))]
pub async fn picklist(
    template: Template,
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> impl IntoResponse {
    let date = match query.date() {
        Ok(Some(date)) => date,
        Ok(None) => {
            return template.render(PicklistTemplate {
                date: format_date(state.clock.today()),
                display: String::new(),
                picklist: None,
                error: None,
            });
        }
        Err(()) => {
            return template.render_status(
                StatusCode::BAD_REQUEST,
                PicklistTemplate {
                    date: query.date.unwrap_or_default(),
                    display: String::new(),
                    picklist: None,
                    error: Some("Invalid date, expected YYYY-MM-DD.".to_owned()),
                },
            );
        }
    };

    let orders: Vec<Order> = crate::or_default!(state.sheet.orders(), "orders");

    template.render(PicklistTemplate {
        date: format_date(date),
        display: display_date(date),
        picklist: Some(Picklist::build(&orders, date)),
        error: None,
    })
}
