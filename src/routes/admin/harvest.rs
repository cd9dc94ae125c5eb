use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use lunchbook_schedule::{display_date, is_delivery_day, parse_date};
use lunchbook_sheet::Meal;
use serde::Deserialize;

use crate::auth::AuthAdmin;
use crate::routes::AppState;
use crate::template::{Template, filters};

const HARVEST_FAILED: &str = "Could not fetch the menu for this week. Please try again later.";

#[derive(askama::Template)]
#[template(path = "admin/harvest.html")]
pub struct HarvestTemplate {
    pub display: String,
    pub anchor: String,
    pub meals: Vec<Meal>,
    pub error: Option<&'static str>,
}

#[derive(Deserialize)]
pub struct HarvestQuery {
    #[serde(default)]
    pub date: String,
}

/// POST /admin/harvest?date= - scrapes the week's menu and publishes it to the sheet.
#[tracing::instrument(skip_all, fields(date = %query.date))]
pub async fn action(
    template: Template,
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<HarvestQuery>,
) -> impl IntoResponse {
    let Some(delivery) = parse_date(&query.date).filter(|d| is_delivery_day(*d)) else {
        return template.render_status(
            StatusCode::BAD_REQUEST,
            HarvestTemplate {
                display: String::new(),
                anchor: String::new(),
                meals: Vec::new(),
                error: Some("Pick a delivery date to harvest."),
            },
        );
    };

    let week = state.clock.ordering_week(delivery);
    let mut page = HarvestTemplate {
        display: display_date(delivery),
        anchor: display_date(week.anchor),
        meals: Vec::new(),
        error: None,
    };

    let meals = match state.harvester.harvest(week.anchor).await {
        Ok(meals) => meals,
        Err(err) => {
            tracing::error!("menu harvest failed: {err}");

            page.error = Some(HARVEST_FAILED);
            return template.render_status(StatusCode::BAD_GATEWAY, page);
        }
    };

    if let Err(err) = state.sheet.publish_menu(week.anchor, &meals).await {
        tracing::error!("failed to publish harvested menu: {err}");

        page.error = Some(HARVEST_FAILED);
        return template.render_status(StatusCode::BAD_GATEWAY, page);
    }

    tracing::info!(meals = meals.len(), "menu harvested");

    page.meals = meals;
    template.render(page)
}
