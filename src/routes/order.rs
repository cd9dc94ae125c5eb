use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use lunchbook_schedule::{
    OrderingWeek, UNKNOWN_DEADLINE, display_date, format_date, is_delivery_day, parse_date,
};
use lunchbook_sheet::{Booking, Meal, NewOrder};
use serde::Deserialize;
use validator::Validate;

use crate::routes::AppState;
use crate::submission::Submission;
use crate::template::{Template, filters};

#[derive(askama::Template)]
#[template(path = "order.html")]
pub struct OrderTemplate {
    pub week: Option<OrderingWeek>,
    pub display: String,
    pub deadline_label: String,
    pub menu: Vec<Meal>,
    pub form: OrderForm,
    pub error: Option<String>,
    pub confirmed: Option<String>,
}

impl OrderTemplate {
    fn accepts_orders(&self) -> bool {
        self.week.as_ref().is_some_and(|w| w.window.accepts_orders())
    }
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub date: Option<String>,
}

#[derive(Deserialize, Validate, Default, Clone)]
pub struct OrderForm {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 120))]
    pub school: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 120))]
    pub teacher: String,
    #[serde(default)]
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    #[serde(default)]
    pub meal_id: String,
    #[serde(default, deserialize_with = "crate::routes::lenient_count")]
    #[validate(range(min = 1, max = 500))]
    pub quantity: u32,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub notes: String,
}

/// Ordering week and menu of one delivery date.
///
/// Unknown or malformed dates yield no week, a `TBD` deadline and no menu.
async fn load(state: &AppState, form: OrderForm) -> OrderTemplate {
    let Some(delivery) = parse_date(&form.date).filter(|d| is_delivery_day(*d)) else {
        return OrderTemplate {
            week: None,
            display: String::new(),
            deadline_label: UNKNOWN_DEADLINE.to_owned(),
            menu: Vec::new(),
            form,
            error: None,
            confirmed: None,
        };
    };

    let week = state.clock.ordering_week(delivery);
    let menu: Vec<Meal> = crate::or_default!(state.sheet.menu(week.anchor), "menu");

    OrderTemplate {
        display: display_date(delivery),
        deadline_label: week.deadline_label.to_owned(),
        week: Some(week),
        menu,
        form,
        error: None,
        confirmed: None,
    }
}

/// GET /order?date=
#[tracing::instrument(skip_all, fields(date = ?query.date))]
pub async fn page(
    template: Template,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> impl IntoResponse {
    let date = query.date.unwrap_or_default();
    let (mut page, bookings) = tokio::join!(
        load(
            &state,
            OrderForm {
                date: date.to_owned(),
                ..Default::default()
            }
        ),
        state.sheet.bookings()
    );

    let bookings: Vec<Booking> = crate::or_default!(sync: bookings, "bookings");
    if let Some(booking) = bookings.iter().find(|b| b.date_key() == date) {
        page.form.school = booking.school.to_owned();
    }

    if !date.is_empty() && page.week.is_none() {
        page.error = Some("This is not a delivery date.".to_owned());
    }

    template.render(page)
}

/// POST /order
#[tracing::instrument(skip_all, fields(date = %input.date, meal = %input.meal_id))]
pub async fn action(
    template: Template,
    State(state): State<AppState>,
    Form(input): Form<OrderForm>,
) -> impl IntoResponse {
    let validation = input.validate();
    let mut page = load(&state, input).await;

    let Some(week) = page.week.clone() else {
        page.error = Some("Pick a delivery date first.".to_owned());
        return template.render_status(StatusCode::BAD_REQUEST, page);
    };

    if !week.window.accepts_orders() {
        page.error = Some(format!(
            "Orders for {} closed on {}.",
            page.display, week.deadline_label
        ));
        return template.render_status(StatusCode::CONFLICT, page);
    }

    if let Err(errors) = validation {
        let mut fields: Vec<_> = errors.field_errors().into_keys().collect();
        fields.sort();

        page.error = Some(format!("Please check: {}.", fields.join(", ")));
        return template.render_status(StatusCode::UNPROCESSABLE_ENTITY, page);
    }

    let Some(meal) = page.menu.iter().find(|m| m.id == page.form.meal_id).cloned() else {
        page.error = Some("Pick a meal from this week's menu.".to_owned());
        return template.render_status(StatusCode::UNPROCESSABLE_ENTITY, page);
    };

    let submission = Submission::order(&page.form.email, week.delivery);
    let fresh = crate::try_page_response!(submission.claim(&state.write_pool), template);
    if !fresh {
        tracing::info!("duplicate order rejected");

        page.error = Some(format!("You already ordered for {}.", page.display));
        return template.render_status(StatusCode::CONFLICT, page);
    }

    let order = NewOrder {
        date: format_date(week.delivery),
        school: page.form.school.trim().to_owned(),
        teacher: page.form.teacher.trim().to_owned(),
        email: page.form.email.trim().to_owned(),
        meal_id: meal.id,
        meal_name: meal.name.to_owned(),
        quantity: page.form.quantity,
        notes: Some(page.form.notes.trim().to_owned()).filter(|n| !n.is_empty()),
        idempotency_key: submission.idempotency_key(),
    };

    if let Err(err) = state.sheet.submit_order(&order).await {
        tracing::error!("failed to submit order: {err}");

        if let Err(err) = submission.release(&state.write_pool).await {
            tracing::error!("failed to release order key: {err}");
        }

        page.error = Some("We could not save your order right now. Please try again.".to_owned());
        return template.render_status(StatusCode::SERVICE_UNAVAILABLE, page);
    }

    tracing::info!(quantity = order.quantity, "order submitted");

    page.confirmed = Some(format!(
        "{} × {} for {}",
        order.quantity, meal.name, page.display
    ));

    template.render(page)
}
