use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use lunchbook_schedule::{display_date, format_date, is_delivery_day, parse_date};
use lunchbook_sheet::NewBooking;
use serde::Deserialize;
use time::Date;
use validator::Validate;

use crate::routes::AppState;
use crate::submission::Submission;
use crate::template::{Template, filters};

#[derive(askama::Template)]
#[template(path = "book.html")]
pub struct BookTemplate {
    pub date: Option<String>,
    pub display: String,
    pub form: BookingForm,
    pub error: Option<String>,
    pub confirmed: bool,
}

impl BookTemplate {
    fn new(form: BookingForm, delivery: Option<Date>) -> Self {
        Self {
            date: delivery.map(format_date),
            display: delivery.map(display_date).unwrap_or_default(),
            form,
            error: None,
            confirmed: false,
        }
    }

    fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

const JUST_BOOKED: &str = "Sorry, this date was just booked. Please pick another one.";

#[derive(Deserialize)]
pub struct PageQuery {
    pub date: Option<String>,
}

#[derive(Deserialize, Validate, Default, Clone)]
pub struct BookingForm {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 120))]
    pub school: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 120))]
    pub principal: String,
    #[serde(default)]
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 40))]
    pub phone: String,
    #[serde(default, deserialize_with = "crate::routes::lenient_count")]
    #[validate(range(min = 1, max = 5000))]
    pub students: u32,
}

/// A date that can still be booked, or the reason it cannot.
fn bookable(value: &str, today: Date) -> Result<Date, &'static str> {
    let date = parse_date(value).ok_or("Pick a delivery date from the calendar.")?;
    if !is_delivery_day(date) {
        return Err("Lunches are only delivered on Mondays, Tuesdays and Wednesdays.");
    }
    if date < today {
        return Err("This date is in the past.");
    }

    Ok(date)
}

/// GET /book?date=
pub async fn page(
    template: Template,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> impl IntoResponse {
    let value = query.date.unwrap_or_default();
    let form = BookingForm {
        date: value.to_owned(),
        ..Default::default()
    };

    match bookable(&value, state.clock.today()) {
        Ok(date) => template.render(BookTemplate::new(form, Some(date))),
        Err(reason) => template.render_status(
            StatusCode::BAD_REQUEST,
            BookTemplate::new(form, None).error(reason),
        ),
    }
}

/// POST /book
#[tracing::instrument(skip_all, fields(date = %input.date, school = %input.school))]
pub async fn action(
    template: Template,
    State(state): State<AppState>,
    Form(input): Form<BookingForm>,
) -> impl IntoResponse {
    let date = match bookable(&input.date, state.clock.today()) {
        Ok(date) => date,
        Err(reason) => {
            return template.render_status(
                StatusCode::BAD_REQUEST,
                BookTemplate::new(input, None).error(reason),
            );
        }
    };

    if let Err(errors) = input.validate() {
        let mut fields: Vec<_> = errors.field_errors().into_keys().collect();
        fields.sort();

        return template.render_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            BookTemplate::new(input, Some(date))
                .error(format!("Please check: {}.", fields.join(", "))),
        );
    }

    let taken = crate::or_default!(state.sheet.taken_dates(), "taken dates");
    if taken.contains(&format_date(date)) {
        return template.render_status(
            StatusCode::CONFLICT,
            BookTemplate::new(input, Some(date))
                .error(JUST_BOOKED),
        );
    }

    let submission = Submission::booking(&input.school, date);
    let fresh = crate::try_page_response!(submission.claim(&state.write_pool), template);
    if !fresh {
        tracing::info!("duplicate booking rejected");

        let message = format!(
            "{} already has a delivery booked in {} {}.",
            input.school.trim(),
            date.month(),
            date.year()
        );
        return template.render_status(
            StatusCode::CONFLICT,
            BookTemplate::new(input, Some(date)).error(message),
        );
    }

    let slot = Submission::booking_date(date);
    let fresh = crate::try_page_response!(slot.claim(&state.write_pool), template);
    if !fresh {
        tracing::info!("date claimed by another school");

        if let Err(err) = submission.release(&state.write_pool).await {
            tracing::error!("failed to release booking key: {err}");
        }

        return template.render_status(
            StatusCode::CONFLICT,
            BookTemplate::new(input, Some(date)).error(JUST_BOOKED),
        );
    }

    let booking = NewBooking {
        date: format_date(date),
        school: input.school.trim().to_owned(),
        principal: input.principal.trim().to_owned(),
        email: input.email.trim().to_owned(),
        phone: Some(input.phone.trim().to_owned()).filter(|p| !p.is_empty()),
        students: input.students,
    };

    if let Err(err) = state.sheet.submit_booking(&booking).await {
        tracing::error!("failed to submit booking: {err}");

        for key in [&submission, &slot] {
            if let Err(err) = key.release(&state.write_pool).await {
                tracing::error!("failed to release booking key: {err}");
            }
        }

        return template.render_status(
            StatusCode::SERVICE_UNAVAILABLE,
            BookTemplate::new(input, Some(date))
                .error("We could not save your booking right now. Please try again."),
        );
    }

    tracing::info!("booking submitted");

    let mut confirmation = BookTemplate::new(input, Some(date));
    confirmation.confirmed = true;

    template.render(confirmation)
}
