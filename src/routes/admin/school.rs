use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use lunchbook_schedule::display_date;
use lunchbook_sheet::{Booking, Order, SchoolProfile};

use crate::auth::AuthAdmin;
use crate::routes::AppState;
use crate::template::{Template, filters};

#[derive(askama::Template)]
#[template(path = "admin/school.html")]
pub struct SchoolTemplate {
    pub school: String,
    pub contact: Option<Booking>,
    pub next_delivery: Option<String>,
    pub total_meals: u32,
    pub bookings: Vec<BookingRow>,
    pub orders: Vec<Order>,
}

pub struct BookingRow {
    pub display: String,
    pub students: u32,
    pub upcoming: bool,
}

impl SchoolTemplate {
    fn new(school: String, mut profile: SchoolProfile, today: time::Date) -> Self {
        profile.bookings.sort_by(|a, b| b.date.cmp(&a.date));
        profile.orders.sort_by(|a, b| b.date.cmp(&a.date));

        Self {
            school,
            contact: profile.contact().cloned(),
            next_delivery: profile.next_booking(today).map(|b| display_date(b.date)),
            total_meals: profile.total_meals(),
            bookings: profile
                .bookings
                .iter()
                .map(|b| BookingRow {
                    display: display_date(b.date),
                    students: b.students,
                    upcoming: b.date >= today,
                })
                .collect(),
            orders: profile.orders,
        }
    }
}

/// GET /admin/schools/{school}
#[tracing::instrument(skip_all, fields(school = %school))]
pub async fn page(
    template: Template,
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(school): Path<String>,
) -> impl IntoResponse {
    let school = school.trim().to_owned();
    let profile: SchoolProfile =
        crate::or_default!(state.sheet.profile(&school), "school profile");

    template.render(SchoolTemplate::new(school, profile, state.clock.today()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn booking(date: time::Date, students: u32) -> Booking {
        Booking {
            date,
            school: "Hillside".to_owned(),
            principal: format!("Principal {students}"),
            email: "office@hillside.edu".to_owned(),
            phone: None,
            students,
        }
    }

    #[test]
    fn test_profile_rows_are_newest_first() {
        let profile = SchoolProfile {
            school: "Hillside".to_owned(),
            bookings: vec![
                booking(date!(2026 - 02 - 02), 200),
                booking(date!(2026 - 04 - 06), 220),
                booking(date!(2026 - 03 - 02), 210),
            ],
            orders: Vec::new(),
        };

        let page = SchoolTemplate::new("Hillside".to_owned(), profile, date!(2026 - 02 - 20));

        assert_eq!(page.bookings[0].students, 220);
        assert!(page.bookings[0].upcoming);
        assert!(!page.bookings[2].upcoming);
        assert_eq!(page.next_delivery.as_deref(), Some("Monday, Mar 02"));
        assert_eq!(page.contact.map(|c| c.students), Some(220));
        assert_eq!(page.total_meals, 0);
    }
}
