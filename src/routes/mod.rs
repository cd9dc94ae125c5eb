use axum::{
    Router,
    response::IntoResponse,
    routing::{get, post},
};
use lunchbook_harvest::Harvester;
use lunchbook_schedule::Clock;
use lunchbook_sheet::SheetClient;
use serde::{Deserialize, Deserializer};
use sqlx::SqlitePool;

use crate::template::{NotFoundTemplate, Template};

mod admin;
mod booking;
mod calendar;
mod health;
mod order;

#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub sheet: SheetClient,
    pub harvester: Harvester,
    pub clock: Clock,
    pub pool: SqlitePool,
    pub write_pool: SqlitePool,
}

impl AppState {
    pub fn new(
        config: crate::config::Config,
        pool: SqlitePool,
        write_pool: SqlitePool,
    ) -> anyhow::Result<Self> {
        let sheet = SheetClient::new(&config.sheet.url, config.sheet.timeout())?;
        let harvester = Harvester::new(
            &config.menu_site.base_url,
            &config.menu_site.menu_path,
            config.menu_site.timeout(),
        )?;
        let clock = Clock::new(
            config.schedule.timezone.to_owned(),
            config.schedule.cutoff_hour,
        );

        Ok(Self {
            config,
            sheet,
            harvester,
            clock,
            pool,
            write_pool,
        })
    }

    /// Replaces the wall clock, for tests that need a fixed "now".
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

/// Form counts that are blank or not a number become 0, so range checks report them.
pub(crate) fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = String::deserialize(deserializer)?;

    Ok(value.trim().parse().unwrap_or_default())
}

pub async fn fallback(template: Template) -> impl IntoResponse {
    template.render_status(axum::http::StatusCode::NOT_FOUND, NotFoundTemplate)
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .with_state(app_state.pool.clone())
        .route("/", get(calendar::page))
        .route("/book", get(booking::page).post(booking::action))
        .route("/order", get(order::page).post(order::action))
        .route(
            "/admin/login",
            get(admin::login::page).post(admin::login::action),
        )
        .route("/admin/logout", get(admin::login::logout))
        .route("/admin", get(admin::dashboard::page))
        .route("/admin/export.csv", get(admin::export::csv))
        .route("/admin/picklist", get(admin::export::picklist))
        .route("/admin/schools/{school}", get(admin::school::page))
        .route("/admin/block/{date}", post(admin::block::toggle))
        .route("/admin/harvest", post(admin::harvest::action))
        .route("/static/{*path}", get(crate::assets::serve))
        .fallback(fallback)
        .with_state(app_state)
}
