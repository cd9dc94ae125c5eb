use std::{collections::HashSet, time::Duration};

use lunchbook_schedule::format_date;
use reqwest::Url;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use time::Date;

use crate::{
    BlockedDate, Booking, Meal, Order, Result, SchoolProfile, SheetError, decode_rows,
};

/// Booking submitted by a principal.
#[derive(Debug, Clone, Serialize)]
pub struct NewBooking {
    pub date: String,
    pub school: String,
    pub principal: String,
    pub email: String,
    pub phone: Option<String>,
    pub students: u32,
}

/// Order submitted by a teacher.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub date: String,
    pub school: String,
    pub teacher: String,
    pub email: String,
    pub meal_id: String,
    pub meal_name: String,
    pub quantity: u32,
    pub notes: Option<String>,
    pub idempotency_key: String,
}

#[derive(Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum Action<'a> {
    Book(&'a NewBooking),
    Order(&'a NewOrder),
    Menu { anchor: String },
    Profile { school: &'a str },
    ToggleBlock { date: String },
    PublishMenu { anchor: String, meals: &'a [Meal] },
}

impl Action<'_> {
    fn name(&self) -> &'static str {
        match self {
            Action::Book(_) => "book",
            Action::Order(_) => "order",
            Action::Menu { .. } => "menu",
            Action::Profile { .. } => "profile",
            Action::ToggleBlock { .. } => "toggle_block",
            Action::PublishMenu { .. } => "publish_menu",
        }
    }
}

/// Rows come back either wrapped as `{"rows": [...]}` or as a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum Rows {
    Wrapped {
        #[serde(default)]
        rows: Vec<Vec<Value>>,
    },
    Bare(Vec<Vec<Value>>),
}

impl From<Rows> for Vec<Vec<Value>> {
    fn from(value: Rows) -> Self {
        match value {
            Rows::Wrapped { rows } | Rows::Bare(rows) => rows,
        }
    }
}

#[derive(Deserialize)]
struct Ack {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    blocked: Option<bool>,
}

#[derive(Deserialize, Default)]
struct ProfileRows {
    #[serde(default)]
    bookings: Vec<Vec<Value>>,
    #[serde(default)]
    orders: Vec<Vec<Value>>,
}

/// Client of the spreadsheet-backed JSON API.
#[derive(Debug, Clone)]
pub struct SheetClient {
    url: Url,
    client: reqwest::Client,
}

impl SheetClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(url).map_err(|_| SheetError::InvalidUrl(url.to_owned()))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lunchbook/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { url, client })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn list(&self, action: &'static str) -> Result<Vec<Vec<Value>>> {
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair("action", action);

        let rows: Rows = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(rows.into())
    }

    async fn post<T: DeserializeOwned>(&self, action: &Action<'_>) -> Result<T> {
        tracing::debug!(action = action.name(), "posting to sheet");

        Ok(self
            .client
            .post(self.url.clone())
            .json(action)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    async fn acknowledged(&self, action: &Action<'_>) -> Result<Ack> {
        let ack: Ack = self.post(action).await?;
        if !ack.ok {
            return Err(SheetError::Rejected {
                action: action.name(),
                message: ack.message.unwrap_or_else(|| "no reason given".to_owned()),
            });
        }

        Ok(ack)
    }

    pub async fn bookings(&self) -> Result<Vec<Booking>> {
        Ok(decode_rows(self.list("bookings").await?))
    }

    pub async fn blocked_dates(&self) -> Result<Vec<BlockedDate>> {
        Ok(decode_rows(self.list("blocked").await?))
    }

    pub async fn orders(&self) -> Result<Vec<Order>> {
        Ok(decode_rows(self.list("orders").await?))
    }

    /// `YYYY-MM-DD` keys of dates that can no longer be booked.
    pub async fn taken_dates(&self) -> Result<HashSet<String>> {
        let (bookings, blocked) = tokio::try_join!(self.bookings(), self.blocked_dates())?;

        Ok(bookings
            .iter()
            .map(Booking::date_key)
            .chain(blocked.into_iter().map(|b| format_date(b.0)))
            .collect())
    }

    pub async fn submit_booking(&self, booking: &NewBooking) -> Result<()> {
        self.acknowledged(&Action::Book(booking)).await?;

        Ok(())
    }

    pub async fn submit_order(&self, order: &NewOrder) -> Result<()> {
        self.acknowledged(&Action::Order(order)).await?;

        Ok(())
    }

    /// Menu published for the ordering week starting on `anchor`.
    pub async fn menu(&self, anchor: Date) -> Result<Vec<Meal>> {
        let rows: Rows = self
            .post(&Action::Menu {
                anchor: format_date(anchor),
            })
            .await?;

        Ok(decode_rows(rows.into()))
    }

    pub async fn profile(&self, school: &str) -> Result<SchoolProfile> {
        let rows: ProfileRows = self.post(&Action::Profile { school }).await?;

        Ok(SchoolProfile {
            school: school.to_owned(),
            bookings: decode_rows(rows.bookings),
            orders: decode_rows(rows.orders),
        })
    }

    /// Flips the blocked flag of a date and returns the new state.
    pub async fn toggle_block(&self, date: Date) -> Result<bool> {
        let ack = self
            .acknowledged(&Action::ToggleBlock {
                date: format_date(date),
            })
            .await?;

        Ok(ack.blocked.unwrap_or_default())
    }

    pub async fn publish_menu(&self, anchor: Date, meals: &[Meal]) -> Result<()> {
        self.acknowledged(&Action::PublishMenu {
            anchor: format_date(anchor),
            meals,
        })
        .await?;

        Ok(())
    }
}
