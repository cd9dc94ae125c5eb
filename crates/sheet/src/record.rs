use lunchbook_schedule::{format_date, parse_date};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::Date;

use crate::RowError;

/// A record stored as one positional row of the remote sheet.
pub trait SheetRow: Sized {
    const KIND: &'static str;

    fn from_cells(cells: &[Value]) -> Result<Self, RowError>;
}

/// Decodes rows, skipping header rows and rows failing the schema.
pub fn decode_rows<T: SheetRow>(rows: Vec<Vec<Value>>) -> Vec<T> {
    let mut records = Vec::with_capacity(rows.len());

    for (index, cells) in rows.iter().enumerate() {
        match T::from_cells(cells) {
            Ok(record) => records.push(record),
            Err(RowError::NotData) => {
                tracing::debug!(kind = T::KIND, row = index, "skipping non-data row");
            }
            Err(err) => {
                tracing::warn!(kind = T::KIND, row = index, err = %err, "skipping malformed row");
            }
        }
    }

    records
}

fn text(cells: &[Value], index: usize) -> Option<String> {
    let value = match cells.get(index)? {
        Value::String(s) => s.trim().to_owned(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };

    (!value.is_empty()).then_some(value)
}

fn required(cells: &[Value], index: usize, column: &'static str) -> Result<String, RowError> {
    text(cells, index).ok_or(RowError::Missing(column))
}

/// Sheets hand dates back either as `YYYY-MM-DD` or as full ISO timestamps.
fn sheet_date(value: &str) -> Option<Date> {
    parse_date(value).or_else(|| value.get(..10).and_then(parse_date))
}

/// First column of every dated row; anything else marks a header or note row.
fn leading_date(cells: &[Value]) -> Result<Date, RowError> {
    text(cells, 0)
        .as_deref()
        .and_then(sheet_date)
        .ok_or(RowError::NotData)
}

fn count(cells: &[Value], index: usize, column: &'static str) -> Result<u32, RowError> {
    let Some(value) = text(cells, index) else {
        return Ok(0);
    };

    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64)
        .map(|n| n as u32)
        .ok_or(RowError::Invalid { column, value })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Booking {
    pub date: Date,
    pub school: String,
    pub principal: String,
    pub email: String,
    pub phone: Option<String>,
    pub students: u32,
}

impl Booking {
    pub fn date_key(&self) -> String {
        format_date(self.date)
    }
}

impl SheetRow for Booking {
    const KIND: &'static str = "booking";

    fn from_cells(cells: &[Value]) -> Result<Self, RowError> {
        Ok(Self {
            date: leading_date(cells)?,
            school: required(cells, 1, "school")?,
            principal: required(cells, 2, "principal")?,
            email: required(cells, 3, "email")?,
            phone: text(cells, 4),
            students: count(cells, 5, "students")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub date: Date,
    pub school: String,
    pub teacher: String,
    pub email: String,
    pub meal_id: String,
    pub meal_name: String,
    pub quantity: u32,
    pub notes: Option<String>,
}

impl Order {
    pub fn date_key(&self) -> String {
        format_date(self.date)
    }
}

impl SheetRow for Order {
    const KIND: &'static str = "order";

    fn from_cells(cells: &[Value]) -> Result<Self, RowError> {
        let date = leading_date(cells)?;
        let quantity = count(cells, 6, "quantity")?;
        if quantity == 0 {
            return Err(RowError::Missing("quantity"));
        }

        Ok(Self {
            date,
            school: required(cells, 1, "school")?,
            teacher: required(cells, 2, "teacher")?,
            email: required(cells, 3, "email")?,
            meal_id: required(cells, 4, "meal_id")?,
            meal_name: required(cells, 5, "meal_name")?,
            quantity,
            notes: text(cells, 7),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedDate(pub Date);

impl SheetRow for BlockedDate {
    const KIND: &'static str = "blocked";

    fn from_cells(cells: &[Value]) -> Result<Self, RowError> {
        leading_date(cells).map(BlockedDate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
}

impl SheetRow for Meal {
    const KIND: &'static str = "meal";

    fn from_cells(cells: &[Value]) -> Result<Self, RowError> {
        let id = text(cells, 0).ok_or(RowError::NotData)?;
        if matches!(
            id.to_ascii_lowercase().as_str(),
            "id" | "meal id" | "meal_id" | "mealid"
        ) {
            return Err(RowError::NotData);
        }

        Ok(Self {
            id,
            name: required(cells, 1, "name")?,
            image_url: text(cells, 2).filter(|url| url.starts_with("http")),
        })
    }
}

/// Everything the sheet knows about one school.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchoolProfile {
    pub school: String,
    pub bookings: Vec<Booking>,
    pub orders: Vec<Order>,
}

impl SchoolProfile {
    pub fn total_meals(&self) -> u32 {
        self.orders
            .iter()
            .fold(0u32, |acc, o| acc.saturating_add(o.quantity))
    }

    pub fn contact(&self) -> Option<&Booking> {
        self.bookings.iter().max_by_key(|b| b.date)
    }

    pub fn next_booking(&self, today: Date) -> Option<&Booking> {
        self.bookings
            .iter()
            .filter(|b| b.date >= today)
            .min_by_key(|b| b.date)
    }
}
