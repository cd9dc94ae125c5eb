//! Order exports: the CSV download and the kitchen picklist.

use std::collections::BTreeMap;
use std::io::{self, Write};

use lunchbook_sheet::Order;
use time::Date;

pub const CSV_HEADER: [&str; 8] = [
    "Date", "School", "Teacher", "Email", "Meal ID", "Meal", "Quantity", "Notes",
];

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Spreadsheet apps evaluate cells starting with these as formulas.
fn is_formula(field: &str) -> bool {
    field.starts_with(['=', '+', '-', '@', '\t', '\r'])
}

pub fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S]) -> io::Result<()> {
    for (index, cell) in row.iter().enumerate() {
        if index > 0 {
            w.write_all(b",")?;
        }

        let cell = cell.as_ref();
        let cell = if is_formula(cell) {
            format!("'{cell}")
        } else {
            cell.to_owned()
        };

        if needs_quotes(&cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }

    w.write_all(b"\r\n")
}

/// Orders of one delivery date, or all of them, as CSV bytes.
pub fn orders_csv(orders: &[Order], date: Option<Date>) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    write_row(&mut out, &CSV_HEADER)?;

    for order in orders.iter().filter(|o| date.is_none_or(|d| o.date == d)) {
        write_row(
            &mut out,
            &[
                order.date_key(),
                order.school.to_owned(),
                order.teacher.to_owned(),
                order.email.to_owned(),
                order.meal_id.to_owned(),
                order.meal_name.to_owned(),
                order.quantity.to_string(),
                order.notes.to_owned().unwrap_or_default(),
            ],
        )?;
    }

    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PicklistLine {
    pub meal: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PicklistSchool {
    pub school: String,
    pub lines: Vec<PicklistLine>,
    pub total: u32,
    pub notes: Vec<String>,
}

/// What the kitchen packs for one delivery date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picklist {
    pub date: Date,
    pub schools: Vec<PicklistSchool>,
    pub meals: Vec<PicklistLine>,
    pub total: u32,
}

impl Picklist {
    pub fn build(orders: &[Order], date: Date) -> Self {
        let mut schools: BTreeMap<&str, (BTreeMap<&str, u32>, Vec<String>)> = BTreeMap::new();
        let mut meals: BTreeMap<&str, u32> = BTreeMap::new();

        for order in orders.iter().filter(|o| o.date == date) {
            let (lines, notes) = schools.entry(order.school.as_str()).or_default();
            let line = lines.entry(order.meal_name.as_str()).or_default();
            *line = line.saturating_add(order.quantity);
            let meal = meals.entry(order.meal_name.as_str()).or_default();
            *meal = meal.saturating_add(order.quantity);

            if let Some(note) = &order.notes {
                notes.push(format!("{}: {note}", order.teacher));
            }
        }

        let schools: Vec<_> = schools
            .into_iter()
            .map(|(school, (lines, notes))| {
                let lines = to_lines(lines);
                PicklistSchool {
                    school: school.to_owned(),
                    total: total(&lines),
                    lines,
                    notes,
                }
            })
            .collect();

        let meals = to_lines(meals);

        Self {
            date,
            total: total(&meals),
            schools,
            meals,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.schools.is_empty()
    }
}

/// Remote quantities are untrusted, so totals saturate instead of overflowing.
fn total(lines: &[PicklistLine]) -> u32 {
    lines
        .iter()
        .fold(0u32, |acc, l| acc.saturating_add(l.quantity))
}

fn to_lines(map: BTreeMap<&str, u32>) -> Vec<PicklistLine> {
    map.into_iter()
        .map(|(meal, quantity)| PicklistLine {
            meal: meal.to_owned(),
            quantity,
        })
        .collect()
}
