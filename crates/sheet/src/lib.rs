//! Typed access to the spreadsheet-backed booking API.

mod client;
mod error;
mod record;

pub use client::*;
pub use error::*;
pub use record::*;
