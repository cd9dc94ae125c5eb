//! Pulls weekly meal cards from the district's public menu site.

mod parse;

use std::time::Duration;

use lunchbook_schedule::format_date;
use lunchbook_sheet::Meal;
use reqwest::Url;
use time::Date;

pub use parse::*;

#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error("menu site request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid menu site url `{0}`")]
    InvalidUrl(String),

    #[error("no meals found for week of {0}")]
    Empty(String),
}

#[derive(Debug, Clone)]
pub struct Harvester {
    page: Url,
    client: reqwest::Client,
}

impl Harvester {
    pub fn new(base_url: &str, menu_path: &str, timeout: Duration) -> Result<Self, HarvestError> {
        let page = Url::parse(base_url)
            .and_then(|base| base.join(menu_path))
            .map_err(|_| HarvestError::InvalidUrl(format!("{base_url}{menu_path}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lunchbook-harvest/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { page, client })
    }

    pub fn page_url(&self, anchor: Date) -> Url {
        let mut url = self.page.clone();
        url.query_pairs_mut()
            .append_pair("week", &format_date(anchor));
        url
    }

    /// Scrapes the menu published for the ordering week starting on `anchor`.
    #[tracing::instrument(skip(self), fields(anchor = %format_date(anchor)))]
    pub async fn harvest(&self, anchor: Date) -> Result<Vec<Meal>, HarvestError> {
        let url = self.page_url(anchor);
        let html = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let meals = parse_menu(&html, &url);
        tracing::info!(meals = meals.len(), "menu page harvested");

        if meals.is_empty() {
            return Err(HarvestError::Empty(format_date(anchor)));
        }

        Ok(meals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_page_url_carries_week() {
        let harvester = Harvester::new(
            "https://menus.example.com",
            "/district/lunch",
            Duration::from_secs(20),
        )
        .unwrap();

        assert_eq!(
            harvester.page_url(date!(2026 - 03 - 01)).as_str(),
            "https://menus.example.com/district/lunch?week=2026-03-01"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            Harvester::new("menus", "/lunch", Duration::from_secs(20)),
            Err(HarvestError::InvalidUrl(_))
        ));
    }
}
