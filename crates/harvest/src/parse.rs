use std::{collections::HashSet, sync::LazyLock};

use lunchbook_sheet::Meal;
use regex::Regex;
use reqwest::Url;

static RE_MEAL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-meal-id\s*=\s*["']([A-Za-z0-9_-]+)["']"#).unwrap());
static RE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class\s*=\s*["'][^"']*\bmeal-name\b[^"']*["'][^>]*>(.*?)</(?:h[1-6]|p|span|div|td|li|a)>"#).unwrap()
});
static RE_IMG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["'][^>]*>"#).unwrap());
static RE_ALT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\balt\s*=\s*["']([^"']*)["']"#).unwrap());
static RE_TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static RE_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Extracts meal cards from a menu page.
///
/// A card starts at a `data-meal-id` attribute and runs until the next one.
/// The name comes from the `meal-name` element, falling back to the image alt text.
pub fn parse_menu(html: &str, base: &Url) -> Vec<Meal> {
    let starts: Vec<_> = RE_MEAL_ID.captures_iter(html).collect();
    let mut seen = HashSet::new();
    let mut meals = Vec::new();

    for (index, captures) in starts.iter().enumerate() {
        let (Some(whole), Some(id)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let end = starts
            .get(index + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(html.len());
        let card = &html[whole.end()..end];

        let image = RE_IMG.captures(card);
        let name = RE_NAME
            .captures(card)
            .and_then(|c| c.get(1))
            .map(|m| clean_text(m.as_str()))
            .filter(|n| !n.is_empty())
            .or_else(|| {
                image
                    .as_ref()
                    .and_then(|img| RE_ALT.captures(img.get(0)?.as_str()))
                    .and_then(|c| c.get(1))
                    .map(|m| clean_text(m.as_str()))
                    .filter(|n| !n.is_empty())
            });

        let Some(name) = name else {
            tracing::debug!(meal_id = id.as_str(), "meal card without a name");
            continue;
        };

        if !seen.insert(id.as_str().to_owned()) {
            continue;
        }

        let image_url = image
            .and_then(|c| c.get(1))
            .and_then(|m| base.join(&decode_entities(m.as_str())).ok())
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .map(String::from);

        meals.push(Meal {
            id: id.as_str().to_owned(),
            name,
            image_url,
        });
    }

    meals
}

fn clean_text(value: &str) -> String {
    let text = RE_TAGS.replace_all(value, " ");
    let text = decode_entities(&text);

    RE_SPACES.replace_all(text.trim(), " ").into_owned()
}

/// Decodes the handful of entities menu sites actually emit.
pub fn decode_entities(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];

        let Some(end) = rest.find(';').filter(|end| *end <= 10) else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };

        let entity = &rest[1..end];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some(' '),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|n| n.parse().ok()))
                .and_then(char::from_u32),
        };

        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <section class="week">
          <div class="menu-item" data-meal-id="4411">
            <img class="thumb" src="/images/meals/4411.jpg" alt="Chicken wrap photo">
            <h3 class="meal-name">Chicken   Wrap &amp; Salsa</h3>
          </div>
          <div class="menu-item" data-meal-id='4412'>
            <img src="https://cdn.example.com/4412.png" alt="Veggie Bowl">
          </div>
          <div class="menu-item" data-meal-id="4411">
            <h3 class="meal-name">Chicken Wrap again</h3>
          </div>
          <div class="menu-item" data-meal-id="4413">
            <span class="price">$4</span>
          </div>
          <div class="menu-item" data-meal-id="4414">
            <img src="javascript:alert(1)">
            <p class="card meal-name large"><b>Fish</b> &#38; Chips</p>
          </div>
        </section>
    "#;

    fn base() -> Url {
        Url::parse("https://menus.example.com/district/").unwrap()
    }

    #[test]
    fn test_parse_menu_cards() {
        let meals = parse_menu(PAGE, &base());

        assert_eq!(
            meals,
            vec![
                Meal {
                    id: "4411".to_owned(),
                    name: "Chicken Wrap & Salsa".to_owned(),
                    image_url: Some("https://menus.example.com/images/meals/4411.jpg".to_owned()),
                },
                Meal {
                    id: "4412".to_owned(),
                    name: "Veggie Bowl".to_owned(),
                    image_url: Some("https://cdn.example.com/4412.png".to_owned()),
                },
                Meal {
                    id: "4414".to_owned(),
                    name: "Fish & Chips".to_owned(),
                    image_url: None,
                },
            ]
        );
    }

    #[test]
    fn test_page_without_cards() {
        assert!(parse_menu("<html><body>Closed for summer</body></html>", &base()).is_empty());
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("Mac &amp; Cheese"), "Mac & Cheese");
        assert_eq!(decode_entities("Caf&#233; &#x41;"), "Café A");
        assert_eq!(decode_entities("AT&T &unknown; &"), "AT&T &unknown; &");
    }
}
