use std::{collections::HashMap, time::Duration};

use axum::{Json, Router, extract::Query, routing::get};
use lunchbook_sheet::{NewOrder, SheetClient, SheetError};
use serde_json::{Value, json};
use time::macros::date;

async fn bookings_api(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    match query.get("action").map(String::as_str) {
        Some("bookings") => Json(json!({
            "rows": [
                ["Date", "School", "Principal", "Email", "Phone", "Students"],
                ["2026-03-02", "Hillside", "Ada Park", "ada@hillside.edu", "", 240],
                ["2026-03-10T05:00:00.000Z", "Lakeview", "Sam Ortiz", "sam@lakeview.edu", "", 120],
            ]
        })),
        Some("blocked") => Json(json!([["2026-03-17"], ["blocked dates"]])),
        Some("orders") => Json(json!({"rows": [
            ["2026-03-02", "Hillside", "Ms. Gray", "gray@hillside.edu", "m-1", "Tacos", 12],
        ]})),
        _ => Json(json!({"rows": []})),
    }
}

async fn actions_api(Json(body): Json<Value>) -> Json<Value> {
    match body["action"].as_str() {
        Some("menu") if body["anchor"] == "2026-03-01" => Json(json!({"rows": [
            ["id", "name", "image"],
            ["m-1", "Tacos", "https://menu.example.com/m-1.jpg"],
            ["m-2", "Pasta", ""],
        ]})),
        Some("menu") => Json(json!({"rows": []})),
        Some("order") if body["quantity"].as_u64() > Some(500) => {
            Json(json!({"ok": false, "message": "quantity too large"}))
        }
        Some("order") => Json(json!({"ok": true})),
        Some("toggle_block") => Json(json!({"ok": true, "blocked": true})),
        Some("profile") => Json(json!({
            "bookings": [["2026-03-02", body["school"], "Ada Park", "ada@hillside.edu"]],
            "orders": [],
        })),
        _ => Json(json!({"ok": false})),
    }
}

async fn spawn(app: Router) -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move { axum::serve(listener, app).await });

    Ok(format!("http://{addr}/exec"))
}

async fn client() -> anyhow::Result<SheetClient> {
    let url = spawn(Router::new().route("/exec", get(bookings_api).post(actions_api))).await?;

    Ok(SheetClient::new(&url, Duration::from_secs(5))?)
}

fn order(quantity: u32) -> NewOrder {
    NewOrder {
        date: "2026-03-02".to_owned(),
        school: "Hillside".to_owned(),
        teacher: "Ms. Gray".to_owned(),
        email: "gray@hillside.edu".to_owned(),
        meal_id: "m-1".to_owned(),
        meal_name: "Tacos".to_owned(),
        quantity,
        notes: None,
        idempotency_key: "order:gray@hillside.edu:2026-03-02".to_owned(),
    }
}

#[tokio::test]
async fn test_taken_dates_merge_bookings_and_blocked() -> anyhow::Result<()> {
    let client = client().await?;

    let mut taken: Vec<_> = client.taken_dates().await?.into_iter().collect();
    taken.sort();

    assert_eq!(taken, vec!["2026-03-02", "2026-03-10", "2026-03-17"]);

    Ok(())
}

#[tokio::test]
async fn test_menu_is_looked_up_by_anchor() -> anyhow::Result<()> {
    let client = client().await?;

    let meals = client.menu(date!(2026 - 03 - 01)).await?;
    assert_eq!(meals.len(), 2);
    assert_eq!(meals[0].name, "Tacos");
    assert_eq!(meals[1].image_url, None);

    assert!(client.menu(date!(2026 - 02 - 22)).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_rejected_order_surfaces_message() -> anyhow::Result<()> {
    let client = client().await?;

    client.submit_order(&order(20)).await?;

    match client.submit_order(&order(900)).await {
        Err(SheetError::Rejected { action, message }) => {
            assert_eq!(action, "order");
            assert_eq!(message, "quantity too large");
        }
        other => panic!("unexpected result {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_profile_and_toggle() -> anyhow::Result<()> {
    let client = client().await?;

    let profile = client.profile("Hillside").await?;
    assert_eq!(profile.bookings.len(), 1);
    assert_eq!(profile.bookings[0].school, "Hillside");
    assert!(profile.orders.is_empty());

    assert!(client.toggle_block(date!(2026 - 03 - 03)).await?);

    Ok(())
}

#[tokio::test]
async fn test_slow_sheet_times_out() -> anyhow::Result<()> {
    let url = spawn(Router::new().route(
        "/exec",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({"rows": []}))
        }),
    ))
    .await?;
    let client = SheetClient::new(&url, Duration::from_millis(200))?;

    match client.bookings().await {
        Err(SheetError::Http(err)) => assert!(err.is_timeout()),
        other => panic!("unexpected result {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_unreachable_sheet_is_an_http_error() -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let client = SheetClient::new(&format!("http://{addr}/exec"), Duration::from_secs(1))?;
    assert!(matches!(client.orders().await, Err(SheetError::Http(_))));

    Ok(())
}
