mod common;

use axum::http::{StatusCode, header};
use common::{body, spawn_app};
use time::macros::datetime;

const NOW: time::PrimitiveDateTime = datetime!(2026-02-20 09:00);

#[tokio::test]
async fn test_admin_requires_session() -> anyhow::Result<()> {
    let app = spawn_app(NOW).await?;

    for uri in ["/admin", "/admin/export.csv", "/admin/picklist", "/admin/schools/Hillside"] {
        let response = app.get(uri).await?;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(response.headers()[header::LOCATION], "/admin/login");
    }

    let response = app
        .get_as_admin("/admin", "admin_token=forged.token.value")
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    Ok(())
}

#[tokio::test]
async fn test_login_with_wrong_password() -> anyhow::Result<()> {
    let app = spawn_app(NOW).await?;

    let response = app
        .post_form("/admin/login", &[("password", "lasagna")], None)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    Ok(())
}

#[tokio::test]
async fn test_dashboard_lists_upcoming_deliveries() -> anyhow::Result<()> {
    let app = spawn_app(NOW).await?;
    let cookie = app.admin_cookie().await?;

    let response = app.get_as_admin("/admin?m=3&y=2026", &cookie).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body(response).await?;
    assert!(html.contains("/admin/schools/Hillside"));
    assert!(html.contains("Lakeview"));
    assert!(html.contains("/admin/picklist?date=2026-03-02"));
    assert!(html.contains("/admin/block/2026-03-03"));
    assert!(!html.contains("/admin/block/2026-03-02"));
    assert!(html.contains("<strong>40</strong>"));

    Ok(())
}

#[tokio::test]
async fn test_csv_export_and_picklist() -> anyhow::Result<()> {
    let app = spawn_app(NOW).await?;
    let cookie = app.admin_cookie().await?;

    let response = app
        .get_as_admin("/admin/export.csv?date=2026-03-02", &cookie)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"orders-2026-03-02.csv\""
    );

    let csv = body(response).await?;
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Date,School,Teacher,Email,Meal ID,Meal,Quantity,Notes");
    assert_eq!(
        lines[1],
        "2026-03-02,Hillside,Ms. Gray,gray@hillside.edu,m-1,Tacos,12,no onions"
    );

    let response = app
        .get_as_admin("/admin/export.csv?date=tomorrow", &cookie)
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let html = body(
        app.get_as_admin("/admin/picklist?date=2026-03-02", &cookie)
            .await?,
    )
    .await?;
    assert!(html.contains("Picklist for Monday, Mar 02"));
    assert!(html.contains("Ms. Gray: no onions"));

    Ok(())
}

#[tokio::test]
async fn test_block_toggle_round_trip() -> anyhow::Result<()> {
    let app = spawn_app(NOW).await?;
    let cookie = app.admin_cookie().await?;

    let response = app
        .post_form("/admin/block/2026-03-04", &[], Some(&cookie))
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/admin?m=3&y=2026&notice=blocked"
    );

    let html = body(app.get("/?m=3&y=2026").await?).await?;
    assert!(!html.contains("/book?date=2026-03-04"));

    let response = app
        .post_form("/admin/block/2026-03-04", &[], Some(&cookie))
        .await?;
    assert_eq!(
        response.headers()[header::LOCATION],
        "/admin?m=3&y=2026&notice=unblocked"
    );

    let html = body(
        app.get_as_admin("/admin?m=3&y=2026&notice=unblocked", &cookie)
            .await?,
    )
    .await?;
    assert!(html.contains("Date reopened"));

    Ok(())
}

#[tokio::test]
async fn test_harvest_publishes_menu() -> anyhow::Result<()> {
    let app = spawn_app(NOW).await?;
    let cookie = app.admin_cookie().await?;

    let response = app
        .post_form("/admin/harvest?date=2026-03-03", &[], Some(&cookie))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body(response).await?.contains("Pasta Bake"));

    let published = app.sheet.submitted("publish_menu");
    assert_eq!(published.len(), 1);
    assert_eq!(published[0]["anchor"], "2026-03-01");
    assert_eq!(published[0]["meals"][0]["id"], "m-1");

    let response = app
        .post_form("/admin/harvest?date=2026-03-09", &[], Some(&cookie))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(
        body(response)
            .await?
            .contains("Could not fetch the menu for this week")
    );

    Ok(())
}

#[tokio::test]
async fn test_school_profile() -> anyhow::Result<()> {
    let app = spawn_app(NOW).await?;
    let cookie = app.admin_cookie().await?;

    let response = app
        .get_as_admin("/admin/schools/Hillside%20Elementary", &cookie)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body(response).await?;
    assert!(html.contains("Hillside Elementary"));
    assert!(html.contains("ada@hillside.edu"));
    assert!(html.contains("Monday, Mar 02"));

    Ok(())
}

#[tokio::test]
async fn test_logout_clears_session() -> anyhow::Result<()> {
    let app = spawn_app(NOW).await?;
    let cookie = app.admin_cookie().await?;

    let response = app.get_as_admin("/admin/logout", &cookie).await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let set_cookie = response.headers()[header::SET_COOKIE].to_str()?;
    assert!(set_cookie.starts_with("admin_token="));
    assert!(set_cookie.contains("Max-Age=0"));

    Ok(())
}
