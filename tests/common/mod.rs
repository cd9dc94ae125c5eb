#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use axum::{
    Json, Router,
    body::Body,
    extract::{Query, State},
    http::{Request, Response, StatusCode, header},
    response::Html,
    routing::get,
};
use http_body_util::BodyExt;
use lunchbook::config::{
    AdminConfig, Config, DatabaseConfig, MenuSiteConfig, ObservabilityConfig, ScheduleConfig,
    ServerConfig, SheetConfig,
};
use lunchbook_schedule::Clock;
use serde_json::{Value, json};
use temp_dir::TempDir;
use time::PrimitiveDateTime;
use tower::ServiceExt;

pub const ADMIN_PASSWORD: &str = "cafeteria";

/// In-process stand-in for the spreadsheet API.
#[derive(Default)]
pub struct FakeSheet {
    pub submitted: Mutex<Vec<Value>>,
    pub blocked: Mutex<HashSet<String>>,
    pub reject_submissions: AtomicBool,
}

impl FakeSheet {
    pub fn submitted(&self, action: &str) -> Vec<Value> {
        self.submitted
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v["action"] == action)
            .cloned()
            .collect()
    }

    pub fn reject(&self, reject: bool) {
        self.reject_submissions.store(reject, Ordering::SeqCst);
    }
}

async fn list(
    State(sheet): State<Arc<FakeSheet>>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    match query.get("action").map(String::as_str) {
        Some("bookings") => Json(json!({"rows": [
            ["Date", "School", "Principal", "Email", "Phone", "Students"],
            ["2026-03-02", "Hillside", "Ada Park", "ada@hillside.edu", "555-0101", 240],
            ["2026-03-10", "Lakeview", "Sam Ortiz", "sam@lakeview.edu", "", 180],
        ]})),
        Some("blocked") => {
            let mut rows = vec![json!(["2026-03-17"])];
            rows.extend(sheet.blocked.lock().unwrap().iter().map(|d| json!([d])));
            Json(json!({ "rows": rows }))
        }
        Some("orders") => Json(json!({"rows": [
            ["2026-03-02", "Hillside", "Ms. Gray", "gray@hillside.edu", "m-1", "Tacos", 12, "no onions"],
            ["2026-03-02", "Hillside", "Mr. Diaz", "diaz@hillside.edu", "m-2", "Pasta", 8],
            ["2026-03-10", "Lakeview", "Ms. Roy", "roy@lakeview.edu", "m-1", "Tacos", 20],
        ]})),
        _ => Json(json!({"rows": []})),
    }
}

async fn act(State(sheet): State<Arc<FakeSheet>>, Json(body): Json<Value>) -> Json<Value> {
    match body["action"].as_str() {
        Some("menu") if body["anchor"] == "2026-03-01" => Json(json!({"rows": [
            ["Meal ID", "Name", "Image"],
            ["m-1", "Tacos", "https://menus.example.com/m-1.jpg"],
            ["m-2", "Pasta", ""],
        ]})),
        Some("menu") => Json(json!({"rows": []})),
        Some("book" | "order" | "publish_menu") => {
            if sheet.reject_submissions.load(Ordering::SeqCst) {
                return Json(json!({"ok": false, "message": "sheet busy"}));
            }

            sheet.submitted.lock().unwrap().push(body);
            Json(json!({"ok": true}))
        }
        Some("toggle_block") => {
            let date = body["date"].as_str().unwrap_or_default().to_owned();
            let mut blocked = sheet.blocked.lock().unwrap();
            let now_blocked = !blocked.remove(&date) && blocked.insert(date);

            Json(json!({"ok": true, "blocked": now_blocked}))
        }
        Some("profile") => Json(json!({
            "bookings": [["2026-03-02", body["school"], "Ada Park", "ada@hillside.edu", "555-0101", 240]],
            "orders": [["2026-03-02", body["school"], "Ms. Gray", "gray@hillside.edu", "m-1", "Tacos", 12]],
        })),
        _ => Json(json!({"ok": false})),
    }
}

async fn menu_page(Query(query): Query<HashMap<String, String>>) -> Result<Html<String>, StatusCode> {
    match query.get("week").map(String::as_str) {
        Some("2026-03-01") => Ok(Html(
            r#"<ul>
                 <li data-meal-id="m-1"><img src="img/m-1.jpg" alt="Tacos"></li>
                 <li data-meal-id="m-2"><span class="meal-name">Pasta Bake</span></li>
               </ul>"#
                .to_owned(),
        )),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn spawn_remote(sheet: Arc<FakeSheet>) -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .route("/exec", get(list).post(act))
        .route("/district/lunch", get(menu_page))
        .with_state(sheet);
    tokio::spawn(async move { axum::serve(listener, app).await });

    Ok(format!("http://{addr}"))
}

pub struct TestApp {
    pub router: Router,
    pub sheet: Arc<FakeSheet>,
    _dir: TempDir,
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> anyhow::Result<Response<Body>> {
        self.send(Request::get(uri).body(Body::empty())?).await
    }

    pub async fn get_as_admin(&self, uri: &str, cookie: &str) -> anyhow::Result<Response<Body>> {
        self.send(
            Request::get(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())?,
        )
        .await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        form: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> anyhow::Result<Response<Body>> {
        let mut request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }

        self.send(request.body(Body::from(serde_urlencoded::to_string(form)?))?)
            .await
    }

    /// Signs in and returns the `Cookie` header value of the admin session.
    pub async fn admin_cookie(&self) -> anyhow::Result<String> {
        let response = self
            .post_form("/admin/login", &[("password", ADMIN_PASSWORD)], None)
            .await?;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .ok_or_else(|| anyhow::anyhow!("no session cookie"))?
            .to_str()?;

        Ok(set_cookie.split(';').next().unwrap_or_default().to_owned())
    }

    async fn send(&self, request: Request<Body>) -> anyhow::Result<Response<Body>> {
        Ok(self.router.clone().oneshot(request).await?)
    }
}

pub async fn body(response: Response<Body>) -> anyhow::Result<String> {
    let bytes = response.into_body().collect().await?.to_bytes();

    Ok(String::from_utf8(bytes.to_vec())?)
}

pub fn config(remote: &str, database_url: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 3000,
        },
        database: DatabaseConfig {
            url: database_url.to_owned(),
            max_connections: 2,
        },
        sheet: SheetConfig {
            url: format!("{remote}/exec"),
            timeout_secs: 5,
        },
        menu_site: MenuSiteConfig {
            base_url: remote.to_owned(),
            menu_path: "/district/lunch".to_owned(),
            timeout_secs: 5,
        },
        schedule: ScheduleConfig::default(),
        admin: AdminConfig {
            password: ADMIN_PASSWORD.to_owned(),
            jwt_secret: "test_secret_key_minimum_32_characters_long".to_owned(),
            session_days: 1,
        },
        observability: ObservabilityConfig::default(),
    }
}

/// Full router against a fake sheet, a fresh ledger and a clock frozen at `now`.
pub async fn spawn_app(now: PrimitiveDateTime) -> anyhow::Result<TestApp> {
    let sheet = Arc::new(FakeSheet::default());
    let remote = spawn_remote(sheet.clone()).await?;

    spawn_app_against(now, &remote, sheet).await
}

/// Same router, but the sheet and menu site point at a port nothing listens on.
pub async fn spawn_offline_app(now: PrimitiveDateTime) -> anyhow::Result<TestApp> {
    spawn_app_against(now, "http://127.0.0.1:1", Arc::default()).await
}

async fn spawn_app_against(
    now: PrimitiveDateTime,
    remote: &str,
    sheet: Arc<FakeSheet>,
) -> anyhow::Result<TestApp> {
    let dir = TempDir::new()?;
    let url = format!("sqlite:{}", dir.child("ledger.db").display());
    lunchbook::db::migrate(&url).await?;

    let write_pool = lunchbook::db::create_write_pool(&url).await?;
    let read_pool = lunchbook::db::create_read_pool(&url, 2).await?;

    let config = config(remote, &url);
    let clock = Clock::new("UTC", config.schedule.cutoff_hour).fixed(now);
    let state = lunchbook::AppState::new(config, read_pool, write_pool)?.with_clock(clock);

    Ok(TestApp {
        router: lunchbook::routes::router(state),
        sheet,
        _dir: dir,
    })
}
