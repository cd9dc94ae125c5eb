use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::{CookieJar, Form};
use serde::Deserialize;

use crate::auth::{build_cookie, password_matches, removal_cookie};
use crate::routes::AppState;
use crate::template::{Template, filters};

#[derive(askama::Template)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
}

/// GET /admin/login
pub async fn page(template: Template) -> impl IntoResponse {
    template.render(LoginTemplate { error: None })
}

/// POST /admin/login - trade the admin password for a session cookie.
#[tracing::instrument(skip_all)]
pub async fn action(
    template: Template,
    State(state): State<AppState>,
    jar: CookieJar,
    Form(input): Form<LoginForm>,
) -> impl IntoResponse {
    if !password_matches(&state.config.admin.password, &input.password) {
        tracing::warn!("admin login rejected");

        return template
            .render_status(
                StatusCode::UNAUTHORIZED,
                LoginTemplate {
                    error: Some("Incorrect password.".to_owned()),
                },
            )
            .into_response();
    }

    let cookie = crate::try_page_response!(sync: build_cookie(&state.config.admin, "admin"), template);

    tracing::info!("admin signed in");

    (jar.add(cookie), Redirect::to("/admin")).into_response()
}

/// GET /admin/logout
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (jar.remove(removal_cookie()), Redirect::to("/admin/login"))
}
