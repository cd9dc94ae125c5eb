use axum::{body::Body, response::Response};

cfg_if::cfg_if! {
    if #[cfg(not(debug_assertions))] {
        use axum::{body::to_bytes, http::header};
        use std::sync::LazyLock;

        static MINIFY_CFG: LazyLock<minify_html::Cfg> = LazyLock::new(|| minify_html::Cfg {
            keep_closing_tags: true,
            keep_html_and_head_opening_tags: true,
            minify_css: true,
            ..Default::default()
        });

        fn is_html(response: &Response<Body>) -> bool {
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .is_some_and(|value| value.starts_with("text/html"))
        }
    }
}

/// Minifies rendered pages in release builds. CSV downloads and assets pass through.
pub async fn minify_html_middleware(response: Response<Body>) -> Response<Body> {
    cfg_if::cfg_if! {
        if #[cfg(not(debug_assertions))] {
            if !is_html(&response) {
                return response;
            }

            let (mut parts, body) = response.into_parts();
            let bytes = match to_bytes(body, usize::MAX).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::error!("failed to buffer page for minification: {err}");
                    return Response::from_parts(parts, Body::empty());
                }
            };

            parts.headers.remove(header::CONTENT_LENGTH);

            return Response::from_parts(parts, Body::from(minify_html::minify(&bytes, &MINIFY_CFG)));
        }
    }

    #[allow(unreachable_code)]
    response
}
