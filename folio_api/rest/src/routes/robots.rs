use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing, Router,
};
use url::Url;

const CACHE_CONTROL: &str = "public, max-age=86400, s-maxage=86400";

pub fn router(site_url: Arc<Url>) -> Router<()> {
    Router::new()
        .route("/robots.txt", routing::get(robots))
        .with_state(site_url)
}

async fn robots(State(site_url): State<Arc<Url>>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, CACHE_CONTROL),
        ],
        render(&site_url),
    )
        .into_response()
}

fn render(site_url: &Url) -> String {
    let sitemap = format!("{}/sitemap.xml", site_url.as_str().trim_end_matches('/'));
    format!(
        "User-agent: *\n\
         Allow: /\n\
         Disallow: /api/\n\
         Disallow: /_next/\n\
         Disallow: /admin/\n\
         \n\
         Sitemap: {sitemap}\n"
    )
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::StatusCode};
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;

    #[test]
    fn render_robots() {
        let url = "https://folio.example/".parse().unwrap();

        assert_eq!(
            render(&url),
            "User-agent: *\nAllow: /\nDisallow: /api/\nDisallow: /_next/\nDisallow: /admin/\n\nSitemap: https://folio.example/sitemap.xml\n"
        );
    }

    #[tokio::test]
    async fn headers() {
        let response = router(Arc::new("https://folio.example".parse().unwrap()))
            .oneshot(
                axum::http::Request::get("/robots.txt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(response.headers()[header::CACHE_CONTROL], CACHE_CONTROL);
    }
}
