//! Embedded favicons

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "static/"]
struct Assets;

fn serve_asset(name: &str, mime: &'static str) -> Response {
    match Assets::get(name) {
        Some(content) => (
            [
                (header::CONTENT_TYPE, mime),
                (header::CACHE_CONTROL, "public, max-age=86400"),
            ],
            Body::from(content.data.into_owned()),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

pub async fn favicon_ico() -> impl IntoResponse {
    serve_asset("favicon.ico", "image/vnd.microsoft.icon")
}

pub async fn favicon_png() -> impl IntoResponse {
    serve_asset("favicon.png", "image/png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_favicons_are_embedded() {
        let response = favicon_ico().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "image/vnd.microsoft.icon"
        );

        let response = favicon_png().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_missing_asset_is_404() {
        let response = serve_asset("nope.gif", "image/gif");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
