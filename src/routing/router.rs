//! Route table for the fixture endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use crate::http::handlers::{basic_409, basic_get, basic_post, done, not_found};
use crate::lifecycle::Shutdown;

/// Build the route table. `shutdown` is the handle `/done` fires.
pub fn fixture_routes(shutdown: Shutdown) -> Router {
    Router::new()
        .route("/done", get(done).fallback(not_found))
        .route("/basic_get", get(basic_get).fallback(not_found))
        .route("/basic_post", post(basic_post).fallback(not_found))
        .route("/basic_409", post(basic_409).fallback(not_found))
        .fallback(not_found)
        .with_state(shutdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn call(router: Router, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn basic_get_returns_success() {
        let (status, body) = call(fixture_routes(Shutdown::new()), "GET", "/basic_get").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"success");
    }

    #[tokio::test]
    async fn basic_409_is_empty_conflict() {
        let (status, body) = call(fixture_routes(Shutdown::new()), "POST", "/basic_409").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn done_responds_empty_and_triggers() {
        let shutdown = Shutdown::new();
        let (status, body) = call(fixture_routes(shutdown.clone()), "GET", "/done").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let (status, body) = call(fixture_routes(Shutdown::new()), "GET", "/nonexistent").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn wrong_method_is_404() {
        let shutdown = Shutdown::new();
        let cases = [
            ("POST", "/basic_get"),
            ("GET", "/basic_post"),
            ("GET", "/basic_409"),
            ("POST", "/done"),
            ("DELETE", "/basic_get"),
        ];
        for (method, uri) in cases {
            let (status, _) = call(fixture_routes(shutdown.clone()), method, uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        }
        assert!(!shutdown.is_triggered(), "POST /done must not shut down");
    }

    #[tokio::test]
    async fn match_is_exact() {
        for uri in ["/basic_get/", "/basic_get/extra", "/BASIC_GET"] {
            let (status, _) = call(fixture_routes(Shutdown::new()), "GET", uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        }
        let (status, _) = call(fixture_routes(Shutdown::new()), "GET", "/basic_get?q=1").await;
        assert_eq!(status, StatusCode::OK);
    }
}
