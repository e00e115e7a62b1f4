//! Raw request body capture.
//!
//! # Responsibilities
//! - Buffer the entire body for every method, path and content type
//! - Expose the exact bytes to handlers through the [`RawBody`] extractor
//! - Over-limit bodies end in 413; truncated bodies end the connection
//!
//! # Design Decisions
//! - Bytes are never transcoded or parsed
//! - The size cap is enforced by `RequestBodyLimitLayer` further out; this
//!   stage only recognizes its error
//! - A truncated body never reaches the router and never gets a status line

use axum::{
    body::{Body, Bytes},
    extract::{FromRequestParts, Request},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures_util::stream;
use http_body_util::LengthLimitError;

/// The request body exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBody(pub Bytes);

impl<S> FromRequestParts<S> for RawBody
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<RawBody>().cloned().ok_or_else(|| {
            tracing::error!("Raw body stage missing from the pipeline");
            StatusCode::INTERNAL_SERVER_ERROR
        })
    }
}

/// Middleware stage: read the body to completion, then continue with it attached.
pub async fn buffer_body(request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => return body_error(&e),
    };

    parts.extensions.insert(RawBody(bytes.clone()));
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn body_error(error: &axum::Error) -> Response {
    if exceeded_limit(error) {
        tracing::warn!(error = %error, "Request body over limit");
        return StatusCode::PAYLOAD_TOO_LARGE.into_response();
    }
    tracing::debug!(error = %error, "Request body read failed, aborting connection");
    abort_connection(error.to_string())
}

/// A response whose body fails before its first frame. hyper gives up on the
/// connection without flushing the head, so the peer sees a reset.
fn abort_connection(reason: String) -> Response {
    let failed = stream::once(std::future::ready(Err::<Bytes, _>(std::io::Error::new(
        std::io::ErrorKind::ConnectionAborted,
        reason,
    ))));
    Response::new(Body::from_stream(failed))
}

fn exceeded_limit(error: &axum::Error) -> bool {
    let mut source = Some(error as &(dyn std::error::Error + 'static));
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::any, Router};
    use tower::ServiceExt;
    use tower_http::limit::RequestBodyLimitLayer;

    async fn report(body: RawBody) -> Bytes {
        body.0
    }

    fn app(limit: usize) -> Router {
        Router::new()
            .route("/", any(report))
            .layer(middleware::from_fn(buffer_body))
            .layer(RequestBodyLimitLayer::new(limit))
    }

    async fn body_bytes(response: Response) -> Bytes {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn exposes_exact_bytes() {
        let request = Request::builder()
            .method("PUT")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(vec![0xffu8, 0x00, b'{']))
            .unwrap();

        let response = app(1024).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(&body_bytes(response).await[..], &[0xffu8, 0x00, b'{'][..]);
    }

    #[tokio::test]
    async fn empty_body_on_get() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = app(1024).oneshot(request).await.unwrap();
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn oversize_body_is_413() {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(vec![b'x'; 64]))
            .unwrap();

        let response = app(16).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn truncated_body_fails_response_body() {
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"only ten b")),
            Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "peer closed before content-length",
            )),
        ];
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-length", "100")
            .body(Body::from_stream(stream::iter(chunks)))
            .unwrap();

        let response = app(1024).oneshot(request).await.unwrap();
        assert!(axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn extractor_without_stage_is_500() {
        let app = Router::new().route("/", any(report));
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
