use std::future::{ready, Ready};
use std::sync::Arc;

use actix_web::dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use tracing::{debug, info_span, warn, Instrument};

use crate::common::{generate_request_id, IdGenerator, RequestId, X_REQUEST_ID};

/// Middleware that injects a request id into the headers and extensions of each request.
///
/// The id is also carried by the span wrapping the request, so every log line
/// emitted while handling it can be correlated.
#[derive(Clone, Default)]
pub struct RequestIdentifier {
    generator: Option<IdGenerator>,
}

impl RequestIdentifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce ids with a caller-supplied generator instead of the built-in token.
    pub fn with_generator<F>(generator: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self {
            generator: Some(Arc::new(generator)),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestIdentifier
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestIdentifierMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestIdentifierMiddleware {
            service,
            generator: self.generator.clone(),
        }))
    }
}

pub struct RequestIdentifierMiddleware<S> {
    service: S,
    generator: Option<IdGenerator>,
}

impl<S, B> Service<ServiceRequest> for RequestIdentifierMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let request_id = match &self.generator {
            Some(generate) => generate(),
            None => generate_request_id(),
        };

        // Mirror the id into the inbound headers so later middleware and
        // handlers can read it from either place.
        match HeaderValue::from_str(&request_id) {
            Ok(value) => {
                req.headers_mut()
                    .insert(HeaderName::from_static(X_REQUEST_ID), value);
            }
            Err(_) => warn!(
                "request id {:?} is not a valid header value, header not set",
                request_id
            ),
        }
        req.extensions_mut().insert(RequestId(request_id.clone()));

        let span = info_span!("http", request_id = %request_id);
        span.in_scope(|| debug!("{} {}", req.method(), req.path()));

        let fut = self.service.call(req);
        Box::pin(fut.instrument(span))
    }
}

/// Returns the request id stored in the request's extensions, if present.
///
/// Empty string when the request never went through [`RequestIdentifier`].
pub fn request_id_from_extensions(req: &HttpRequest) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default()
}

/// Returns the request id from the request headers, if present.
pub fn request_id_from_headers(req: &HttpRequest) -> String {
    req.headers()
        .get(X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_default()
}

impl FromRequest for RequestId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(RequestId(request_id_from_extensions(req))))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{test, web, App, HttpRequest};

    use super::*;
    use crate::common::TOKEN_LEN;

    async fn echo_ids(req: HttpRequest) -> String {
        format!(
            "{}|{}",
            request_id_from_extensions(&req),
            request_id_from_headers(&req)
        )
    }

    #[actix_web::test]
    async fn test_default_generator_sets_both_places() {
        let app = test::init_service(
            App::new()
                .wrap(RequestIdentifier::new())
                .route("/", web::get().to(echo_ids)),
        )
        .await;

        let body = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request()).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        let (from_extensions, from_headers) = body.split_once('|').unwrap();

        assert_eq!(from_extensions, from_headers);
        assert_eq!(from_extensions.len(), TOKEN_LEN);
    }

    #[actix_web::test]
    async fn test_custom_generator_is_used() {
        let app = test::init_service(
            App::new()
                .wrap(RequestIdentifier::with_generator(|| "fixed-id".to_string()))
                .route("/", web::get().to(echo_ids)),
        )
        .await;

        let body = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(&body[..], b"fixed-id|fixed-id");
    }

    #[actix_web::test]
    async fn test_missing_id_reads_as_empty_string() {
        let app =
            test::init_service(App::new().route("/", web::get().to(echo_ids))).await;

        let body = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(&body[..], b"|");
    }

    #[actix_web::test]
    async fn test_invalid_generator_output_skips_header() {
        let app = test::init_service(
            App::new()
                .wrap(RequestIdentifier::with_generator(|| "bad\nid".to_string()))
                .route("/", web::get().to(echo_ids)),
        )
        .await;

        let body = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(&body[..], b"bad\nid|");
    }

    #[actix_web::test]
    async fn test_extractor_reads_extensions() {
        async fn handler(request_id: RequestId) -> String {
            request_id.0
        }

        let app = test::init_service(
            App::new()
                .wrap(RequestIdentifier::with_generator(|| "typed-id".to_string()))
                .route("/", web::get().to(handler)),
        )
        .await;

        let body = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(&body[..], b"typed-id");
    }
}
