use std::collections::HashSet;
use std::future::{ready, Ready};
use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::USER_AGENT;
use actix_web::http::{Method, StatusCode, Version};
use actix_web::Error;
use chrono::{DateTime, SecondsFormat, Utc};
use futures::future::LocalBoxFuture;
use tracing::info;

use crate::middleware::identifier::request_id_from_headers;

type Formatter = dyn Fn(&AccessRecord) -> String + Send + Sync;

/// One completed request, as handed to the access log formatter.
pub struct AccessRecord {
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
    pub client_ip: String,
    pub method: Method,
    pub path: String,
    pub version: Version,
    pub status: StatusCode,
    pub latency: Duration,
    pub user_agent: String,
    /// Error message when the inner service failed.
    pub error: Option<String>,
}

/// Default line layout: timestamp, request id, client ip, request line,
/// status, latency, user agent.
pub fn default_format(record: &AccessRecord) -> String {
    let mut line = format!(
        "{} [{}] - [{}] \"{} {} {:?} {} {:?}\" {}",
        record.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        record.request_id,
        record.client_ip,
        record.method,
        record.path,
        record.version,
        record.status.as_u16(),
        record.latency,
        record.user_agent,
    );
    if let Some(error) = &record.error {
        line.push(' ');
        line.push_str(error);
    }
    line
}

/// Middleware that emits one formatted line per completed request.
///
/// Reads the id off the request headers, so it picks up whatever the
/// identifier middleware assigned before the request reached it.
pub struct AccessLog {
    skip_paths: HashSet<String>,
    formatter: Option<Arc<Formatter>>,
}

impl AccessLog {
    pub fn new() -> Self {
        Self {
            skip_paths: HashSet::new(),
            formatter: None,
        }
    }

    /// Exact-match request paths for which no line is emitted.
    pub fn skip_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.skip_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the default line layout with a caller-supplied one.
    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&AccessRecord) -> String + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(formatter));
        self
    }
}

impl Default for AccessLog {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B> Transform<S, ServiceRequest> for AccessLog
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AccessLogMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessLogMiddleware {
            service,
            skip_paths: self.skip_paths.clone(),
            formatter: self.formatter.clone(),
        }))
    }
}

pub struct AccessLogMiddleware<S> {
    service: S,
    skip_paths: HashSet<String>,
    formatter: Option<Arc<Formatter>>,
}

impl<S, B> Service<ServiceRequest> for AccessLogMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if self.skip_paths.contains(req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let started = Instant::now();
        let timestamp = Utc::now();
        let request_id = request_id_from_headers(req.request());
        let client_ip = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("-")
            .to_owned();
        let method = req.method().clone();
        let path = req.path().to_owned();
        let version = req.version();
        let user_agent = req
            .headers()
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        let formatter = self.formatter.clone();

        let fut = self.service.call(req);
        Box::pin(async move {
            let outcome = fut.await;
            let (status, error) = match &outcome {
                Ok(response) => (response.status(), None),
                Err(err) => (err.as_response_error().status_code(), Some(err.to_string())),
            };

            let record = AccessRecord {
                timestamp,
                request_id,
                client_ip,
                method,
                path,
                version,
                status,
                latency: started.elapsed(),
                user_agent,
                error,
            };
            let line = match &formatter {
                Some(format) => format(&record),
                None => default_format(&record),
            };
            info!(target: "access", "{}", line);

            outcome
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use actix_web::{test::{self}, web, App};

    use super::*;
    use crate::common::TOKEN_LEN;
    use crate::middleware::RequestIdentifier;

    fn sample_record() -> AccessRecord {
        AccessRecord {
            timestamp: Utc::now(),
            request_id: "abcd1234abcd1234".to_string(),
            client_ip: "10.0.0.7".to_string(),
            method: Method::GET,
            path: "/orders".to_string(),
            version: Version::HTTP_11,
            status: StatusCode::OK,
            latency: Duration::from_millis(12),
            user_agent: "curl/8.5.0".to_string(),
            error: None,
        }
    }

    #[test]
    fn test_default_format_contains_request_line() {
        let line = default_format(&sample_record());
        assert!(line.contains("[abcd1234abcd1234]"));
        assert!(line.contains("[10.0.0.7]"));
        assert!(line.contains("\"GET /orders HTTP/1.1 200"));
        assert!(line.contains("curl/8.5.0"));
    }

    #[test]
    fn test_default_format_appends_error_message() {
        let mut record = sample_record();
        record.status = StatusCode::INTERNAL_SERVER_ERROR;
        record.error = Some("boom".to_string());
        let line = default_format(&record);
        assert!(line.contains("500"));
        assert!(line.ends_with("boom"));
    }

    #[actix_web::test]
    async fn test_skipped_paths_produce_no_line() {
        let lines: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();

        let app = test::init_service(
            App::new()
                .wrap(
                    AccessLog::new()
                        .skip_paths(["/health"])
                        .with_formatter(move |record| {
                            let line = default_format(record);
                            sink.lock().unwrap().push(line.clone());
                            line
                        }),
                )
                .wrap(RequestIdentifier::new())
                .route("/health", web::get().to(|| async { "healthy" }))
                .route("/work", web::get().to(|| async { "done" })),
        )
        .await;

        test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        test::call_service(&app, test::TestRequest::get().uri("/work").to_request()).await;

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("/work"));

        // The identifier middleware runs first, so the line carries its token.
        let request_id = lines[0]
            .split('[')
            .nth(1)
            .and_then(|rest| rest.split(']').next())
            .unwrap();
        assert_eq!(request_id.len(), TOKEN_LEN);
    }
}
