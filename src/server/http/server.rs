use crate::configs::{HttpServerConfig, LogConfig};
use crate::middleware::{AccessLog, RequestIdentifier};
use crate::server::http::{get_app_health, get_request_id};
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};

pub async fn create_http_server(
    http_config: &HttpServerConfig,
    log_config: &LogConfig,
) -> Result<Server, std::io::Error> {
    let address = format!("{}:{}", &http_config.host, &http_config.port);
    let skip_paths = log_config.skip_paths.clone();

    // The identifier is registered last so it wraps the access log and runs first.
    let server = HttpServer::new(move || {
        App::new()
            .wrap(AccessLog::new().skip_paths(skip_paths.clone()))
            .wrap(RequestIdentifier::new())
            .route("/health", web::get().to(get_app_health))
            .route("/request-id", web::get().to(get_request_id))
    })
    .bind(address)?
    .run();

    Ok(server)
}
