mod routes;
mod server;

pub use routes::{get_app_health, get_request_id};
pub use server::create_http_server;
