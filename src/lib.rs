pub mod configs;
pub mod middleware;
pub mod server;
pub mod startup;
pub mod telemetry;
pub mod common;
mod context;
pub use common::{generate_request_id, uuid_request_id, IdGenerator, RequestId, X_REQUEST_ID};
pub use context::{Environment, ParseEnvironmentError};
pub use middleware::{
    default_format, request_id_from_extensions, request_id_from_headers, AccessLog, AccessRecord,
    RequestIdentifier,
};
