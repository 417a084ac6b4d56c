mod access_log;
mod identifier;

pub use access_log::{default_format, AccessLog, AccessRecord};
pub use identifier::{request_id_from_extensions, request_id_from_headers, RequestIdentifier};
