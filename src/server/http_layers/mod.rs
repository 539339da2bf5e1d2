mod requests_logging;

pub use requests_logging::{endpoint_label, log_requests, RequestsLoggingLevel};
