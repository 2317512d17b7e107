pub mod metrics;
pub mod panic;
pub mod tracing;

pub use self::metrics::{UNMATCHED_ENDPOINT, metrics_middleware};
pub use self::panic::panic_response;
pub use self::tracing::{REQUEST_ID_HEADER, make_request_span, request_id_middleware};
