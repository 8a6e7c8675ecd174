//! HTTP middleware shared by the service.

pub mod request_context;

pub use request_context::{request_context_middleware, RequestId, REQUEST_ID_HEADER};
