//! Utility functions and helpers.

pub mod http;

pub use http::{HttpResponse, HttpTransport, ReqwestTransport};
