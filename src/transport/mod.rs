//! HTTP transport shared by the address fetcher and the notifier.
//!
//! This module provides:
//! - Request/response value types ([`HttpRequest`], [`HttpResponse`])
//! - The client abstraction ([`HttpClient`])
//! - The production client ([`ReqwestClient`])

mod client;
mod error;
mod request;


pub use client::{ReqwestClient, USER_AGENT};
pub use error::HttpError;
pub use request::{HttpClient, HttpRequest, HttpResponse};
