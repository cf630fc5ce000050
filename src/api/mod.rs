//! HTTP surfaces: the inference service and the web front controller.

mod helpers;
pub mod inference;
pub mod web;

pub use helpers::{bad_request, internal_error, not_found, ApiError, ApiResult};
