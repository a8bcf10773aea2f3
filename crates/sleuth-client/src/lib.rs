//! Sleuth Client Library
//!
//! Typed access to the Sleuth deployment-tracking GraphQL API:
//! - `transport`: authenticated GraphQL-over-HTTP with error classification
//! - `model`: domain records and mutation input shapes
//! - `api`: the backend-agnostic `SleuthApi` trait
//! - `client`: the real GraphQL-backed implementation
//! - `fakes`: an in-memory implementation for tests

mod api;
mod client;
mod error;
pub mod fakes;
pub mod model;
mod transport;

pub use api::SleuthApi;
pub use client::SleuthClient;
pub use error::{ApiError, ApiResult};
pub use transport::GraphQlTransport;
