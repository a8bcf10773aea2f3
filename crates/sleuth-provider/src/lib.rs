//! Sleuth Provider Core
//!
//! Desired-state reconciliation of Sleuth resources over the GraphQL API:
//! - `resource`: the lifecycle trait and shared adapter policies
//! - `resources`: the seven managed resource types
//! - `registry`: type-erased name-keyed dispatch
//! - `provider`: configuration and construction
//! - `host`: the newline-delimited JSON harness the binary serves
//! - `schema`: declarative attribute schemas
//! - `error`: the provider error taxonomy and host diagnostics

pub mod error;
pub mod host;
pub mod provider;
pub mod registry;
pub mod resource;
pub mod resources;
pub mod schema;

pub use error::{Diagnostic, ProviderError, ProviderResult, Severity};
pub use provider::{ProviderConfig, SleuthProvider, DEFAULT_BASEURL, USER_AGENT};
pub use registry::{DynResource, Registry};
pub use resource::{parse_composite_id, OpContext, ResourceLifecycle};
pub use schema::{AttrType, Attribute, Schema};
