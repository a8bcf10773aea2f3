//! Per-resource lifecycle adapters.

pub mod code_change_source;
pub mod environment;
pub mod error_impact_source;
pub mod incident_impact_source;
pub mod metric_impact_source;
pub mod project;
pub mod team;

pub use code_change_source::CodeChangeSourceResource;
pub use environment::EnvironmentResource;
pub use error_impact_source::ErrorImpactSourceResource;
pub use incident_impact_source::IncidentImpactSourceResource;
pub use metric_impact_source::MetricImpactSourceResource;
pub use project::ProjectResource;
pub use team::TeamResource;
