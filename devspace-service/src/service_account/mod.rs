pub mod aggregator;
pub mod error;
pub mod outcome;
pub mod service_account_service;
pub mod space_index;

#[cfg(test)]
mod tests;

pub use aggregator::{AggregatorSettings, AuthorizationAggregator};
pub use error::ServiceAccountError;
pub use outcome::{ClusterProbeOutcome, ClusterProbeReport, ProbeStage};
pub use service_account_service::{DefaultServiceAccountService, ServiceAccountService};
pub use space_index::SpaceIndex;
