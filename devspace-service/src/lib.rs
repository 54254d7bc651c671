pub mod service_account;

pub use service_account::{
    AggregatorSettings, AuthorizationAggregator, ClusterProbeOutcome, ClusterProbeReport,
    DefaultServiceAccountService, ProbeStage, ServiceAccountError, ServiceAccountService,
    SpaceIndex,
};
