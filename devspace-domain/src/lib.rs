pub mod cluster;
pub mod security;
pub mod workload;

pub use cluster::{Cluster, SpaceAssignment, SpaceAssignmentFilter};
pub use security::{ClusterAccessResult, NamespaceGrant, User};
pub use workload::{ControllerVariant, DevModeType, WorkloadKind};
