pub mod assignment;
pub mod cluster;
pub mod security;
pub mod store;

pub use assignment::{AssignmentError, AssignmentService};
pub use cluster::{
    ClusterAccessClient, ClusterAccessError, ClusterHandle, CredentialAssembler,
    ServiceAccountInfo, ServiceAccountSecret,
};
pub use security::{AuthenticatedUser, AuthenticationResult};
pub use store::{ClusterRegistry, SpaceAssignmentStore, UserStore};
