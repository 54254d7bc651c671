pub mod assignment;
pub mod credential;
pub mod database;
pub mod k8s;
pub mod security;

pub use assignment::{AssignmentSettings, KubeAssignmentService};
pub use credential::DevKubeconfigAssembler;
pub use database::{
    DatabaseManager, PoolSettings, SeaOrmClusterRegistry, SeaOrmSpaceAssignmentStore, SeaOrmUserStore,
};
pub use k8s::{KubeClusterAccessClient, KubeClusterHandle, KubeSettings, ReviewAttributes};
pub use security::JwtService;
