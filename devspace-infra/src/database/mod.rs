pub mod entity;
pub mod manager;
pub mod repository;


pub use manager::{DatabaseManager, PoolSettings};
pub use repository::{SeaOrmClusterRegistry, SeaOrmSpaceAssignmentStore, SeaOrmUserStore};
