pub mod user;
pub mod service_account;

pub use user::User;
pub use service_account::{ClusterAccessResult, NamespaceGrant};
