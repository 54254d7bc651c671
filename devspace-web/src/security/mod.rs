pub mod admin;
pub mod middleware;

pub use admin::AuthorizeAdmins;
pub use middleware::{auth_middleware, authenticate};
