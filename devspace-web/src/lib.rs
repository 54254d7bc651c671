pub mod app_state;
pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod response;
pub mod security;

pub use app_state::AppState;
pub use handlers::*;
pub use response::{ApiError, ApiResponse};
pub use security::{auth_middleware, AuthorizeAdmins};
