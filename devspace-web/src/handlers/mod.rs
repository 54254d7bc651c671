pub mod health;
pub mod service_account;

pub use health::health_check;
pub use service_account::{authorize, list_authorization};
