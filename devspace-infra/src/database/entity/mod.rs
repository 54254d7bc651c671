pub mod cluster;
pub mod dev_space;
pub mod user;
