pub mod agent;
pub mod api;
