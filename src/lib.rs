pub mod config;
pub mod controller;
pub mod handlers;
pub mod observability;
pub mod package;
pub mod queue;
pub mod store;
pub mod summary;
