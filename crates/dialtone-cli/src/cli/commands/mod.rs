pub mod auth;
pub mod config;
pub mod dashboard;
