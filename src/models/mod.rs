//! Data structures shared by the core and the reference host.

pub mod content;
pub mod credential;
pub mod integration;
pub mod site_config;
pub mod user;
