//! Core logic: attribution, credential lifecycle, stats, and the host seam.

pub mod admin;
pub mod attribution;
pub mod credentials;
pub mod events;
pub mod file_lock;
pub mod flash;
pub mod nonce;
pub mod paths;
pub mod ports;
pub mod request;
pub mod site_file;
pub mod site_store;
pub mod stats;
