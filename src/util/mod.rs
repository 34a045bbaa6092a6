//! Secret handling and logging setup.

pub mod logging;
pub mod secret;
