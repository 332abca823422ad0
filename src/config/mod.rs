//! Runner configuration, read once from the environment at startup.

mod runner_config;
pub use runner_config::*;
