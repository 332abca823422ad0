//! Repeated Uniswap V2 style swaps across a set of wallets.
//!
//! The binary reads a [`config::RunnerConfig`] from the environment and hands it to a
//! [`domain::BatchRunner`]; everything else lives in the library so it can be tested
//! against a mocked chain.

pub mod config;
pub mod constants;
pub mod domain;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;
