//! # Domain Module
//!
//! Core swap logic:
//!
//! * Amount conversion between human and base units
//! * Allowance and balance checks
//! * Router path resolution
//! * Single-attempt execution and the per-wallet batch loop

pub mod swap;
pub use swap::*;
