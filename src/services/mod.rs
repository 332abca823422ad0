//! # Services Module
//!
//! Chain access and wallet signing used by the swap engine.

pub mod provider;
pub use provider::*;

pub mod signer;
pub use signer::*;
