mod amount;
pub use amount::*;

mod config;
pub use config::*;

mod signer;
pub use signer::*;

mod swap;
pub use swap::*;
