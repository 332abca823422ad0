//! # Wallet Signers
//!
//! Local secp256k1 signers and the scoped credential sources they are built from.
//!
//! ```text
//! CredentialSource (trait)
//!   ├── EnvCredentialSource       - comma-separated keys in an environment variable
//!   ├── FileCredentialSource      - one key per line in a file
//!   └── InMemoryCredentialSource  - keys held by the caller
//! ```
//!
//! A source never hands out more than one key at a time. The key string is wrapped in
//! `Zeroizing` and wiped as soon as the signer has been derived from it.

mod credentials;
pub use credentials::*;

mod local_signer;
pub use local_signer::*;
