//! RPC client constants

/// HTTP timeout applied to every JSON-RPC request (in seconds)
pub const DEFAULT_RPC_TIMEOUT_SECONDS: u64 = 30;

/// Number of retries for read-only RPC calls on transient failures
pub const DEFAULT_RPC_MAX_RETRIES: u32 = 3;

/// Base delay of the exponential backoff between read retries (in milliseconds)
pub const DEFAULT_RPC_RETRY_BASE_DELAY_MS: u64 = 250;

/// Upper bound for a single backoff delay (in milliseconds)
pub const DEFAULT_RPC_RETRY_MAX_DELAY_MS: u64 = 4_000;

/// Maximum time to wait for a transaction receipt (in seconds). Zero disables the ceiling.
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECONDS: u64 = 180;

/// Interval between receipt polls (in milliseconds)
pub const DEFAULT_CONFIRMATION_POLL_INTERVAL_MS: u64 = 2_000;
