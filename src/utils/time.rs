use alloy::primitives::U256;
use chrono::Utc;

/// Router deadline: current Unix time plus `horizon_seconds`.
///
/// A negative or zero horizon yields a deadline that is already due, which the router rejects.
pub fn deadline_from_now(horizon_seconds: i64) -> U256 {
    let deadline = Utc::now().timestamp().saturating_add(horizon_seconds);
    U256::from(deadline.max(0) as u64)
}
