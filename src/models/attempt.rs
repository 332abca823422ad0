//! Per-attempt execution records.

use std::fmt;

use alloy::primitives::{Address, TxHash};
use serde::Serialize;
use strum::Display;

/// Classification of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum FailureKind {
    InvalidAmount,
    InvalidIntent,
    InsufficientBalance,
    ApprovalRejected,
    ApprovalTimeout,
    SubmitOrConfirmError,
    SwapTimeout,
    ProviderUnavailable,
}

/// Result of making sure the router may spend the input token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ApprovalOutcome {
    AlreadySufficient,
    Approved { tx_hash: TxHash, block_number: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SwapOutcome {
    Pending,
    Approved {
        tx_hash: TxHash,
        block_number: u64,
    },
    Submitted {
        tx_hash: TxHash,
    },
    Confirmed {
        tx_hash: TxHash,
        block_number: u64,
    },
    Failed {
        kind: FailureKind,
        message: String,
    },
    /// The attempt was interrupted; a submitted transaction may still be included later.
    Unknown {
        tx_hash: Option<TxHash>,
    },
}

impl SwapOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SwapOutcome::Confirmed { .. } | SwapOutcome::Failed { .. } | SwapOutcome::Unknown { .. }
        )
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            SwapOutcome::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            SwapOutcome::Approved { tx_hash, .. }
            | SwapOutcome::Submitted { tx_hash }
            | SwapOutcome::Confirmed { tx_hash, .. } => Some(*tx_hash),
            SwapOutcome::Unknown { tx_hash } => *tx_hash,
            SwapOutcome::Pending | SwapOutcome::Failed { .. } => None,
        }
    }
}

impl fmt::Display for SwapOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapOutcome::Pending => write!(f, "pending"),
            SwapOutcome::Approved {
                tx_hash,
                block_number,
            } => write!(f, "approved tx={tx_hash} block={block_number}"),
            SwapOutcome::Submitted { tx_hash } => write!(f, "submitted tx={tx_hash}"),
            SwapOutcome::Confirmed {
                tx_hash,
                block_number,
            } => write!(f, "confirmed tx={tx_hash} block={block_number}"),
            SwapOutcome::Failed { kind, message } => write!(f, "failed ({kind}): {message}"),
            SwapOutcome::Unknown { tx_hash: Some(hash) } => write!(f, "unknown tx={hash}"),
            SwapOutcome::Unknown { tx_hash: None } => write!(f, "unknown"),
        }
    }
}

/// One execution of an intent by one wallet.
///
/// `history` keeps every outcome the attempt passed through, in order, so the
/// approval and submission sequence can be inspected after the fact.
#[derive(Debug, Clone, Serialize)]
pub struct SwapAttempt {
    pub wallet: Address,
    /// 1-based attempt number within the wallet's run.
    pub index: u32,
    pub outcome: SwapOutcome,
    pub history: Vec<SwapOutcome>,
}

impl SwapAttempt {
    pub fn new(wallet: Address, index: u32) -> Self {
        Self {
            wallet,
            index,
            outcome: SwapOutcome::Pending,
            history: vec![SwapOutcome::Pending],
        }
    }

    pub fn advance(&mut self, outcome: SwapOutcome) {
        log::debug!(
            "[{}] attempt {} -> {}",
            self.wallet,
            self.index,
            outcome
        );
        self.history.push(outcome.clone());
        self.outcome = outcome;
    }

    pub fn fail(&mut self, kind: FailureKind, message: impl Into<String>) {
        self.advance(SwapOutcome::Failed {
            kind,
            message: message.into(),
        });
    }

    /// Marks an interrupted attempt. A transaction that was already handed to the
    /// network is kept so it can be looked up later.
    pub fn mark_unknown(&mut self) {
        if self.outcome.is_terminal() {
            return;
        }
        let tx_hash = match &self.outcome {
            SwapOutcome::Submitted { tx_hash } => Some(*tx_hash),
            _ => None,
        };
        self.advance(SwapOutcome::Unknown { tx_hash });
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self.outcome, SwapOutcome::Confirmed { .. })
    }

    pub fn reached(&self, predicate: impl Fn(&SwapOutcome) -> bool) -> bool {
        self.history.iter().any(predicate)
    }
}
