//! Bridge module records
//!
//! These are the values stored under the prefixes in `keys`. Every record is
//! validated before it is written.

use chrono::{DateTime, Utc};
use hyperchain_core::{Address, ChainId, Coin, HyperchainError, Result};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Bridge lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeStatus {
    /// Accepts initiations and approvals
    Active,
    /// Temporarily halted by the admin
    Paused,
    /// Permanently retired
    Inactive,
}

impl BridgeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Inactive => "inactive",
        }
    }

    /// Allowed admin transitions: Active <-> Paused, either -> Inactive
    pub fn can_transition_to(&self, next: BridgeStatus) -> bool {
        match (self, next) {
            (Self::Inactive, _) => false,
            (current, next) if *current == next => true,
            (Self::Active, _) | (Self::Paused, _) => true,
        }
    }
}

impl fmt::Display for BridgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-directional channel from a source chain to a target chain
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bridge {
    /// Unique bridge identifier
    pub id: String,

    pub source_chain_id: ChainId,

    pub target_chain_id: ChainId,

    pub status: BridgeStatus,

    pub creator: Address,

    /// Only account allowed to mutate the bridge
    pub admin: Address,

    /// Distinct relayer approvals needed to complete a transfer
    pub min_relayers: u64,

    /// Accepted denominations
    pub supported_tokens: BTreeSet<String>,

    /// Registered relayers, in registration order
    pub relayers: IndexSet<Address>,

    #[serde(with = "serde_bytes")]
    pub metadata: Vec<u8>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Bridge {
    pub fn supports(&self, denom: &str) -> bool {
        self.supported_tokens.contains(denom)
    }

    pub fn is_relayer(&self, address: &Address) -> bool {
        self.relayers.contains(address)
    }

    pub fn is_active(&self) -> bool {
        self.status == BridgeStatus::Active
    }

    /// Whether enough relayers are registered for any transfer to complete
    pub fn can_reach_quorum(&self) -> bool {
        self.relayers.len() as u64 >= self.min_relayers
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(invalid("bridge ID cannot be empty"));
        }
        if self.source_chain_id == self.target_chain_id {
            return Err(invalid("source and target chain must differ"));
        }
        if self.min_relayers == 0 {
            return Err(invalid("min relayers cannot be zero"));
        }
        if self.supported_tokens.is_empty() {
            return Err(invalid("supported tokens cannot be empty"));
        }
        Ok(())
    }
}

/// Transfer lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Pending,
    Completed,
    Failed,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value moving across a bridge
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeTransfer {
    pub id: String,

    pub bridge_id: String,

    /// Snapshot of the bridge's chains at initiation
    pub source_chain_id: ChainId,

    pub target_chain_id: ChainId,

    pub sender: Address,

    pub recipient: Address,

    pub amount: Coin,

    pub status: TransferStatus,

    pub created_at: DateTime<Utc>,

    /// Set on the terminal transition
    pub completed_at: Option<DateTime<Utc>>,

    /// Caller correlation token; non-empty values are replay-guarded
    pub source_tx_id: String,

    /// Assigned on completion
    pub target_tx_id: String,

    /// Relayers that approved, in approval order
    pub approvals: Vec<Address>,

    #[serde(with = "serde_bytes")]
    pub metadata: Vec<u8>,
}

impl BridgeTransfer {
    pub fn has_approved(&self, relayer: &Address) -> bool {
        self.approvals.contains(relayer)
    }

    pub fn approval_count(&self) -> u64 {
        self.approvals.len() as u64
    }

    pub fn is_pending(&self) -> bool {
        self.status == TransferStatus::Pending
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(invalid("transfer ID cannot be empty"));
        }
        if self.bridge_id.is_empty() {
            return Err(invalid("bridge ID cannot be empty"));
        }
        if self.is_pending() != self.completed_at.is_none() {
            return Err(invalid("completion time must be set exactly when terminal"));
        }
        if self.status == TransferStatus::Completed && self.target_tx_id.is_empty() {
            return Err(invalid("completed transfer must carry a target tx ID"));
        }
        let mut seen = BTreeSet::new();
        if !self.approvals.iter().all(|a| seen.insert(a)) {
            return Err(invalid("duplicate approval"));
        }
        Ok(())
    }
}

/// Role granted on a chain
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionType {
    Admin,
    Validator,
    Relayer,
    User,
    Read,
    Write,
}

impl PermissionType {
    pub const ALL: [PermissionType; 6] = [
        Self::Admin,
        Self::Validator,
        Self::Relayer,
        Self::User,
        Self::Read,
        Self::Write,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Validator => "validator",
            Self::Relayer => "relayer",
            Self::User => "user",
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for PermissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionType {
    type Err = HyperchainError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                HyperchainError::InvalidArgument(format!("invalid permission type: {}", s))
            })
    }
}

/// Role grant keyed by `(chain_id, address, permission_type)`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub chain_id: ChainId,

    pub address: Address,

    pub permission_type: PermissionType,

    pub granted_at: DateTime<Utc>,

    /// `None` never expires
    pub expires_at: Option<DateTime<Utc>>,

    pub granted_by: Address,

    #[serde(with = "serde_bytes")]
    pub metadata: Vec<u8>,
}

impl Permission {
    /// Expired records stay in the store but carry no authority
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires < now)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(expires) = self.expires_at {
            if expires < self.granted_at {
                return Err(invalid("permission cannot expire before it is granted"));
            }
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> HyperchainError {
    HyperchainError::InvalidArgument(msg.to_string())
}
