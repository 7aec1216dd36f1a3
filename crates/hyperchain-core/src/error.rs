//! Error types for Hyperchain bridge operations

use thiserror::Error;

/// Result type alias for Hyperchain operations
pub type Result<T> = std::result::Result<T, HyperchainError>;

/// Errors reported by the host token ledger
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Account does not hold enough of the denomination
    #[error("Insufficient balance: {address} has {available}{denom}, needs {required}{denom}")]
    InsufficientBalance {
        address: String,
        denom: String,
        available: u128,
        required: u128,
    },

    /// Coin is malformed or zero
    #[error("Invalid coin: {0}")]
    InvalidCoin(String),

    /// Module escrow holds less than it owes
    #[error("Escrow shortfall for {denom}: holds {available}, owes {required}")]
    EscrowShortfall {
        denom: String,
        available: u128,
        required: u128,
    },
}

/// Errors that can occur in bridge module operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HyperchainError {
    // === Lookup Failures ===
    /// Bridge does not exist
    #[error("Bridge not found: {0}")]
    BridgeNotFound(String),

    /// Bridge transfer does not exist
    #[error("Transfer not found: {0}")]
    TransferNotFound(String),

    /// Chain is not registered with the hyperchain registry
    #[error("Chain not found: {0}")]
    ChainNotFound(String),

    /// Permission record does not exist
    #[error("Permission not found: {chain_id}/{address}/{permission_type}")]
    PermissionNotFound {
        chain_id: String,
        address: String,
        permission_type: String,
    },

    /// Relayer is not registered on the bridge
    #[error("Relayer {relayer} is not registered for bridge {bridge_id}")]
    RelayerNotFound { bridge_id: String, relayer: String },

    // === Precondition Failures ===
    /// Bridge is paused or inactive
    #[error("Bridge {bridge_id} is not active, current status: {status}")]
    BridgeNotActive { bridge_id: String, status: String },

    /// Transfer already reached a terminal state
    #[error("Transfer {transfer_id} is not pending, current status: {status}")]
    TransferNotPending { transfer_id: String, status: String },

    /// Denomination not in the bridge's supported set
    #[error("Token {denom} is not supported by bridge {bridge_id}")]
    UnsupportedToken { bridge_id: String, denom: String },

    /// Zero or otherwise unusable amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Malformed account identifier
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Malformed or inconsistent argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Relayer already approved this transfer
    #[error("Relayer {relayer} has already approved transfer {transfer_id}")]
    AlreadyApproved { transfer_id: String, relayer: String },

    /// A transfer with the same replay key exists
    #[error("Duplicate transfer: bridge {bridge_id} already has source tx {source_tx_id}")]
    DuplicateTransfer {
        bridge_id: String,
        source_tx_id: String,
    },

    /// Relayer already registered on the bridge
    #[error("Relayer {relayer} is already registered for bridge {bridge_id}")]
    RelayerAlreadyExists { bridge_id: String, relayer: String },

    /// Transfer belongs to a different bridge
    #[error("Transfer {transfer_id} belongs to bridge {actual}, not {expected}")]
    BridgeMismatch {
        transfer_id: String,
        expected: String,
        actual: String,
    },

    // === Authorization Failures ===
    /// Caller does not satisfy the guard
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // === Capacity Failures ===
    /// Per-chain cap reached
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Deposit below the configured minimum
    #[error("Insufficient deposit: need {required}, got {provided}")]
    InsufficientDeposit { required: String, provided: String },

    /// Stake below the configured minimum
    #[error("Insufficient stake: need {required}, got {provided}")]
    InsufficientStake { required: String, provided: String },

    // === External Failures ===
    /// Propagated host ledger error
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Record encoding error
    #[error("Codec error: {0}")]
    Codec(String),
}

impl HyperchainError {
    /// Stable numeric code reported to the host alongside the message
    pub fn code(&self) -> u32 {
        match self {
            Self::BridgeNotFound(_) => 2001,
            Self::TransferNotFound(_) => 2002,
            Self::ChainNotFound(_) => 2003,
            Self::PermissionNotFound { .. } => 2004,
            Self::RelayerNotFound { .. } => 2005,
            Self::BridgeNotActive { .. } => 2101,
            Self::TransferNotPending { .. } => 2102,
            Self::UnsupportedToken { .. } => 2103,
            Self::InvalidAmount(_) => 2104,
            Self::InvalidAddress(_) => 2105,
            Self::InvalidArgument(_) => 2106,
            Self::AlreadyApproved { .. } => 2107,
            Self::DuplicateTransfer { .. } => 2108,
            Self::RelayerAlreadyExists { .. } => 2109,
            Self::BridgeMismatch { .. } => 2110,
            Self::Unauthorized(_) => 2201,
            Self::QuotaExceeded(_) => 2301,
            Self::InsufficientDeposit { .. } => 2302,
            Self::InsufficientStake { .. } => 2303,
            Self::Ledger(_) => 2401,
            Self::Codec(_) => 2403,
        }
    }

    /// Lookup failure (the referenced record does not exist)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::BridgeNotFound(_)
                | Self::TransferNotFound(_)
                | Self::ChainNotFound(_)
                | Self::PermissionNotFound { .. }
                | Self::RelayerNotFound { .. }
        )
    }

    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}
