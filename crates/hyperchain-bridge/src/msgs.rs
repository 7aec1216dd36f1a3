//! Bridge module messages
//!
//! Every message carries the transaction signer. `validate_basic` runs the
//! stateless checks before a message touches the store; everything that
//! needs state happens in the handlers, in the documented order.

use crate::types::PermissionType;
use hyperchain_core::{Address, ChainId, Coin, HyperchainError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Longest permission grant, in days
pub const MAX_EXPIRATION_DAYS: u64 = 36_500;

/// Longest cancellation reason
pub const MAX_REASON_LEN: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgCreateBridge {
    pub signer: String,
    pub source_chain_id: String,
    pub target_chain_id: String,
    pub min_relayers: u64,
    pub supported_tokens: Vec<String>,
    #[serde(default, with = "serde_bytes")]
    pub metadata: Vec<u8>,
}

/// Partial update; `None` leaves a field unchanged
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgUpdateBridge {
    pub signer: String,
    pub bridge_id: String,
    #[serde(default)]
    pub min_relayers: Option<u64>,
    #[serde(default)]
    pub supported_tokens: Option<Vec<String>>,
    #[serde(default)]
    pub metadata: Option<serde_bytes::ByteBuf>,
    #[serde(default)]
    pub status: Option<crate::types::BridgeStatus>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgAddRelayer {
    pub signer: String,
    pub bridge_id: String,
    pub relayer: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRemoveRelayer {
    pub signer: String,
    pub bridge_id: String,
    pub relayer: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgInitiateTransfer {
    pub signer: String,
    pub bridge_id: String,
    pub recipient: String,
    pub amount: Coin,
    #[serde(default)]
    pub source_tx_id: String,
    #[serde(default, with = "serde_bytes")]
    pub metadata: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgApproveTransfer {
    pub signer: String,
    pub bridge_id: String,
    pub transfer_id: String,
}

/// Admin cancellation of a pending transfer; refunds the sender
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgCancelTransfer {
    pub signer: String,
    pub bridge_id: String,
    pub transfer_id: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgGrantPermission {
    pub signer: String,
    pub chain_id: String,
    pub address: String,
    pub permission_type: PermissionType,
    /// Zero means no expiry
    #[serde(default)]
    pub expiration_days: u64,
    #[serde(default, with = "serde_bytes")]
    pub metadata: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRevokePermission {
    pub signer: String,
    pub chain_id: String,
    pub address: String,
    pub permission_type: PermissionType,
}

/// Every message the module accepts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Msg {
    CreateBridge(MsgCreateBridge),
    UpdateBridge(MsgUpdateBridge),
    AddRelayer(MsgAddRelayer),
    RemoveRelayer(MsgRemoveRelayer),
    InitiateTransfer(MsgInitiateTransfer),
    ApproveTransfer(MsgApproveTransfer),
    CancelTransfer(MsgCancelTransfer),
    GrantPermission(MsgGrantPermission),
    RevokePermission(MsgRevokePermission),
}

impl Msg {
    /// Decode a JSON message; unknown `type` tags are rejected
    ///
    /// The body is read straight from the text, so amounts above `u64::MAX`
    /// survive.
    pub fn from_json(json: &str) -> Result<Self> {
        let tagged: Tagged = serde_json::from_str(json)
            .map_err(|e| invalid(&format!("unrecognized message: {}", e)))?;
        let tag = tagged
            .kind
            .ok_or_else(|| invalid("message is missing its type tag"))?;
        Self::dispatch(&tag, JsonText(json))
    }

    /// Decode an already parsed message
    ///
    /// `serde_json::Value` holds at most 64-bit integers; use [`Msg::from_json`]
    /// for larger amounts.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(mut fields) = value else {
            return Err(invalid("message must be a JSON object"));
        };
        let tag = match fields.remove("type") {
            Some(serde_json::Value::String(tag)) => tag,
            _ => return Err(invalid("message is missing its type tag")),
        };
        Self::dispatch(&tag, serde_json::Value::Object(fields))
    }

    // matched by hand: serde's internally tagged enums buffer the body and lose u128
    fn dispatch(tag: &str, body: impl MsgBody) -> Result<Self> {
        Ok(match tag {
            "create_bridge" => Self::CreateBridge(body.decode()?),
            "update_bridge" => Self::UpdateBridge(body.decode()?),
            "add_relayer" => Self::AddRelayer(body.decode()?),
            "remove_relayer" => Self::RemoveRelayer(body.decode()?),
            "initiate_transfer" => Self::InitiateTransfer(body.decode()?),
            "approve_transfer" => Self::ApproveTransfer(body.decode()?),
            "cancel_transfer" => Self::CancelTransfer(body.decode()?),
            "grant_permission" => Self::GrantPermission(body.decode()?),
            "revoke_permission" => Self::RevokePermission(body.decode()?),
            other => return Err(invalid(&format!("unrecognized message type: {}", other))),
        })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::CreateBridge(_) => "create_bridge",
            Self::UpdateBridge(_) => "update_bridge",
            Self::AddRelayer(_) => "add_relayer",
            Self::RemoveRelayer(_) => "remove_relayer",
            Self::InitiateTransfer(_) => "initiate_transfer",
            Self::ApproveTransfer(_) => "approve_transfer",
            Self::CancelTransfer(_) => "cancel_transfer",
            Self::GrantPermission(_) => "grant_permission",
            Self::RevokePermission(_) => "revoke_permission",
        }
    }

    pub fn signer(&self) -> &str {
        match self {
            Self::CreateBridge(m) => &m.signer,
            Self::UpdateBridge(m) => &m.signer,
            Self::AddRelayer(m) => &m.signer,
            Self::RemoveRelayer(m) => &m.signer,
            Self::InitiateTransfer(m) => &m.signer,
            Self::ApproveTransfer(m) => &m.signer,
            Self::CancelTransfer(m) => &m.signer,
            Self::GrantPermission(m) => &m.signer,
            Self::RevokePermission(m) => &m.signer,
        }
    }

    /// Stateless checks
    pub fn validate_basic(&self) -> Result<()> {
        Address::parse(self.signer())?;

        match self {
            Self::CreateBridge(m) => {
                let source = ChainId::parse(m.source_chain_id.as_str())?;
                let target = ChainId::parse(m.target_chain_id.as_str())?;
                if source == target {
                    return Err(invalid("source and target chain must differ"));
                }
                if m.min_relayers == 0 {
                    return Err(invalid("min relayers must be at least 1"));
                }
                validate_tokens(&m.supported_tokens)
            }
            Self::UpdateBridge(m) => {
                require_id("bridge ID", &m.bridge_id)?;
                if m.min_relayers == Some(0) {
                    return Err(invalid("min relayers must be at least 1"));
                }
                match &m.supported_tokens {
                    Some(tokens) => validate_tokens(tokens),
                    None => Ok(()),
                }
            }
            Self::AddRelayer(MsgAddRelayer {
                bridge_id, relayer, ..
            })
            | Self::RemoveRelayer(MsgRemoveRelayer {
                bridge_id, relayer, ..
            }) => {
                require_id("bridge ID", bridge_id)?;
                Address::parse(relayer.as_str())?;
                Ok(())
            }
            Self::InitiateTransfer(m) => require_id("bridge ID", &m.bridge_id),
            Self::ApproveTransfer(m) => {
                require_id("bridge ID", &m.bridge_id)?;
                require_id("transfer ID", &m.transfer_id)
            }
            Self::CancelTransfer(m) => {
                require_id("bridge ID", &m.bridge_id)?;
                require_id("transfer ID", &m.transfer_id)?;
                if m.reason.len() > MAX_REASON_LEN {
                    return Err(invalid("cancellation reason too long"));
                }
                Ok(())
            }
            Self::GrantPermission(m) => {
                ChainId::parse(m.chain_id.as_str())?;
                Address::parse(m.address.as_str())?;
                if m.expiration_days > MAX_EXPIRATION_DAYS {
                    return Err(invalid("expiration days out of range"));
                }
                Ok(())
            }
            Self::RevokePermission(m) => {
                ChainId::parse(m.chain_id.as_str())?;
                Address::parse(m.address.as_str())?;
                Ok(())
            }
        }
    }
}

/// Handler output
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MsgResponse {
    CreateBridge { bridge_id: String },
    InitiateTransfer { transfer_id: String },
    /// `target_tx_id` is empty until the transfer completes
    ApproveTransfer { target_tx_id: String },
    Empty,
}

impl MsgResponse {
    pub fn bridge_id(&self) -> Option<&str> {
        match self {
            Self::CreateBridge { bridge_id } => Some(bridge_id.as_str()),
            _ => None,
        }
    }

    pub fn transfer_id(&self) -> Option<&str> {
        match self {
            Self::InitiateTransfer { transfer_id } => Some(transfer_id.as_str()),
            _ => None,
        }
    }

    pub fn target_tx_id(&self) -> Option<&str> {
        match self {
            Self::ApproveTransfer { target_tx_id } => Some(target_tx_id.as_str()),
            _ => None,
        }
    }
}

/// Only the tag of a message; other fields are skipped
#[derive(Deserialize)]
struct Tagged {
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Source of a message body
trait MsgBody {
    fn decode<T: DeserializeOwned>(self) -> Result<T>;
}

/// Raw JSON text; the `type` field is ignored by the body structs
struct JsonText<'a>(&'a str);

impl MsgBody for JsonText<'_> {
    fn decode<T: DeserializeOwned>(self) -> Result<T> {
        serde_json::from_str(self.0)
            .map_err(|e| invalid(&format!("unrecognized message: {}", e)))
    }
}

impl MsgBody for serde_json::Value {
    fn decode<T: DeserializeOwned>(self) -> Result<T> {
        serde_json::from_value(self)
            .map_err(|e| invalid(&format!("unrecognized message: {}", e)))
    }
}

fn validate_tokens(tokens: &[String]) -> Result<()> {
    if tokens.is_empty() {
        return Err(invalid("supported tokens cannot be empty"));
    }
    if let Some(bad) = tokens.iter().find(|t| !Coin::is_valid_denom(t)) {
        return Err(invalid(&format!("invalid token denomination: {}", bad)));
    }
    Ok(())
}

fn require_id(what: &str, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(invalid(&format!("{} cannot be empty", what)));
    }
    Ok(())
}

fn invalid(msg: &str) -> HyperchainError {
    HyperchainError::InvalidArgument(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create(source: &str, target: &str, min: u64, tokens: &[&str]) -> Msg {
        Msg::CreateBridge(MsgCreateBridge {
            signer: "nmx1admin".into(),
            source_chain_id: source.into(),
            target_chain_id: target.into(),
            min_relayers: min,
            supported_tokens: tokens.iter().map(|t| t.to_string()).collect(),
            metadata: Vec::new(),
        })
    }

    #[test]
    fn test_create_bridge_validate_basic() {
        assert!(create("alpha", "beta", 2, &["gold"]).validate_basic().is_ok());

        for msg in [
            create("alpha", "alpha", 2, &["gold"]),
            create("alpha", "beta", 0, &["gold"]),
            create("alpha", "beta", 2, &[]),
            create("alpha", "beta", 2, &["$$"]),
            create("", "beta", 2, &["gold"]),
        ] {
            assert!(matches!(
                msg.validate_basic(),
                Err(HyperchainError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_bad_signer_rejected() {
        let msg = Msg::ApproveTransfer(MsgApproveTransfer {
            signer: "Not An Address".into(),
            bridge_id: "b".into(),
            transfer_id: "t".into(),
        });
        assert!(matches!(
            msg.validate_basic(),
            Err(HyperchainError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_update_rejects_zero_min_and_empty_tokens() {
        let zero = Msg::UpdateBridge(MsgUpdateBridge {
            signer: "nmx1admin".into(),
            bridge_id: "b".into(),
            min_relayers: Some(0),
            ..Default::default()
        });
        assert!(zero.validate_basic().is_err());

        let empty = Msg::UpdateBridge(MsgUpdateBridge {
            signer: "nmx1admin".into(),
            bridge_id: "b".into(),
            supported_tokens: Some(Vec::new()),
            ..Default::default()
        });
        assert!(empty.validate_basic().is_err());
    }

    #[test]
    fn test_json_dispatch_tag() {
        let msg = Msg::from_value(json!({
            "type": "initiate_transfer",
            "signer": "nmx1alice",
            "bridge_id": "b1",
            "recipient": "nmx1bob",
            "amount": { "denom": "gold", "amount": 100 },
            "source_tx_id": "u1"
        }))
        .unwrap();
        assert_eq!(msg.type_name(), "initiate_transfer");
        assert_eq!(msg.signer(), "nmx1alice");

        let unknown = Msg::from_value(json!({ "type": "mark_failed", "signer": "nmx1alice" }));
        assert!(matches!(unknown, Err(HyperchainError::InvalidArgument(_))));

        let untagged = Msg::from_value(json!({ "signer": "nmx1alice" }));
        assert!(matches!(untagged, Err(HyperchainError::InvalidArgument(_))));
    }

    #[test]
    fn test_from_json_reads_large_amounts() {
        let json = r#"{"type":"initiate_transfer","signer":"nmx1alice","bridge_id":"b1",
            "recipient":"nmx1bob","amount":{"denom":"gold","amount":18446744073709551615}}"#;
        let Msg::InitiateTransfer(msg) = Msg::from_json(json).unwrap() else {
            panic!("wrong message kind");
        };
        assert_eq!(msg.amount, Coin::new("gold", u64::MAX as u128));
        assert!(msg.source_tx_id.is_empty());

        let encoded = serde_json::to_value(Msg::InitiateTransfer(msg.clone())).unwrap();
        assert_eq!(encoded["type"], "initiate_transfer");
        assert_eq!(Msg::from_value(encoded).unwrap(), Msg::InitiateTransfer(msg));

        let json = r#"{"type":"initiate_transfer","signer":"nmx1alice","bridge_id":"b1",
            "recipient":"nmx1bob","amount":{"denom":"gold","amount":340282366920938463463374607431768211455}}"#;
        let Msg::InitiateTransfer(msg) = Msg::from_json(json).unwrap() else {
            panic!("wrong message kind");
        };
        assert_eq!(msg.amount, Coin::new("gold", u128::MAX));
    }

    #[test]
    fn test_from_json_rejects_untagged() {
        let untagged = Msg::from_json(r#"{"signer":"nmx1alice"}"#);
        assert!(matches!(untagged, Err(HyperchainError::InvalidArgument(_))));
        let not_object = Msg::from_json("[1, 2]");
        assert!(matches!(not_object, Err(HyperchainError::InvalidArgument(_))));
        let unknown = Msg::from_json(r#"{"type":"mark_failed","signer":"nmx1alice"}"#);
        assert!(matches!(unknown, Err(HyperchainError::InvalidArgument(_))));
    }

    #[test]
    fn test_grant_expiration_bound() {
        let msg = Msg::GrantPermission(MsgGrantPermission {
            signer: "nmx1admin".into(),
            chain_id: "alpha".into(),
            address: "nmx1alice".into(),
            permission_type: PermissionType::Admin,
            expiration_days: MAX_EXPIRATION_DAYS + 1,
            metadata: Vec::new(),
        });
        assert!(msg.validate_basic().is_err());
    }
}
