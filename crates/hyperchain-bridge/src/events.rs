//! Module events
//!
//! Events are buffered per message and handed to the host only when the
//! message commits, in the order the mutations happened.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Event kinds emitted by the bridge module
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    BridgeCreated,
    BridgeUpdated,
    RelayerRegistered,
    RelayerRemoved,
    TransferInitiated,
    TransferApproved,
    TransferCompleted,
    TransferFailed,
    PermissionGranted,
    PermissionRevoked,
}

impl EventType {
    /// Wire name reported to the host event manager
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BridgeCreated => "create_hyperchain_bridge",
            Self::BridgeUpdated => "update_hyperchain_bridge",
            Self::RelayerRegistered => "register_hyperchain_bridge_relayer",
            Self::RelayerRemoved => "remove_hyperchain_bridge_relayer",
            Self::TransferInitiated => "initiate_hyperchain_bridge_transaction",
            Self::TransferApproved => "approve_hyperchain_bridge_transaction",
            Self::TransferCompleted => "complete_hyperchain_bridge_transaction",
            Self::TransferFailed => "fail_hyperchain_bridge_transaction",
            Self::PermissionGranted => "grant_hyperchain_permission",
            Self::PermissionRevoked => "revoke_hyperchain_permission",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute keys
pub mod attr {
    pub const HYPERCHAIN_ID: &str = "hyperchain_id";
    pub const CREATOR: &str = "creator";
    pub const ADMIN: &str = "admin";
    pub const BRIDGE_ID: &str = "bridge_id";
    pub const SOURCE_CHAIN_ID: &str = "source_chain_id";
    pub const TARGET_CHAIN_ID: &str = "target_chain_id";
    pub const RELAYER: &str = "relayer";
    pub const TRANSACTION_ID: &str = "transaction_id";
    pub const TARGET_TRANSACTION_ID: &str = "target_transaction_id";
    pub const SENDER: &str = "sender";
    pub const RECIPIENT: &str = "recipient";
    pub const AMOUNT: &str = "amount";
    pub const ADDRESS: &str = "address";
    pub const PERMISSION_TYPE: &str = "permission_type";
    pub const EXPIRATION_DAYS: &str = "expiration_days";
    pub const STATUS: &str = "status";
    pub const REASON: &str = "reason";
}

/// Typed event with ordered string attributes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventType,
    pub attributes: Vec<(String, String)>,
}

impl Event {
    pub fn new(kind: EventType) -> Self {
        Self {
            kind,
            attributes: Vec::new(),
        }
    }

    /// Append an attribute
    pub fn attr(mut self, key: &str, value: impl ToString) -> Self {
        self.attributes.push((key.to_string(), value.to_string()));
        self
    }

    /// First value recorded under `key`
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        for (key, value) in &self.attributes {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_attributes_keep_order() {
        let event = Event::new(EventType::TransferApproved)
            .attr(attr::BRIDGE_ID, "b1")
            .attr(attr::TRANSACTION_ID, "t1")
            .attr(attr::RELAYER, "nmx1ra");

        assert_eq!(event.attribute(attr::TRANSACTION_ID), Some("t1"));
        assert_eq!(event.attribute(attr::AMOUNT), None);
        assert_eq!(
            event.to_string(),
            "approve_hyperchain_bridge_transaction bridge_id=b1 transaction_id=t1 relayer=nmx1ra"
        );
    }

    #[test]
    fn test_event_json_shape() {
        let event = Event::new(EventType::BridgeCreated).attr(attr::BRIDGE_ID, "b1");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "BridgeCreated");
        assert_eq!(json["attributes"][0][0], "bridge_id");
    }
}
