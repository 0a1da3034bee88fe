//! Events recorded by a multisig wallet
//!
//! Callers learn the index of a submitted transaction from the
//! `Submitted` event (or the return value of the submit call).

use crate::core::Principal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum MultisigEvent {
    Deposit {
        sender: Principal,
        amount: u128,
        balance: u128,
    },
    Submitted {
        owner: Principal,
        index: u64,
        target: Principal,
        value: u128,
        payload: Vec<u8>,
    },
    Confirmed {
        owner: Principal,
        index: u64,
    },
    Revoked {
        owner: Principal,
        index: u64,
    },
    Executed {
        owner: Principal,
        index: u64,
    },
}

impl MultisigEvent {
    /// Transaction index the event refers to, if any
    pub fn index(&self) -> Option<u64> {
        match self {
            MultisigEvent::Deposit { .. } => None,
            MultisigEvent::Submitted { index, .. }
            | MultisigEvent::Confirmed { index, .. }
            | MultisigEvent::Revoked { index, .. }
            | MultisigEvent::Executed { index, .. } => Some(*index),
        }
    }
}

/// An event stamped with the time it was recorded
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EventRecord {
    pub event: MultisigEvent,
    pub timestamp: DateTime<Utc>,
}

impl EventRecord {
    pub fn new(event: MultisigEvent) -> Self {
        Self {
            event,
            timestamp: Utc::now(),
        }
    }
}
