// 1.0: domain primitives. ids, loan offerings, the decoded position record.
// every id is a newtype over a 32 byte hash so a loan hash can never be passed as a position id.

use alloy_primitives::{Address, Bytes, B256, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionId(pub B256);

impl PositionId {
    pub fn as_b256(&self) -> B256 {
        self.0
    }
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<B256> for PositionId {
    fn from(hash: B256) -> Self {
        Self(hash)
    }
}

// 1.1: hash of a loan offering, computed by the protocol. keys the loan accounting reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanHash(pub B256);

impl fmt::Display for LoanHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.2: a lender's terms. interest_rate is in human units, scaled on the way out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanOffering {
    pub owed_token: Address,
    pub held_token: Address,
    pub payer: Address,
    pub owner: Address,
    pub taker: Address,
    pub position_owner: Address,
    pub fee_recipient: Address,
    pub lender_fee_token_address: Address,
    pub taker_fee_token_address: Address,
    pub max_amount: U256,
    pub min_amount: U256,
    pub min_held_token: U256,
    pub lender_fee: U256,
    pub taker_fee: U256,
    pub expiration_timestamp: U256,
    pub salt: U256,
    pub call_time_limit: u32,
    pub max_duration: u32,
    pub interest_rate: Decimal,
    pub interest_period: u32,
    pub signature: Bytes,
}

impl LoanOffering {
    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }
}

// 1.3: an offering that carries a signature. opening or increasing against an unsigned
// offering is a caller bug, so the type refuses to exist without one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedLoanOffering(LoanOffering);

impl SignedLoanOffering {
    #[must_use]
    pub fn new(offering: LoanOffering) -> Option<Self> {
        if offering.is_signed() {
            Some(Self(offering))
        } else {
            None
        }
    }

    pub fn offering(&self) -> &LoanOffering {
        &self.0
    }

    pub fn signature(&self) -> &Bytes {
        &self.0.signature
    }

    pub fn into_inner(self) -> LoanOffering {
        self.0
    }
}

impl std::ops::Deref for SignedLoanOffering {
    type Target = LoanOffering;

    fn deref(&self) -> &LoanOffering {
        &self.0
    }
}

// 1.4: position as stored by the protocol. timestamps are unix seconds, zero when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub owed_token: Address,
    pub held_token: Address,
    pub lender: Address,
    pub owner: Address,
    pub principal: U256,
    pub required_deposit: U256,
    pub call_time_limit: u32,
    pub start_timestamp: u32,
    pub call_timestamp: u32,
    pub max_duration: u32,
    pub interest_rate: Decimal,
    pub interest_period: u32,
}

impl Position {
    // the protocol answers unknown ids with an all zero record
    pub fn is_empty(&self) -> bool {
        self.owner == Address::ZERO && self.lender == Address::ZERO && self.start_timestamp == 0
    }

    pub fn is_called(&self) -> bool {
        self.call_timestamp != 0
    }
}

// 1.5: lifecycle as observed from the outside. MarginCalled and CallCanceled collapse
// into Called / Open since the protocol only exposes the current flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    Uninitialized,
    Open,
    Called,
    Closed,
}

impl PositionStatus {
    pub fn from_flags(contains: bool, called: bool, closed: bool) -> Self {
        if closed {
            PositionStatus::Closed
        } else if !contains {
            PositionStatus::Uninitialized
        } else if called {
            PositionStatus::Called
        } else {
            PositionStatus::Open
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PositionStatus::Closed)
    }
}

// 1.6: the exchange counterparty used by open/increase/close. only its address goes on the wire.
pub trait ExchangeWrapper {
    fn address(&self) -> Address;
}

impl ExchangeWrapper for Address {
    fn address(&self) -> Address {
        *self
    }
}
