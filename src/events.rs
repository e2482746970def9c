// 8.0 events.rs: decoded position history. raw logs come off the transport, get decoded through the
// abi bindings, and land here as plain records. closed events also carry their block time.

use alloy_primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::abi::IMargin;
use crate::types::{LoanHash, PositionId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionOpenedEvent {
    pub position_id: PositionId,
    pub trader: Address,
    pub lender: Address,
    pub loan_hash: LoanHash,
    pub owed_token: Address,
    pub held_token: Address,
    pub loan_fee_recipient: Address,
    pub principal: U256,
    pub held_token_from_sell: U256,
    pub deposit_amount: U256,
    pub interest_rate: U256,
    pub call_time_limit: u32,
    pub max_duration: u32,
    pub deposit_in_held_token: bool,
}

impl From<IMargin::PositionOpened> for PositionOpenedEvent {
    fn from(log: IMargin::PositionOpened) -> Self {
        Self {
            position_id: PositionId(log.positionId),
            trader: log.trader,
            lender: log.lender,
            loan_hash: LoanHash(log.loanHash),
            owed_token: log.owedToken,
            held_token: log.heldToken,
            loan_fee_recipient: log.loanFeeRecipient,
            principal: log.principal,
            held_token_from_sell: log.heldTokenFromSell,
            deposit_amount: log.depositAmount,
            interest_rate: log.interestRate,
            call_time_limit: log.callTimeLimit,
            max_duration: log.maxDuration,
            deposit_in_held_token: log.depositInHeldToken,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionClosedEvent {
    pub position_id: PositionId,
    pub closer: Address,
    pub payout_recipient: Address,
    pub close_amount: U256,
    pub remaining_amount: U256,
    pub owed_token_paid_to_lender: U256,
    pub payout_amount: U256,
    pub buyback_cost_in_held_token: U256,
    pub payout_in_held_token: bool,
}

impl PositionClosedEvent {
    pub fn is_full_close(&self) -> bool {
        self.remaining_amount.is_zero()
    }
}

impl From<IMargin::PositionClosed> for PositionClosedEvent {
    fn from(log: IMargin::PositionClosed) -> Self {
        Self {
            position_id: PositionId(log.positionId),
            closer: log.closer,
            payout_recipient: log.payoutRecipient,
            close_amount: log.closeAmount,
            remaining_amount: log.remainingAmount,
            owed_token_paid_to_lender: log.owedTokenPaidToLender,
            payout_amount: log.payoutAmount,
            buyback_cost_in_held_token: log.buybackCostInHeldToken,
            payout_in_held_token: log.payoutInHeldToken,
        }
    }
}

// 7.1: one log entry with where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent<T> {
    pub block_number: u64,
    pub transaction_hash: B256,
    pub args: T,
}

// 7.2: a log entry joined with the timestamp of its block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampedEvent<T> {
    pub block_number: u64,
    pub timestamp: DateTime<Utc>,
    pub args: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_close_has_nothing_remaining() {
        let mut closed = PositionClosedEvent {
            position_id: PositionId(B256::repeat_byte(1)),
            closer: Address::repeat_byte(2),
            payout_recipient: Address::repeat_byte(3),
            close_amount: U256::from(100u64),
            remaining_amount: U256::ZERO,
            owed_token_paid_to_lender: U256::from(100u64),
            payout_amount: U256::from(40u64),
            buyback_cost_in_held_token: U256::from(60u64),
            payout_in_held_token: true,
        };
        assert!(closed.is_full_close());

        closed.remaining_amount = U256::from(1u64);
        assert!(!closed.is_full_close());
    }
}
