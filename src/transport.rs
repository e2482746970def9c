// 5.0: the seam to the remote contract system. everything on the far side of
// MarginTransport (signing, nonce management, provider, network) is out of scope here.
// 5.1 call options and the derived caller context. 5.2 receipts and raw logs.

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::PositionId;

// optional overlay passed with each write. unknown keys do not exist; every field here
// is forwarded untouched to the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOptions {
    // ignored by every facade method: the role address always wins
    pub from: Option<Address>,
    pub gas: Option<u64>,
    pub gas_price: Option<u128>,
    pub value: Option<U256>,
    pub nonce: Option<u64>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    // per-call keys win over the defaults they are layered on
    pub fn merged_over(&self, defaults: &CallOptions) -> CallOptions {
        CallOptions {
            from: self.from.or(defaults.from),
            gas: self.gas.or(defaults.gas),
            gas_price: self.gas_price.or(defaults.gas_price),
            value: self.value.or(defaults.value),
            nonce: self.nonce.or(defaults.nonce),
        }
    }

    // 5.1: the sender is applied last and always replaces whatever `from` the options carried
    pub fn into_context(self, from: Address) -> CallContext {
        CallContext {
            from,
            gas: self.gas,
            gas_price: self.gas_price,
            value: self.value,
            nonce: self.nonce,
        }
    }
}

/// Caller context that accompanies a state changing call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub from: Address,
    pub gas: Option<u64>,
    pub gas_price: Option<u128>,
    pub value: Option<U256>,
    pub nonce: Option<u64>,
}

// 5.2: what a mined write reports back. position_id is stamped by the facade on opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub transaction_hash: B256,
    pub block_number: u64,
    pub gas_used: u64,
    pub success: bool,
    pub position_id: Option<PositionId>,
}

impl TxReceipt {
    pub fn with_position_id(mut self, id: PositionId) -> Self {
        self.position_id = Some(id);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockTag {
    Number(u64),
    Latest,
}

impl BlockTag {
    pub fn resolve(&self, head: u64) -> u64 {
        match self {
            BlockTag::Number(number) => *number,
            BlockTag::Latest => head,
        }
    }
}

// single filter, single range. the transport returns everything that matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    pub address: Address,
    pub event_signature: B256,
    pub position_id: B256,
    pub from_block: BlockTag,
    pub to_block: BlockTag,
}

impl LogFilter {
    // `head` is the newest mined block; `Latest` resolves to it on either bound
    pub fn matches(&self, log: &RawLog, head: u64) -> bool {
        log.address == self.address
            && log.topics.first() == Some(&self.event_signature)
            && log.topics.get(1) == Some(&self.position_id)
            && self.in_range(log.block_number, head)
    }

    fn in_range(&self, block: u64, head: u64) -> bool {
        let from = self.from_block.resolve(head);
        let to = self.to_block.resolve(head);
        block >= from && block <= to
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLog {
    pub address: Address,
    pub block_number: u64,
    pub transaction_hash: B256,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("execution reverted: {reason}")]
    Reverted { reason: String, data: Bytes },

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("request timed out")]
    Timeout,
}

/// Handle to a deployed margin contract's network.
///
/// Implementations own signing and submission. `send_transaction` resolves once the
/// transaction is mined; a revert is reported as [`TransportError::Reverted`], never as a
/// receipt with `success == false`.
#[async_trait]
pub trait MarginTransport: Send + Sync {
    async fn send_transaction(
        &self,
        to: Address,
        calldata: Bytes,
        context: CallContext,
    ) -> Result<TxReceipt, TransportError>;

    // side-effect-free eth_call against latest state
    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, TransportError>;

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>, TransportError>;

    /// Unix seconds of the given block.
    async fn block_timestamp(&self, block_number: u64) -> Result<u64, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn sender_override_wins_last() {
        let caller_supplied = address!("00000000000000000000000000000000000000aa");
        let trader = address!("00000000000000000000000000000000000000bb");

        let options = CallOptions {
            from: Some(caller_supplied),
            ..CallOptions::new().with_gas(500_000)
        };
        let context = options.into_context(trader);

        assert_eq!(context.from, trader);
        assert_eq!(context.gas, Some(500_000));
    }

    #[test]
    fn per_call_options_win_over_defaults() {
        let defaults = CallOptions::new().with_gas(1_000_000).with_gas_price(5);
        let per_call = CallOptions::new().with_gas(200_000).with_value(U256::from(3u64));

        let merged = per_call.merged_over(&defaults);
        assert_eq!(merged.gas, Some(200_000));
        assert_eq!(merged.gas_price, Some(5));
        assert_eq!(merged.value, Some(U256::from(3u64)));
        assert_eq!(merged.nonce, None);
    }

    #[test]
    fn filter_matches_topic_and_range() {
        let contract = address!("00000000000000000000000000000000000000cc");
        let signature = B256::repeat_byte(0x11);
        let id = B256::repeat_byte(0x22);

        let filter = LogFilter {
            address: contract,
            event_signature: signature,
            position_id: id,
            from_block: BlockTag::Number(5),
            to_block: BlockTag::Latest,
        };

        let log = RawLog {
            address: contract,
            block_number: 9,
            transaction_hash: B256::ZERO,
            topics: vec![signature, id],
            data: Bytes::new(),
        };
        assert!(filter.matches(&log, 9));

        let early = RawLog { block_number: 4, ..log.clone() };
        assert!(!filter.matches(&early, 9));

        let other_position = RawLog { topics: vec![signature, B256::repeat_byte(0x33)], ..log };
        assert!(!filter.matches(&other_position, 9));
    }

    #[test]
    fn latest_lower_bound_is_the_head() {
        let contract = address!("00000000000000000000000000000000000000cc");
        let signature = B256::repeat_byte(0x11);
        let id = B256::repeat_byte(0x22);

        let filter = LogFilter {
            address: contract,
            event_signature: signature,
            position_id: id,
            from_block: BlockTag::Latest,
            to_block: BlockTag::Latest,
        };
        let log = RawLog {
            address: contract,
            block_number: 3,
            transaction_hash: B256::ZERO,
            topics: vec![signature, id],
            data: Bytes::new(),
        };

        assert!(filter.matches(&log, 3));
        assert!(!filter.matches(&log, 4));
        assert_eq!(BlockTag::Number(7).resolve(100), 7);
    }
}
