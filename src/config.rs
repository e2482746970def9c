// 7.0 config.rs: what a Margin facade is bound to. one instance per network.
// loading this from files or env is the caller's business; presets cover the common cases.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::transport::CallOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginConfig {
    // network identifier the contract is deployed on
    pub network_id: u64,
    // address of the deployed margin contract
    pub margin_address: Address,
    // first block scanned by the history reads
    pub events_from_block: u64,
    // options layered under every write (per-call options win)
    pub default_options: CallOptions,
    // log every dispatch at info instead of debug
    pub verbose: bool,
}

impl MarginConfig {
    pub fn new(network_id: u64, margin_address: Address) -> Self {
        Self {
            network_id,
            margin_address,
            events_from_block: 0,
            default_options: CallOptions::default(),
            verbose: false,
        }
    }

    pub fn mainnet(margin_address: Address) -> Self {
        Self::new(1, margin_address)
    }

    // local dev chains. generous gas so tests never fail on estimation
    pub fn development(margin_address: Address) -> Self {
        let mut config = Self::new(1212, margin_address);
        config.default_options = CallOptions::new().with_gas(6_000_000);
        config.verbose = true;
        config
    }

    pub fn with_events_from_block(mut self, block: u64) -> Self {
        self.events_from_block = block;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        let address = Address::repeat_byte(0x42);

        let mainnet = MarginConfig::mainnet(address);
        assert_eq!(mainnet.network_id, 1);
        assert_eq!(mainnet.events_from_block, 0);
        assert_eq!(mainnet.default_options, CallOptions::default());
        assert!(!mainnet.verbose);

        let dev = MarginConfig::development(address).with_events_from_block(10);
        assert_eq!(dev.default_options.gas, Some(6_000_000));
        assert_eq!(dev.events_from_block, 10);
    }

    #[test]
    fn serde_round_trip() {
        let config = MarginConfig::development(Address::repeat_byte(0x42));
        let json = serde_json::to_string(&config).unwrap();
        let parsed: MarginConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
