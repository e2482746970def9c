// 6.0 margin/core.rs: the facade struct and the two dispatch paths every operation goes through.
// writes: encode → merge options → force sender → send. reads: encode → call → decode.

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use tracing::{debug, info, warn};

use super::results::MarginError;
use crate::config::MarginConfig;
use crate::helpers;
use crate::transport::{CallOptions, MarginTransport, TxReceipt};
use crate::types::PositionId;

/** 6.1: client for one deployed margin contract. holds no state beyond its binding */
#[derive(Debug)]
pub struct Margin<T: MarginTransport> {
    pub(super) transport: Arc<T>,
    pub(super) config: MarginConfig,
}

impl<T: MarginTransport> Clone for Margin<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: self.config.clone(),
        }
    }
}

impl<T: MarginTransport> Margin<T> {
    pub fn new(transport: Arc<T>, config: MarginConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &MarginConfig {
        &self.config
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub fn get_address(&self) -> Address {
        self.config.margin_address
    }

    pub fn get_position_id(&self, trader: Address, nonce: U256) -> PositionId {
        helpers::get_position_id(trader, nonce)
    }

    // 6.2: state changing path. `from` is applied after every overlay, so a sender
    // smuggled in through options never reaches the transport.
    pub(super) async fn send<C: SolCall>(
        &self,
        call: C,
        from: Address,
        options: CallOptions,
    ) -> Result<TxReceipt, MarginError> {
        let method = method_name::<C>();

        if let Some(discarded) = options.from.filter(|supplied| *supplied != from) {
            warn!(method, %discarded, sender = %from, "caller supplied sender overridden");
        }

        let context = options
            .merged_over(&self.config.default_options)
            .into_context(from);

        if self.config.verbose {
            info!(method, sender = %from, gas = ?context.gas, "dispatching");
        } else {
            debug!(method, sender = %from, gas = ?context.gas, "dispatching");
        }

        let receipt = self
            .transport
            .send_transaction(self.config.margin_address, Bytes::from(call.abi_encode()), context)
            .await
            .map_err(|source| MarginError::remote(method, source))?;

        info!(
            method,
            tx = %receipt.transaction_hash,
            block = receipt.block_number,
            gas_used = receipt.gas_used,
            "mined"
        );
        Ok(receipt)
    }

    // 6.3: read path. decode failures mean the deployed contract no longer matches the bindings
    pub(super) async fn read<C: SolCall>(&self, call: C) -> Result<C::Return, MarginError> {
        let method = method_name::<C>();

        if self.config.verbose {
            info!(method, "calling");
        } else {
            debug!(method, "calling");
        }

        let data = self
            .transport
            .call(self.config.margin_address, Bytes::from(call.abi_encode()))
            .await
            .map_err(|source| MarginError::remote(method, source))?;

        C::abi_decode_returns(&data, true).map_err(|err| MarginError::decode(method, err))
    }
}

// "openPosition(address[11],...)" → "openPosition"
fn method_name<C: SolCall>() -> &'static str {
    let signature: &'static str = C::SIGNATURE;
    signature.split('(').next().unwrap_or(signature)
}
