// 6.4 margin/positions.rs: open, increase and close. opens derive the position id locally
// and stamp it on the receipt; nothing here checks business rules, the contract does.

use alloy_primitives::{Address, Bytes, U256};
use rust_decimal::Decimal;

use super::core::Margin;
use super::results::MarginError;
use crate::abi::IMargin;
use crate::marshal::{
    IncreasePositionArgs, LoanAmounts, LoanParties, LoanTerms, OpenPositionArgs,
    OpenWithoutCounterpartyArgs,
};
use crate::transport::{CallOptions, MarginTransport, TxReceipt};
use crate::types::{ExchangeWrapper, PositionId, SignedLoanOffering};

impl<T: MarginTransport> Margin<T> {
    // 6.4.1: open against a signed loan offering, buying held token through the exchange
    #[allow(clippy::too_many_arguments)]
    pub async fn open_position(
        &self,
        loan_offering: &SignedLoanOffering,
        trader: Address,
        owner: Address,
        principal: U256,
        deposit_amount: U256,
        nonce: U256,
        deposit_in_held_token: bool,
        exchange_wrapper: &impl ExchangeWrapper,
        order_data: Bytes,
        options: CallOptions,
    ) -> Result<TxReceipt, MarginError> {
        let position_id = self.get_position_id(trader, nonce);

        let args = OpenPositionArgs {
            owner,
            parties: LoanParties::from_offering(loan_offering),
            exchange_wrapper: exchange_wrapper.address(),
            amounts: LoanAmounts::from_offering(loan_offering),
            principal,
            deposit_amount,
            nonce,
            terms: LoanTerms::from_offering(loan_offering)?,
            signature: loan_offering.signature().clone(),
            deposit_in_held_token,
            order_data,
        };

        let receipt = self.send(args.to_call(), trader, options).await?;
        Ok(receipt.with_position_id(position_id))
    }

    // 6.4.2: lender and trader agree off-protocol; the contract resolves both from the args
    #[allow(clippy::too_many_arguments)]
    pub async fn open_without_counterparty(
        &self,
        trader: Address,
        position_owner: Address,
        loan_owner: Address,
        owed_token: Address,
        held_token: Address,
        nonce: U256,
        deposit: U256,
        principal: U256,
        call_time_limit: u32,
        max_duration: u32,
        interest_rate: Decimal,
        interest_period: u32,
        options: CallOptions,
    ) -> Result<TxReceipt, MarginError> {
        let position_id = self.get_position_id(trader, nonce);

        let args = OpenWithoutCounterpartyArgs {
            position_owner,
            owed_token,
            held_token,
            loan_owner,
            principal,
            deposit,
            nonce,
            terms: LoanTerms::new(call_time_limit, max_duration, interest_rate, interest_period)?,
        };

        let receipt = self.send(args.to_call(), trader, options).await?;
        Ok(receipt.with_position_id(position_id))
    }

    // 6.4.3: add principal to an existing position from a new loan offering
    #[allow(clippy::too_many_arguments)]
    pub async fn increase_position(
        &self,
        position_id: PositionId,
        loan_offering: &SignedLoanOffering,
        trader: Address,
        principal: U256,
        deposit_in_held_token: bool,
        exchange_wrapper: &impl ExchangeWrapper,
        order_data: Bytes,
        options: CallOptions,
    ) -> Result<TxReceipt, MarginError> {
        let args = IncreasePositionArgs {
            position_id,
            parties: LoanParties::from_offering(loan_offering),
            exchange_wrapper: exchange_wrapper.address(),
            amounts: LoanAmounts::from_offering(loan_offering),
            principal,
            call_time_limit: loan_offering.call_time_limit,
            max_duration: loan_offering.max_duration,
            deposit_in_held_token,
            signature: loan_offering.signature().clone(),
            order_data,
        };

        self.send(args.to_call(), trader, options).await
    }

    pub async fn increase_without_counterparty(
        &self,
        position_id: PositionId,
        principal_to_add: U256,
        sender: Address,
        options: CallOptions,
    ) -> Result<TxReceipt, MarginError> {
        let call = IMargin::increaseWithoutCounterpartyCall {
            positionId: position_id.0,
            principalToAdd: principal_to_add,
        };
        self.send(call, sender, options).await
    }

    // 6.4.4: close through an exchange. close_amount beyond the principal is clamped or
    // rejected by the contract, not here.
    #[allow(clippy::too_many_arguments)]
    pub async fn close_position(
        &self,
        position_id: PositionId,
        closer: Address,
        payout_recipient: Address,
        close_amount: U256,
        payout_in_held_token: bool,
        exchange_wrapper: &impl ExchangeWrapper,
        order_data: Bytes,
        options: CallOptions,
    ) -> Result<TxReceipt, MarginError> {
        let call = IMargin::closePositionCall {
            positionId: position_id.0,
            requestedCloseAmount: close_amount,
            payoutRecipient: payout_recipient,
            exchangeWrapper: exchange_wrapper.address(),
            payoutInHeldToken: payout_in_held_token,
            orderData: order_data,
        };
        self.send(call, closer, options).await
    }

    // closer supplies the owed token directly, no exchange involved
    pub async fn close_position_directly(
        &self,
        position_id: PositionId,
        closer: Address,
        payout_recipient: Address,
        close_amount: U256,
        options: CallOptions,
    ) -> Result<TxReceipt, MarginError> {
        let call = IMargin::closePositionDirectlyCall {
            positionId: position_id.0,
            requestedCloseAmount: close_amount,
            payoutRecipient: payout_recipient,
        };
        self.send(call, closer, options).await
    }

    pub async fn close_position_without_counterparty(
        &self,
        position_id: PositionId,
        closer: Address,
        payout_recipient: Address,
        close_amount: U256,
        options: CallOptions,
    ) -> Result<TxReceipt, MarginError> {
        let call = IMargin::closeWithoutCounterpartyCall {
            positionId: position_id.0,
            requestedCloseAmount: close_amount,
            payoutRecipient: payout_recipient,
        };
        self.send(call, closer, options).await
    }
}
