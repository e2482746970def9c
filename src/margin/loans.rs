// 6.5 margin/loans.rs: lender side and rights management. loan offer cancellation,
// margin calls, collateral, and transfers of the loan or position.

use alloy_primitives::{Address, U256};

use super::core::Margin;
use super::results::MarginError;
use crate::abi::IMargin;
use crate::marshal::CancelLoanOfferingArgs;
use crate::transport::{CallOptions, MarginTransport, TxReceipt};
use crate::types::{LoanOffering, PositionId};

impl<T: MarginTransport> Margin<T> {
    /// Burns `cancel_amount` of an offering's remaining capacity.
    ///
    /// The offering needs no signature; the contract only accepts this from its payer.
    /// The interest rate is scaled to protocol units exactly as on open, so the cancel
    /// lands on the same offering hash. Earlier clients sent the human rate unscaled,
    /// which addressed a different offering.
    pub async fn cancel_loan_offer(
        &self,
        loan_offering: &LoanOffering,
        cancel_amount: U256,
        from: Address,
        options: CallOptions,
    ) -> Result<TxReceipt, MarginError> {
        let args = CancelLoanOfferingArgs::from_offering(loan_offering, cancel_amount)?;
        self.send(args.to_call(), from, options).await
    }

    // 6.5.2: lender demands required_deposit more collateral before the call time limit
    pub async fn margin_call(
        &self,
        position_id: PositionId,
        required_deposit: U256,
        from: Address,
        options: CallOptions,
    ) -> Result<TxReceipt, MarginError> {
        let call = IMargin::marginCallCall {
            positionId: position_id.0,
            requiredDeposit: required_deposit,
        };
        self.send(call, from, options).await
    }

    pub async fn cancel_margin_call(
        &self,
        position_id: PositionId,
        from: Address,
        options: CallOptions,
    ) -> Result<TxReceipt, MarginError> {
        let call = IMargin::cancelMarginCallCall {
            positionId: position_id.0,
        };
        self.send(call, from, options).await
    }

    // 6.5.3: lender seizes the held token after an uncured call or expiry
    pub async fn force_recover_collateral(
        &self,
        position_id: PositionId,
        collateral_recipient: Address,
        from: Address,
        options: CallOptions,
    ) -> Result<TxReceipt, MarginError> {
        let call = IMargin::forceRecoverCollateralCall {
            positionId: position_id.0,
            recipient: collateral_recipient,
        };
        self.send(call, from, options).await
    }

    /// Adds held token collateral to a position.
    ///
    /// Dispatches to the contract's `depositCollateral(bytes32,uint256)`. Earlier clients
    /// routed this through `forceRecoverCollateral` with the amount in the recipient slot;
    /// that wiring is not reproduced.
    pub async fn deposit_collateral(
        &self,
        position_id: PositionId,
        deposit_amount: U256,
        from: Address,
        options: CallOptions,
    ) -> Result<TxReceipt, MarginError> {
        let call = IMargin::depositCollateralCall {
            positionId: position_id.0,
            depositAmount: deposit_amount,
        };
        self.send(call, from, options).await
    }

    // 6.5.4: only the current lender may move the loan, only the current owner the position
    pub async fn transfer_loan(
        &self,
        position_id: PositionId,
        to: Address,
        from: Address,
        options: CallOptions,
    ) -> Result<TxReceipt, MarginError> {
        let call = IMargin::transferLoanCall {
            positionId: position_id.0,
            who: to,
        };
        self.send(call, from, options).await
    }

    pub async fn transfer_position(
        &self,
        position_id: PositionId,
        to: Address,
        from: Address,
        options: CallOptions,
    ) -> Result<TxReceipt, MarginError> {
        let call = IMargin::transferPositionCall {
            positionId: position_id.0,
            who: to,
        };
        self.send(call, from, options).await
    }
}
