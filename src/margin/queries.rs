// 6.6 margin/queries.rs: constant reads. every call re-fetches; nothing is cached.

use alloy_primitives::U256;

use super::core::Margin;
use super::results::MarginError;
use crate::abi::IMargin;
use crate::helpers::convert_interest_rate_from_protocol;
use crate::transport::MarginTransport;
use crate::types::{LoanHash, Position, PositionId, PositionStatus};

impl<T: MarginTransport> Margin<T> {
    /// Fetches and decodes a position.
    ///
    /// Unknown ids are not an error: the contract answers with an all zero record, which
    /// comes back here with [`Position::is_empty`] set.
    pub async fn get_position(&self, position_id: PositionId) -> Result<Position, MarginError> {
        let ret = self
            .read(IMargin::getPositionCall {
                positionId: position_id.0,
            })
            .await?;

        let [owed_token, held_token, lender, owner] = ret._0;
        let [principal, required_deposit] = ret._1;
        let [call_time_limit, start_timestamp, call_timestamp, max_duration, interest_rate, interest_period] =
            ret._2;

        Ok(Position {
            id: position_id,
            owed_token,
            held_token,
            lender,
            owner,
            principal,
            required_deposit,
            call_time_limit,
            start_timestamp,
            call_timestamp,
            max_duration,
            interest_rate: convert_interest_rate_from_protocol(interest_rate),
            interest_period,
        })
    }

    pub async fn contains_position(&self, position_id: PositionId) -> Result<bool, MarginError> {
        let ret = self
            .read(IMargin::containsPositionCall {
                positionId: position_id.0,
            })
            .await?;
        Ok(ret._0)
    }

    pub async fn is_position_called(&self, position_id: PositionId) -> Result<bool, MarginError> {
        let ret = self
            .read(IMargin::isPositionCalledCall {
                positionId: position_id.0,
            })
            .await?;
        Ok(ret._0)
    }

    pub async fn is_position_closed(&self, position_id: PositionId) -> Result<bool, MarginError> {
        let ret = self
            .read(IMargin::isPositionClosedCall {
                positionId: position_id.0,
            })
            .await?;
        Ok(ret._0)
    }

    // 6.6.1: three reads folded into one lifecycle value. not atomic: a write landing between
    // the reads can produce a status that never existed on chain.
    pub async fn get_position_status(
        &self,
        position_id: PositionId,
    ) -> Result<PositionStatus, MarginError> {
        let closed = self.is_position_closed(position_id).await?;
        if closed {
            return Ok(PositionStatus::Closed);
        }
        let contains = self.contains_position(position_id).await?;
        let called = contains && self.is_position_called(position_id).await?;
        Ok(PositionStatus::from_flags(contains, called, closed))
    }

    pub async fn get_total_owed_token_repaid_to_lender(
        &self,
        position_id: PositionId,
    ) -> Result<U256, MarginError> {
        let ret = self
            .read(IMargin::getTotalOwedTokenRepaidToLenderCall {
                positionId: position_id.0,
            })
            .await?;
        Ok(ret._0)
    }

    pub async fn get_position_balance(&self, position_id: PositionId) -> Result<U256, MarginError> {
        let ret = self
            .read(IMargin::getPositionBalanceCall {
                positionId: position_id.0,
            })
            .await?;
        Ok(ret._0)
    }

    // seconds until the next interest period boundary
    pub async fn get_time_until_interest_increase(
        &self,
        position_id: PositionId,
    ) -> Result<U256, MarginError> {
        let ret = self
            .read(IMargin::getTimeUntilInterestIncreaseCall {
                positionId: position_id.0,
            })
            .await?;
        Ok(ret._0)
    }

    pub async fn get_position_owed_amount(
        &self,
        position_id: PositionId,
    ) -> Result<U256, MarginError> {
        let ret = self
            .read(IMargin::getPositionOwedAmountCall {
                positionId: position_id.0,
            })
            .await?;
        Ok(ret._0)
    }

    // 6.6.2: previews. owed amount for closing principal_to_close at a given instant
    pub async fn get_position_owed_amount_at_time(
        &self,
        position_id: PositionId,
        principal_to_close: U256,
        timestamp_in_seconds: u32,
    ) -> Result<U256, MarginError> {
        let ret = self
            .read(IMargin::getPositionOwedAmountAtTimeCall {
                positionId: position_id.0,
                principalToClose: principal_to_close,
                timestamp: timestamp_in_seconds,
            })
            .await?;
        Ok(ret._0)
    }

    pub async fn get_lender_amount_for_increase_position_at_time(
        &self,
        position_id: PositionId,
        principal_to_add: U256,
        timestamp_in_seconds: u32,
    ) -> Result<U256, MarginError> {
        let ret = self
            .read(IMargin::getLenderAmountForIncreasePositionAtTimeCall {
                positionId: position_id.0,
                principalToAdd: principal_to_add,
                timestamp: timestamp_in_seconds,
            })
            .await?;
        Ok(ret._0)
    }

    // 6.6.3: loan offering accounting, keyed by the protocol's offering hash
    pub async fn get_loan_unavailable_amount(&self, loan_hash: LoanHash) -> Result<U256, MarginError> {
        let ret = self
            .read(IMargin::getLoanUnavailableAmountCall { loanHash: loan_hash.0 })
            .await?;
        Ok(ret._0)
    }

    pub async fn get_loan_filled_amount(&self, loan_hash: LoanHash) -> Result<U256, MarginError> {
        let ret = self
            .read(IMargin::getLoanFilledAmountCall { loanHash: loan_hash.0 })
            .await?;
        Ok(ret._0)
    }

    pub async fn get_loan_canceled_amount(&self, loan_hash: LoanHash) -> Result<U256, MarginError> {
        let ret = self
            .read(IMargin::getLoanCanceledAmountCall { loanHash: loan_hash.0 })
            .await?;
        Ok(ret._0)
    }

    pub async fn get_loan_number(&self, loan_hash: LoanHash) -> Result<U256, MarginError> {
        let ret = self
            .read(IMargin::getLoanNumberCall { loanHash: loan_hash.0 })
            .await?;
        Ok(ret._0)
    }

    pub async fn is_loan_approved(&self, loan_hash: LoanHash) -> Result<bool, MarginError> {
        let ret = self
            .read(IMargin::isLoanApprovedCall { loanHash: loan_hash.0 })
            .await?;
        Ok(ret._0)
    }
}
