// 9.0 simulated.rs: MOCKED. in-memory stand-in for a deployed margin contract.
// decodes calldata through the same bindings the facade encodes with, so argument order
// mistakes surface as wrong state. enforces the argument checks the contract performs;
// interest is flat (owed = principal) and exchanges fill 1:1. not an accounting model.

use std::collections::HashMap;

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::{SolCall, SolEvent, SolInterface, SolValue};
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::abi::IMargin::{self, IMarginCalls};
use crate::helpers::get_position_id;
use crate::marshal::{LoanAmounts, LoanParties, LoanTerms};
use crate::transport::{
    CallContext, LogFilter, MarginTransport, RawLog, TransportError, TxReceipt,
};
use crate::types::{LoanHash, LoanOffering};

const BASE_GAS: u64 = 21_000;

#[derive(Debug, Clone, Default)]
struct SimPosition {
    owed_token: Address,
    held_token: Address,
    lender: Address,
    owner: Address,
    principal: U256,
    required_deposit: U256,
    call_time_limit: u32,
    start_timestamp: u32,
    call_timestamp: u32,
    max_duration: u32,
    interest_rate: u32,
    interest_period: u32,
    balance: U256,
    repaid: U256,
    closed: bool,
}

#[derive(Debug, Clone, Default)]
struct LoanBook {
    filled: U256,
    canceled: U256,
    number: U256,
}

impl LoanBook {
    fn unavailable(&self) -> U256 {
        self.filled.saturating_add(self.canceled)
    }
}

#[derive(Debug, Default)]
struct SimState {
    now: u64,
    block_timestamps: Vec<u64>,
    positions: HashMap<B256, SimPosition>,
    loans: HashMap<B256, LoanBook>,
    logs: Vec<RawLog>,
    // calls still to let through, then the error to fail with
    pending_fault: Option<(usize, TransportError)>,
}

// what a successful write leaves behind besides state
struct Outcome {
    events: Vec<alloy_primitives::LogData>,
}

impl Outcome {
    fn none() -> Self {
        Self { events: Vec::new() }
    }

    fn event(log: impl SolEvent) -> Self {
        Self {
            events: vec![log.encode_log_data()],
        }
    }
}

type Revert = String;

fn require(condition: bool, reason: &str) -> Result<(), Revert> {
    if condition {
        Ok(())
    } else {
        Err(reason.to_string())
    }
}

// uint256 math reverts on overflow, it never wraps
fn add(a: U256, b: U256) -> Result<U256, Revert> {
    a.checked_add(b).ok_or_else(|| "Addition overflow".to_string())
}

fn mul(a: U256, b: U256) -> Result<U256, Revert> {
    a.checked_mul(b).ok_or_else(|| "Multiplication overflow".to_string())
}

/// In-memory margin contract.
///
/// Each successful write mines its own block at the current simulated time.
#[derive(Debug)]
pub struct SimulatedMargin {
    address: Address,
    state: Mutex<SimState>,
}

impl SimulatedMargin {
    pub fn new(address: Address, start_time: u64) -> Self {
        Self {
            address,
            state: Mutex::new(SimState {
                now: start_time,
                ..SimState::default()
            }),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn advance_time(&self, seconds: u64) {
        let mut state = self.state.lock().await;
        state.now += seconds;
    }

    pub async fn now(&self) -> u64 {
        self.state.lock().await.now
    }

    pub async fn block_number(&self) -> u64 {
        self.state.lock().await.block_timestamps.len() as u64
    }

    // the next transport call fails with this error, whatever it is
    pub async fn fail_next(&self, error: TransportError) {
        self.fail_after(0, error).await;
    }

    // lets `skip` transport calls through, then fails exactly one
    pub async fn fail_after(&self, skip: usize, error: TransportError) {
        self.state.lock().await.pending_fault = Some((skip, error));
    }

    /// Hash this backend files an offering's fills and cancels under.
    ///
    /// Simulation only; deployed contracts hash offerings their own way.
    pub fn loan_hash_of(offering: &LoanOffering) -> Option<LoanHash> {
        let terms = LoanTerms::from_offering(offering).ok()?;
        Some(LoanHash(loan_hash(
            &LoanParties::from_offering(offering).to_array(),
            &LoanAmounts::from_offering(offering).to_array(),
            &terms.to_array(),
        )))
    }
}

fn loan_hash(parties: &[Address; 9], amounts: &[U256; 7], terms: &[u32; 4]) -> B256 {
    keccak256((*parties, *amounts, *terms).abi_encode())
}

impl SimState {
    fn take_fault(&mut self) -> Result<(), TransportError> {
        match self.pending_fault.take() {
            Some((0, fault)) => Err(fault),
            Some((skip, fault)) => {
                self.pending_fault = Some((skip - 1, fault));
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn now32(&self) -> u32 {
        u32::try_from(self.now).unwrap_or(u32::MAX)
    }

    fn open_position_mut(&mut self, id: &B256) -> Result<&mut SimPosition, Revert> {
        match self.positions.get_mut(id) {
            Some(position) if !position.closed => Ok(position),
            _ => Err("Position does not exist or is closed".to_string()),
        }
    }

    fn open_position(&self, id: &B256) -> Result<&SimPosition, Revert> {
        match self.positions.get(id) {
            Some(position) if !position.closed => Ok(position),
            _ => Err("Position does not exist or is closed".to_string()),
        }
    }

    // 9.1: writes. every handler validates fully before it mutates anything.
    fn execute(&mut self, call: IMarginCalls, sender: Address) -> Result<Outcome, Revert> {
        match call {
            IMarginCalls::openPosition(c) => self.open_position_call(c, sender),
            IMarginCalls::openWithoutCounterparty(c) => self.open_without_counterparty(c, sender),
            IMarginCalls::increasePosition(c) => self.increase_position(c, sender),
            IMarginCalls::increaseWithoutCounterparty(c) => {
                require(c.principalToAdd > U256::ZERO, "Principal to add must be positive")?;
                let position = self.open_position_mut(&c.positionId)?;
                require(sender == position.owner, "Only the position owner can increase")?;
                let principal = add(position.principal, c.principalToAdd)?;
                let balance = add(position.balance, c.principalToAdd)?;
                position.principal = principal;
                position.balance = balance;
                Ok(Outcome::none())
            }
            IMarginCalls::closePosition(c) => self.close(
                c.positionId,
                c.requestedCloseAmount,
                c.payoutRecipient,
                c.payoutInHeldToken,
                sender,
            ),
            IMarginCalls::closePositionDirectly(c) => {
                self.close(c.positionId, c.requestedCloseAmount, c.payoutRecipient, true, sender)
            }
            IMarginCalls::closeWithoutCounterparty(c) => {
                self.close(c.positionId, c.requestedCloseAmount, c.payoutRecipient, true, sender)
            }
            IMarginCalls::cancelLoanOffering(c) => {
                let payer = c.addresses[2];
                require(sender == payer, "Only the loan payer can cancel")?;
                require(c.cancelAmount > U256::ZERO, "Cancel amount must be positive")?;
                let hash = loan_hash(&c.addresses, &c.values256, &c.values32);
                let max_amount = c.values256[0];
                let book = self.loans.entry(hash).or_default();
                let available = max_amount.saturating_sub(book.unavailable());
                book.canceled = add(book.canceled, c.cancelAmount.min(available))?;
                Ok(Outcome::none())
            }
            IMarginCalls::marginCall(c) => {
                let now = self.now32();
                let position = self.open_position_mut(&c.positionId)?;
                require(sender == position.lender, "Only the lender can margin call")?;
                require(position.call_timestamp == 0, "Position already called")?;
                position.call_timestamp = now;
                position.required_deposit = c.requiredDeposit;
                Ok(Outcome::none())
            }
            IMarginCalls::cancelMarginCall(c) => {
                let position = self.open_position_mut(&c.positionId)?;
                require(sender == position.lender, "Only the lender can cancel a margin call")?;
                require(position.call_timestamp != 0, "Position is not called")?;
                position.call_timestamp = 0;
                position.required_deposit = U256::ZERO;
                Ok(Outcome::none())
            }
            IMarginCalls::forceRecoverCollateral(c) => {
                let now = self.now32();
                let position = self.open_position_mut(&c.positionId)?;
                require(sender == position.lender, "Only the lender can recover collateral")?;
                require(c.recipient != Address::ZERO, "Recipient cannot be zero")?;
                let call_expired = position.call_timestamp != 0
                    && now >= position.call_timestamp.saturating_add(position.call_time_limit);
                let loan_expired = now >= position.start_timestamp.saturating_add(position.max_duration);
                require(call_expired || loan_expired, "Cannot recover collateral yet")?;
                position.balance = U256::ZERO;
                position.principal = U256::ZERO;
                position.closed = true;
                Ok(Outcome::none())
            }
            IMarginCalls::depositCollateral(c) => {
                require(c.depositAmount > U256::ZERO, "Deposit must be positive")?;
                let position = self.open_position_mut(&c.positionId)?;
                require(sender == position.owner, "Only the position owner can deposit")?;
                position.balance = add(position.balance, c.depositAmount)?;
                if position.call_timestamp != 0 && c.depositAmount >= position.required_deposit {
                    position.call_timestamp = 0;
                    position.required_deposit = U256::ZERO;
                }
                Ok(Outcome::none())
            }
            IMarginCalls::transferLoan(c) => {
                require(c.who != Address::ZERO, "New lender cannot be zero")?;
                let position = self.open_position_mut(&c.positionId)?;
                require(sender == position.lender, "Only the lender can transfer the loan")?;
                position.lender = c.who;
                Ok(Outcome::none())
            }
            IMarginCalls::transferPosition(c) => {
                require(c.who != Address::ZERO, "New owner cannot be zero")?;
                let position = self.open_position_mut(&c.positionId)?;
                require(sender == position.owner, "Only the owner can transfer the position")?;
                position.owner = c.who;
                Ok(Outcome::none())
            }
            _ => Err("Not a state changing function".to_string()),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn check_new_position(
        &self,
        id: &B256,
        owner: Address,
        loan_owner: Address,
        owed_token: Address,
        held_token: Address,
        principal: U256,
        terms: &[u32; 4],
    ) -> Result<(), Revert> {
        require(!self.positions.contains_key(id), "PositionId already exists")?;
        require(owner != Address::ZERO, "Position owner cannot be zero")?;
        require(loan_owner != Address::ZERO, "Loan owner cannot be zero")?;
        require(owed_token != Address::ZERO, "Owed token cannot be zero")?;
        require(owed_token != held_token, "Owed token cannot equal held token")?;
        require(principal > U256::ZERO, "Principal must be positive")?;
        let [_, max_duration, _, interest_period] = *terms;
        require(max_duration > 0, "Max duration must be positive")?;
        require(interest_period <= max_duration, "Interest period exceeds max duration")?;
        Ok(())
    }

    fn open_position_call(
        &mut self,
        c: IMargin::openPositionCall,
        sender: Address,
    ) -> Result<Outcome, Revert> {
        let a = c.addresses;
        let v = c.values256;
        let (owner, owed_token, held_token, loan_owner, taker) = (a[0], a[1], a[2], a[4], a[5]);
        let (max_amount, min_amount, expiration) = (v[0], v[1], v[5]);
        let (principal, deposit, nonce) = (v[7], v[8], v[9]);

        let id = get_position_id(sender, nonce).0;
        self.check_new_position(&id, owner, loan_owner, owed_token, held_token, principal, &c.values32)?;
        require(!c.signature.is_empty(), "Loan offering is not signed")?;
        require(taker == Address::ZERO || taker == sender, "Invalid taker")?;
        require(expiration > U256::from(self.now), "Loan offering expired")?;
        require(principal >= min_amount, "Principal below loan minimum")?;

        let parties: [Address; 9] = [a[1], a[2], a[3], a[4], a[5], a[6], a[7], a[8], a[9]];
        let amounts: [U256; 7] = [v[0], v[1], v[2], v[3], v[4], v[5], v[6]];
        let hash = loan_hash(&parties, &amounts, &c.values32);
        let current = self.loans.get(&hash).cloned().unwrap_or_default();
        require(add(current.unavailable(), principal)? <= max_amount, "Loan offering amount exceeded")?;
        let balance = add(principal, deposit)?;
        let updated = LoanBook {
            filled: add(current.filled, principal)?,
            number: add(current.number, U256::from(1u64))?,
            ..current
        };

        self.loans.insert(hash, updated);

        let [call_time_limit, max_duration, interest_rate, interest_period] = c.values32;
        let now = self.now32();
        self.positions.insert(
            id,
            SimPosition {
                owed_token,
                held_token,
                lender: loan_owner,
                owner,
                principal,
                call_time_limit,
                start_timestamp: now,
                max_duration,
                interest_rate,
                interest_period,
                balance,
                ..SimPosition::default()
            },
        );

        Ok(Outcome::event(IMargin::PositionOpened {
            positionId: id,
            trader: sender,
            lender: loan_owner,
            loanHash: hash,
            owedToken: owed_token,
            heldToken: held_token,
            loanFeeRecipient: a[7],
            principal,
            heldTokenFromSell: principal,
            depositAmount: deposit,
            interestRate: U256::from(interest_rate),
            callTimeLimit: call_time_limit,
            maxDuration: max_duration,
            depositInHeldToken: c.depositInHeldToken,
        }))
    }

    fn open_without_counterparty(
        &mut self,
        c: IMargin::openWithoutCounterpartyCall,
        sender: Address,
    ) -> Result<Outcome, Revert> {
        let [position_owner, owed_token, held_token, loan_owner] = c.addresses;
        let [principal, deposit, nonce] = c.values256;

        let id = get_position_id(sender, nonce).0;
        self.check_new_position(
            &id,
            position_owner,
            loan_owner,
            owed_token,
            held_token,
            principal,
            &c.values32,
        )?;

        let [call_time_limit, max_duration, interest_rate, interest_period] = c.values32;
        let now = self.now32();
        self.positions.insert(
            id,
            SimPosition {
                owed_token,
                held_token,
                lender: loan_owner,
                owner: position_owner,
                principal,
                call_time_limit,
                start_timestamp: now,
                max_duration,
                interest_rate,
                interest_period,
                balance: deposit,
                ..SimPosition::default()
            },
        );

        Ok(Outcome::event(IMargin::PositionOpened {
            positionId: id,
            trader: sender,
            lender: loan_owner,
            loanHash: B256::ZERO,
            owedToken: owed_token,
            heldToken: held_token,
            loanFeeRecipient: Address::ZERO,
            principal,
            heldTokenFromSell: U256::ZERO,
            depositAmount: deposit,
            interestRate: U256::from(interest_rate),
            callTimeLimit: call_time_limit,
            maxDuration: max_duration,
            depositInHeldToken: true,
        }))
    }

    fn increase_position(
        &mut self,
        c: IMargin::increasePositionCall,
        sender: Address,
    ) -> Result<Outcome, Revert> {
        let a = c.addresses;
        let v = c.values256;
        let principal = v[7];

        require(principal > U256::ZERO, "Principal to add must be positive")?;
        require(!c.signature.is_empty(), "Loan offering is not signed")?;
        require(a[1] == Address::ZERO || a[1] == sender, "Invalid taker")?;
        require(v[5] > U256::from(self.now), "Loan offering expired")?;
        require(principal >= v[1] && principal <= v[0], "Principal outside loan bounds")?;

        let position = self.open_position(&c.positionId)?;
        require(
            c.values32 == [position.call_time_limit, position.max_duration],
            "Loan terms do not match position",
        )?;

        let new_principal = add(position.principal, principal)?;
        let new_balance = add(position.balance, principal)?;

        let position = self.open_position_mut(&c.positionId)?;
        position.principal = new_principal;
        position.balance = new_balance;
        Ok(Outcome::none())
    }

    fn close(
        &mut self,
        id: B256,
        close_amount: U256,
        payout_recipient: Address,
        payout_in_held_token: bool,
        sender: Address,
    ) -> Result<Outcome, Revert> {
        require(close_amount > U256::ZERO, "Close amount must be positive")?;
        require(payout_recipient != Address::ZERO, "Payout recipient cannot be zero")?;

        let position = self.open_position_mut(&id)?;
        require(sender == position.owner, "Only the owner can close")?;
        require(close_amount <= position.principal, "Close amount exceeds principal")?;

        // held token released pro rata, owed token repaid flat
        let released = mul(position.balance, close_amount)? / position.principal;
        let payout = released.saturating_sub(close_amount);
        let repaid = add(position.repaid, close_amount)?;
        position.principal -= close_amount;
        position.balance -= released;
        position.repaid = repaid;
        let remaining = position.principal;
        if remaining.is_zero() {
            position.closed = true;
            position.call_timestamp = 0;
            position.required_deposit = U256::ZERO;
        }

        Ok(Outcome::event(IMargin::PositionClosed {
            positionId: id,
            closer: sender,
            payoutRecipient: payout_recipient,
            closeAmount: close_amount,
            remainingAmount: remaining,
            owedTokenPaidToLender: close_amount,
            payoutAmount: payout,
            buybackCostInHeldToken: close_amount,
            payoutInHeldToken: payout_in_held_token,
        }))
    }

    // 9.2: constant reads. unknown ids read as zero, like contract storage.
    fn query(&self, call: IMarginCalls) -> Result<Vec<u8>, Revert> {
        let empty = SimPosition::default();
        let position = |id: &B256| self.positions.get(id).unwrap_or(&empty);
        let loan = |hash: &B256| self.loans.get(hash).cloned().unwrap_or_default();

        let encoded = match call {
            IMarginCalls::getPosition(c) => {
                let p = position(&c.positionId);
                IMargin::getPositionCall::abi_encode_returns(&(
                    [p.owed_token, p.held_token, p.lender, p.owner],
                    [p.principal, p.required_deposit],
                    [
                        p.call_time_limit,
                        p.start_timestamp,
                        p.call_timestamp,
                        p.max_duration,
                        p.interest_rate,
                        p.interest_period,
                    ],
                ))
            }
            IMarginCalls::containsPosition(c) => {
                let contained = self.positions.get(&c.positionId).is_some_and(|p| !p.closed);
                IMargin::containsPositionCall::abi_encode_returns(&(contained,))
            }
            IMarginCalls::isPositionCalled(c) => {
                let called = position(&c.positionId).call_timestamp != 0;
                IMargin::isPositionCalledCall::abi_encode_returns(&(called,))
            }
            IMarginCalls::isPositionClosed(c) => {
                IMargin::isPositionClosedCall::abi_encode_returns(&(position(&c.positionId).closed,))
            }
            IMarginCalls::getTotalOwedTokenRepaidToLender(c) => {
                IMargin::getTotalOwedTokenRepaidToLenderCall::abi_encode_returns(&(
                    position(&c.positionId).repaid,
                ))
            }
            IMarginCalls::getPositionBalance(c) => {
                IMargin::getPositionBalanceCall::abi_encode_returns(&(position(&c.positionId).balance,))
            }
            IMarginCalls::getTimeUntilInterestIncrease(c) => {
                let p = position(&c.positionId);
                let remaining = if p.closed || p.interest_period == 0 || p.start_timestamp == 0 {
                    0
                } else {
                    let elapsed = self.now32().saturating_sub(p.start_timestamp);
                    p.interest_period - elapsed % p.interest_period
                };
                IMargin::getTimeUntilInterestIncreaseCall::abi_encode_returns(&(U256::from(remaining),))
            }
            IMarginCalls::getPositionOwedAmount(c) => {
                IMargin::getPositionOwedAmountCall::abi_encode_returns(&(position(&c.positionId).principal,))
            }
            IMarginCalls::getPositionOwedAmountAtTime(c) => {
                let p = self.open_position(&c.positionId)?;
                require(c.principalToClose <= p.principal, "Close amount exceeds principal")?;
                IMargin::getPositionOwedAmountAtTimeCall::abi_encode_returns(&(c.principalToClose,))
            }
            IMarginCalls::getLenderAmountForIncreasePositionAtTime(c) => {
                self.open_position(&c.positionId)?;
                IMargin::getLenderAmountForIncreasePositionAtTimeCall::abi_encode_returns(&(
                    c.principalToAdd,
                ))
            }
            IMarginCalls::getLoanUnavailableAmount(c) => {
                IMargin::getLoanUnavailableAmountCall::abi_encode_returns(&(loan(&c.loanHash).unavailable(),))
            }
            IMarginCalls::getLoanFilledAmount(c) => {
                IMargin::getLoanFilledAmountCall::abi_encode_returns(&(loan(&c.loanHash).filled,))
            }
            IMarginCalls::getLoanCanceledAmount(c) => {
                IMargin::getLoanCanceledAmountCall::abi_encode_returns(&(loan(&c.loanHash).canceled,))
            }
            IMarginCalls::getLoanNumber(c) => {
                IMargin::getLoanNumberCall::abi_encode_returns(&(loan(&c.loanHash).number,))
            }
            IMarginCalls::isLoanApproved(_) => {
                // no on-chain approvals in the simulation
                IMargin::isLoanApprovedCall::abi_encode_returns(&(false,))
            }
            _ => return Err("Not a constant function".to_string()),
        };
        Ok(encoded)
    }
}

fn reverted(reason: Revert) -> TransportError {
    TransportError::Reverted {
        reason,
        data: Bytes::new(),
    }
}

#[async_trait]
impl MarginTransport for SimulatedMargin {
    async fn send_transaction(
        &self,
        to: Address,
        calldata: Bytes,
        context: CallContext,
    ) -> Result<TxReceipt, TransportError> {
        let mut state = self.state.lock().await;
        state.take_fault()?;

        if to != self.address {
            return Err(TransportError::Rpc {
                code: -32000,
                message: format!("no contract deployed at {to}"),
            });
        }
        if let Some(limit) = context.gas {
            let needed = BASE_GAS + calldata.len() as u64 * 16;
            if limit < needed {
                return Err(reverted("out of gas".to_string()));
            }
        }

        let call = IMarginCalls::abi_decode(&calldata, true)
            .map_err(|err| reverted(format!("invalid calldata: {err}")))?;
        let outcome = state.execute(call, context.from).map_err(reverted)?;

        let now = state.now;
        state.block_timestamps.push(now);
        let block_number = state.block_timestamps.len() as u64;

        let mut preimage = calldata.to_vec();
        preimage.extend_from_slice(&block_number.to_be_bytes());
        let transaction_hash = keccak256(preimage);

        for log in outcome.events {
            state.logs.push(RawLog {
                address: self.address,
                block_number,
                transaction_hash,
                topics: log.topics().to_vec(),
                data: log.data,
            });
        }

        Ok(TxReceipt {
            transaction_hash,
            block_number,
            gas_used: BASE_GAS + calldata.len() as u64 * 16,
            success: true,
            position_id: None,
        })
    }

    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, TransportError> {
        let mut state = self.state.lock().await;
        state.take_fault()?;

        if to != self.address {
            // calls to empty accounts return nothing
            return Ok(Bytes::new());
        }

        let call = IMarginCalls::abi_decode(&calldata, true)
            .map_err(|err| reverted(format!("invalid calldata: {err}")))?;
        state.query(call).map(Bytes::from).map_err(reverted)
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>, TransportError> {
        let mut state = self.state.lock().await;
        state.take_fault()?;
        let head = state.block_timestamps.len() as u64;
        Ok(state.logs.iter().filter(|log| filter.matches(log, head)).cloned().collect())
    }

    async fn block_timestamp(&self, block_number: u64) -> Result<u64, TransportError> {
        let mut state = self.state.lock().await;
        state.take_fault()?;
        block_number
            .checked_sub(1)
            .and_then(|index| state.block_timestamps.get(index as usize).copied())
            .ok_or(TransportError::Rpc {
                code: -32000,
                message: format!("unknown block {block_number}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_foreign_calldata() {
        let sim = SimulatedMargin::new(Address::repeat_byte(1), 1_000);
        let result = sim
            .send_transaction(
                sim.address(),
                Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
                crate::transport::CallOptions::new().into_context(Address::repeat_byte(2)),
            )
            .await;
        assert!(matches!(result, Err(TransportError::Reverted { .. })));
        assert_eq!(sim.block_number().await, 0);
    }

    #[tokio::test]
    async fn unknown_block_is_an_rpc_error() {
        let sim = SimulatedMargin::new(Address::repeat_byte(1), 1_000);
        assert!(matches!(sim.block_timestamp(0).await, Err(TransportError::Rpc { .. })));
        assert!(matches!(sim.block_timestamp(1).await, Err(TransportError::Rpc { .. })));
    }

    #[tokio::test]
    async fn injected_fault_fires_once() {
        let sim = SimulatedMargin::new(Address::repeat_byte(1), 1_000);
        sim.fail_next(TransportError::Timeout).await;

        let filter = LogFilter {
            address: sim.address(),
            event_signature: IMargin::PositionOpened::SIGNATURE_HASH,
            position_id: B256::ZERO,
            from_block: crate::transport::BlockTag::Number(0),
            to_block: crate::transport::BlockTag::Latest,
        };
        assert_eq!(sim.get_logs(&filter).await, Err(TransportError::Timeout));
        assert_eq!(sim.get_logs(&filter).await, Ok(Vec::new()));
    }
}
