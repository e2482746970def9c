// 4.0: typed argument groups. every remote call that takes address[] / uint256[] / uint32[]
// arrays is built from a named struct here, and the array order lives in exactly one place.
// 4.1 loan offering groups shared by open, increase and cancel.
// 4.2 per-operation argument structs and their call encodings.

use alloy_primitives::{Address, Bytes, U256};

use crate::abi::IMargin;
use crate::helpers::convert_interest_rate_to_protocol;
use crate::margin::MarginError;
use crate::types::{LoanOffering, PositionId};
use rust_decimal::Decimal;

// 4.1: the nine parties named by a loan offering, in protocol order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanParties {
    pub owed_token: Address,
    pub held_token: Address,
    pub payer: Address,
    pub owner: Address,
    pub taker: Address,
    pub position_owner: Address,
    pub fee_recipient: Address,
    pub lender_fee_token: Address,
    pub taker_fee_token: Address,
}

impl LoanParties {
    pub fn from_offering(offering: &LoanOffering) -> Self {
        Self {
            owed_token: offering.owed_token,
            held_token: offering.held_token,
            payer: offering.payer,
            owner: offering.owner,
            taker: offering.taker,
            position_owner: offering.position_owner,
            fee_recipient: offering.fee_recipient,
            lender_fee_token: offering.lender_fee_token_address,
            taker_fee_token: offering.taker_fee_token_address,
        }
    }

    pub fn to_array(&self) -> [Address; 9] {
        [
            self.owed_token,
            self.held_token,
            self.payer,
            self.owner,
            self.taker,
            self.position_owner,
            self.fee_recipient,
            self.lender_fee_token,
            self.taker_fee_token,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanAmounts {
    pub max_amount: U256,
    pub min_amount: U256,
    pub min_held_token: U256,
    pub lender_fee: U256,
    pub taker_fee: U256,
    pub expiration_timestamp: U256,
    pub salt: U256,
}

impl LoanAmounts {
    pub fn from_offering(offering: &LoanOffering) -> Self {
        Self {
            max_amount: offering.max_amount,
            min_amount: offering.min_amount,
            min_held_token: offering.min_held_token,
            lender_fee: offering.lender_fee,
            taker_fee: offering.taker_fee,
            expiration_timestamp: offering.expiration_timestamp,
            salt: offering.salt,
        }
    }

    pub fn to_array(&self) -> [U256; 7] {
        [
            self.max_amount,
            self.min_amount,
            self.min_held_token,
            self.lender_fee,
            self.taker_fee,
            self.expiration_timestamp,
            self.salt,
        ]
    }
}

// uint32 terms. interest_rate is already protocol scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanTerms {
    pub call_time_limit: u32,
    pub max_duration: u32,
    pub interest_rate: u32,
    pub interest_period: u32,
}

impl LoanTerms {
    pub fn new(
        call_time_limit: u32,
        max_duration: u32,
        interest_rate: Decimal,
        interest_period: u32,
    ) -> Result<Self, MarginError> {
        Ok(Self {
            call_time_limit,
            max_duration,
            interest_rate: scale_rate(interest_rate)?,
            interest_period,
        })
    }

    pub fn from_offering(offering: &LoanOffering) -> Result<Self, MarginError> {
        Self::new(
            offering.call_time_limit,
            offering.max_duration,
            offering.interest_rate,
            offering.interest_period,
        )
    }

    pub fn to_array(&self) -> [u32; 4] {
        [
            self.call_time_limit,
            self.max_duration,
            self.interest_rate,
            self.interest_period,
        ]
    }
}

fn scale_rate(rate: Decimal) -> Result<u32, MarginError> {
    convert_interest_rate_to_protocol(rate).ok_or_else(|| MarginError::Encode {
        field: "interestRate",
        reason: format!("{rate} does not scale into uint32"),
    })
}

// 4.2: openPosition. [owner, 9 parties, exchange] / [7 amounts, principal, deposit, nonce] / terms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPositionArgs {
    pub owner: Address,
    pub parties: LoanParties,
    pub exchange_wrapper: Address,
    pub amounts: LoanAmounts,
    pub principal: U256,
    pub deposit_amount: U256,
    pub nonce: U256,
    pub terms: LoanTerms,
    pub signature: Bytes,
    pub deposit_in_held_token: bool,
    pub order_data: Bytes,
}

impl OpenPositionArgs {
    pub fn addresses(&self) -> [Address; 11] {
        let p = self.parties.to_array();
        [
            self.owner,
            p[0], p[1], p[2], p[3], p[4], p[5], p[6], p[7], p[8],
            self.exchange_wrapper,
        ]
    }

    pub fn values256(&self) -> [U256; 10] {
        let a = self.amounts.to_array();
        [
            a[0], a[1], a[2], a[3], a[4], a[5], a[6],
            self.principal,
            self.deposit_amount,
            self.nonce,
        ]
    }

    pub fn values32(&self) -> [u32; 4] {
        self.terms.to_array()
    }

    pub fn to_call(&self) -> IMargin::openPositionCall {
        IMargin::openPositionCall {
            addresses: self.addresses(),
            values256: self.values256(),
            values32: self.values32(),
            signature: self.signature.clone(),
            depositInHeldToken: self.deposit_in_held_token,
            orderData: self.order_data.clone(),
        }
    }
}

// openWithoutCounterparty. [positionOwner, owedToken, heldToken, loanOwner] / [principal, deposit, nonce] / terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenWithoutCounterpartyArgs {
    pub position_owner: Address,
    pub owed_token: Address,
    pub held_token: Address,
    pub loan_owner: Address,
    pub principal: U256,
    pub deposit: U256,
    pub nonce: U256,
    pub terms: LoanTerms,
}

impl OpenWithoutCounterpartyArgs {
    pub fn addresses(&self) -> [Address; 4] {
        [self.position_owner, self.owed_token, self.held_token, self.loan_owner]
    }

    pub fn values256(&self) -> [U256; 3] {
        [self.principal, self.deposit, self.nonce]
    }

    pub fn values32(&self) -> [u32; 4] {
        self.terms.to_array()
    }

    pub fn to_call(&self) -> IMargin::openWithoutCounterpartyCall {
        IMargin::openWithoutCounterpartyCall {
            addresses: self.addresses(),
            values256: self.values256(),
            values32: self.values32(),
        }
    }
}

// increasePosition. the position already fixes owner, tokens and rate, so those are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncreasePositionArgs {
    pub position_id: PositionId,
    pub parties: LoanParties,
    pub exchange_wrapper: Address,
    pub amounts: LoanAmounts,
    pub principal: U256,
    pub call_time_limit: u32,
    pub max_duration: u32,
    pub deposit_in_held_token: bool,
    pub signature: Bytes,
    pub order_data: Bytes,
}

impl IncreasePositionArgs {
    pub fn addresses(&self) -> [Address; 7] {
        [
            self.parties.payer,
            self.parties.taker,
            self.parties.position_owner,
            self.parties.fee_recipient,
            self.parties.lender_fee_token,
            self.parties.taker_fee_token,
            self.exchange_wrapper,
        ]
    }

    pub fn values256(&self) -> [U256; 8] {
        let a = self.amounts.to_array();
        [a[0], a[1], a[2], a[3], a[4], a[5], a[6], self.principal]
    }

    pub fn values32(&self) -> [u32; 2] {
        [self.call_time_limit, self.max_duration]
    }

    pub fn to_call(&self) -> IMargin::increasePositionCall {
        IMargin::increasePositionCall {
            positionId: self.position_id.0,
            addresses: self.addresses(),
            values256: self.values256(),
            values32: self.values32(),
            depositInHeldToken: self.deposit_in_held_token,
            signature: self.signature.clone(),
            orderData: self.order_data.clone(),
        }
    }
}

// cancelLoanOffering. the bare offering groups plus the amount to cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelLoanOfferingArgs {
    pub parties: LoanParties,
    pub amounts: LoanAmounts,
    pub terms: LoanTerms,
    pub cancel_amount: U256,
}

impl CancelLoanOfferingArgs {
    pub fn from_offering(offering: &LoanOffering, cancel_amount: U256) -> Result<Self, MarginError> {
        Ok(Self {
            parties: LoanParties::from_offering(offering),
            amounts: LoanAmounts::from_offering(offering),
            terms: LoanTerms::from_offering(offering)?,
            cancel_amount,
        })
    }

    pub fn to_call(&self) -> IMargin::cancelLoanOfferingCall {
        IMargin::cancelLoanOfferingCall {
            addresses: self.parties.to_array(),
            values256: self.amounts.to_array(),
            values32: self.terms.to_array(),
            cancelAmount: self.cancel_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::B256;
    use alloy_sol_types::SolCall;
    use rust_decimal_macros::dec;

    fn addr(n: u8) -> Address {
        Address::repeat_byte(n)
    }

    fn val(n: u64) -> U256 {
        U256::from(n)
    }

    // every field gets a distinct marker so a swap shows up as a wrong index
    fn offering() -> LoanOffering {
        LoanOffering {
            owed_token: addr(1),
            held_token: addr(2),
            payer: addr(3),
            owner: addr(4),
            taker: addr(5),
            position_owner: addr(6),
            fee_recipient: addr(7),
            lender_fee_token_address: addr(8),
            taker_fee_token_address: addr(9),
            max_amount: val(101),
            min_amount: val(102),
            min_held_token: val(103),
            lender_fee: val(104),
            taker_fee: val(105),
            expiration_timestamp: val(106),
            salt: val(107),
            call_time_limit: 201,
            max_duration: 202,
            interest_rate: dec!(2),
            interest_period: 204,
            signature: Bytes::from(vec![0xab; 65]),
        }
    }

    fn open_args() -> OpenPositionArgs {
        let loan = offering();
        OpenPositionArgs {
            owner: addr(0xa0),
            parties: LoanParties::from_offering(&loan),
            exchange_wrapper: addr(0xee),
            amounts: LoanAmounts::from_offering(&loan),
            principal: val(108),
            deposit_amount: val(109),
            nonce: val(110),
            terms: LoanTerms::from_offering(&loan).unwrap(),
            signature: loan.signature.clone(),
            deposit_in_held_token: true,
            order_data: Bytes::from(vec![1, 2, 3]),
        }
    }

    #[test]
    fn open_position_addresses_order() {
        let expected = [
            addr(0xa0),
            addr(1), addr(2), addr(3), addr(4), addr(5), addr(6), addr(7), addr(8), addr(9),
            addr(0xee),
        ];
        assert_eq!(open_args().addresses(), expected);
    }

    #[test]
    fn open_position_values_order() {
        let expected: Vec<U256> = (101..=110).map(val).collect();
        assert_eq!(open_args().values256().to_vec(), expected);
        assert_eq!(open_args().values32(), [201, 202, 20_000_000, 204]);
    }

    #[test]
    fn open_position_call_round_trips_through_abi() {
        let args = open_args();
        let encoded = args.to_call().abi_encode();
        assert_eq!(&encoded[..4], &IMargin::openPositionCall::SELECTOR);

        let decoded = IMargin::openPositionCall::abi_decode(&encoded, true).unwrap();
        assert_eq!(decoded.addresses, args.addresses());
        assert_eq!(decoded.values32, args.values32());
        assert!(decoded.depositInHeldToken);
        assert_eq!(decoded.orderData, Bytes::from(vec![1, 2, 3]));
    }

    #[test]
    fn open_without_counterparty_order() {
        let args = OpenWithoutCounterpartyArgs {
            position_owner: addr(1),
            owed_token: addr(2),
            held_token: addr(3),
            loan_owner: addr(4),
            principal: val(10),
            deposit: val(20),
            nonce: val(30),
            terms: LoanTerms::new(1, 2, dec!(0.5), 3).unwrap(),
        };
        assert_eq!(args.addresses(), [addr(1), addr(2), addr(3), addr(4)]);
        assert_eq!(args.values256(), [val(10), val(20), val(30)]);
        assert_eq!(args.values32(), [1, 2, 5_000_000, 3]);
    }

    #[test]
    fn increase_position_drops_fixed_fields() {
        let loan = offering();
        let args = IncreasePositionArgs {
            position_id: PositionId(B256::repeat_byte(0x77)),
            parties: LoanParties::from_offering(&loan),
            exchange_wrapper: addr(0xee),
            amounts: LoanAmounts::from_offering(&loan),
            principal: val(108),
            call_time_limit: loan.call_time_limit,
            max_duration: loan.max_duration,
            deposit_in_held_token: false,
            signature: loan.signature.clone(),
            order_data: Bytes::new(),
        };

        assert_eq!(
            args.addresses(),
            [addr(3), addr(5), addr(6), addr(7), addr(8), addr(9), addr(0xee)]
        );
        let expected: Vec<U256> = (101..=108).map(val).collect();
        assert_eq!(args.values256().to_vec(), expected);
        assert_eq!(args.values32(), [201, 202]);
        assert_eq!(args.to_call().positionId, B256::repeat_byte(0x77));
    }

    #[test]
    fn cancel_uses_bare_offering_groups() {
        let args = CancelLoanOfferingArgs::from_offering(&offering(), val(55)).unwrap();
        let call = args.to_call();

        assert_eq!(
            call.addresses,
            [addr(1), addr(2), addr(3), addr(4), addr(5), addr(6), addr(7), addr(8), addr(9)]
        );
        let expected: Vec<U256> = (101..=107).map(val).collect();
        assert_eq!(call.values256.to_vec(), expected);
        assert_eq!(call.values32, [201, 202, 20_000_000, 204]);
        assert_eq!(call.cancelAmount, val(55));
    }

    #[test]
    fn unscalable_rate_is_an_encode_error() {
        let mut loan = offering();
        loan.interest_rate = dec!(-0.5);
        let err = LoanTerms::from_offering(&loan).unwrap_err();
        assert!(matches!(err, MarginError::Encode { field: "interestRate", .. }));
    }
}
