// 2.0: pure unit and identity helpers. the protocol re-derives every value here on chain,
// so each function must agree with it bit for bit.

use alloy_primitives::{keccak256, Address, U256};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::PositionId;

/// Fixed point scale between a human interest rate and the protocol's uint32 slot.
pub const INTEREST_RATE_SCALE: Decimal = dec!(10_000_000);

/// keccak256 over the tightly packed `(address, uint256)` pair, i.e. solidity's
/// `keccak256(abi.encodePacked(trader, nonce))`.
pub fn get_position_id(trader: Address, nonce: U256) -> PositionId {
    let mut packed = [0u8; 52];
    packed[..20].copy_from_slice(trader.as_slice());
    packed[20..].copy_from_slice(&nonce.to_be_bytes::<32>());
    PositionId(keccak256(packed))
}

// 2.1: human → protocol. multiply then floor. None when the result does not fit uint32
// (negative rates included), which would otherwise be silently truncated by the encoder.
#[must_use]
pub fn convert_interest_rate_to_protocol(rate: Decimal) -> Option<u32> {
    let scaled = rate.checked_mul(INTEREST_RATE_SCALE)?.floor();
    scaled.to_u32()
}

// 2.2: protocol → human. divide then floor. lossy: anything below one whole unit is dropped.
pub fn convert_interest_rate_from_protocol(rate: u32) -> Decimal {
    (Decimal::from(rate) / INTEREST_RATE_SCALE).floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use alloy_sol_types::SolValue;

    #[test]
    fn position_id_is_packed_keccak() {
        let trader = address!("90f8bf6a479f320ead074411a4b0e7944ea8c9c1");
        let nonce = U256::from(7u64);

        let expected = keccak256((trader, nonce).abi_encode_packed());
        assert_eq!(get_position_id(trader, nonce).0, expected);

        // padded encoding would put the address in a full word
        let padded = keccak256((trader, nonce).abi_encode());
        assert_ne!(get_position_id(trader, nonce).0, padded);
    }

    #[test]
    fn position_id_depends_on_both_inputs() {
        let a = address!("90f8bf6a479f320ead074411a4b0e7944ea8c9c1");
        let b = address!("ffcf8fdee72ac11b5c542428b35eef5769c409f0");

        assert_eq!(get_position_id(a, U256::from(1u64)), get_position_id(a, U256::from(1u64)));
        assert_ne!(get_position_id(a, U256::from(1u64)), get_position_id(a, U256::from(2u64)));
        assert_ne!(get_position_id(a, U256::from(1u64)), get_position_id(b, U256::from(1u64)));
    }

    #[test]
    fn rate_to_protocol_floors() {
        assert_eq!(convert_interest_rate_to_protocol(dec!(1)), Some(10_000_000));
        assert_eq!(convert_interest_rate_to_protocol(dec!(0.1)), Some(1_000_000));
        // 0.00000009 * 1e7 = 0.9, floored away
        assert_eq!(convert_interest_rate_to_protocol(dec!(0.00000009)), Some(0));
        assert_eq!(convert_interest_rate_to_protocol(dec!(12.34567891)), Some(123_456_789));
    }

    #[test]
    fn rate_to_protocol_rejects_out_of_range() {
        assert_eq!(convert_interest_rate_to_protocol(dec!(-1)), None);
        // u32::MAX / 1e7 is roughly 429.49
        assert_eq!(convert_interest_rate_to_protocol(dec!(430)), None);
        assert!(convert_interest_rate_to_protocol(dec!(429)).is_some());
    }

    #[test]
    fn rate_from_protocol_truncates() {
        assert_eq!(convert_interest_rate_from_protocol(10_000_000), dec!(1));
        assert_eq!(convert_interest_rate_from_protocol(19_999_999), dec!(1));
        assert_eq!(convert_interest_rate_from_protocol(9_999_999), dec!(0));
        assert_eq!(convert_interest_rate_from_protocol(0), dec!(0));
    }
}
