use bitcoin::Amount;

use crate::{BitcoinError, Result};

/// Minimum output value most relay policies will forward; also used as the
/// reveal transaction's dust-avoiding destination amount.
pub const DUST_LIMIT_SATS: u64 = 546;

const VERSION_SIZE: usize = 4;
const INPUT_COUNT_SIZE: usize = 1;
const OUTPUT_COUNT_SIZE: usize = 1;
const LOCKTIME_SIZE: usize = 4;
const MARKER_FLAG_SIZE: usize = 1;

/// `out point (36) + scriptSig length (1) + empty scriptSig (0) + sequence (4)
/// + witness item count (1) + (signature 73 + pubkey 34) / 4`.
const P2WPKH_INPUT_BASE_SIZE: usize = 69;

/// `out point (36) + scriptSig length (1) + empty scriptSig (0) + sequence (4)
/// + witness item count (3) + schnorr signature (65) / 4`; the script-path
/// witness items (script + control block) are added on top per input.
const P2TR_INPUT_BASE_SIZE: usize = 61;

/// `value (8) + scriptPubKey length (1) + scriptPubKey (25)`.
const P2WPKH_OUTPUT_BASE_SIZE: usize = 34;

/// `value (8) + scriptPubKey length (1) + scriptPubKey (34)`.
const P2TR_OUTPUT_BASE_SIZE: usize = 43;

/// Estimate a transaction's virtual size in vBytes.
///
/// `p2tr_witness_sizes` gives, for each taproot input spent via script path,
/// the size in bytes of its witness stack beyond the base schnorr signature
/// (i.e. the inscription script + control block for a reveal input).
#[must_use]
pub fn estimate_transaction_size(
    p2wpkh_inputs: u32,
    p2tr_inputs: &[usize],
    p2wpkh_outputs: u32,
    p2tr_outputs: u32,
) -> usize {
    let base_size = VERSION_SIZE + INPUT_COUNT_SIZE + OUTPUT_COUNT_SIZE + LOCKTIME_SIZE + MARKER_FLAG_SIZE;
    let p2wpkh_input_size = P2WPKH_INPUT_BASE_SIZE * p2wpkh_inputs as usize;
    let p2tr_input_size: usize =
        p2tr_witness_sizes_total(p2tr_inputs, P2TR_INPUT_BASE_SIZE);
    let p2wpkh_output_size = P2WPKH_OUTPUT_BASE_SIZE * p2wpkh_outputs as usize;
    let p2tr_output_size = P2TR_OUTPUT_BASE_SIZE * p2tr_outputs as usize;

    base_size + p2wpkh_input_size + p2tr_input_size + p2wpkh_output_size + p2tr_output_size
}

fn p2tr_witness_sizes_total(witness_sizes: &[usize], base: usize) -> usize {
    witness_sizes.iter().map(|w| base + w).sum()
}

/// Estimate the fee, in satoshis, for a transaction of the given shape at
/// `fee_rate` sat/vB.
///
/// # Errors
/// Returns [`BitcoinError::InvalidFeeRate`] if `fee_rate` is zero.
pub fn estimate_fee(
    p2wpkh_inputs: u32,
    p2tr_inputs: &[usize],
    p2wpkh_outputs: u32,
    p2tr_outputs: u32,
    fee_rate: u64,
) -> Result<Amount> {
    if fee_rate == 0 {
        return Err(BitcoinError::InvalidFeeRate(fee_rate));
    }
    let size = estimate_transaction_size(p2wpkh_inputs, p2tr_inputs, p2wpkh_outputs, p2tr_outputs);
    Ok(Amount::from_sat(size as u64 * fee_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_scales_with_rate() {
        let low = estimate_fee(1, &[200], 1, 1, 10).unwrap();
        let high = estimate_fee(1, &[200], 1, 1, 20).unwrap();
        let ratio = high.to_sat() as f64 / low.to_sat() as f64;
        assert!((ratio - 2.0).abs() < 0.2, "expected ~2x, got {ratio}");
    }

    #[test]
    fn zero_rate_is_rejected() {
        assert!(estimate_fee(1, &[], 1, 1, 0).is_err());
    }
}
