//! Fee estimation for matched input sets
//!
//! The fee of a candidate spend depends only on its input count. The size
//! model assumes legacy pay-to-pubkey-hash inputs, two outputs (payment and
//! change) and a fixed transaction overhead; the size is priced at a fixed
//! per-kilobyte rate, rounded to the nearest whole fee unit and floored at
//! the protocol minimum.
//!
//! All arithmetic is integer arithmetic in minor units.

use bitcoin::Amount;

/// Size model and pricing constants
pub mod defaults {
    /// Estimated size of one signed input in bytes
    pub const INPUT_SIZE: u64 = 148;

    /// Estimated size of the two outputs (payment and change) in bytes
    pub const OUTPUTS_SIZE: u64 = 2 * 34;

    /// Fixed transaction overhead (version, counts, lock time) in bytes
    pub const TX_OVERHEAD: u64 = 10 + 9;

    /// Bytes per kilobyte used by the fee rate
    pub const KILOBYTE: u64 = 1024;

    /// Fee charged per kilobyte, in minor units
    pub const FEE_PER_KB: u64 = 100_000;

    /// Minimum fee accepted by the network, in minor units
    pub const MIN_FEE: u64 = 100_000;
}

/// Estimate the serialized size in bytes of a spend with `input_count` inputs
pub fn estimate_size(input_count: usize) -> u64 {
    (input_count as u64)
        .saturating_mul(defaults::INPUT_SIZE)
        .saturating_add(defaults::OUTPUTS_SIZE)
        .saturating_add(defaults::TX_OVERHEAD)
}

/// Estimate the fee for a spend with `input_count` inputs
///
/// The size is priced at [`defaults::FEE_PER_KB`] per kilobyte (truncated to
/// whole minor units), rounded half-up to a multiple of the per-kilobyte rate
/// and never less than [`defaults::MIN_FEE`].
///
/// # Arguments
/// * `input_count` - Number of inputs in the candidate set
///
/// # Returns
/// * The fee as an `Amount`
pub fn estimate_fee(input_count: usize) -> Amount {
    let raw = estimate_size(input_count).saturating_mul(defaults::FEE_PER_KB) / defaults::KILOBYTE;
    let rounded = raw.saturating_add(defaults::FEE_PER_KB / 2) / defaults::FEE_PER_KB
        * defaults::FEE_PER_KB;
    Amount::from_sat(rounded.max(defaults::MIN_FEE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_size() {
        assert_eq!(estimate_size(0), 87);
        assert_eq!(estimate_size(1), 235);
        assert_eq!(estimate_size(10), 1567);
    }

    #[test]
    fn test_small_spends_pay_minimum_fee() {
        for inputs in 0..=7 {
            assert_eq!(estimate_fee(inputs), Amount::from_sat(defaults::MIN_FEE), "inputs={}", inputs);
        }
    }

    #[test]
    fn test_fee_steps() {
        // 10 inputs: 1567 bytes -> 153_027 -> rounds to 200_000
        assert_eq!(estimate_fee(10), Amount::from_sat(200_000));
        // 17 inputs: 2603 bytes -> 254_199 -> rounds to 300_000
        assert_eq!(estimate_fee(17), Amount::from_sat(300_000));
        // 16 inputs: 2455 bytes -> 239_746 -> rounds to 200_000
        assert_eq!(estimate_fee(16), Amount::from_sat(200_000));
    }

    #[test]
    fn test_fee_is_monotonic() {
        let mut previous = estimate_fee(0);
        for inputs in 1..500 {
            let fee = estimate_fee(inputs);
            assert!(fee >= previous);
            assert_eq!(fee.to_sat() % defaults::FEE_PER_KB, 0);
            previous = fee;
        }
    }
}
