// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/difficulty.rs
// Version: 2.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file contains the 256-bit target helpers: parsing the pool target,
// expanding compact nBits, comparing a header hash against a target and
// reporting the equivalent difficulty.

use log::warn;
use uint::construct_uint;

const LOG_TARGET: &str = "gbt_miner::difficulty";

construct_uint! {
    pub struct U256(4);
}

/// Difficulty 1 target (nBits 0x1d00ffff), big-endian.
const MAX_TARGET: [u8; 32] = [
    0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Convert Bitcoin difficulty bits (nBits) to target
pub fn bits_to_target(bits: u32) -> U256 {
    let exponent = ((bits >> 24) & 0xFF) as usize;
    let mantissa = bits & 0x00FF_FFFF;
    if exponent <= 3 {
        U256::from(mantissa >> (8 * (3 - exponent)))
    } else if exponent > 32 {
        warn!(target: LOG_TARGET, "nBits {:08x} overflows 256 bits", bits);
        U256::MAX
    } else {
        U256::from(mantissa) << (8 * (exponent - 3))
    }
}

pub fn target_to_bytes(target: U256) -> [u8; 32] {
    target.to_big_endian()
}

/// A header hash (as produced by SHA256d, little-endian number) meets a
/// big-endian target when it is numerically less than or equal to it.
pub fn hash_meets_target(hash: &[u8; 32], target: &[u8; 32]) -> bool {
    U256::from_little_endian(hash) <= U256::from_big_endian(target)
}

/// Share difficulty equivalent of a target, for logging.
pub fn target_difficulty(target: &[u8; 32]) -> f64 {
    let target = U256::from_big_endian(target);
    if target.is_zero() {
        warn!(target: LOG_TARGET, "Zero target has no finite difficulty");
        return f64::INFINITY;
    }
    u256_to_f64(U256::from_big_endian(&MAX_TARGET)) / u256_to_f64(target)
}

fn u256_to_f64(value: U256) -> f64 {
    value
        .0
        .iter()
        .rev()
        .fold(0.0, |acc, limb| acc * 18_446_744_073_709_551_616.0 + *limb as f64)
}


// Changelog:
// - v2.0.0: Reduced to 256-bit target handling for getblocktemplate work.
//   - Added hash_meets_target over little-endian hashes and big-endian targets.
//   - Added target_difficulty for log output.
// - v1.1.0 (2025-06-16): Added bits_to_target function for nBits conversion.
