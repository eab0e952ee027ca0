// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/sha256.rs
// Version: 2.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements the SHA256d (double SHA-256) primitives used by the
// template builder and the hasher backends: header hashing, merkle roots and
// the padded 128-byte header buffer handed to workers.

use crate::core::types::{HEADER_BUFFER_LEN, HEADER_LEN, HEADER_PREFIX_LEN, NONCE_OFFSET};
use sha2::{Digest, Sha256};

pub fn sha256d_hash(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

/// Hash an 80-byte header with `nonce` written big-endian into the nonce field.
pub fn sha256d_header_with_nonce(header: &[u8; HEADER_LEN], nonce: u32) -> [u8; 32] {
    let mut buf = *header;
    buf[NONCE_OFFSET..HEADER_LEN].copy_from_slice(&nonce.to_be_bytes());
    sha256d_hash(&buf)
}

/// Merkle root over leaves given in internal byte order. An odd level
/// duplicates its last node.
pub fn merkle_root(leaves: &[[u8; 32]]) -> [u8; 32] {
    if leaves.is_empty() {
        return [0u8; 32];
    }

    let mut level: Vec<[u8; 32]> = leaves.to_vec();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            if let Some(last) = level.last().copied() {
                level.push(last);
            }
        }
        level = level
            .chunks(2)
            .map(|pair| {
                let mut joined = [0u8; 64];
                joined[..32].copy_from_slice(&pair[0]);
                joined[32..].copy_from_slice(&pair[1]);
                sha256d_hash(&joined)
            })
            .collect();
    }
    level[0]
}

/// Lay the header prefix out in the fixed buffer the hashers expect: prefix
/// at 0, zeroed nonce at 76, SHA-256 padding byte at 80 and the 640-bit
/// message length in the last eight bytes.
pub fn pad_header(prefix: &[u8; HEADER_PREFIX_LEN]) -> [u8; HEADER_BUFFER_LEN] {
    let mut buf = [0u8; HEADER_BUFFER_LEN];
    buf[..HEADER_PREFIX_LEN].copy_from_slice(prefix);
    buf[HEADER_LEN] = 0x80;
    buf[HEADER_BUFFER_LEN - 8..].copy_from_slice(&((HEADER_LEN as u64) * 8).to_be_bytes());
    buf
}


// Changelog:
// - v2.0.0: Reworked for getblocktemplate mining.
//   - Added merkle_root and pad_header; nonce is written big-endian.
// - v1.0.4 (2025-06-18): Fixed type mismatches and compilation errors.
