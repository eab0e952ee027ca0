// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/miner/hasher/midstate.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements the midstate hasher. The first 64 bytes of the padded
// header never change within a work item, so their SHA-256 state is computed
// once at load time and each nonce only compresses the second block, which
// already carries the padding and length suffix.
//
// Tree Location:
// - src/miner/hasher/midstate.rs (midstate SHA256d search)
// - Depends on: sha2 (compress feature)

use super::{Hasher, LoadedWork};
use crate::core::difficulty::hash_meets_target;
use crate::core::error::HasherError;
use crate::core::types::{HEADER_BUFFER_LEN, NONCE_OFFSET};
use sha2::digest::generic_array::GenericArray;
use sha2::{Digest, Sha256, compress256};

const SHA256_IV: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

const BLOCK_LEN: usize = 64;
/// Nonce offset inside the second block.
const BLOCK_NONCE_OFFSET: usize = NONCE_OFFSET - BLOCK_LEN;

#[derive(Debug, Default)]
pub struct MidstateHasher {
    work: Option<LoadedWork>,
    midstate: [u32; 8],
}

impl MidstateHasher {
    pub fn new() -> Self {
        Self::default()
    }

    fn first_hash(&self, tail: &[u8; BLOCK_LEN]) -> [u8; 32] {
        let mut state = self.midstate;
        compress256(&mut state, &[GenericArray::clone_from_slice(tail)]);
        let mut digest = [0u8; 32];
        for (chunk, word) in digest.chunks_exact_mut(4).zip(state.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        digest
    }
}

impl Hasher for MidstateHasher {
    fn load(&mut self, header: &[u8; HEADER_BUFFER_LEN], target: &[u8; 32], start_nonce: u32, range: u32) {
        let mut state = SHA256_IV;
        compress256(&mut state, &[GenericArray::clone_from_slice(&header[..BLOCK_LEN])]);
        self.midstate = state;
        self.work = Some(LoadedWork {
            header: *header,
            target: *target,
            start_nonce,
            range,
        });
    }

    fn search(&mut self) -> Result<Option<u32>, HasherError> {
        let work = self.work.as_ref().ok_or(HasherError::NotLoaded)?;
        let mut tail = [0u8; BLOCK_LEN];
        tail.copy_from_slice(&work.header[BLOCK_LEN..]);

        for offset in 0..work.range {
            let nonce = work.start_nonce.wrapping_add(offset);
            tail[BLOCK_NONCE_OFFSET..BLOCK_NONCE_OFFSET + 4].copy_from_slice(&nonce.to_be_bytes());
            let first = self.first_hash(&tail);
            let hash: [u8; 32] = Sha256::digest(first).into();
            if hash_meets_target(&hash, &work.target) {
                return Ok(Some(nonce));
            }
        }
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "midstate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sha256::{pad_header, sha256d_header_with_nonce};
    use crate::core::types::HEADER_LEN;
    use crate::miner::hasher::test_vectors::*;

    #[test]
    fn test_first_hash_matches_plain_sha256() {
        let padded = pad_header(&genesis_prefix());
        let mut hasher = MidstateHasher::new();
        hasher.load(&padded, &[0; 32], 0, 1);

        let mut tail = [0u8; BLOCK_LEN];
        tail.copy_from_slice(&padded[BLOCK_LEN..]);
        tail[BLOCK_NONCE_OFFSET..BLOCK_NONCE_OFFSET + 4].copy_from_slice(&GENESIS_NONCE.to_be_bytes());
        let first = hasher.first_hash(&tail);
        let double: [u8; 32] = Sha256::digest(first).into();

        let mut header = [0u8; HEADER_LEN];
        header.copy_from_slice(&padded[..HEADER_LEN]);
        assert_eq!(double, sha256d_header_with_nonce(&header, GENESIS_NONCE));
    }

    #[test]
    fn test_search_before_load() {
        assert_eq!(MidstateHasher::new().search(), Err(HasherError::NotLoaded));
    }
}
