// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/miner/hasher/cpu.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// Portable hasher: a full double SHA-256 of the 80-byte header per nonce.

use super::{Hasher, LoadedWork};
use crate::core::difficulty::hash_meets_target;
use crate::core::error::HasherError;
use crate::core::sha256::sha256d_header_with_nonce;
use crate::core::types::{HEADER_BUFFER_LEN, HEADER_LEN};

#[derive(Debug, Default)]
pub struct CpuHasher {
    work: Option<LoadedWork>,
}

impl CpuHasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Hasher for CpuHasher {
    fn load(&mut self, header: &[u8; HEADER_BUFFER_LEN], target: &[u8; 32], start_nonce: u32, range: u32) {
        self.work = Some(LoadedWork {
            header: *header,
            target: *target,
            start_nonce,
            range,
        });
    }

    fn search(&mut self) -> Result<Option<u32>, HasherError> {
        let work = self.work.as_ref().ok_or(HasherError::NotLoaded)?;
        let mut header = [0u8; HEADER_LEN];
        header.copy_from_slice(&work.header[..HEADER_LEN]);

        for offset in 0..work.range {
            let nonce = work.start_nonce.wrapping_add(offset);
            let hash = sha256d_header_with_nonce(&header, nonce);
            if hash_meets_target(&hash, &work.target) {
                return Ok(Some(nonce));
            }
        }
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "cpu"
    }
}
