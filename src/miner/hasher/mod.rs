// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/miner/hasher/mod.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file defines the hash-search capability every worker is bound to and
// the backends selectable from the command line.
//
// Tree Location:
// - src/miner/hasher/mod.rs (hasher capability entry point)
// - Submodules: cpu, midstate

pub mod cpu;
pub mod midstate;

pub use cpu::CpuHasher;
pub use midstate::MidstateHasher;

use crate::core::error::HasherError;
use crate::core::types::HEADER_BUFFER_LEN;

/// A range-bounded nonce search over one padded header.
///
/// `load` configures the search, `search` blocks until the range is
/// exhausted or a nonce meeting the target is found. The nonce is written
/// big-endian into the header before hashing.
pub trait Hasher: Send {
    fn load(&mut self, header: &[u8; HEADER_BUFFER_LEN], target: &[u8; 32], start_nonce: u32, range: u32);

    fn search(&mut self) -> Result<Option<u32>, HasherError>;

    fn name(&self) -> &'static str;
}

impl<H: Hasher + ?Sized> Hasher for Box<H> {
    fn load(&mut self, header: &[u8; HEADER_BUFFER_LEN], target: &[u8; 32], start_nonce: u32, range: u32) {
        (**self).load(header, target, start_nonce, range)
    }

    fn search(&mut self) -> Result<Option<u32>, HasherError> {
        (**self).search()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Hasher backend selectable with `--hasher`.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HasherKind {
    /// Portable double SHA-256 per nonce
    Cpu,
    /// Reuses the first-block SHA-256 state across nonces
    Midstate,
}

impl HasherKind {
    pub fn build(self) -> Result<Box<dyn Hasher>, HasherError> {
        Ok(match self {
            HasherKind::Cpu => Box::new(CpuHasher::new()),
            HasherKind::Midstate => Box::new(MidstateHasher::new()),
        })
    }

    /// One hasher per worker; fails before any thread exists.
    pub fn build_many(self, count: usize) -> Result<Vec<Box<dyn Hasher>>, HasherError> {
        (0..count).map(|_| self.build()).collect()
    }
}

/// Search parameters shared by the backends.
#[derive(Debug, Clone)]
pub(crate) struct LoadedWork {
    pub header: [u8; HEADER_BUFFER_LEN],
    pub target: [u8; 32],
    pub start_nonce: u32,
    pub range: u32,
}
