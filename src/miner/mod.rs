// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/miner/mod.rs
// Version: 2.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file is the module declaration for the mining side of the project:
// hasher backends, worker threads, statistics and the top-level miner.
//
// Tree Location:
// - src/miner/mod.rs (miner module entry point)
// - Submodules: gbt_miner, hasher, stats, worker

pub mod gbt_miner;
pub mod hasher;
pub mod stats;
pub mod worker;

// Re-export key types for convenience
pub use gbt_miner::GbtMiner;
pub use hasher::{Hasher, HasherKind};
pub use stats::{MinerStats, ShareLedger, ThreadStats};
pub use worker::WorkerPool;

// Changelog:
// - v2.0.0: Replaced the CPU/GPU Stratum miners with GbtMiner, the worker
//   pool and pluggable hashers.
// - v1.1.0 (2025-06-24): Added GPU mining module.
// - v1.0.0 (2025-06-14): Extracted from monolithic main.rs.
