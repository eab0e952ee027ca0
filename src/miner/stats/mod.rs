// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/miner/stats/mod.rs
// Version: 2.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file is the module declaration for share accounting and status
// reporting.
//
// Tree Location:
// - src/miner/stats/mod.rs (stats module entry point)
// - Submodules: miner_stats, share_ledger, thread_stats

pub mod miner_stats;
pub mod share_ledger;
pub mod thread_stats;

pub use miner_stats::{MinerStats, StatusSnapshot};
pub use share_ledger::{ShareLedger, ShareLog};
pub use thread_stats::ThreadStats;

// Changelog:
// - v2.0.0: Added the share ledger; dropped GPU info.
// - v1.0.0 (2025-06-14): Extracted from monolithic main.rs.
