// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/lib.rs
// Version: 2.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file serves as the library entry point for gbt-miner. It exports the
// modules the binary and the integration tests build on.
//
// Tree Location:
// - src/lib.rs (root library file)
// - Exports modules: core, miner, pool, utils, work

pub mod core;
pub mod miner;
pub mod pool;
pub mod utils;
pub mod work;

// Re-export commonly used types at the crate root for convenience
pub use crate::core::{MinerConfig, Template};
pub use crate::miner::{GbtMiner, HasherKind};
pub use crate::pool::HttpRpcClient;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

// Changelog:
// - v2.0.0: Reworked into a getblocktemplate miner; added the work module and
//   dropped benchmark, help and the optional TUI.
// - v1.0.2 (2025-06-15): Added help module support.
// - v1.0.0 (2025-06-14): Initial modular breakout from monolithic main.rs.
