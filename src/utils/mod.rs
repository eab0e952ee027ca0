// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/utils/mod.rs
// Version: 1.1.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file is the module declaration for small helpers shared by the miner:
// status formatting and the user agent sent to the pool.
//
// Tree Location:
// - src/utils/mod.rs (utils module entry point)
// - Submodules: format, user_agent

pub mod format;
pub mod user_agent;

// Changelog:
// - v1.1.0: Added the HTTP user agent helper.
// - v1.0.0 (2025-06-14): Extracted from monolithic main.rs.
