// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/pool/mod.rs
// Version: 2.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file is the module declaration for the pool communication functionality
// of the miner, located in the pool subdirectory. It declares submodules
// and re-exports key types for use throughout the project.
//
// Tree Location:
// - src/pool/mod.rs (pool module entry point)
// - Submodules: client, messages, protocol

pub mod client;
pub mod messages;
pub mod protocol;

// Re-export key types for convenience
pub use client::{HttpRpcClient, RpcClient, with_retries};
pub use protocol::GbtProtocol;

// Changelog:
// - v2.0.0: Re-exports the JSON-RPC client trait and the getblocktemplate protocol.
// - v1.0.0 (2025-06-14): Extracted from monolithic main.rs.
