// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/mod.rs
// Version: 2.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file is the module declaration for the core functionality of the
// miner, located in the core subdirectory. It declares submodules and
// re-exports key types for use throughout the project.

pub mod config;
pub mod difficulty;
pub mod error;
pub mod sha256;
pub mod template;
pub mod types;

// Re-export the most commonly used items
pub use config::{MinerConfig, PoolEndpoint, RetryPolicy};
pub use error::{ConfigError, HasherError, RpcError, TemplateError};
pub use sha256::{pad_header, sha256d_hash, sha256d_header_with_nonce};
pub use template::Template;
pub use types::{Args, Solution, SubmitOutcome, WorkItem};

// Changelog:
// - v2.0.0: Replaced SHA3x modules with template, config and error modules.
// - v1.0.1 (2025-06-16): Added simple SHA-256 support.
