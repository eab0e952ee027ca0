// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/error.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file defines the error types shared by the pool client, the template
// parser, the hasher backends and the configuration layer.
//
// Tree Location:
// - src/core/error.rs (error taxonomy)
// - Depends on: thiserror, reqwest, hex

use thiserror::Error;

/// Failure of a single pool RPC attempt. Every variant is treated as
/// transient by the retrying callers.
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("transport error: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    #[error("pool answered with HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("pool returned error {code}: {message}")]
    Server { code: i64, message: String },

    #[error("malformed response: {message}")]
    Malformed { message: String },

    #[error("empty response")]
    Empty,

    #[error("invalid pool url {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

impl From<TemplateError> for RpcError {
    fn from(err: TemplateError) -> Self {
        RpcError::Malformed {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        RpcError::Malformed {
            message: err.to_string(),
        }
    }
}

/// A `getblocktemplate` result that cannot be turned into a `Template`.
#[derive(Error, Debug, PartialEq)]
pub enum TemplateError {
    #[error("missing field `{field}`")]
    MissingField { field: &'static str },

    #[error("field `{field}` is not valid hex: {source}")]
    InvalidHex {
        field: &'static str,
        #[source]
        source: hex::FromHexError,
    },

    #[error("field `{field}` has {actual} bytes, expected {expected}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("field `{field}` has an invalid value")]
    InvalidValue { field: &'static str },
}

/// Fault inside a hasher backend, distinct from "no nonce in range".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HasherError {
    #[error("search called before any work was loaded")]
    NotLoaded,

    #[error("hasher backend failure: {message}")]
    Backend { message: String },
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0}")]
    Invalid(String),
}
