// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/pool/client.rs
// Version: 2.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements the JSON-RPC client used to talk to the pool and the
// bounded retry loop shared by the fetcher, the longpoll watcher and the
// submitter. Each component owns its own client so a long-running longpoll
// never blocks a submission.
//
// Tree Location:
// - src/pool/client.rs (pool RPC client logic)
// - Depends on: reqwest, serde_json, crate::core

use crate::core::config::{PoolEndpoint, RetryPolicy};
use crate::core::error::RpcError;
use crate::pool::messages::{RpcRequest, parse_response};
use crate::utils::user_agent::user_agent;
use crate::work::shutdown::CancelToken;
use log::{debug, warn};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;

const LOG_TARGET: &str = "gbt_miner::pool::client";

/// The pool as seen by the work-distribution components.
pub trait RpcClient: Send {
    fn call(&mut self, method: &str, params: Value) -> Result<Value, RpcError>;

    /// Rebuild the underlying connection after a failure.
    fn reconnect(&mut self) -> Result<(), RpcError>;
}

impl<R: RpcClient + ?Sized> RpcClient for Box<R> {
    fn call(&mut self, method: &str, params: Value) -> Result<Value, RpcError> {
        (**self).call(method, params)
    }

    fn reconnect(&mut self) -> Result<(), RpcError> {
        (**self).reconnect()
    }
}

/// JSON-RPC over HTTP with basic auth.
pub struct HttpRpcClient {
    endpoint: PoolEndpoint,
    timeout: Duration,
    http: Client,
    next_id: u64,
}

impl HttpRpcClient {
    pub fn new(endpoint: PoolEndpoint, timeout: Duration) -> Result<Self, RpcError> {
        let http = Self::build_http(timeout)?;
        Ok(Self {
            endpoint,
            timeout,
            http,
            next_id: 1,
        })
    }

    /// Client factory handed to `GbtMiner::start`; each component gets its
    /// own client with the timeout it needs.
    pub fn connector(endpoint: PoolEndpoint) -> impl Fn(Duration) -> Result<Box<dyn RpcClient>, RpcError> {
        move |timeout| {
            let client = HttpRpcClient::new(endpoint.clone(), timeout)?;
            Ok(Box::new(client) as Box<dyn RpcClient>)
        }
    }

    fn build_http(timeout: Duration) -> Result<Client, RpcError> {
        Ok(Client::builder()
            .timeout(timeout)
            .user_agent(user_agent())
            .build()?)
    }
}

impl RpcClient for HttpRpcClient {
    fn call(&mut self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id;
        self.next_id += 1;

        let mut request = self.http.post(&self.endpoint.url).json(&RpcRequest {
            id,
            method,
            params: &params,
        });
        if let Some(user) = &self.endpoint.user {
            request = request.basic_auth(user, self.endpoint.password.as_ref());
        }

        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        // bitcoind-style servers answer RPC errors with HTTP 500 and a JSON body
        if !status.is_success() && body.trim().is_empty() {
            return Err(RpcError::HttpStatus {
                status: status.as_u16(),
            });
        }
        parse_response(&body)
    }

    fn reconnect(&mut self) -> Result<(), RpcError> {
        debug!(target: LOG_TARGET, "Rebuilding HTTP client for {}", self.endpoint.url);
        self.http = Self::build_http(self.timeout)?;
        Ok(())
    }
}

/// Run `attempt` up to `policy.attempts` times, reconnecting and pausing
/// between failures. `None` when every attempt failed or the run flag was
/// cleared while waiting.
pub fn with_retries<R, T, F>(
    rpc: &mut R,
    policy: &RetryPolicy,
    cancel: &CancelToken,
    what: &str,
    mut attempt: F,
) -> Option<T>
where
    R: RpcClient + ?Sized,
    F: FnMut(&mut R) -> Result<T, RpcError>,
{
    for n in 1..=policy.attempts {
        match attempt(rpc) {
            Ok(value) => return Some(value),
            Err(e) => {
                warn!(target: LOG_TARGET, "{} attempt {}/{} failed: {}", what, n, policy.attempts, e);
            }
        }
        if let Err(e) = rpc.reconnect() {
            warn!(target: LOG_TARGET, "{} reconnect failed: {}", what, e);
        }
        if n == policy.attempts {
            break;
        }
        if !cancel.sleep(policy.delay) {
            debug!(target: LOG_TARGET, "{} retries abandoned on shutdown", what);
            break;
        }
    }
    None
}

// Changelog:
// - v2.0.0: Replaced the raw TCP Stratum client with a JSON-RPC HTTP client.
//   - Added the RpcClient trait and the with_retries helper.
// - v1.1.0 (2025-06-23): Added DNS resolution support
