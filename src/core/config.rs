// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/config.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file holds the runtime configuration handed to every component. The
// binary builds it from `Args`; tests build it directly.

use crate::core::error::{ConfigError, RpcError};
use crate::core::types::{DEFAULT_NSLICES, quantum};
use crate::miner::hasher::HasherKind;
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

/// Pool location with credentials split out of the url.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolEndpoint {
    pub url: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl PoolEndpoint {
    pub fn parse(pool_url: &str) -> Result<Self, RpcError> {
        let mut url = Url::parse(pool_url).map_err(|e| RpcError::InvalidUrl {
            url: pool_url.to_string(),
            message: e.to_string(),
        })?;

        let user = Some(url.username().to_string()).filter(|u| !u.is_empty());
        let password = url.password().map(str::to_string);
        if url.set_username("").is_err() || url.set_password(None).is_err() {
            return Err(RpcError::InvalidUrl {
                url: pool_url.to_string(),
                message: "url cannot carry credentials".to_string(),
            });
        }

        Ok(Self {
            url: url.to_string(),
            user,
            password,
        })
    }
}

/// Bounded retry with a pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MinerConfig {
    pub pool: PoolEndpoint,
    pub workers: usize,
    pub hasher: HasherKind,
    pub nslices: u32,
    pub work_queue_capacity: usize,
    pub send_queue_capacity: usize,
    pub retry: RetryPolicy,
    pub rpc_timeout: Duration,
    pub longpoll_timeout: Duration,
    /// Ask for the next template once the current one has less time left.
    pub low_water: Duration,
    pub status_interval: Duration,
    /// A worker whose liveness stamp is older than this counts as dead.
    pub liveness_window: Duration,
    pub share_log: Option<PathBuf>,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            pool: PoolEndpoint {
                url: "http://127.0.0.1:8332/".to_string(),
                user: None,
                password: None,
            },
            workers: 1,
            hasher: HasherKind::Midstate,
            nslices: DEFAULT_NSLICES,
            work_queue_capacity: 64,
            send_queue_capacity: 16,
            retry: RetryPolicy::default(),
            rpc_timeout: Duration::from_secs(30),
            longpoll_timeout: Duration::from_secs(60 * 60),
            low_water: Duration::from_secs(10),
            status_interval: Duration::from_secs(30),
            liveness_window: Duration::from_secs(60),
            share_log: None,
        }
    }
}

impl MinerConfig {
    pub fn quantum(&self) -> u32 {
        quantum(self.nslices)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.nslices.is_power_of_two() || !(2..=65536).contains(&self.nslices) {
            return Err(ConfigError::Invalid(format!(
                "nslices must be a power of two between 2 and 65536, got {}",
                self.nslices
            )));
        }
        if self.workers == 0 {
            return Err(ConfigError::Invalid("at least one worker is required".to_string()));
        }
        if self.work_queue_capacity == 0 || self.send_queue_capacity == 0 {
            return Err(ConfigError::Invalid("queue capacities must be non-zero".to_string()));
        }
        if self.retry.attempts == 0 {
            return Err(ConfigError::Invalid("retry attempts must be at least 1".to_string()));
        }
        Ok(())
    }
}
