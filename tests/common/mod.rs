// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: tests/common/mod.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// Shared fixtures for the integration tests: a scripted pool standing in for
// the JSON-RPC server, stub hashers and template builders.

#![allow(dead_code)]

use gbt_miner::core::config::RetryPolicy;
use gbt_miner::core::error::{HasherError, RpcError};
use gbt_miner::core::template::Template;
use gbt_miner::core::types::{HEADER_BUFFER_LEN, HEADER_PREFIX_LEN};
use gbt_miner::miner::hasher::Hasher;
use gbt_miner::pool::client::RpcClient;
use serde_json::{Value, json};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// One scripted pool answer.
#[derive(Debug, Clone)]
pub enum Reply {
    Ok(Value),
    /// Transport-style failure.
    Fail,
    /// JSON-RPC error object.
    Server(i64, String),
    /// Answer after a pause, as a parked longpoll does.
    Delayed(Duration, Value),
}

/// What the pool does once the script runs out.
#[derive(Debug, Clone)]
pub enum Fallback {
    Fail,
    Reply(Value),
    /// Accept a submission once, reject any repeat as a duplicate.
    RejectDuplicates,
    /// Serve the template for getblocktemplate, accept every submitblock.
    Mining(Value),
}

#[derive(Debug)]
struct PoolState {
    script: VecDeque<Reply>,
    fallback: Fallback,
    calls: Vec<(String, Value)>,
    reconnects: usize,
    seen: HashSet<String>,
}

/// A pool shared by any number of `MockRpc` clients.
#[derive(Debug, Clone)]
pub struct MockPool {
    state: Arc<Mutex<PoolState>>,
}

impl MockPool {
    pub fn new(fallback: Fallback) -> Self {
        Self {
            state: Arc::new(Mutex::new(PoolState {
                script: VecDeque::new(),
                fallback,
                calls: Vec::new(),
                reconnects: 0,
                seen: HashSet::new(),
            })),
        }
    }

    pub fn failing() -> Self {
        Self::new(Fallback::Fail)
    }

    pub fn replying(value: Value) -> Self {
        Self::new(Fallback::Reply(value))
    }

    pub fn push(&self, reply: Reply) -> &Self {
        self.state.lock().unwrap().script.push_back(reply);
        self
    }

    pub fn client(&self) -> MockRpc {
        MockRpc { pool: self.clone() }
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn call_log(&self) -> Vec<(String, Value)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn reconnects(&self) -> usize {
        self.state.lock().unwrap().reconnects
    }
}

pub struct MockRpc {
    pool: MockPool,
}

impl RpcClient for MockRpc {
    fn call(&mut self, method: &str, params: Value) -> Result<Value, RpcError> {
        let reply = {
            let mut state = self.pool.state.lock().unwrap();
            state.calls.push((method.to_string(), params.clone()));
            match state.script.pop_front() {
                Some(reply) => reply,
                None => match state.fallback.clone() {
                    Fallback::Fail => Reply::Fail,
                    Fallback::Reply(value) => Reply::Ok(value),
                    Fallback::Mining(template) => match method {
                        "getblocktemplate" => Reply::Ok(template),
                        _ => Reply::Ok(Value::Null),
                    },
                    Fallback::RejectDuplicates => {
                        if state.seen.insert(params.to_string()) {
                            Reply::Ok(Value::Null)
                        } else {
                            Reply::Ok(json!("duplicate"))
                        }
                    }
                },
            }
        };

        match reply {
            Reply::Ok(value) => Ok(value),
            Reply::Fail => Err(RpcError::Malformed {
                message: "connection reset".to_string(),
            }),
            Reply::Server(code, message) => Err(RpcError::Server { code, message }),
            Reply::Delayed(pause, value) => {
                std::thread::sleep(pause);
                Ok(value)
            }
        }
    }

    fn reconnect(&mut self) -> Result<(), RpcError> {
        self.pool.state.lock().unwrap().reconnects += 1;
        Ok(())
    }
}

/// Record of every `load` a stub hasher saw: header tag byte, start, range.
pub type LoadLog = Arc<Mutex<Vec<(u8, u32, u32)>>>;

/// Finds `answer` when it falls inside the loaded range, otherwise nothing.
pub struct StubHasher {
    answer: Option<u32>,
    start: u32,
    range: u32,
    delay: Duration,
    loads: LoadLog,
}

impl StubHasher {
    pub fn never_finds() -> Self {
        Self::finding(None)
    }

    pub fn finding(answer: Option<u32>) -> Self {
        Self {
            answer,
            start: 0,
            range: 0,
            delay: Duration::ZERO,
            loads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn loads(&self) -> LoadLog {
        Arc::clone(&self.loads)
    }
}

impl Hasher for StubHasher {
    fn load(&mut self, header: &[u8; HEADER_BUFFER_LEN], _target: &[u8; 32], start_nonce: u32, range: u32) {
        self.start = start_nonce;
        self.range = range;
        self.loads.lock().unwrap().push((header[0], start_nonce, range));
    }

    fn search(&mut self) -> Result<Option<u32>, HasherError> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let end = self.start as u64 + self.range as u64;
        Ok(self.answer.filter(|n| *n >= self.start && (*n as u64) < end))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// A hasher whose backend always faults.
pub struct BrokenHasher;

impl Hasher for BrokenHasher {
    fn load(&mut self, _header: &[u8; HEADER_BUFFER_LEN], _target: &[u8; 32], _start_nonce: u32, _range: u32) {}

    fn search(&mut self) -> Result<Option<u32>, HasherError> {
        Err(HasherError::Backend {
            message: "device lost".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "broken"
    }
}

pub fn fast_retry(attempts: u32) -> RetryPolicy {
    RetryPolicy {
        attempts,
        delay: Duration::from_millis(5),
    }
}

/// Opaque single-variation template living for `lifetime`.
pub fn template(tag: u8, lifetime: Duration) -> Arc<Template> {
    let mut prefix = [0u8; HEADER_PREFIX_LEN];
    prefix[0] = tag;
    Arc::new(Template::new(prefix, [0xff; 32], lifetime))
}

/// A `getblocktemplate` result in the opaque `data` shape.
pub fn template_json(tag: u8, longpoll_id: Option<&str>) -> Value {
    let mut data = vec![0u8; 80];
    data[0] = tag;
    let mut result = json!({
        "data": hex::encode(data),
        "target": "00000000ffff0000000000000000000000000000000000000000000000000000",
        "expires": 120,
    });
    if let Some(id) = longpoll_id {
        result["longpollid"] = json!(id);
    }
    result
}

/// Poll `condition` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
