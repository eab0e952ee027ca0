// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/template.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements the block template received from the pool. A template
// is parsed once by the thread that issued the RPC and is read-only after
// that, apart from the cursor over its header variations.
//
// Tree Location:
// - src/core/template.rs (pool work unit)
// - Depends on: serde_json, hex, crate::core::sha256, crate::core::difficulty

use crate::core::difficulty::{bits_to_target, target_to_bytes};
use crate::core::error::TemplateError;
use crate::core::sha256::{merkle_root, sha256d_hash};
use crate::core::types::{HEADER_LEN, HEADER_PREFIX_LEN};
use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// Template lifetime when the pool does not send `expires`.
pub const DEFAULT_EXPIRES_SECS: u64 = 120;

const TIME_OFFSET: usize = 68;

#[derive(Debug, Clone)]
struct BlockBody {
    coinbase: Vec<u8>,
    transactions: Vec<Vec<u8>>,
}

/// A pool-issued unit of work.
#[derive(Debug)]
pub struct Template {
    header_prefix: [u8; HEADER_PREFIX_LEN],
    target: [u8; 32],
    longpoll_id: Option<String>,
    work_id: Option<String>,
    height: Option<u64>,
    received_at: Instant,
    lifetime: Duration,
    variations: u32,
    next_variation: AtomicU32,
    body: Option<BlockBody>,
}

impl Template {
    /// Opaque template with a single header variation.
    pub fn new(header_prefix: [u8; HEADER_PREFIX_LEN], target: [u8; 32], lifetime: Duration) -> Self {
        Self {
            header_prefix,
            target,
            longpoll_id: None,
            work_id: None,
            height: None,
            received_at: Instant::now(),
            lifetime,
            variations: 1,
            next_variation: AtomicU32::new(0),
            body: None,
        }
    }

    /// Allow `count` time-rolled header variations.
    pub fn with_variations(mut self, count: u32) -> Self {
        self.variations = count.max(1);
        self
    }

    pub fn with_longpoll_id(mut self, id: impl Into<String>) -> Self {
        self.longpoll_id = Some(id.into());
        self
    }

    /// Build a template from a `getblocktemplate` result.
    pub fn from_response(resp: &Value) -> Result<Self, TemplateError> {
        if !resp.is_object() {
            return Err(TemplateError::InvalidValue { field: "result" });
        }

        let (header_prefix, body) = match resp.get("data").and_then(Value::as_str) {
            Some(data) => (opaque_prefix(data)?, None),
            None => full_prefix(resp)?,
        };

        let target = match resp.get("target").and_then(Value::as_str) {
            Some(hex_target) => fixed_hex::<32>("target", hex_target)?,
            None => target_to_bytes(bits_to_target(parse_bits(resp)?)),
        };

        let expires = resp
            .get("expires")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_EXPIRES_SECS);

        let curtime = u32::from_le_bytes([
            header_prefix[TIME_OFFSET],
            header_prefix[TIME_OFFSET + 1],
            header_prefix[TIME_OFFSET + 2],
            header_prefix[TIME_OFFSET + 3],
        ]);
        let variations = if time_is_mutable(resp) {
            let by_expiry = expires.max(1);
            let by_maxtime = resp
                .get("maxtime")
                .and_then(Value::as_u64)
                .map(|maxtime| maxtime.saturating_sub(curtime as u64) + 1)
                .unwrap_or(by_expiry);
            by_expiry.min(by_maxtime).min(u32::MAX as u64) as u32
        } else {
            1
        };

        Ok(Self {
            header_prefix,
            target,
            longpoll_id: resp.get("longpollid").and_then(Value::as_str).map(str::to_string),
            work_id: resp.get("workid").and_then(Value::as_str).map(str::to_string),
            height: resp.get("height").and_then(Value::as_u64),
            received_at: Instant::now(),
            lifetime: Duration::from_secs(expires),
            variations,
            next_variation: AtomicU32::new(0),
            body,
        })
    }

    /// Validity remaining, reaching zero at expiry.
    pub fn time_left(&self) -> Duration {
        self.lifetime.saturating_sub(self.received_at.elapsed())
    }

    pub fn is_expired(&self) -> bool {
        self.time_left().is_zero()
    }

    /// Whether further header variations remain to be handed out.
    pub fn work_left(&self) -> bool {
        self.next_variation.load(Ordering::Acquire) < self.variations
    }

    /// Hand out the next header variation and its data identifier.
    pub fn get_data(&self) -> Option<([u8; HEADER_PREFIX_LEN], u32)> {
        let variations = self.variations;
        let data_id = self
            .next_variation
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < variations).then(|| n + 1))
            .ok()?;
        Some((self.header_for(data_id), data_id))
    }

    fn header_for(&self, data_id: u32) -> [u8; HEADER_PREFIX_LEN] {
        let mut prefix = self.header_prefix;
        if data_id > 0 {
            let mut time = [0u8; 4];
            time.copy_from_slice(&prefix[TIME_OFFSET..TIME_OFFSET + 4]);
            let rolled = u32::from_le_bytes(time).wrapping_add(data_id);
            prefix[TIME_OFFSET..TIME_OFFSET + 4].copy_from_slice(&rolled.to_le_bytes());
        }
        prefix
    }

    pub fn target(&self) -> &[u8; 32] {
        &self.target
    }

    pub fn header_prefix(&self) -> &[u8; HEADER_PREFIX_LEN] {
        &self.header_prefix
    }

    pub fn longpoll_id(&self) -> Option<&str> {
        self.longpoll_id.as_deref()
    }

    pub fn work_id(&self) -> Option<&str> {
        self.work_id.as_deref()
    }

    pub fn height(&self) -> Option<u64> {
        self.height
    }

    pub fn variations(&self) -> u32 {
        self.variations
    }

    /// Hex payload for `submitblock`: the full block when the template carried
    /// its transactions, the bare header otherwise.
    pub fn submission_hex(&self, header: &[u8; HEADER_LEN]) -> String {
        let Some(body) = &self.body else {
            return hex::encode(header);
        };

        let mut block = Vec::with_capacity(
            HEADER_LEN
                + 9
                + body.coinbase.len()
                + body.transactions.iter().map(Vec::len).sum::<usize>(),
        );
        block.extend_from_slice(header);
        write_varint(&mut block, 1 + body.transactions.len() as u64);
        block.extend_from_slice(&body.coinbase);
        for tx in &body.transactions {
            block.extend_from_slice(tx);
        }
        hex::encode(block)
    }
}

fn time_is_mutable(resp: &Value) -> bool {
    resp.get("mutable")
        .and_then(Value::as_array)
        .map(|m| {
            m.iter()
                .filter_map(Value::as_str)
                .any(|s| s == "time" || s == "time/increment")
        })
        .unwrap_or(false)
}

fn opaque_prefix(data: &str) -> Result<[u8; HEADER_PREFIX_LEN], TemplateError> {
    let bytes = hex::decode(data).map_err(|source| TemplateError::InvalidHex { field: "data", source })?;
    if bytes.len() < HEADER_PREFIX_LEN {
        return Err(TemplateError::InvalidLength {
            field: "data",
            expected: HEADER_PREFIX_LEN,
            actual: bytes.len(),
        });
    }
    let mut prefix = [0u8; HEADER_PREFIX_LEN];
    prefix.copy_from_slice(&bytes[..HEADER_PREFIX_LEN]);
    Ok(prefix)
}

fn full_prefix(resp: &Value) -> Result<([u8; HEADER_PREFIX_LEN], Option<BlockBody>), TemplateError> {
    let version = resp
        .get("version")
        .and_then(Value::as_u64)
        .ok_or(TemplateError::MissingField { field: "version" })?;
    let version = u32::try_from(version).map_err(|_| TemplateError::InvalidValue { field: "version" })?;

    let prev_hash = display_hash(
        "previousblockhash",
        resp.get("previousblockhash")
            .and_then(Value::as_str)
            .ok_or(TemplateError::MissingField { field: "previousblockhash" })?,
    )?;

    let curtime = resp
        .get("curtime")
        .and_then(Value::as_u64)
        .ok_or(TemplateError::MissingField { field: "curtime" })?;
    let curtime = u32::try_from(curtime).map_err(|_| TemplateError::InvalidValue { field: "curtime" })?;

    let bits = parse_bits(resp)?;

    let coinbase_hex = resp
        .get("coinbasetxn")
        .and_then(|c| c.get("data"))
        .and_then(Value::as_str)
        .ok_or(TemplateError::MissingField { field: "coinbasetxn" })?;
    let coinbase =
        hex::decode(coinbase_hex).map_err(|source| TemplateError::InvalidHex { field: "coinbasetxn", source })?;

    let mut leaves = vec![sha256d_hash(&coinbase)];
    let mut transactions = Vec::new();
    if let Some(txs) = resp.get("transactions").and_then(Value::as_array) {
        for tx in txs {
            let data = tx
                .get("data")
                .and_then(Value::as_str)
                .ok_or(TemplateError::MissingField { field: "transactions.data" })?;
            let data =
                hex::decode(data).map_err(|source| TemplateError::InvalidHex { field: "transactions.data", source })?;
            let txid = match tx.get("txid").or_else(|| tx.get("hash")).and_then(Value::as_str) {
                Some(id) => display_hash("transactions.txid", id)?,
                None => sha256d_hash(&data),
            };
            leaves.push(txid);
            transactions.push(data);
        }
    }

    let mut prefix = [0u8; HEADER_PREFIX_LEN];
    prefix[0..4].copy_from_slice(&version.to_le_bytes());
    prefix[4..36].copy_from_slice(&prev_hash);
    prefix[36..68].copy_from_slice(&merkle_root(&leaves));
    prefix[68..72].copy_from_slice(&curtime.to_le_bytes());
    prefix[72..76].copy_from_slice(&bits.to_le_bytes());

    Ok((prefix, Some(BlockBody { coinbase, transactions })))
}

fn parse_bits(resp: &Value) -> Result<u32, TemplateError> {
    let bits = resp
        .get("bits")
        .and_then(Value::as_str)
        .ok_or(TemplateError::MissingField { field: "bits" })?;
    u32::from_str_radix(bits, 16).map_err(|_| TemplateError::InvalidValue { field: "bits" })
}

fn fixed_hex<const N: usize>(field: &'static str, value: &str) -> Result<[u8; N], TemplateError> {
    let bytes = hex::decode(value).map_err(|source| TemplateError::InvalidHex { field, source })?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| TemplateError::InvalidLength {
        field,
        expected: N,
        actual: bytes.len(),
    })
}

/// RPC hashes are displayed byte-reversed; headers carry internal order.
fn display_hash(field: &'static str, value: &str) -> Result<[u8; 32], TemplateError> {
    let mut hash = fixed_hex::<32>(field, value)?;
    hash.reverse();
    Ok(hash)
}

fn write_varint(out: &mut Vec<u8>, n: u64) {
    match n {
        0..=0xfc => out.push(n as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&n.to_le_bytes());
        }
    }
}
