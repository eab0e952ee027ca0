// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/pool/protocol.rs
// Version: 2.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file builds the parameters of the three pool calls the miner makes:
// an immediate getblocktemplate, a longpoll getblocktemplate and submitblock.
//
// Tree Location:
// - src/pool/protocol.rs (getblocktemplate protocol logic)
// - Depends on: serde_json, crate::core

use crate::core::types::Solution;
use log::debug;
use serde_json::{Value, json};

const LOG_TARGET: &str = "gbt_miner::pool::protocol";

pub const GET_BLOCK_TEMPLATE: &str = "getblocktemplate";
pub const SUBMIT_BLOCK: &str = "submitblock";

/// Capabilities announced with every template request.
const CAPABILITIES: [&str; 5] = ["coinbasetxn", "workid", "coinbase/append", "time", "longpoll"];

/// Constructs parameters for the getblocktemplate protocol
pub struct GbtProtocol;

impl GbtProtocol {
    /// Parameters for an immediate template request
    pub fn template_request() -> Value {
        json!([{ "capabilities": CAPABILITIES }])
    }

    /// Parameters for a longpoll request; without an id the pool answers at once
    pub fn longpoll_request(longpoll_id: Option<&str>) -> Value {
        match longpoll_id {
            Some(id) => json!([{ "capabilities": CAPABILITIES, "longpollid": id }]),
            None => Self::template_request(),
        }
    }

    /// Parameters for submitting a solved header
    pub fn submit_request(solution: &Solution) -> Value {
        let data = solution.template.submission_hex(&solution.header);
        debug!(target: LOG_TARGET,
            "Submitting data_id={} nonce={:08x} ({} hex chars)",
            solution.data_id,
            solution.nonce,
            data.len()
        );
        match solution.template.work_id() {
            Some(work_id) => json!([data, { "workid": work_id }]),
            None => json!([data]),
        }
    }
}


// Changelog:
// - v2.0.0: Replaced Stratum login/submit messages with getblocktemplate calls.
// - v1.0.2 (2025-06-23): Fixed algo field format for pool compatibility.
