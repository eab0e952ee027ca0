// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/work/submitter.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements the submitter: the single consumer of the send queue.
// Solutions are submitted one at a time, classified as accepted, rejected or
// failed, and recorded in the share ledger.
//
// Tree Location:
// - src/work/submitter.rs (serialized solution submission)
// - Depends on: crossbeam, crate::pool, crate::miner::stats

use crate::core::config::RetryPolicy;
use crate::core::error::RpcError;
use crate::core::types::{Solution, SubmitOutcome};
use crate::miner::stats::ShareLedger;
use crate::pool::client::{RpcClient, with_retries};
use crate::pool::messages::classify_submit_result;
use crate::pool::protocol::{GbtProtocol, SUBMIT_BLOCK};
use crate::work::shutdown::CancelToken;
use crossbeam::channel::{Receiver, RecvTimeoutError};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

const LOG_TARGET: &str = "gbt_miner::work::submitter";

const RECV_WAIT: Duration = Duration::from_millis(500);

pub struct Submitter<R: RpcClient> {
    rpc: R,
    send_rx: Receiver<Solution>,
    ledger: Arc<ShareLedger>,
    retry: RetryPolicy,
    cancel: CancelToken,
}

impl<R: RpcClient> Submitter<R> {
    pub fn new(
        rpc: R,
        send_rx: Receiver<Solution>,
        ledger: Arc<ShareLedger>,
        retry: RetryPolicy,
        cancel: CancelToken,
    ) -> Self {
        Self {
            rpc,
            send_rx,
            ledger,
            retry,
            cancel,
        }
    }

    /// Submit until every sender is gone. Solutions still queued at shutdown
    /// are submitted before exiting.
    pub fn run(mut self) {
        loop {
            match self.send_rx.recv_timeout(RECV_WAIT) {
                Ok(solution) => {
                    self.submit(&solution);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        debug!(target: LOG_TARGET, "exiting");
    }

    /// Submit one solution and record its outcome.
    pub fn submit(&mut self, solution: &Solution) -> SubmitOutcome {
        let params = GbtProtocol::submit_request(solution);
        let outcome = with_retries(&mut self.rpc, &self.retry, &self.cancel, "submitblock", |rpc| {
            match rpc.call(SUBMIT_BLOCK, params.clone()) {
                Ok(result) => Ok(classify_submit_result(&result)),
                // an error object is the pool's answer, not a transport fault
                Err(RpcError::Server { code, message }) => Ok(SubmitOutcome::Rejected {
                    reason: format!("{} (code {})", message, code),
                }),
                Err(e) => Err(e),
            }
        })
        .unwrap_or(SubmitOutcome::Failed);

        match &outcome {
            SubmitOutcome::Accepted => info!(target: LOG_TARGET, "✅ Sending nonce: Accepted"),
            SubmitOutcome::Rejected { reason } => {
                warn!(target: LOG_TARGET, "❌ Sending nonce: Rejected");
                warn!(target: LOG_TARGET, "   Reason: {}", reason);
            }
            SubmitOutcome::Failed => warn!(target: LOG_TARGET, "⚠️ Sending nonce: Failed"),
        }
        self.ledger.record(solution, &outcome);
        outcome
    }
}
