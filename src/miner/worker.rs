// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/miner/worker.rs
// Version: 2.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements the worker pool: one OS thread per hasher, each
// pulling a work item, running the blocking range search and forwarding any
// found nonce to the submitter. A worker finishes its current search before
// it notices shutdown.
//
// Tree Location:
// - src/miner/worker.rs (hash worker threads)
// - Depends on: crossbeam, log, crate::miner::hasher, crate::work

use crate::core::types::{Solution, WorkItem};
use crate::miner::hasher::Hasher;
use crate::miner::stats::ThreadStats;
use crate::work::queue::WorkQueue;
use crate::work::shutdown::CancelToken;
use crossbeam::channel::Sender;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const LOG_TARGET: &str = "gbt_miner::miner::worker";

/// How long an idle worker waits on the queue before re-stamping liveness.
const PULL_INTERVAL: Duration = Duration::from_millis(500);

pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn one named thread per hasher. `stats` must hold one entry per hasher.
    pub fn spawn(
        hashers: Vec<Box<dyn Hasher>>,
        work_queue: Arc<WorkQueue<WorkItem>>,
        send_tx: Sender<Solution>,
        stats: &[Arc<ThreadStats>],
        cancel: CancelToken,
    ) -> crate::Result<Self> {
        if hashers.len() != stats.len() {
            return Err(format!("{} hashers for {} worker stats", hashers.len(), stats.len()).into());
        }

        let mut handles = Vec::with_capacity(hashers.len());
        for (id, (hasher, thread_stats)) in hashers.into_iter().zip(stats.iter()).enumerate() {
            let worker = Worker {
                id,
                hasher,
                work_queue: Arc::clone(&work_queue),
                send_tx: send_tx.clone(),
                stats: Arc::clone(thread_stats),
                cancel: cancel.clone(),
            };
            let handle = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || worker.run())?;
            handles.push(handle);
        }
        info!(target: LOG_TARGET, "⛏️  Started {} hash workers", handles.len());
        Ok(Self { handles })
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every worker to finish its current search and exit.
    pub fn join(self) {
        for handle in self.handles {
            if handle.join().is_err() {
                error!(target: LOG_TARGET, "A worker thread panicked");
            }
        }
    }
}

struct Worker {
    id: usize,
    hasher: Box<dyn Hasher>,
    work_queue: Arc<WorkQueue<WorkItem>>,
    send_tx: Sender<Solution>,
    stats: Arc<ThreadStats>,
    cancel: CancelToken,
}

impl Worker {
    fn run(mut self) {
        debug!(target: LOG_TARGET, "Worker {} using {} hasher", self.id, self.hasher.name());
        while self.cancel.is_running() {
            self.stats.stamp();
            let Some(item) = self.work_queue.get_timeout(PULL_INTERVAL) else {
                if self.work_queue.is_closed() {
                    break;
                }
                continue;
            };
            if !self.process(&item) {
                break;
            }
        }
        debug!(target: LOG_TARGET, "Worker {} exiting", self.id);
    }

    /// Search one item. False once the submitter is gone.
    fn process(&mut self, item: &WorkItem) -> bool {
        self.hasher.load(&item.header, &item.target, item.start_nonce, item.range);
        let started = Instant::now();
        let found = match self.hasher.search() {
            Ok(found) => found,
            Err(e) => {
                error!(target: LOG_TARGET,
                    "Worker {} search failed on data_id={} start={:08x}: {}",
                    self.id, item.data_id, item.start_nonce, e
                );
                return true;
            }
        };

        let hashes = match found {
            Some(nonce) => nonce.wrapping_sub(item.start_nonce) as u64 + 1,
            None => item.range as u64,
        };
        self.stats.record_search(hashes, started.elapsed());

        if let Some(nonce) = found {
            info!(target: LOG_TARGET, "💎 Worker {} found nonce {:08x}", self.id, nonce);
            if self.send_tx.send(item.solve(nonce)).is_err() {
                warn!(target: LOG_TARGET, "Send queue closed, dropping nonce {:08x}", nonce);
                return false;
            }
        }
        true
    }
}


// Changelog:
// - v2.0.0: Workers pull sliced work items from a bounded queue and delegate
//   the search to a pluggable hasher; replaces the broadcast-job mining loop.
// - v1.1.4: SHA-256 header building for Bitcoin-style pools.
