// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/miner/stats/thread_stats.rs
// Version: 2.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements per-worker statistics: the instantaneous hash rate of
// the last finished work item and the liveness stamp an operator uses to spot
// a stuck or dead worker.
//
// Tree Location:
// - src/miner/stats/thread_stats.rs (per-worker statistics logic)
// - Depends on: std

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub struct ThreadStats {
    worker_id: usize,
    pub hashes_computed: AtomicU64,
    pub items_completed: AtomicU64,
    /// f64 bits of the last instantaneous rate
    current_hashrate: AtomicU64,
    last_seen: Mutex<Instant>,
}

impl ThreadStats {
    pub fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            hashes_computed: AtomicU64::new(0),
            items_completed: AtomicU64::new(0),
            current_hashrate: AtomicU64::new(0f64.to_bits()),
            last_seen: Mutex::new(Instant::now()),
        }
    }

    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    /// Mark the worker alive; called before every pull from the work queue.
    pub fn stamp(&self) {
        *self.last_seen.lock().unwrap_or_else(|e| e.into_inner()) = Instant::now();
    }

    pub fn since_last_seen(&self) -> Duration {
        self.last_seen.lock().unwrap_or_else(|e| e.into_inner()).elapsed()
    }

    pub fn is_alive(&self, window: Duration) -> bool {
        self.since_last_seen() <= window
    }

    /// Record one finished search of `hashes` nonces that took `elapsed`.
    pub fn record_search(&self, hashes: u64, elapsed: Duration) {
        self.hashes_computed.fetch_add(hashes, Ordering::Relaxed);
        self.items_completed.fetch_add(1, Ordering::Relaxed);
        let secs = elapsed.as_secs_f64();
        if secs > 0.0 {
            let rate = hashes as f64 / secs;
            self.current_hashrate.store(rate.to_bits(), Ordering::Relaxed);
        }
    }

    pub fn get_hashrate(&self) -> f64 {
        f64::from_bits(self.current_hashrate.load(Ordering::Relaxed))
    }
}


// Changelog:
// - v2.0.0: Replaced share dots and peak tracking with the instantaneous rate
//   of the last work item and a liveness stamp.
// - v1.0.1 (2025-06-14): Added peak hashrate tracking for benchmarking.
// - v1.0.0 (2025-06-14): Extracted from monolithic main.rs.
