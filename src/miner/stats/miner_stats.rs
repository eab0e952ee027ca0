// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/miner/stats/miner_stats.rs
// Version: 2.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements the miner-wide status surface: the sum of per-worker
// hash rates, the work queue depth, share totals and worker liveness. It is
// read by the status printer and never mutates miner state.
//
// Tree Location:
// - src/miner/stats/miner_stats.rs (miner-wide statistics logic)
// - Depends on: chrono, thread_stats, share_ledger, crate::work

use super::share_ledger::ShareLedger;
use super::thread_stats::ThreadStats;
use crate::core::types::WorkItem;
use crate::utils::format::FormatUtils;
use crate::work::mailbox::TemplateMailbox;
use crate::work::queue::WorkQueue;
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Point-in-time view of the miner.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub hashrate: f64,
    pub queue_depth: usize,
    pub template_pending: bool,
    pub accepted: u64,
    pub rejected: u64,
    pub failed: u64,
    pub started: DateTime<Local>,
    pub uptime: Duration,
    pub workers_alive: usize,
    pub workers_dead: Vec<usize>,
}

impl StatusSnapshot {
    pub fn status_line(&self) -> String {
        format!(
            "{} | queue: W:{}{} | shares: A:{} R:{} F:{} since {} ({})",
            FormatUtils::format_hashrate(self.hashrate),
            self.queue_depth,
            if self.template_pending { " T:1" } else { "" },
            self.accepted,
            self.rejected,
            self.failed,
            self.started.format("%Y-%m-%d %H:%M:%S"),
            FormatUtils::format_uptime(self.uptime)
        )
    }
}

pub struct MinerStats {
    pub thread_stats: Vec<Arc<ThreadStats>>,
    pub ledger: Arc<ShareLedger>,
    work_queue: Arc<WorkQueue<WorkItem>>,
    mailbox: Arc<TemplateMailbox>,
    liveness_window: Duration,
    start_time: Instant,
}

impl MinerStats {
    pub fn new(
        num_workers: usize,
        ledger: Arc<ShareLedger>,
        work_queue: Arc<WorkQueue<WorkItem>>,
        mailbox: Arc<TemplateMailbox>,
        liveness_window: Duration,
    ) -> Self {
        Self {
            thread_stats: (0..num_workers).map(|i| Arc::new(ThreadStats::new(i))).collect(),
            ledger,
            work_queue,
            mailbox,
            liveness_window,
            start_time: Instant::now(),
        }
    }

    pub fn liveness_window(&self) -> Duration {
        self.liveness_window
    }

    /// Sum of the workers' instantaneous rates.
    pub fn get_total_hashrate(&self) -> f64 {
        self.thread_stats.iter().map(|t| t.get_hashrate()).sum()
    }

    pub fn dead_workers(&self) -> Vec<usize> {
        self.thread_stats
            .iter()
            .filter(|t| !t.is_alive(self.liveness_window))
            .map(|t| t.worker_id())
            .collect()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let (accepted, rejected, failed) = self.ledger.totals();
        let workers_dead = self.dead_workers();
        StatusSnapshot {
            hashrate: self.get_total_hashrate(),
            queue_depth: self.work_queue.len(),
            template_pending: self.mailbox.has_pending(),
            accepted,
            rejected,
            failed,
            started: self.ledger.start_time(),
            uptime: self.start_time.elapsed(),
            workers_alive: self.thread_stats.len() - workers_dead.len(),
            workers_dead,
        }
    }
}


// Changelog:
// - v2.0.0: Rebuilt around the share ledger and work queue; the status line
//   replaces the text dashboard.
// - v1.0.3: Added activity log and hashrate history.
// - v1.0.0 (2025-06-14): Extracted from monolithic main.rs.
