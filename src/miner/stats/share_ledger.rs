// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/miner/stats/share_ledger.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements the share ledger: process-wide accepted / rejected /
// failed counters plus the append-only audit log. Only the submitter writes
// to it; the status printer reads the counters.
//
// Tree Location:
// - src/miner/stats/share_ledger.rs (share accounting and audit log)
// - Depends on: chrono, hex, log

use crate::core::types::{Solution, SubmitOutcome};
use chrono::{DateTime, Local};
use log::{error, info};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

const LOG_TARGET: &str = "gbt_miner::stats::share_ledger";

/// Append-only audit file, one line per submission attempt:
/// `<unix time> <header hex> <nonce hex> <accepted|rejected|failed>`.
pub struct ShareLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ShareLog {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        info!(target: LOG_TARGET, "📝 Share log: {}", path.display());
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one record and flush it so the file survives a crash.
    pub fn append(&mut self, solution: &Solution, outcome: &SubmitOutcome) -> io::Result<()> {
        writeln!(
            self.writer,
            "{} {} {} {}",
            chrono::Utc::now().timestamp(),
            hex::encode(solution.header),
            hex::encode(solution.nonce_bytes()),
            outcome.tag()
        )?;
        self.writer.flush()
    }
}

pub struct ShareLedger {
    pub accepted: AtomicU64,
    pub rejected: AtomicU64,
    pub failed: AtomicU64,
    start_time: DateTime<Local>,
    log: Option<Mutex<ShareLog>>,
}

impl ShareLedger {
    /// A ledger that only counts.
    pub fn new() -> Self {
        Self {
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            start_time: Local::now(),
            log: None,
        }
    }

    pub fn with_log(log: ShareLog) -> Self {
        Self {
            log: Some(Mutex::new(log)),
            ..Self::new()
        }
    }

    pub fn start_time(&self) -> DateTime<Local> {
        self.start_time
    }

    /// Count `outcome` and append its audit record. An audit write error is
    /// logged; the counters are updated regardless.
    pub fn record(&self, solution: &Solution, outcome: &SubmitOutcome) {
        let counter = match outcome {
            SubmitOutcome::Accepted => &self.accepted,
            SubmitOutcome::Rejected { .. } => &self.rejected,
            SubmitOutcome::Failed => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        if let Some(log) = &self.log {
            let mut log = log.lock().unwrap_or_else(|e| e.into_inner());
            if let Err(e) = log.append(solution, outcome) {
                error!(target: LOG_TARGET, "Failed to write {}: {}", log.path().display(), e);
            }
        }
    }

    pub fn totals(&self) -> (u64, u64, u64) {
        (
            self.accepted.load(Ordering::Relaxed),
            self.rejected.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed),
        )
    }
}

impl Default for ShareLedger {
    fn default() -> Self {
        Self::new()
    }
}
