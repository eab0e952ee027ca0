// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/miner/gbt_miner.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file wires the miner together: it owns the shared queues, spawns the
// fetcher, longpoll, producer, submitter and worker threads, prints the
// periodic status line and tears everything down in order on shutdown.
//
// Tree Location:
// - src/miner/gbt_miner.rs (miner orchestration)
// - Depends on: crossbeam, tokio, crate::work, crate::miner

use crate::core::config::MinerConfig;
use crate::core::error::RpcError;
use crate::core::types::{Solution, WorkItem};
use crate::miner::hasher::Hasher;
use crate::miner::stats::{MinerStats, ShareLedger, ShareLog};
use crate::miner::worker::WorkerPool;
use crate::pool::client::RpcClient;
use crate::utils::format::FormatUtils;
use crate::work::{
    CancelToken, LongpollWatcher, Submitter, TemplateFetcher, TemplateMailbox, WorkProducer, WorkQueue,
};
use crossbeam::channel::bounded;
use log::{error, info, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const LOG_TARGET: &str = "gbt_miner::miner";

pub struct GbtMiner {
    cancel: CancelToken,
    mailbox: Arc<TemplateMailbox>,
    work_queue: Arc<WorkQueue<WorkItem>>,
    stats: Arc<MinerStats>,
    workers: Option<WorkerPool>,
    submitter: Option<JoinHandle<()>>,
    services: Vec<JoinHandle<()>>,
}

impl GbtMiner {
    /// Start every component. `hashers` must already be built, one per
    /// worker; `connect` builds an RPC client with the given timeout.
    pub fn start<F>(config: &MinerConfig, hashers: Vec<Box<dyn Hasher>>, connect: F) -> crate::Result<Self>
    where
        F: Fn(Duration) -> Result<Box<dyn RpcClient>, RpcError>,
    {
        config.validate()?;
        if hashers.len() != config.workers {
            return Err(format!("expected {} hashers, got {}", config.workers, hashers.len()).into());
        }

        let ledger = Arc::new(match &config.share_log {
            Some(path) => ShareLedger::with_log(ShareLog::open(path)?),
            None => ShareLedger::new(),
        });
        let cancel = CancelToken::new();
        let mailbox = Arc::new(TemplateMailbox::new());
        let work_queue = Arc::new(WorkQueue::new(config.work_queue_capacity));
        let stats = Arc::new(MinerStats::new(
            config.workers,
            Arc::clone(&ledger),
            Arc::clone(&work_queue),
            Arc::clone(&mailbox),
            config.liveness_window,
        ));
        let (send_tx, send_rx) = bounded::<Solution>(config.send_queue_capacity);

        // clients first so a bad pool url fails before any thread exists
        let fetch_rpc = connect(config.rpc_timeout)?;
        let longpoll_rpc = connect(config.longpoll_timeout)?;
        let submit_rpc = connect(config.rpc_timeout)?;

        let submitter = Submitter::new(submit_rpc, send_rx, ledger, config.retry, cancel.clone());
        let submitter = spawn_named("sendwork", move || submitter.run())?;

        let workers = WorkerPool::spawn(
            hashers,
            Arc::clone(&work_queue),
            send_tx,
            &stats.thread_stats,
            cancel.clone(),
        )?;

        let mut services = Vec::with_capacity(3);
        let producer = WorkProducer::new(
            Arc::clone(&mailbox),
            Arc::clone(&work_queue),
            config.nslices,
            config.low_water,
            cancel.clone(),
        );
        services.push(spawn_named("makework", move || producer.run())?);

        let fetcher = TemplateFetcher::new(fetch_rpc, Arc::clone(&mailbox), config.retry, cancel.clone());
        services.push(spawn_named("gettmpl", move || fetcher.run())?);

        let watcher = LongpollWatcher::new(longpoll_rpc, Arc::clone(&mailbox), config.retry, cancel.clone());
        services.push(spawn_named("longpoll", move || watcher.run())?);

        info!(target: LOG_TARGET,
            "🚀 Mining {} with {} worker(s), {} slices of {:#x} nonces",
            config.pool.url,
            config.workers,
            config.nslices,
            config.quantum()
        );

        Ok(Self {
            cancel,
            mailbox,
            work_queue,
            stats,
            workers: Some(workers),
            submitter: Some(submitter),
            services,
        })
    }

    pub fn stats(&self) -> Arc<MinerStats> {
        Arc::clone(&self.stats)
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn mailbox(&self) -> Arc<TemplateMailbox> {
        Arc::clone(&self.mailbox)
    }

    pub fn work_queue(&self) -> Arc<WorkQueue<WorkItem>> {
        Arc::clone(&self.work_queue)
    }

    /// Log a status line every `interval` until shutdown.
    pub fn start_status_printer(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let stats = Arc::clone(&self.stats);
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if cancel.is_cancelled() {
                    break;
                }
                let snapshot = stats.snapshot();
                info!(target: LOG_TARGET, "{}", snapshot.status_line());
                if !snapshot.workers_dead.is_empty() {
                    warn!(target: LOG_TARGET,
                        "💀 {} worker(s) not seen within {}: {:?}",
                        snapshot.workers_dead.len(),
                        FormatUtils::format_uptime(stats.liveness_window()),
                        snapshot.workers_dead
                    );
                }
            }
        })
    }

    /// Cancel, release blocked threads, let workers finish their current
    /// search, drain the send queue, then join the remaining threads.
    pub fn shutdown(mut self) {
        info!(target: LOG_TARGET, "🛑 Shutting down");
        self.cancel.cancel();
        self.mailbox.close();
        self.work_queue.close();

        if let Some(workers) = self.workers.take() {
            workers.join();
        }
        if let Some(submitter) = self.submitter.take() {
            join_logged("sendwork", submitter);
        }
        for handle in self.services.drain(..) {
            let name = handle.thread().name().unwrap_or("service").to_string();
            join_logged(&name, handle);
        }

        let (accepted, rejected, failed) = self.stats.ledger.totals();
        info!(target: LOG_TARGET, "Final shares: A:{} R:{} F:{}", accepted, rejected, failed);
    }
}

fn spawn_named<F>(name: &str, body: F) -> std::io::Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new().name(name.to_string()).spawn(body)
}

fn join_logged(name: &str, handle: JoinHandle<()>) {
    if handle.join().is_err() {
        error!(target: LOG_TARGET, "{} thread panicked", name);
    }
}
