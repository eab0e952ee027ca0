// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/work/longpoll.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements the longpoll watcher. It keeps one getblocktemplate
// call parked on the pool with the last longpoll id; when the pool answers,
// the new template replaces anything queued and preempts the producer.
//
// Tree Location:
// - src/work/longpoll.rs (longpoll template watcher)
// - Depends on: crate::pool, crate::work::mailbox

use crate::core::config::RetryPolicy;
use crate::core::template::Template;
use crate::pool::client::{RpcClient, with_retries};
use crate::pool::protocol::{GET_BLOCK_TEMPLATE, GbtProtocol};
use crate::work::mailbox::TemplateMailbox;
use crate::work::shutdown::CancelToken;
use log::{debug, error, info, warn};
use std::sync::Arc;

const LOG_TARGET: &str = "gbt_miner::work::longpoll";

/// Result of one longpoll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LongpollCycle {
    Published,
    Failed,
    /// The pool answered without a longpoll id.
    Unsupported,
}

pub struct LongpollWatcher<R: RpcClient> {
    rpc: R,
    mailbox: Arc<TemplateMailbox>,
    retry: RetryPolicy,
    cancel: CancelToken,
    longpoll_id: Option<String>,
}

impl<R: RpcClient> LongpollWatcher<R> {
    pub fn new(rpc: R, mailbox: Arc<TemplateMailbox>, retry: RetryPolicy, cancel: CancelToken) -> Self {
        Self {
            rpc,
            mailbox,
            retry,
            cancel,
            longpoll_id: None,
        }
    }

    pub fn longpoll_id(&self) -> Option<&str> {
        self.longpoll_id.as_deref()
    }

    pub fn run(mut self) {
        while self.cancel.is_running() {
            match self.poll_once() {
                LongpollCycle::Published => {}
                LongpollCycle::Failed => {
                    // pause before re-parking so a dead pool is not hammered
                    self.cancel.sleep(self.retry.delay);
                }
                LongpollCycle::Unsupported => {
                    warn!(target: LOG_TARGET, "Pool does not support longpoll, watcher stopped");
                    break;
                }
            }
        }
        debug!(target: LOG_TARGET, "exiting");
    }

    pub fn poll_once(&mut self) -> LongpollCycle {
        debug!(target: LOG_TARGET, "Initiating longpoll (id: {:?})", self.longpoll_id);
        let params = GbtProtocol::longpoll_request(self.longpoll_id.as_deref());
        let template = with_retries(&mut self.rpc, &self.retry, &self.cancel, "longpoll", |rpc| {
            let result = rpc.call(GET_BLOCK_TEMPLATE, params.clone())?;
            Ok(Template::from_response(&result)?)
        });

        let Some(template) = template else {
            error!(target: LOG_TARGET, "Longpoll failed");
            return LongpollCycle::Failed;
        };
        let Some(id) = template.longpoll_id().map(str::to_string) else {
            return LongpollCycle::Unsupported;
        };

        info!(target: LOG_TARGET,
            "⚡ Got template from longpoll{}",
            template.height().map(|h| format!(" for height {}", h)).unwrap_or_default()
        );
        self.longpoll_id = Some(id);
        self.mailbox.publish_longpoll(Arc::new(template));
        LongpollCycle::Published
    }
}
