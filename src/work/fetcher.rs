// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/work/fetcher.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements the template fetcher. It sleeps until the producer
// raises the need-template signal, issues one getblocktemplate call (with
// bounded retries) and publishes the result to the fetched slot of the
// mailbox. A failed cycle publishes nothing.
//
// Tree Location:
// - src/work/fetcher.rs (edge-triggered template fetching)
// - Depends on: crate::pool, crate::work::mailbox

use crate::core::config::RetryPolicy;
use crate::core::template::Template;
use crate::pool::client::{RpcClient, with_retries};
use crate::pool::protocol::{GET_BLOCK_TEMPLATE, GbtProtocol};
use crate::work::mailbox::TemplateMailbox;
use crate::work::shutdown::CancelToken;
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;

const LOG_TARGET: &str = "gbt_miner::work::fetcher";

/// Upper bound on how long the fetcher sleeps between run flag checks.
const REQUEST_WAIT: Duration = Duration::from_millis(500);

pub struct TemplateFetcher<R: RpcClient> {
    rpc: R,
    mailbox: Arc<TemplateMailbox>,
    retry: RetryPolicy,
    cancel: CancelToken,
}

impl<R: RpcClient> TemplateFetcher<R> {
    pub fn new(rpc: R, mailbox: Arc<TemplateMailbox>, retry: RetryPolicy, cancel: CancelToken) -> Self {
        Self {
            rpc,
            mailbox,
            retry,
            cancel,
        }
    }

    pub fn run(mut self) {
        while self.cancel.is_running() {
            if !self.mailbox.wait_for_request(REQUEST_WAIT) {
                if self.mailbox.is_closed() {
                    break;
                }
                continue;
            }
            self.fetch_once();
        }
        debug!(target: LOG_TARGET, "exiting");
    }

    /// One activation: fetch and publish, or re-arm the request after the
    /// retry delay so the producer is not left waiting on a failed cycle.
    pub fn fetch_once(&mut self) -> bool {
        debug!(target: LOG_TARGET, "Requesting template");
        match self.fetch() {
            Some(template) => {
                info!(target: LOG_TARGET,
                    "📋 Got template{}: {} variation(s), {}s to live",
                    template.height().map(|h| format!(" for height {}", h)).unwrap_or_default(),
                    template.variations(),
                    template.time_left().as_secs()
                );
                self.mailbox.publish_fetched(template);
                true
            }
            None => {
                error!(target: LOG_TARGET, "Template request failed");
                if self.cancel.sleep(self.retry.delay) {
                    self.mailbox.request_template();
                }
                false
            }
        }
    }

    fn fetch(&mut self) -> Option<Arc<Template>> {
        let params = GbtProtocol::template_request();
        with_retries(&mut self.rpc, &self.retry, &self.cancel, "getblocktemplate", |rpc| {
            let result = rpc.call(GET_BLOCK_TEMPLATE, params.clone())?;
            Ok(Template::from_response(&result)?)
        })
        .map(Arc::new)
    }
}
