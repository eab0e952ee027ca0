// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/work/producer.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements the work producer. It takes the next template from the
// mailbox (longpoll first), cuts every header variation into `nslices` equal
// nonce ranges and feeds them to the bounded work queue. Slicing stops as soon
// as the template is retired; the queue is then cleared so no stale item ever
// reaches a worker.
//
// Tree Location:
// - src/work/producer.rs (template slicing)
// - Depends on: crate::core, crate::work

use crate::core::sha256::pad_header;
use crate::core::template::Template;
use crate::core::types::{WorkItem, quantum};
use crate::work::mailbox::{TemplateMailbox, TemplateOrigin};
use crate::work::queue::{PutError, WorkQueue};
use crate::work::shutdown::CancelToken;
use log::{debug, info};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

const LOG_TARGET: &str = "gbt_miner::work::producer";

/// How often a blocked put or a drain wait re-checks the retire conditions.
const RETIRE_POLL: Duration = Duration::from_millis(50);

/// Why the producer stopped slicing a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retired {
    Cancelled,
    Preempted,
    Expired,
    Exhausted,
}

impl fmt::Display for Retired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Retired::Cancelled => "shutdown",
            Retired::Preempted => "preempted by longpoll",
            Retired::Expired => "expired",
            Retired::Exhausted => "exhausted",
        })
    }
}

pub struct WorkProducer {
    mailbox: Arc<TemplateMailbox>,
    work_queue: Arc<WorkQueue<WorkItem>>,
    nslices: u32,
    low_water: Duration,
    cancel: CancelToken,
}

impl WorkProducer {
    pub fn new(
        mailbox: Arc<TemplateMailbox>,
        work_queue: Arc<WorkQueue<WorkItem>>,
        nslices: u32,
        low_water: Duration,
        cancel: CancelToken,
    ) -> Self {
        Self {
            mailbox,
            work_queue,
            nslices,
            low_water,
            cancel,
        }
    }

    pub fn run(self) {
        while self.cancel.is_running() {
            if !self.mailbox.has_pending() {
                self.mailbox.request_template();
            }
            debug!(target: LOG_TARGET, "waiting for template");
            let Some((template, origin)) = self.mailbox.take() else {
                break;
            };
            match origin {
                TemplateOrigin::Longpoll => info!(target: LOG_TARGET, "Got template from longpoll"),
                TemplateOrigin::Fetch => info!(target: LOG_TARGET, "Got template"),
            }
            self.produce(&template);
        }
        debug!(target: LOG_TARGET, "exiting");
    }

    /// Slice `template` until it is retired, then clear the work queue.
    pub fn produce(&self, template: &Arc<Template>) -> Retired {
        let mut reason = self.slice(template);
        if reason == Retired::Exhausted {
            reason = self.drain(template);
        }
        let dropped = self.work_queue.clear();
        debug!(target: LOG_TARGET, "Template {}: cleared {} queued item(s)", reason, dropped);
        reason
    }

    fn slice(&self, template: &Arc<Template>) -> Retired {
        let quantum = quantum(self.nslices);
        loop {
            if let Some(reason) = self.interrupted(template) {
                return reason;
            }
            let Some((prefix, data_id)) = template.get_data() else {
                return Retired::Exhausted;
            };
            debug!(target: LOG_TARGET, "data_id {}: {}s left", data_id, template.time_left().as_secs());
            let header = pad_header(&prefix);

            for index in 0..self.nslices {
                if let Some(reason) = self.interrupted(template) {
                    return reason;
                }
                self.request_ahead(template);
                let item = WorkItem {
                    template: Arc::clone(template),
                    data_id,
                    header,
                    target: *template.target(),
                    start_nonce: index.wrapping_mul(quantum),
                    range: quantum,
                };
                if let Err(reason) = self.enqueue(item, template) {
                    return reason;
                }
            }
        }
    }

    /// Blocking put that still notices a retire condition while the queue is full.
    fn enqueue(&self, mut item: WorkItem, template: &Arc<Template>) -> Result<(), Retired> {
        loop {
            match self.work_queue.put_timeout(item, RETIRE_POLL) {
                Ok(()) => return Ok(()),
                Err(PutError::Closed(_)) => return Err(Retired::Cancelled),
                Err(PutError::Timeout(back)) => item = back,
            }
            if let Some(reason) = self.interrupted(template) {
                return Err(reason);
            }
        }
    }

    /// Every slice is queued: let the workers take them unless the template
    /// is retired first.
    fn drain(&self, template: &Arc<Template>) -> Retired {
        if !self.mailbox.has_pending() {
            self.mailbox.request_template();
        }
        while !self.work_queue.is_empty() {
            if let Some(reason) = self.interrupted(template) {
                return reason;
            }
            if !self.cancel.sleep(RETIRE_POLL) {
                return Retired::Cancelled;
            }
        }
        Retired::Exhausted
    }

    fn interrupted(&self, template: &Template) -> Option<Retired> {
        if self.cancel.is_cancelled() {
            Some(Retired::Cancelled)
        } else if self.mailbox.preempted() {
            Some(Retired::Preempted)
        } else if template.is_expired() {
            Some(Retired::Expired)
        } else {
            None
        }
    }

    fn request_ahead(&self, template: &Template) {
        if template.time_left() < self.low_water
            && !self.mailbox.has_pending()
            && !self.mailbox.template_requested()
        {
            debug!(target: LOG_TARGET, "{}s left, requesting next template", template.time_left().as_secs());
            self.mailbox.request_template();
        }
    }
}
