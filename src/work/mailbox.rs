// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/work/mailbox.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements the template mailbox shared by the fetcher, the
// longpoll watcher and the producer: one single-slot cell per template origin
// plus the need-template and preempt-now signals. All slot changes happen
// under one lock, so "drop stale templates, store the longpoll result, raise
// preempt" is a single step as seen by the producer.
//
// Tree Location:
// - src/work/mailbox.rs (template handoff)
// - Depends on: std, crate::core::template

use crate::core::template::Template;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateOrigin {
    Fetch,
    Longpoll,
}

#[derive(Debug, Default)]
struct Slots {
    fetched: Option<Arc<Template>>,
    longpoll: Option<Arc<Template>>,
    need_template: bool,
    closed: bool,
}

#[derive(Debug, Default)]
pub struct TemplateMailbox {
    slots: Mutex<Slots>,
    changed: Condvar,
    preempt: AtomicBool,
}

impl TemplateMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store a fetched template, replacing any unconsumed fetched one.
    pub fn publish_fetched(&self, template: Arc<Template>) {
        let mut slots = self.lock();
        slots.fetched = Some(template);
        self.changed.notify_all();
    }

    /// Store a longpoll template: every queued template is stale now, and
    /// the producer is told to abandon the one it is slicing.
    pub fn publish_longpoll(&self, template: Arc<Template>) {
        let mut slots = self.lock();
        slots.fetched = None;
        slots.longpoll = Some(template);
        self.preempt.store(true, Ordering::Release);
        self.changed.notify_all();
    }

    /// Block until a template is available; longpoll results win over
    /// fetched ones. `None` once the mailbox is closed.
    pub fn take(&self) -> Option<(Arc<Template>, TemplateOrigin)> {
        let mut slots = self.lock();
        loop {
            if slots.closed {
                return None;
            }
            if let Some(template) = slots.longpoll.take() {
                self.preempt.store(false, Ordering::Release);
                return Some((template, TemplateOrigin::Longpoll));
            }
            if let Some(template) = slots.fetched.take() {
                return Some((template, TemplateOrigin::Fetch));
            }
            slots = self.changed.wait(slots).unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Raised by `publish_longpoll`, lowered when that template is taken.
    pub fn preempted(&self) -> bool {
        self.preempt.load(Ordering::Acquire)
    }

    /// Whether a template of either origin is waiting to be taken.
    pub fn has_pending(&self) -> bool {
        let slots = self.lock();
        slots.fetched.is_some() || slots.longpoll.is_some()
    }

    /// Ask the fetcher for a fresh template.
    pub fn request_template(&self) {
        let mut slots = self.lock();
        if !slots.need_template {
            slots.need_template = true;
            self.changed.notify_all();
        }
    }

    pub fn template_requested(&self) -> bool {
        self.lock().need_template
    }

    /// Wait up to `timeout` for a template request and consume it.
    /// Returns false on timeout or close.
    pub fn wait_for_request(&self, timeout: Duration) -> bool {
        let slots = self.lock();
        let (mut slots, _) = self
            .changed
            .wait_timeout_while(slots, timeout, |s| !s.need_template && !s.closed)
            .unwrap_or_else(|e| e.into_inner());
        if slots.closed || !slots.need_template {
            return false;
        }
        slots.need_template = false;
        true
    }

    /// Release every thread blocked in `take` or `wait_for_request`.
    pub fn close(&self) {
        let mut slots = self.lock();
        slots.closed = true;
        self.changed.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}
