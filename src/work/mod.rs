// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/work/mod.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file is the module declaration for work distribution: the template
// mailbox, the bounded work queue and the threads that move templates in and
// solutions out.
//
// Tree Location:
// - src/work/mod.rs (work distribution entry point)
// - Submodules: fetcher, longpoll, mailbox, producer, queue, shutdown, submitter

pub mod fetcher;
pub mod longpoll;
pub mod mailbox;
pub mod producer;
pub mod queue;
pub mod shutdown;
pub mod submitter;

pub use fetcher::TemplateFetcher;
pub use longpoll::{LongpollCycle, LongpollWatcher};
pub use mailbox::{TemplateMailbox, TemplateOrigin};
pub use producer::{Retired, WorkProducer};
pub use queue::{PutError, WorkQueue};
pub use shutdown::CancelToken;
pub use submitter::Submitter;
