// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: tests/rpc_test.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file contains integration tests for the pool-facing components: the
// template fetcher, the longpoll watcher and the submitter, driven by a
// scripted pool. Covers retry bounds, longpoll id handling and submission
// classification.
//
// Tree Location:
// - tests/rpc_test.rs (pool component tests)
// - Depends on: gbt-miner, crossbeam, serde_json, tempfile

mod common;

#[cfg(test)]
mod tests {
    use super::common::*;
    use crossbeam::channel::bounded;
    use gbt_miner::core::types::{HEADER_PREFIX_LEN, Solution, SubmitOutcome, WorkItem};
    use gbt_miner::core::sha256::pad_header;
    use gbt_miner::miner::stats::{ShareLedger, ShareLog};
    use gbt_miner::work::{CancelToken, LongpollCycle, LongpollWatcher, Submitter, TemplateFetcher, TemplateMailbox};
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn solution(tag: u8, nonce: u32) -> Solution {
        let template = template(tag, Duration::from_secs(30));
        let item = WorkItem {
            template: Arc::clone(&template),
            data_id: 0,
            header: pad_header(&[tag; HEADER_PREFIX_LEN]),
            target: [0xff; 32],
            start_nonce: 0,
            range: u32::MAX,
        };
        item.solve(nonce)
    }

    fn submitter(pool: &MockPool, ledger: &Arc<ShareLedger>, attempts: u32) -> Submitter<MockRpc> {
        let (_tx, rx) = bounded(1);
        Submitter::new(pool.client(), rx, Arc::clone(ledger), fast_retry(attempts), CancelToken::new())
    }

    #[test]
    fn test_fetcher_publishes_template() {
        let pool = MockPool::replying(template_json(7, None));
        let mailbox = Arc::new(TemplateMailbox::new());
        let mut fetcher = TemplateFetcher::new(pool.client(), Arc::clone(&mailbox), fast_retry(3), CancelToken::new());

        assert!(fetcher.fetch_once());
        let (template, _) = mailbox.take().unwrap();
        assert_eq!(template.header_prefix()[0], 7);
        assert_eq!(pool.call_log()[0].0, "getblocktemplate");
    }

    #[test]
    fn test_fetcher_retry_bound_then_rearms() {
        let pool = MockPool::failing();
        let mailbox = Arc::new(TemplateMailbox::new());
        let mut fetcher = TemplateFetcher::new(pool.client(), Arc::clone(&mailbox), fast_retry(4), CancelToken::new());

        assert!(!fetcher.fetch_once());
        assert_eq!(pool.calls(), 4);
        assert_eq!(pool.reconnects(), 4);
        assert!(!mailbox.has_pending());
        // the next cycle is already requested
        assert!(mailbox.template_requested());

        pool.push(Reply::Ok(template_json(1, None)));
        assert!(fetcher.fetch_once());
        assert_eq!(pool.calls(), 5);
        assert!(mailbox.has_pending());
    }

    #[test]
    fn test_fetcher_treats_malformed_template_as_failure() {
        let pool = MockPool::replying(json!({ "target": "ff" }));
        let mailbox = Arc::new(TemplateMailbox::new());
        let mut fetcher = TemplateFetcher::new(pool.client(), Arc::clone(&mailbox), fast_retry(2), CancelToken::new());

        assert!(!fetcher.fetch_once());
        assert_eq!(pool.calls(), 2);
        assert!(!mailbox.has_pending());
    }

    #[test]
    fn test_longpoll_carries_previous_id() {
        let pool = MockPool::failing();
        pool.push(Reply::Ok(template_json(1, Some("lp-1"))));
        pool.push(Reply::Ok(template_json(2, Some("lp-2"))));
        let mailbox = Arc::new(TemplateMailbox::new());
        let mut watcher = LongpollWatcher::new(pool.client(), Arc::clone(&mailbox), fast_retry(2), CancelToken::new());

        assert_eq!(watcher.poll_once(), LongpollCycle::Published);
        assert_eq!(watcher.longpoll_id(), Some("lp-1"));
        assert!(mailbox.preempted());
        assert_eq!(watcher.poll_once(), LongpollCycle::Published);
        assert_eq!(watcher.longpoll_id(), Some("lp-2"));

        let log = pool.call_log();
        assert!(log[0].1[0].get("longpollid").is_none());
        assert_eq!(log[1].1[0]["longpollid"], "lp-1");

        // only the newest longpoll template survives
        let (template, _) = mailbox.take().unwrap();
        assert_eq!(template.header_prefix()[0], 2);
        assert!(!mailbox.has_pending());
    }

    #[test]
    fn test_longpoll_retry_bound_then_resumes() {
        let pool = MockPool::failing();
        let mailbox = Arc::new(TemplateMailbox::new());
        let mut watcher = LongpollWatcher::new(pool.client(), Arc::clone(&mailbox), fast_retry(3), CancelToken::new());

        assert_eq!(watcher.poll_once(), LongpollCycle::Failed);
        assert_eq!(pool.calls(), 3);
        assert!(!mailbox.preempted());

        pool.push(Reply::Ok(template_json(3, Some("lp-9"))));
        assert_eq!(watcher.poll_once(), LongpollCycle::Published);
        assert_eq!(pool.calls(), 4);
    }

    #[test]
    fn test_longpoll_without_id_is_unsupported() {
        let pool = MockPool::replying(template_json(1, None));
        let mailbox = Arc::new(TemplateMailbox::new());
        let watcher = LongpollWatcher::new(pool.client(), Arc::clone(&mailbox), fast_retry(2), CancelToken::new());

        // run() stops on its own instead of spinning
        watcher.run();
        assert_eq!(pool.calls(), 1);
        assert!(!mailbox.has_pending());
    }

    #[test]
    fn test_submit_classification_is_total() {
        let pool = MockPool::failing();
        pool.push(Reply::Ok(json!(null)));
        pool.push(Reply::Ok(json!("high-hash")));
        pool.push(Reply::Ok(json!(false)));
        pool.push(Reply::Server(-22, "Block decode failed".to_string()));
        let ledger = Arc::new(ShareLedger::new());
        let mut submitter = submitter(&pool, &ledger, 2);

        assert_eq!(submitter.submit(&solution(1, 1)), SubmitOutcome::Accepted);
        assert_eq!(
            submitter.submit(&solution(1, 2)),
            SubmitOutcome::Rejected {
                reason: "high-hash".to_string()
            }
        );
        assert_eq!(submitter.submit(&solution(1, 3)), SubmitOutcome::Accepted);
        assert!(matches!(submitter.submit(&solution(1, 4)), SubmitOutcome::Rejected { .. }));
        assert_eq!(submitter.submit(&solution(1, 5)), SubmitOutcome::Failed);

        let (accepted, rejected, failed) = ledger.totals();
        assert_eq!((accepted, rejected, failed), (2, 2, 1));
        assert_eq!(accepted + rejected + failed, 5);
    }

    #[test]
    fn test_duplicate_submission_is_rejected() {
        let pool = MockPool::new(Fallback::RejectDuplicates);
        let ledger = Arc::new(ShareLedger::new());
        let mut submitter = submitter(&pool, &ledger, 3);

        let share = solution(4, 0xcafe);
        assert_eq!(submitter.submit(&share), SubmitOutcome::Accepted);
        assert!(matches!(submitter.submit(&share), SubmitOutcome::Rejected { .. }));
        assert_eq!(ledger.accepted.load(Ordering::Relaxed), 1);
        assert_eq!(ledger.rejected.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_submit_retry_bound() {
        let pool = MockPool::failing();
        let ledger = Arc::new(ShareLedger::new());
        let mut submitter = submitter(&pool, &ledger, 5);

        assert_eq!(submitter.submit(&solution(1, 9)), SubmitOutcome::Failed);
        assert_eq!(pool.calls(), 5);
        assert_eq!(ledger.totals(), (0, 0, 1));

        // next solution goes through normally
        pool.push(Reply::Ok(json!(null)));
        assert_eq!(submitter.submit(&solution(1, 10)), SubmitOutcome::Accepted);
        assert_eq!(pool.calls(), 6);
    }

    #[test]
    fn test_submit_params_carry_header_and_nonce() {
        let pool = MockPool::replying(json!(null));
        let ledger = Arc::new(ShareLedger::new());
        let mut submitter = submitter(&pool, &ledger, 1);

        submitter.submit(&solution(5, 0x1234ABCD));
        let (method, params) = pool.call_log().remove(0);
        assert_eq!(method, "submitblock");
        let data = params[0].as_str().unwrap();
        assert_eq!(data.len(), 160);
        assert!(data.ends_with("1234abcd"));
    }

    #[test]
    fn test_submitter_run_drains_queue_and_logs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("share.test.log");
        let ledger = Arc::new(ShareLedger::with_log(ShareLog::open(&path).unwrap()));
        let pool = MockPool::replying(json!(null));
        let (tx, rx) = bounded(4);
        let submitter = Submitter::new(pool.client(), rx, Arc::clone(&ledger), fast_retry(2), CancelToken::new());

        tx.send(solution(1, 1)).unwrap();
        tx.send(solution(1, 2)).unwrap();
        tx.send(solution(1, 3)).unwrap();
        drop(tx);
        submitter.run();

        assert_eq!(ledger.totals(), (3, 0, 0));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 3);
        assert!(contents.lines().all(|line| line.ends_with(" accepted")));
    }
}
