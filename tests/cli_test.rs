// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: tests/cli_test.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file contains tests for command-line parsing and the conversion of
// arguments into the runtime configuration.
//
// Tree Location:
// - tests/cli_test.rs (argument tests)
// - Depends on: gbt-miner, clap

#[cfg(test)]
mod tests {
    use clap::Parser;
    use gbt_miner::HasherKind;
    use gbt_miner::core::types::Args;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["gbt-miner", "http://alice:pw@127.0.0.1:8332/"]).unwrap();
        assert!(args.validate().is_ok());
        assert_eq!(args.hasher, HasherKind::Midstate);
        assert_eq!(args.nslices, 128);

        let config = args.into_config().unwrap();
        assert!(config.workers >= 1);
        assert_eq!(config.pool.user.as_deref(), Some("alice"));
        assert_eq!(config.retry.attempts, 10);
        assert_eq!(config.longpoll_timeout, Duration::from_secs(3600));
        let share_log = config.share_log.unwrap();
        let name = share_log.to_string_lossy();
        assert!(name.starts_with("share.") && name.ends_with(".log"));
    }

    #[test]
    fn test_explicit_options() {
        let args = Args::try_parse_from([
            "gbt-miner",
            "http://127.0.0.1:8332/",
            "--workers",
            "3",
            "--hasher",
            "cpu",
            "--nslices",
            "16",
            "--retries",
            "4",
            "--retry-delay-ms",
            "250",
            "--share-log",
            "/tmp/shares.log",
        ])
        .unwrap();
        assert!(args.validate().is_ok());

        let config = args.into_config().unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.hasher, HasherKind::Cpu);
        assert_eq!(config.quantum(), 1 << 28);
        assert_eq!(config.retry.delay, Duration::from_millis(250));
        assert_eq!(config.share_log, Some(PathBuf::from("/tmp/shares.log")));
    }

    #[test]
    fn test_validation_errors() {
        let bad_slices = Args::try_parse_from(["gbt-miner", "http://127.0.0.1/", "--nslices", "100"]).unwrap();
        assert!(bad_slices.validate().is_err());

        let bad_url = Args::try_parse_from(["gbt-miner", "stratum+tcp://pool:3333"]).unwrap();
        assert!(bad_url.validate().is_err());

        let bad_timeouts = Args::try_parse_from([
            "gbt-miner",
            "http://127.0.0.1/",
            "--rpc-timeout",
            "60",
            "--longpoll-timeout",
            "30",
        ])
        .unwrap();
        assert!(bad_timeouts.validate().is_err());
    }
}
