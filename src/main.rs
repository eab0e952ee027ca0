// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/main.rs
// Version: 3.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// Binary entry point: parse arguments, set up logging, build the hashers,
// start the miner and shut it down cleanly on Ctrl-C.

use clap::Parser;
use gbt_miner::{GbtMiner, HttpRpcClient, Result, core::types::Args};
use log::{LevelFilter, error, info};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;

const LOG_TARGET: &str = "gbt_miner::main";

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {T}: {m}{n}";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Validate arguments
    if let Err(err) = args.validate() {
        eprintln!("❌ Error: {}", err);
        std::process::exit(1);
    }

    init_logging(&args)?;

    let config = args.into_config()?;
    info!(target: LOG_TARGET, "⛏️  gbt-miner v{}", env!("CARGO_PKG_VERSION"));

    // hasher construction failures abort before any thread is spawned
    let hashers = match config.hasher.build_many(config.workers) {
        Ok(hashers) => hashers,
        Err(e) => {
            error!(target: LOG_TARGET, "❌ Could not initialize {:?} hasher: {}", config.hasher, e);
            std::process::exit(1);
        }
    };

    let status_interval = config.status_interval;
    let connector = HttpRpcClient::connector(config.pool.clone());
    // blocking HTTP clients must not be created or dropped on the async runtime
    let miner = tokio::task::spawn_blocking(move || GbtMiner::start(&config, hashers, connector)).await??;
    let printer = miner.start_status_printer(status_interval);

    tokio::signal::ctrl_c().await?;
    info!(target: LOG_TARGET, "Ctrl-C received, stopping (in-flight searches and RPCs finish first)");
    printer.abort();
    tokio::task::spawn_blocking(move || miner.shutdown()).await?;

    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    if let Some(path) = &args.log_config {
        log4rs::init_file(path, Default::default())?;
        return Ok(());
    }

    let level = if args.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .logger(Logger::builder().build("hyper", LevelFilter::Warn))
        .logger(Logger::builder().build("reqwest", LevelFilter::Warn))
        .build(Root::builder().appender("stdout").build(level))?;
    log4rs::init_config(config)?;
    Ok(())
}

// Changelog:
// - v3.0.0: Single getblocktemplate mining mode with log4rs logging; removed
//   the cpu/gpu/hybrid feature modes, benchmarks and the web dashboard.
// - v2.0.0-feature-based: Feature-based mining modes.
