mod driver;
mod settings;

use anyhow::{bail, Context, Result};
use clap::Parser;
use simuart_core::{Bridge, Transactor};
use std::path::PathBuf;
use std::time::Duration;

use driver::{parse_greeting, Driver};

/// Expose simulated UARTs as pseudo-terminals and run a loopback design.
#[derive(Debug, Parser)]
#[command(name = "simuart", version, about)]
struct Args {
    /// JSON config; defaults to <config dir>/simuart/config.json when present.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Instance to create, repeatable. Replaces the configured list.
    #[arg(short, long = "name")]
    names: Vec<String>,

    /// Stop after this many simulation steps.
    #[arg(long)]
    steps: Option<u64>,

    /// Hex bytes sent to every instance once it is up, e.g. "48 69 0a".
    #[arg(long)]
    greeting: Option<String>,

    /// Only consume host bytes, never answer.
    #[arg(long)]
    no_echo: bool,

    /// Log every byte moved.
    #[arg(long)]
    trace: bool,

    /// Print the traffic log when the run ends.
    #[arg(long)]
    dump_traffic: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut cfg = settings::load(args.config.as_deref())?;
    if !args.names.is_empty() {
        cfg.instances = args.names.clone();
    }
    if args.trace {
        cfg.transactor.trace_bytes = true;
    }
    if args.dump_traffic && cfg.transactor.traffic_capacity == 0 {
        cfg.transactor.traffic_capacity = 10_000;
    }
    let echo = cfg.echo && !args.no_echo;
    let greeting = args
        .greeting
        .as_deref()
        .map(parse_greeting)
        .transpose()?;

    let mut driver = Driver::new(Bridge::new(Transactor::new(cfg.transactor.clone())), echo);
    for name in &cfg.instances {
        driver
            .create(name)
            .with_context(|| format!("creating UART `{name}`"))?;
    }
    if driver.bridge().transactor().registry().is_empty() {
        bail!("no UART instances configured; pass --name or list them in the config");
    }
    if let Some(bytes) = greeting {
        driver.greet(&bytes)?;
    }

    let interval = Duration::from_millis(cfg.step_interval_ms);
    let mut step = 0u64;
    while args.steps.map_or(true, |limit| step < limit) {
        driver.step()?;
        step += 1;
        if !interval.is_zero() {
            std::thread::sleep(interval);
        }
    }

    log::info!("stopped after {step} steps");
    let transactor = driver.bridge().transactor();
    for name in transactor.registry().names() {
        let stats = transactor.stats(name)?;
        log::info!(
            "{name}: {} received, {} sent, {} dropped",
            stats.received,
            stats.sent,
            stats.dropped
        );
    }
    if args.dump_traffic {
        if transactor.traffic().is_empty() {
            log::info!("no traffic recorded");
        } else {
            print!("{}", transactor.traffic().to_text(true, true));
        }
    }
    Ok(())
}
