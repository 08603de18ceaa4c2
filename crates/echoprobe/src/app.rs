use crate::config::{EchoprobeConfig, LogFormat, LogSpanEvents, Mode};
use crate::report;
use anyhow::anyhow;
use echoprobe_core::{Builder, Pinger, ReachabilityMonitor};
use std::cell::Cell;
use std::thread;
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;

/// Run the echoprobe application.
pub fn run_echoprobe(cfg: &EchoprobeConfig) -> anyhow::Result<()> {
    configure_logging(cfg);
    let pinger = Builder::new(cfg.probe.target.clone())
        .count(cfg.probe.count)
        .receive_timeout(cfg.probe.receive_timeout)
        .total_timeout(cfg.probe.total_timeout)
        .build()?;
    if cfg.verbose {
        report::print_config(pinger.config());
    }
    match cfg.mode {
        Mode::Once => run_once(&pinger),
        Mode::Monitor { interval } => run_monitor(pinger, interval),
    }
}

fn run_once(pinger: &Pinger) -> anyhow::Result<()> {
    let result = pinger.run()?;
    report::print_result(&result);
    if result.is_success() {
        Ok(())
    } else {
        Err(anyhow!("no reply from {}", pinger.config().target))
    }
}

fn run_monitor(pinger: Pinger, interval: Duration) -> anyhow::Result<()> {
    let previous = Cell::new(None);
    let _monitor = ReachabilityMonitor::spawn_with(pinger, interval, move |result| {
        report::print_check(result, previous.get());
        previous.set(Some(result.is_success()));
    })?;
    loop {
        thread::park();
    }
}

fn configure_logging(cfg: &EchoprobeConfig) {
    if cfg.verbose {
        let fmt_span = match cfg.log_span_events {
            LogSpanEvents::Off => FmtSpan::NONE,
            LogSpanEvents::Active => FmtSpan::ACTIVE,
            LogSpanEvents::Full => FmtSpan::FULL,
        };
        match cfg.log_format {
            LogFormat::Compact => {
                tracing_subscriber::fmt()
                    .with_span_events(fmt_span)
                    .with_env_filter(&cfg.log_filter)
                    .compact()
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::fmt()
                    .with_span_events(fmt_span)
                    .with_env_filter(&cfg.log_filter)
                    .pretty()
                    .init();
            }
            LogFormat::Json => {
                tracing_subscriber::fmt()
                    .with_span_events(fmt_span)
                    .with_env_filter(&cfg.log_filter)
                    .json()
                    .init();
            }
        }
    }
}
