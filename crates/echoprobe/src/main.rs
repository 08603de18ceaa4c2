#![warn(clippy::all, clippy::pedantic, clippy::nursery, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::option_if_let_else,
    clippy::missing_const_for_fn,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::redundant_pub_crate
)]
#![forbid(unsafe_code)]

use crate::config::{Args, EchoprobeConfig};
use clap::Parser;

mod app;
mod config;
mod report;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cfg = EchoprobeConfig::try_from(args)?;
    app::run_echoprobe(&cfg)
}
