// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `orgstruct` - manage organizational-structure versions in a `SQLite`
//! database.
//!
//! Results are printed to stdout as JSON; logs go to stderr. `RUST_LOG`
//! overrides the `-v`/`-q` verbosity flags.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod commands;

#[cfg(test)]
mod tests;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use orgstruct_persistence::Persistence;
use std::path::PathBuf;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;
use tracing_subscriber::EnvFilter;

use crate::commands::Command;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args: Args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(args.env_filter())
        .with_writer(std::io::stderr)
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err:#}");
            std::process::exit(1);
        }
    }
    Ok(())
}

/// Versioning, publish and correction of organizational structures.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. Created on first use.
    #[arg(short, long, default_value = "orgstruct.db")]
    database: PathBuf,

    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        info!(database = %self.database.display(), "Opening database");
        let mut persistence: Persistence = Persistence::new_with_file(&self.database)
            .wrap_err_with(|| format!("cannot open {}", self.database.display()))?;
        let mut stdout = std::io::stdout().lock();
        self.command.run(&mut persistence, &mut stdout)
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::default().add_directive(self.log_level().into()))
    }
}
