#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use nrc_tcx::{ConvertError, cli, convert, utils};
use std::process::ExitCode;

#[macro_use]
extern crate nrc_tcx;

fn main() -> ExitCode {
    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(1);
        }
    };
    utils::init_logging(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(ConvertError::NoLocationData { .. }) = e.downcast_ref::<ConvertError>() {
                tracing::error!("{e:#}; no output written");
            } else {
                tracing::error!("{e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &cli::Cli) -> Result<()> {
    dlog!(
        "mode=convert database={} activity={} output={}",
        cli.database.display(),
        cli.activity_id,
        cli.output.display()
    );

    let done = convert(&cli.database, &cli.activity_id, &cli.output).with_context(|| {
        format!(
            "converting activity {} from {}",
            cli.activity_id,
            cli.database.display()
        )
    })?;

    tracing::info!(
        schema = %done.variant,
        trackpoints = done.trackpoints,
        output = %cli.output.display(),
        "successfully created tcx file"
    );

    if !cli.no_summary {
        println!("{}", done.summary);
    }

    Ok(())
}
