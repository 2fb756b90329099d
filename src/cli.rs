use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "nrc-tcx",
    version,
    about = "Convert one Nike Run Club activity from its SQLite database into a TCX file"
)]
pub struct Cli {
    /// Path to the activity SQLite database (iPhone or Watch layout).
    #[arg(value_name = "DATABASE")]
    pub database: PathBuf,

    /// Activity identifier as stored in the `activityID` column.
    #[arg(value_name = "ACTIVITY_ID")]
    pub activity_id: String,

    /// Where to write the TCX document. Replaced only on success.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Do not print the activity summary to stdout.
    #[arg(long)]
    pub no_summary: bool,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}
