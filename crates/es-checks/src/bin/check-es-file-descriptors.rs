//! Checks open file descriptor usage on the busiest Elasticsearch node.

use std::process::ExitCode;

use clap::Parser;

use es_checks::checks::file_descriptors::{DEFAULT_CRITICAL_PERCENT, DEFAULT_WARNING_PERCENT};
use es_checks::checks::FileDescriptors;
use es_checks::cli::{execute, parse_args, ConnectionArgs};
use es_checks::{Check, ThresholdConfig};

#[derive(Parser)]
#[command(name = "check-es-file-descriptors", disable_help_flag = true)]
#[command(about = "Compare open file descriptors against the node limit")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Warning percentage of fd usage.
    #[arg(short = 'w', long, default_value_t = DEFAULT_WARNING_PERCENT)]
    warning: u64,

    /// Critical percentage of fd usage.
    #[arg(short = 'c', long, default_value_t = DEFAULT_CRITICAL_PERCENT)]
    critical: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli: Cli = match parse_args(FileDescriptors::default().name()) {
        Ok(cli) => cli,
        Err(code) => return code,
    };

    let check = FileDescriptors {
        thresholds: ThresholdConfig::percentage(Some(cli.warning), Some(cli.critical)),
        timeout_secs: cli.connection.timeout,
    };
    execute(&check, &cli.connection).await
}
