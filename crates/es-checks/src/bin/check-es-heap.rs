//! Checks cluster-wide JVM heap usage.

use std::process::ExitCode;

use clap::Parser;

use es_checks::checks::Heap;
use es_checks::cli::{execute, parse_args, ConnectionArgs};
use es_checks::{Check, ThresholdConfig};

#[derive(Parser)]
#[command(name = "check-es-heap", disable_help_flag = true)]
#[command(about = "Compare heap used against byte or percentage thresholds")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Heap used WARNING threshold (bytes, or percent with --percentage).
    #[arg(short = 'w', long, alias = "warn")]
    warning: Option<u64>,

    /// Heap used CRITICAL threshold (bytes, or percent with --percentage).
    #[arg(short = 'c', long, alias = "crit")]
    critical: Option<u64>,

    /// Treat the thresholds as percentages of the maximum heap.
    #[arg(long)]
    percentage: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli: Cli = match parse_args(Heap::default().name()) {
        Ok(cli) => cli,
        Err(code) => return code,
    };

    let thresholds = if cli.percentage {
        ThresholdConfig::percentage(cli.warning, cli.critical)
    } else {
        ThresholdConfig::absolute(cli.warning, cli.critical)
    };
    let check = Heap {
        thresholds,
        timeout_secs: cli.connection.timeout,
    };
    execute(&check, &cli.connection).await
}
