//! Checks Elasticsearch cluster health at a chosen level of detail.

use std::process::ExitCode;

use clap::Parser;

use es_checks::checks::{ClusterHealth, HealthLevel};
use es_checks::cli::{execute, parse_args, ConnectionArgs};
use es_checks::Check;

#[derive(Parser)]
#[command(name = "check-es-cluster-health", disable_help_flag = true)]
#[command(about = "Map cluster health green/yellow/red to OK/WARNING/CRITICAL")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Level of detail for the health request.
    #[arg(short = 'l', long, value_enum, default_value_t = HealthLevel::Cluster)]
    level: HealthLevel,

    /// Answer from the queried node instead of the master.
    #[arg(long)]
    local: bool,

    /// Index or index pattern to check.
    #[arg(short = 'i', long)]
    index: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli: Cli = match parse_args(ClusterHealth::default().name()) {
        Ok(cli) => cli,
        Err(code) => return code,
    };

    let check = ClusterHealth {
        level: cli.level,
        local: cli.local,
        index: cli.index,
        timeout_secs: cli.connection.timeout,
    };
    execute(&check, &cli.connection).await
}
