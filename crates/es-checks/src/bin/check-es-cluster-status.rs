//! Checks the Elasticsearch cluster status colour.

use std::process::ExitCode;

use clap::Parser;

use es_checks::checks::ClusterStatus;
use es_checks::cli::{execute, parse_args, ConnectionArgs};
use es_checks::Check;

#[derive(Parser)]
#[command(name = "check-es-cluster-status", disable_help_flag = true)]
#[command(about = "Report the cluster status, optionally only from the elected master")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Only evaluate when the queried node is the elected master.
    #[arg(short = 'm', long)]
    master_only: bool,

    /// Wait up to this many seconds for the cluster to turn green.
    #[arg(short = 'T', long, alias = "status_timeout")]
    status_timeout: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli: Cli = match parse_args(ClusterStatus::default().name()) {
        Ok(cli) => cli,
        Err(code) => return code,
    };

    let check = ClusterStatus {
        master_only: cli.master_only,
        status_timeout: cli.status_timeout,
        timeout_secs: cli.connection.timeout,
    };
    execute(&check, &cli.connection).await
}
