//! Checks whether any Elasticsearch circuit breaker has tripped.

use std::process::ExitCode;

use clap::Parser;

use es_checks::checks::CircuitBreakers;
use es_checks::cli::{execute, parse_args, ConnectionArgs};
use es_checks::Check;

#[derive(Parser)]
#[command(name = "check-es-circuit-breakers", disable_help_flag = true)]
#[command(about = "Report CRITICAL when any node has a tripped circuit breaker")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Only check the local node.
    #[arg(short = 'l', long)]
    localhost: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli: Cli = match parse_args(CircuitBreakers::default().name()) {
        Ok(cli) => cli,
        Err(code) => return code,
    };

    let check = CircuitBreakers {
        localhost: cli.localhost,
        timeout_secs: cli.connection.timeout,
    };
    execute(&check, &cli.connection).await
}
