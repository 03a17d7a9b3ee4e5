//! Command-line plumbing shared by the check binaries.

use std::ffi::OsString;
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{ArgAction, Args, Parser};
use es_client::config::{DEFAULT_PORT, DEFAULT_TIMEOUT_SECS};
use es_client::{ConnectionConfig, HttpFetcher, Scheme, Transport};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::checks::{run_check, Check};
use crate::verdict::Verdict;

/// Connection flags every check accepts.
///
/// `-h` is the host, so help is only reachable as `--help`; binaries embedding
/// these arguments must set `disable_help_flag = true`.
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// Transport: `default`, or `aws` for SigV4-signed AWS domains.
    #[arg(long, env = "ES_TRANSPORT", default_value = "default")]
    pub transport: Transport,

    /// AWS region for the aws transport; falls back to the AWS config chain.
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// AWS profile name.
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Elasticsearch host.
    #[arg(short = 'h', long, env = "ES_HOST", default_value = "localhost")]
    pub host: String,

    /// Elasticsearch port.
    #[arg(short, long, env = "ES_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Elasticsearch user.
    #[arg(short, long, env = "ES_USER")]
    pub user: Option<String>,

    /// Elasticsearch password.
    #[arg(short = 'P', long, env = "ES_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Connection scheme; defaults to https for authenticated connections.
    #[arg(short, long)]
    pub scheme: Option<Scheme>,

    /// Query timeout in seconds.
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Print diagnostic lines before the verdict.
    #[arg(long)]
    pub debug: bool,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

impl ConnectionArgs {
    #[must_use]
    pub fn to_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            transport: self.transport,
            region: self.region.clone(),
            profile: self.profile.clone(),
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            scheme: self.scheme,
            timeout_secs: self.timeout,
        }
    }
}

/// Diagnostics filter. Without `--debug` nothing is logged, whatever
/// `RUST_LOG` says, so stdout carries only the verdict line.
fn log_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new("es_checks=debug,es_client=debug")
    } else {
        EnvFilter::new("off")
    }
}

/// Route diagnostics to stdout when debugging.
pub fn init_logging(debug: bool) {
    // A subscriber may already be installed (tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(debug))
        .with_writer(std::io::stdout)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

/// Parse the process arguments.
///
/// Usage errors are printed as a one-line UNKNOWN verdict; help exits cleanly.
pub fn parse_args<T: Parser>(check_name: &str) -> Result<T, ExitCode> {
    parse_args_from(check_name, std::env::args_os())
}

pub fn parse_args_from<T, I, A>(check_name: &str, args: I) -> Result<T, ExitCode>
where
    T: Parser,
    I: IntoIterator<Item = A>,
    A: Into<OsString> + Clone,
{
    T::try_parse_from(args).map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = e.print();
            ExitCode::SUCCESS
        }
        _ => {
            let verdict = Verdict::unknown(usage_error_message(&e));
            println!("{}", verdict.render(check_name));
            verdict.exit_code()
        }
    })
}

fn usage_error_message(error: &clap::Error) -> String {
    let text = error.to_string();
    let first = text.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}

async fn connect(args: &ConnectionArgs) -> anyhow::Result<HttpFetcher> {
    let config = args.to_config();
    debug!(
        transport = %config.transport,
        host = %config.host,
        port = config.port,
        scheme = %config.effective_scheme(),
        timeout = config.timeout_secs,
        "Connecting"
    );
    HttpFetcher::new(&config)
        .await
        .context("Failed to create statistics client")
}

/// Run `check` against the configured cluster, print the verdict line and
/// return its exit code.
pub async fn execute(check: &dyn Check, args: &ConnectionArgs) -> ExitCode {
    init_logging(args.debug);

    let verdict = match connect(args).await {
        Ok(fetcher) => run_check(check, &fetcher).await,
        Err(e) => Verdict::unknown(format!("{e:#}")),
    };

    println!("{}", verdict.render(check.name()));
    verdict.exit_code()
}
