//! vmcdns
//!
//! Finds unreserved static IPs in the VMC lab segments, reserves them as
//! `api`/`*.apps` A records in the lab's Route53 hosted zone, renders an
//! `install-config.yaml` for them, and releases them again.

mod cli;
mod commands;
mod config;
mod error;

use crate::cli::Cli;
use crate::commands::Context;
use crate::config::Config;
use crate::error::CliError;
use clap::Parser;
use route53_client::{AwsCredentials, Route53Client};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use vmc_ipam::{InstallSecrets, PingProber};

const ACCESS_DENIED_HINT: &str =
    "Access denied! Do you need to set $AWS_PROFILE and/or $AWS_ACCESS_KEY_ID/$AWS_SECRET_ACCESS_KEY?";

fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,vmcdns={level},vmc_ipam={level},route53_client={level}"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(command: cli::Commands, json: bool) -> Result<(), CliError> {
    let config = Config::from_env()?;
    debug!("Configuration: {:?}", config);

    let credentials = AwsCredentials::from_env()?;
    let client = Route53Client::new(&config.route53_endpoint, credentials)?;
    let prober = PingProber::default();
    let ctx = Context {
        client: &client,
        config: &config,
        prober: &prober,
        secrets: InstallSecrets::from_env(),
        json,
    };

    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr();
    commands::dispatch(&ctx, command, &mut stdout, &mut stderr).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let Some(command) = cli.command else {
        eprintln!("Subcommand required. Use --help for usage.");
        return ExitCode::FAILURE;
    };

    match run(command, cli.json).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_access_denied() => {
            debug!("{}", e);
            eprintln!("{ACCESS_DENIED_HINT}");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
