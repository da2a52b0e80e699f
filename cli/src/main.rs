/*!

The command line interface for cleaning up the AWS resources left behind by hybrid nodes
end-to-end tests.

!*/

mod cleanup;
mod sweeper;

use anyhow::{Context, Result};
use clap::Parser;
use e2e_cleanup::clients::AwsClients;
use e2e_utils::aws::{aws_config, caller_account};
use e2e_utils::init_logger;
use log::{info, LevelFilter};

/// Clean up AWS resources created by hybrid nodes end-to-end test runs.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Set logging verbosity [trace|debug|info|warn|error]. If the environment variable `RUST_LOG`
    /// is present, it overrides the default logging behavior. See https://docs.rs/env_logger/latest
    #[clap(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
    #[clap(flatten)]
    aws: AwsArgs,
    #[clap(subcommand)]
    command: Command,
}

/// Where and as whom AWS calls are made.
#[derive(Debug, Clone, Parser)]
pub(crate) struct AwsArgs {
    /// The AWS region. Defaults to the environment's region, or us-west-2.
    #[clap(long, global = true)]
    region: Option<String>,
    /// The arn of a role to assume before making any AWS calls.
    #[clap(long = "assume-role", global = true)]
    assume_role: Option<String>,
}

impl AwsArgs {
    /// Create the AWS clients, using `region` instead of `--region` when it is given. The account
    /// is logged before anything is deleted from it.
    pub(crate) async fn clients(&self, region: Option<&str>) -> Result<AwsClients> {
        let region = region.map(str::to_string).or_else(|| self.region.clone());
        let config = aws_config(&region, &self.assume_role, &None).await;
        let account = caller_account(&config)
            .await
            .context("Unable to determine the AWS account")?;
        info!("Using AWS account '{}'", account);
        Ok(AwsClients::new(&config))
    }
}

#[derive(Debug, Parser)]
enum Command {
    /// Delete every resource of one test cluster, as described by a resources file.
    Cleanup(cleanup::Cleanup),
    /// Deregister stale SSM managed instances and activations left behind by test runs.
    Sweeper(sweeper::Sweeper),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logger(env!("CARGO_CRATE_NAME"), Some(args.log_level));
    if let Err(e) = run(args).await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Cleanup(cleanup) => cleanup.run(&args.aws).await,
        Command::Sweeper(sweeper) => sweeper.run(&args.aws).await,
    }
}
