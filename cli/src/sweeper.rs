use crate::AwsArgs;
use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use e2e_cleanup::constants::DEFAULT_AGE_THRESHOLD;
use e2e_cleanup::duration::parse_duration;
use e2e_cleanup::SweeperInput;
use std::time::Duration;

/// Remove SSM managed instances and activations of test clusters that are older than a threshold.
#[derive(Debug, Parser)]
#[clap(group(
    ArgGroup::new("selector")
        .required(true)
        .multiple(true)
        .args(&["all-clusters", "cluster-name", "cluster-name-prefix"]),
))]
pub(crate) struct Sweeper {
    /// Sweep the resources of every test cluster.
    #[clap(long = "all-clusters")]
    all_clusters: bool,
    /// Only list what would be deleted.
    #[clap(long = "dry-run")]
    dry_run: bool,
    /// Sweep one cluster's resources regardless of their age.
    #[clap(long = "cluster-name", conflicts_with_all = &["all-clusters", "cluster-name-prefix"])]
    cluster_name: Option<String>,
    /// Sweep the resources of clusters whose name starts with this prefix.
    #[clap(long = "cluster-name-prefix")]
    cluster_name_prefix: Option<String>,
    /// Only sweep resources older than this, e.g. `24h` or `1d12h`.
    #[clap(
        long = "age-threshold",
        default_value = DEFAULT_AGE_THRESHOLD,
        value_parser = parse_duration
    )]
    age_threshold: Duration,
}

impl Sweeper {
    pub(crate) async fn run(&self, aws: &AwsArgs) -> Result<()> {
        let clients = aws.clients(None).await?;
        e2e_cleanup::Sweeper::new(&clients)
            .run(self.input())
            .await
            .context("Sweeper failed")
    }

    fn input(&self) -> SweeperInput {
        SweeperInput {
            all_clusters: self.all_clusters,
            dry_run: self.dry_run,
            cluster_name: self.cluster_name.clone().unwrap_or_default(),
            cluster_name_prefix: self.cluster_name_prefix.clone().unwrap_or_default(),
            instance_age_threshold: self.age_threshold,
        }
    }
}
