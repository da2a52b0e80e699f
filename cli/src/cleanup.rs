use crate::AwsArgs;
use anyhow::{ensure, Context, Result};
use clap::{value_parser, Parser};
use e2e_cleanup::{ClusterCleanup, Error, FilterInput, Sweeper, SweeperInput};
use log::info;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Delete every resource created for the cluster named in a resources file.
#[derive(Debug, Parser)]
pub(crate) struct Cleanup {
    /// Path to the YAML file describing the test cluster.
    #[clap(
        short = 'f',
        long = "resources-file",
        alias = "filename",
        value_parser = value_parser!(PathBuf)
    )]
    resources_file: PathBuf,
}

/// The test cluster whose resources are deleted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourcesFile {
    cluster_name: String,
    #[serde(default)]
    cluster_region: Option<String>,
    #[serde(default)]
    dry_run: bool,
}

impl Cleanup {
    pub(crate) async fn run(&self, aws: &AwsArgs) -> Result<()> {
        let resources = read_resources_file(&self.resources_file).await?;
        let clients = aws.clients(resources.cluster_region.as_deref()).await?;
        let input = FilterInput {
            dry_run: resources.dry_run,
            ..FilterInput::for_cluster(resources.cluster_name.as_str())
        };

        let mut errors = Vec::new();
        if let Err(e) = ClusterCleanup::new(&clients).run(&input).await {
            errors.push(e);
        }
        // The sweeper catches SSM leftovers the cluster's own cleanup could not find.
        let sweep = SweeperInput {
            cluster_name: resources.cluster_name.clone(),
            dry_run: resources.dry_run,
            ..SweeperInput::default()
        };
        if let Err(e) = Sweeper::new(&clients).run(sweep).await {
            errors.push(e);
        }

        match Error::join(errors) {
            Some(e) => Err(e).context(format!(
                "Unable to clean up cluster '{}'",
                resources.cluster_name
            )),
            None => {
                info!("Cleaned up cluster '{}'", resources.cluster_name);
                Ok(())
            }
        }
    }
}

async fn read_resources_file(path: &Path) -> Result<ResourcesFile> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .context(format!("Unable to read resources file '{}'", path.display()))?;
    let resources: ResourcesFile = serde_yaml::from_str(&contents)
        .context(format!("Unable to parse resources file '{}'", path.display()))?;
    ensure!(
        !resources.cluster_name.is_empty(),
        "The resources file '{}' has an empty clusterName",
        path.display()
    );
    Ok(resources)
}
