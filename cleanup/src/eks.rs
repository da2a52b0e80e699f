use crate::arn::Arn;
use crate::clients::{EksApi, TaggingApi};
use crate::constants::{CLUSTER_DELETION_POLL, CLUSTER_DELETION_TIMEOUT, TAGGING_EKS_CLUSTER};
use crate::error::{self, Result};
use crate::resource::{should_delete_resource, FilterInput, ResourceWithTags};
use crate::tagger::ResourceTagger;
use log::{debug, info};
use snafu::ResultExt;
use std::sync::Arc;
use std::time::Duration;

const CLUSTER_NOT_FOUND: &[&str] = &["ResourceNotFoundException"];

pub struct EksClusterCleaner {
    eks: Arc<dyn EksApi>,
    tagging: Arc<dyn TaggingApi>,
    poll: Duration,
    timeout: Duration,
}

impl EksClusterCleaner {
    pub fn new(eks: Arc<dyn EksApi>, tagging: Arc<dyn TaggingApi>) -> Self {
        Self {
            eks,
            tagging,
            poll: CLUSTER_DELETION_POLL,
            timeout: CLUSTER_DELETION_TIMEOUT,
        }
    }

    pub fn with_wait(mut self, poll: Duration, timeout: Duration) -> Self {
        self.poll = poll;
        self.timeout = timeout;
        self
    }

    pub async fn list_clusters(&self, input: &FilterInput) -> Result<Vec<String>> {
        let arns = ResourceTagger::new(Arc::clone(&self.tagging), input)
            .tagged_arns(TAGGING_EKS_CLUSTER)
            .await?;
        let mut cluster_names = Vec::new();
        for arn in arns {
            let arn = Arn::parse(&arn).context(error::ArnSnafu)?;
            let name = arn.eks_cluster_name().context(error::ArnSnafu)?;
            let cluster = match self.eks.describe_cluster(name).await {
                Ok(cluster) => cluster,
                Err(e) if e.is_code(CLUSTER_NOT_FOUND) => {
                    info!("EKS cluster '{}' already deleted", name);
                    continue;
                }
                Err(e) => {
                    return Err(e).context(error::DescribeResourceSnafu {
                        what: "EKS cluster",
                        id: name,
                    })
                }
            };
            let resource = ResourceWithTags::new(name, cluster.created, cluster.tags);
            if should_delete_resource(&resource, input) {
                cluster_names.push(name.to_string());
            }
        }
        Ok(cluster_names)
    }

    /// Delete the cluster and wait until EKS no longer knows about it.
    pub async fn delete_cluster(&self, name: &str) -> Result<()> {
        info!("Deleting EKS cluster '{}'", name);
        match self.eks.delete_cluster(name).await {
            Ok(()) => {}
            Err(e) if e.is_code(CLUSTER_NOT_FOUND) => {
                info!("EKS cluster '{}' already deleted", name);
                return Ok(());
            }
            Err(e) => {
                return Err(e).context(error::DeleteResourceSnafu {
                    what: "EKS cluster",
                    id: name,
                })
            }
        }
        tokio::time::timeout(self.timeout, self.wait_for_deletion(name))
            .await
            .context(error::WaitTimeoutSnafu {
                what: "EKS cluster",
                id: name,
            })?
    }

    pub async fn delete_clusters(&self, names: &[String]) -> Result<()> {
        for name in names {
            self.delete_cluster(name).await?;
        }
        Ok(())
    }

    async fn wait_for_deletion(&self, name: &str) -> Result<()> {
        loop {
            match self.eks.describe_cluster(name).await {
                Ok(cluster) => debug!(
                    "EKS cluster '{}' is {}, waiting",
                    name,
                    cluster.status.as_deref().unwrap_or("unknown")
                ),
                Err(e) if e.is_code(CLUSTER_NOT_FOUND) => {
                    info!("Deleted EKS cluster '{}'", name);
                    return Ok(());
                }
                Err(e) => {
                    return Err(e).context(error::DescribeResourceSnafu {
                        what: "EKS cluster",
                        id: name,
                    })
                }
            }
            tokio::time::sleep(self.poll).await;
        }
    }
}
