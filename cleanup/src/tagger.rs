use crate::clients::{TaggedResource, TaggingApi};
use crate::constants::TEST_CLUSTER_TAG_KEY;
use crate::error::{ListResourcesSnafu, Result};
use crate::resource::FilterInput;
use log::trace;
use snafu::ResultExt;
use std::sync::Arc;

/// Finds resources of one type that carry the cluster tag, using the resource groups tagging api.
/// When an exact cluster name is given only that cluster's resources are returned.
pub struct ResourceTagger {
    tagging: Arc<dyn TaggingApi>,
    cluster_name: Option<String>,
}

impl ResourceTagger {
    pub fn new(tagging: Arc<dyn TaggingApi>, input: &FilterInput) -> Self {
        Self {
            tagging,
            cluster_name: input.exact_cluster().map(str::to_string),
        }
    }

    pub async fn tagged_resources(&self, resource_type: &str) -> Result<Vec<TaggedResource>> {
        let values: Vec<String> = self.cluster_name.iter().cloned().collect();
        let mut resources = Vec::new();
        let mut next_token = None;
        loop {
            let page = self
                .tagging
                .get_resources(resource_type, TEST_CLUSTER_TAG_KEY, &values, next_token)
                .await
                .context(ListResourcesSnafu {
                    what: format!("tagged '{}' resources", resource_type),
                })?;
            trace!(
                "Tagging api returned {} '{}' resources",
                page.items.len(),
                resource_type
            );
            resources.extend(page.items);
            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => return Ok(resources),
            }
        }
    }

    /// Only the ARNs of `tagged_resources`.
    pub async fn tagged_arns(&self, resource_type: &str) -> Result<Vec<String>> {
        Ok(self
            .tagged_resources(resource_type)
            .await?
            .into_iter()
            .map(|resource| resource.arn)
            .collect())
    }
}
