use super::{api_error, owned, tags_from_map, to_utc};
use crate::clients::{ApiError, ApiResult, Cluster, EksApi};
use aws_sdk_eks::Client;

#[async_trait::async_trait]
impl EksApi for Client {
    async fn describe_cluster(&self, name: &str) -> ApiResult<Cluster> {
        let output = self
            .describe_cluster()
            .name(name)
            .send()
            .await
            .map_err(api_error)?;
        let cluster = output.cluster().ok_or_else(|| {
            ApiError::new(
                "ResourceNotFoundException",
                format!("No cluster found for name: {}", name),
            )
        })?;
        Ok(Cluster {
            name: owned(cluster.name()),
            status: cluster.status().map(|status| status.as_str().to_string()),
            created: to_utc(cluster.created_at()),
            tags: tags_from_map(cluster.tags()),
        })
    }

    async fn delete_cluster(&self, name: &str) -> ApiResult<()> {
        self.delete_cluster()
            .name(name)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }
}
