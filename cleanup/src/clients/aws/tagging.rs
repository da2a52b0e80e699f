use super::{api_error, convert_tags, owned};
use crate::clients::{ApiResult, Page, TaggedResource, TaggingApi};
use aws_sdk_resourcegroupstagging::model::TagFilter;
use aws_sdk_resourcegroupstagging::Client;

#[async_trait::async_trait]
impl TaggingApi for Client {
    async fn get_resources(
        &self,
        resource_type: &str,
        tag_key: &str,
        tag_values: &[String],
        next_token: Option<String>,
    ) -> ApiResult<Page<TaggedResource>> {
        let values = if tag_values.is_empty() {
            None
        } else {
            Some(tag_values.to_vec())
        };
        let output = self
            .get_resources()
            .resource_type_filters(resource_type)
            .tag_filters(TagFilter::builder().key(tag_key).set_values(values).build())
            .set_pagination_token(next_token)
            .send()
            .await
            .map_err(api_error)?;
        let items = output
            .resource_tag_mapping_list()
            .unwrap_or_default()
            .iter()
            .map(|mapping| TaggedResource {
                arn: owned(mapping.resource_arn()),
                tags: convert_tags(mapping.tags()),
            })
            .collect();
        // The last page carries an empty token rather than none.
        let next_token = output
            .pagination_token()
            .filter(|token| !token.is_empty())
            .map(str::to_string);
        Ok(Page { items, next_token })
    }
}
