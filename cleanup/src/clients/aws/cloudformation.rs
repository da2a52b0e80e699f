use super::{api_error, convert_tags, owned, to_utc};
use crate::clients::{ApiError, ApiResult, CloudFormationApi, Stack};
use aws_sdk_cloudformation::Client;

#[async_trait::async_trait]
impl CloudFormationApi for Client {
    async fn describe_stack(&self, stack: &str) -> ApiResult<Stack> {
        let output = self
            .describe_stacks()
            .stack_name(stack)
            .send()
            .await
            .map_err(api_error)?;
        let found = output
            .stacks()
            .unwrap_or_default()
            .first()
            .ok_or_else(|| {
                ApiError::new(
                    "StackNotFoundException",
                    format!("Stack with id {} does not exist", stack),
                )
            })?;
        Ok(Stack {
            id: owned(found.stack_id()),
            name: owned(found.stack_name()),
            status: found.stack_status().map(|status| status.as_str().to_string()),
            created: to_utc(found.creation_time()),
            tags: convert_tags(found.tags()),
        })
    }

    async fn delete_stack(&self, stack: &str) -> ApiResult<()> {
        self.delete_stack()
            .stack_name(stack)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }
}
