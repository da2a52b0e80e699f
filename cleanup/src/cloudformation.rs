use crate::clients::{ApiError, CloudFormationApi, TaggingApi};
use crate::constants::{
    STACK_DELETION_POLL, STACK_DELETION_TIMEOUT, TAGGING_CFN_STACK,
    TEST_ARCHITECTURE_STACK_NAME_PREFIX, TEST_CREDENTIALS_STACK_NAME_PREFIX,
};
use crate::error::{self, Result};
use crate::resource::{cluster_tag_value, should_delete_resource, FilterInput, ResourceWithTags};
use crate::tagger::ResourceTagger;
use e2e_utils::impl_display_as_json;
use log::{debug, info};
use serde::Serialize;
use snafu::{ensure, ResultExt};
use std::sync::Arc;
use std::time::Duration;

const DELETE_COMPLETE: &str = "DELETE_COMPLETE";
const DELETE_FAILED: &str = "DELETE_FAILED";

/// A stack selected for deletion and the cluster it was created for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CfnStack {
    pub stack_name: String,
    pub cluster_name: String,
}

impl_display_as_json!(CfnStack);

/// Credentials stacks share their prefix with architecture stacks.
pub fn is_credential_stack(stack_name: &str) -> bool {
    stack_name.starts_with(TEST_CREDENTIALS_STACK_NAME_PREFIX)
        && !stack_name.starts_with(TEST_ARCHITECTURE_STACK_NAME_PREFIX)
}

pub fn is_architecture_stack(stack_name: &str) -> bool {
    stack_name.starts_with(TEST_ARCHITECTURE_STACK_NAME_PREFIX)
}

/// CloudFormation reports a missing stack as a validation error when it is looked up by name.
fn stack_missing(e: &ApiError) -> bool {
    e.is_code(&["StackNotFoundException"])
        || (e.is_code(&["ValidationError"]) && e.message().contains("does not exist"))
}

pub struct CfnStackCleaner {
    cfn: Arc<dyn CloudFormationApi>,
    tagging: Arc<dyn TaggingApi>,
    poll: Duration,
    timeout: Duration,
}

impl CfnStackCleaner {
    pub fn new(cfn: Arc<dyn CloudFormationApi>, tagging: Arc<dyn TaggingApi>) -> Self {
        Self {
            cfn,
            tagging,
            poll: STACK_DELETION_POLL,
            timeout: STACK_DELETION_TIMEOUT,
        }
    }

    pub fn with_wait(mut self, poll: Duration, timeout: Duration) -> Self {
        self.poll = poll;
        self.timeout = timeout;
        self
    }

    pub async fn list_credential_stacks(&self, input: &FilterInput) -> Result<Vec<CfnStack>> {
        self.list_stacks(input, is_credential_stack).await
    }

    pub async fn list_architecture_stacks(&self, input: &FilterInput) -> Result<Vec<CfnStack>> {
        self.list_stacks(input, is_architecture_stack).await
    }

    async fn list_stacks(
        &self,
        input: &FilterInput,
        include: fn(&str) -> bool,
    ) -> Result<Vec<CfnStack>> {
        let arns = ResourceTagger::new(Arc::clone(&self.tagging), input)
            .tagged_arns(TAGGING_CFN_STACK)
            .await?;
        let mut stacks = Vec::new();
        for arn in arns {
            let stack = match self.cfn.describe_stack(&arn).await {
                Ok(stack) => stack,
                Err(e) if stack_missing(&e) => {
                    info!("Stack '{}' already deleted", arn);
                    continue;
                }
                Err(e) => {
                    return Err(e).context(error::DescribeResourceSnafu {
                        what: "CloudFormation stack",
                        id: arn,
                    })
                }
            };
            // Deleted stacks stay visible by id for a while.
            if stack.status.as_deref() == Some(DELETE_COMPLETE) || !include(&stack.name) {
                continue;
            }
            let resource = ResourceWithTags::new(stack.id.as_str(), stack.created, stack.tags);
            if should_delete_resource(&resource, input) {
                stacks.push(CfnStack {
                    cluster_name: cluster_tag_value(&resource.tags)
                        .unwrap_or_default()
                        .to_string(),
                    stack_name: stack.name,
                });
            }
        }
        Ok(stacks)
    }

    /// Delete the stack and wait until CloudFormation has finished deleting it.
    pub async fn delete_stack(&self, stack_name: &str) -> Result<()> {
        info!("Deleting CloudFormation stack '{}'", stack_name);
        match self.cfn.delete_stack(stack_name).await {
            Ok(()) => {}
            Err(e) if stack_missing(&e) => {
                info!("Stack '{}' already deleted", stack_name);
                return Ok(());
            }
            Err(e) => {
                return Err(e).context(error::DeleteResourceSnafu {
                    what: "CloudFormation stack",
                    id: stack_name,
                })
            }
        }
        tokio::time::timeout(self.timeout, self.wait_for_deletion(stack_name))
            .await
            .context(error::WaitTimeoutSnafu {
                what: "CloudFormation stack",
                id: stack_name,
            })?
    }

    pub async fn delete_stacks(&self, stacks: &[CfnStack]) -> Result<()> {
        for stack in stacks {
            self.delete_stack(&stack.stack_name).await?;
        }
        Ok(())
    }

    async fn wait_for_deletion(&self, stack_name: &str) -> Result<()> {
        loop {
            let stack = match self.cfn.describe_stack(stack_name).await {
                Ok(stack) => stack,
                Err(e) if stack_missing(&e) => break,
                Err(e) => {
                    return Err(e).context(error::DescribeResourceSnafu {
                        what: "CloudFormation stack",
                        id: stack_name,
                    })
                }
            };
            let status = stack.status.unwrap_or_default();
            if status == DELETE_COMPLETE {
                break;
            }
            ensure!(
                status != DELETE_FAILED,
                error::WaitFailedSnafu {
                    what: "CloudFormation stack",
                    id: stack_name,
                    status,
                }
            );
            debug!("Stack '{}' is {}, waiting", stack_name, status);
            tokio::time::sleep(self.poll).await;
        }
        info!("Deleted CloudFormation stack '{}'", stack_name);
        Ok(())
    }
}
