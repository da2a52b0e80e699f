use crate::arn::Arn;
use crate::clients::{Ec2Api, Instance, TaggingApi};
use crate::constants::{
    INSTANCE_TERMINATE_POLL, INSTANCE_TERMINATE_TIMEOUT, POLL_ERROR_BUDGET, TAGGING_EC2_INSTANCE,
};
use crate::error::{self, Result};
use crate::resource::{should_delete_resource, FilterInput, ResourceWithTags};
use crate::tagger::ResourceTagger;
use log::{debug, info, warn};
use snafu::ResultExt;
use std::sync::Arc;
use std::time::Duration;

const INSTANCE_NOT_FOUND: &str = "InvalidInstanceID.NotFound";

pub struct Ec2Cleaner {
    ec2: Arc<dyn Ec2Api>,
    tagging: Arc<dyn TaggingApi>,
    poll: Duration,
    timeout: Duration,
}

impl Ec2Cleaner {
    pub fn new(ec2: Arc<dyn Ec2Api>, tagging: Arc<dyn TaggingApi>) -> Self {
        Self {
            ec2,
            tagging,
            poll: INSTANCE_TERMINATE_POLL,
            timeout: INSTANCE_TERMINATE_TIMEOUT,
        }
    }

    /// Change how often and how long `delete_instances` polls for termination.
    pub fn with_wait(mut self, poll: Duration, timeout: Duration) -> Self {
        self.poll = poll;
        self.timeout = timeout;
        self
    }

    /// Ids of the instances selected by `input` that are not already terminated.
    pub async fn list_tagged_instances(&self, input: &FilterInput) -> Result<Vec<String>> {
        let arns = ResourceTagger::new(Arc::clone(&self.tagging), input)
            .tagged_arns(TAGGING_EC2_INSTANCE)
            .await?;
        let instance_ids = arns
            .iter()
            .map(|arn| {
                Arn::parse(arn)
                    .map(|arn| arn.resource_id().to_string())
                    .context(error::ArnSnafu)
            })
            .collect::<Result<Vec<_>>>()?;
        if instance_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .describe_all(&instance_ids)
            .await
            .context(error::ListResourcesSnafu {
                what: "EC2 instances",
            })?
            .into_iter()
            .filter(|instance| should_terminate_instance(instance, input))
            .map(|instance| instance.id)
            .collect())
    }

    /// Terminate the instances and wait until all of them are terminated.
    pub async fn delete_instances(&self, instance_ids: &[String]) -> Result<()> {
        if instance_ids.is_empty() {
            return Ok(());
        }
        info!("Terminating EC2 instances {:?}", instance_ids);
        match self.ec2.terminate_instances(instance_ids).await {
            Ok(()) => {}
            // One unknown id fails the whole batch, so retry them one by one.
            Err(e) if e.is_code(&[INSTANCE_NOT_FOUND]) => {
                for instance_id in instance_ids {
                    self.terminate_instance(instance_id).await?;
                }
            }
            Err(e) => {
                return Err(e).context(error::DeleteResourceSnafu {
                    what: "EC2 instances",
                    id: instance_ids.join(","),
                })
            }
        }

        tokio::time::timeout(self.timeout, self.wait_for_terminated(instance_ids))
            .await
            .context(error::WaitTimeoutSnafu {
                what: "EC2 instances",
                id: instance_ids.join(","),
            })?
    }

    async fn terminate_instance(&self, instance_id: &str) -> Result<()> {
        match self
            .ec2
            .terminate_instances(&[instance_id.to_string()])
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if e.is_code(&[INSTANCE_NOT_FOUND]) => {
                info!("EC2 instance '{}' already terminated", instance_id);
                Ok(())
            }
            Err(e) => Err(e).context(error::DeleteResourceSnafu {
                what: "EC2 instance",
                id: instance_id,
            }),
        }
    }

    async fn wait_for_terminated(&self, instance_ids: &[String]) -> Result<()> {
        let mut failures = 0;
        loop {
            match self.describe_all(instance_ids).await {
                Ok(instances) => {
                    failures = 0;
                    // Instances that are no longer described are gone.
                    let remaining: Vec<&str> = instances
                        .iter()
                        .filter(|instance| !instance.is_terminated())
                        .map(|instance| instance.id.as_str())
                        .collect();
                    if remaining.is_empty() {
                        info!("EC2 instances {:?} terminated", instance_ids);
                        return Ok(());
                    }
                    debug!("Waiting for EC2 instances {:?} to terminate", remaining);
                }
                Err(e) => {
                    failures += 1;
                    if failures > POLL_ERROR_BUDGET {
                        return Err(e).context(error::PollBudgetSnafu {
                            what: "EC2 instances to terminate",
                            failures,
                        });
                    }
                    warn!("Error checking status of EC2 instances. Retrying: {}", e);
                }
            }
            tokio::time::sleep(self.poll).await;
        }
    }

    async fn describe_all(
        &self,
        instance_ids: &[String],
    ) -> crate::clients::ApiResult<Vec<Instance>> {
        let mut instances = Vec::new();
        let mut next_token = None;
        loop {
            let page = self
                .ec2
                .describe_instances(instance_ids, next_token)
                .await?;
            instances.extend(page.items);
            next_token = page.next_token;
            if next_token.is_none() {
                return Ok(instances);
            }
        }
    }
}

fn should_terminate_instance(instance: &Instance, input: &FilterInput) -> bool {
    if instance.is_terminated() {
        return false;
    }
    let resource = ResourceWithTags::new(
        instance.id.as_str(),
        instance.launch_time,
        instance.tags.clone(),
    );
    should_delete_resource(&resource, input)
}
