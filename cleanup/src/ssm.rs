use crate::arn::Arn;
use crate::clients::{
    Activation, InstanceInformationFilter, ManagedInstance, SsmApi, TaggingApi,
};
use crate::constants::{
    MANAGED_INSTANCE_RESOURCE_TYPE, TAGGING_SSM_MANAGED_INSTANCE, TAGGING_SSM_PARAMETER,
};
use crate::error::{self, Result};
use crate::resource::{should_delete_resource, FilterInput, ResourceWithTags, Tag};
use crate::tagger::ResourceTagger;
use log::info;
use snafu::ResultExt;
use std::collections::HashMap;
use std::sync::Arc;

// DescribeInstanceInformation accepts at most this many values per filter.
const INSTANCE_FILTER_LIMIT: usize = 50;

const ACTIVATION_NOT_FOUND: &[&str] = &["InvalidActivation", "InvalidActivationId"];
const INSTANCE_NOT_FOUND: &[&str] = &["InvalidInstanceId"];
const PARAMETER_NOT_FOUND: &[&str] = &["ParameterNotFound"];

pub struct SsmCleaner {
    ssm: Arc<dyn SsmApi>,
    tagging: Arc<dyn TaggingApi>,
}

impl SsmCleaner {
    pub fn new(ssm: Arc<dyn SsmApi>, tagging: Arc<dyn TaggingApi>) -> Self {
        Self { ssm, tagging }
    }

    pub async fn list_activations(&self, input: &FilterInput) -> Result<Vec<String>> {
        self.list_activations_where(|activation| {
            let resource = ResourceWithTags::new(
                activation.id.as_str(),
                activation.created,
                activation.tags.clone(),
            );
            should_delete_resource(&resource, input)
        })
        .await
    }

    /// Activations created for one node, matched by their default instance name.
    pub async fn list_activations_for_node(&self, node_name: &str) -> Result<Vec<String>> {
        self.list_activations_where(|activation| {
            activation.default_instance_name.as_deref() == Some(node_name)
        })
        .await
    }

    async fn list_activations_where<F>(&self, select: F) -> Result<Vec<String>>
    where
        F: Fn(&Activation) -> bool,
    {
        let mut activation_ids = Vec::new();
        let mut next_token = None;
        loop {
            let page = self.ssm.describe_activations(next_token).await.context(
                error::ListResourcesSnafu {
                    what: "SSM activations",
                },
            )?;
            activation_ids.extend(
                page.items
                    .iter()
                    .filter(|&activation| select(activation))
                    .map(|activation| activation.id.clone()),
            );
            next_token = page.next_token;
            if next_token.is_none() {
                return Ok(activation_ids);
            }
        }
    }

    pub async fn delete_activation(&self, activation_id: &str) -> Result<()> {
        info!("Deleting SSM activation '{}'", activation_id);
        match self.ssm.delete_activation(activation_id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_code(ACTIVATION_NOT_FOUND) => {
                info!("SSM activation '{}' already deleted", activation_id);
                Ok(())
            }
            Err(e) => Err(e).context(error::DeleteResourceSnafu {
                what: "SSM activation",
                id: activation_id,
            }),
        }
    }

    pub async fn delete_activations(&self, activation_ids: &[String]) -> Result<()> {
        for activation_id in activation_ids {
            self.delete_activation(activation_id).await?;
        }
        Ok(())
    }

    /// Hybrid nodes registered with SSM whose tags are selected by `input`. Their age is the last
    /// time they pinged SSM, or their registration time if they never did.
    pub async fn list_managed_instances(&self, input: &FilterInput) -> Result<Vec<String>> {
        let tagged = ResourceTagger::new(Arc::clone(&self.tagging), input)
            .tagged_resources(TAGGING_SSM_MANAGED_INSTANCE)
            .await?;
        let mut tags: HashMap<String, Vec<Tag>> = HashMap::new();
        for resource in tagged {
            let arn = Arn::parse(&resource.arn).context(error::ArnSnafu)?;
            tags.insert(arn.resource_id().to_string(), resource.tags);
        }
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        let mut ids: Vec<String> = tags.keys().cloned().collect();
        ids.sort();
        let mut instance_ids = Vec::new();
        for chunk in ids.chunks(INSTANCE_FILTER_LIMIT) {
            let filter = InstanceInformationFilter::InstanceIds(chunk.to_vec());
            for instance in self.describe_managed_instances(&filter).await? {
                let resource = ResourceWithTags::new(
                    instance.id.as_str(),
                    instance.last_ping.or(instance.registered),
                    tags.get(&instance.id).cloned().unwrap_or_default(),
                );
                if should_delete_resource(&resource, input) {
                    instance_ids.push(instance.id);
                }
            }
        }
        Ok(instance_ids)
    }

    /// Hybrid nodes registered with any of the activations.
    pub async fn list_managed_instances_by_activation_ids(
        &self,
        activation_ids: &[String],
    ) -> Result<Vec<String>> {
        if activation_ids.is_empty() {
            return Ok(Vec::new());
        }
        let filter = InstanceInformationFilter::ActivationIds(activation_ids.to_vec());
        Ok(self
            .describe_managed_instances(&filter)
            .await?
            .into_iter()
            .filter(|instance| {
                instance
                    .activation_id
                    .as_ref()
                    .map_or(false, |id| activation_ids.contains(id))
            })
            .map(|instance| instance.id)
            .collect())
    }

    /// Only hybrid nodes, SSM also reports EC2 instances.
    async fn describe_managed_instances(
        &self,
        filter: &InstanceInformationFilter,
    ) -> Result<Vec<ManagedInstance>> {
        let mut instances = Vec::new();
        let mut next_token = None;
        loop {
            let page = self
                .ssm
                .describe_instance_information(filter, next_token)
                .await
                .context(error::ListResourcesSnafu {
                    what: "SSM managed instances",
                })?;
            instances.extend(page.items.into_iter().filter(|instance| {
                instance.resource_type.as_deref() == Some(MANAGED_INSTANCE_RESOURCE_TYPE)
            }));
            next_token = page.next_token;
            if next_token.is_none() {
                return Ok(instances);
            }
        }
    }

    pub async fn deregister_managed_instance(&self, instance_id: &str) -> Result<()> {
        info!("Deregistering SSM managed instance '{}'", instance_id);
        match self.ssm.deregister_managed_instance(instance_id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_code(INSTANCE_NOT_FOUND) => {
                info!("SSM managed instance '{}' already deregistered", instance_id);
                Ok(())
            }
            Err(e) => Err(e).context(error::DeleteResourceSnafu {
                what: "SSM managed instance",
                id: instance_id,
            }),
        }
    }

    pub async fn delete_managed_instances(&self, instance_ids: &[String]) -> Result<()> {
        for instance_id in instance_ids {
            self.deregister_managed_instance(instance_id).await?;
        }
        Ok(())
    }

    /// Parameter names whose tags are selected by `input`, aged by their last modification.
    pub async fn list_parameters(&self, input: &FilterInput) -> Result<Vec<String>> {
        let tagged = ResourceTagger::new(Arc::clone(&self.tagging), input)
            .tagged_resources(TAGGING_SSM_PARAMETER)
            .await?;
        let mut names = Vec::new();
        for resource in tagged {
            let name = Arn::parse(&resource.arn)
                .and_then(|arn| arn.ssm_parameter_name())
                .context(error::ArnSnafu)?;
            let parameter = match self.ssm.describe_parameter(&name).await.context(
                error::DescribeResourceSnafu {
                    what: "SSM parameter",
                    id: name.as_str(),
                },
            )? {
                Some(parameter) => parameter,
                None => {
                    info!("SSM parameter '{}' already deleted", name);
                    continue;
                }
            };
            let candidate =
                ResourceWithTags::new(name.as_str(), parameter.last_modified, resource.tags);
            if should_delete_resource(&candidate, input) {
                names.push(name);
            }
        }
        Ok(names)
    }

    pub async fn delete_parameter(&self, name: &str) -> Result<()> {
        info!("Deleting SSM parameter '{}'", name);
        match self.ssm.delete_parameter(name).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_code(PARAMETER_NOT_FOUND) => {
                info!("SSM parameter '{}' already deleted", name);
                Ok(())
            }
            Err(e) => Err(e).context(error::DeleteResourceSnafu {
                what: "SSM parameter",
                id: name,
            }),
        }
    }

    pub async fn delete_parameters(&self, names: &[String]) -> Result<()> {
        for name in names {
            self.delete_parameter(name).await?;
        }
        Ok(())
    }
}
