use super::{arn, not_found, page, FakeAccount, State};
use e2e_cleanup::clients::{
    Activation, ApiError, ApiResult, CloudFormationApi, Cluster, EksApi,
    InstanceInformationFilter, ManagedInstance, Page, Parameter, Profile, RolesAnywhereApi,
    SsmApi, Stack, TaggedResource, TaggingApi, TrustAnchor,
};
use e2e_cleanup::Tag;

const NOT_FOUND: &str = "ResourceNotFoundException";

#[async_trait::async_trait]
impl SsmApi for FakeAccount {
    async fn describe_activations(
        &self,
        next_token: Option<String>,
    ) -> ApiResult<Page<Activation>> {
        let mut state = self.state();
        state.check("describe_activations")?;
        let activations = state.activations.values().cloned().collect();
        Ok(page(activations, next_token))
    }

    async fn delete_activation(&self, activation_id: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.call("delete_activation", activation_id)?;
        state
            .activations
            .remove(activation_id)
            .map(|_| ())
            .ok_or_else(|| not_found("InvalidActivation", activation_id))
    }

    async fn describe_instance_information(
        &self,
        filter: &InstanceInformationFilter,
        next_token: Option<String>,
    ) -> ApiResult<Page<ManagedInstance>> {
        let mut state = self.state();
        state.check("describe_instance_information")?;
        let instances = state
            .managed_instances
            .values()
            .map(|(instance, _)| instance)
            .filter(|instance| match filter {
                InstanceInformationFilter::InstanceIds(ids) => ids.contains(&instance.id),
                InstanceInformationFilter::ActivationIds(ids) => instance
                    .activation_id
                    .as_ref()
                    .map_or(false, |id| ids.contains(id)),
            })
            .cloned()
            .collect();
        Ok(page(instances, next_token))
    }

    async fn deregister_managed_instance(&self, instance_id: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.call("deregister_managed_instance", instance_id)?;
        state
            .managed_instances
            .remove(instance_id)
            .map(|_| ())
            .ok_or_else(|| not_found("InvalidInstanceId", instance_id))
    }

    async fn describe_parameter(&self, name: &str) -> ApiResult<Option<Parameter>> {
        let mut state = self.state();
        state.check("describe_parameter")?;
        Ok(state
            .parameters
            .get(name)
            .map(|(parameter, _)| parameter.clone()))
    }

    async fn delete_parameter(&self, name: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.call("delete_parameter", name)?;
        state
            .parameters
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| not_found("ParameterNotFound", name))
    }
}

fn stack_missing(stack: &str) -> ApiError {
    ApiError::new(
        "ValidationError",
        format!("Stack with id {} does not exist", stack),
    )
}

#[async_trait::async_trait]
impl CloudFormationApi for FakeAccount {
    async fn describe_stack(&self, stack: &str) -> ApiResult<Stack> {
        let mut state = self.state();
        state.check("describe_stack")?;
        // Deleted stacks can still be described by id, but not by name.
        let found = state
            .stacks
            .iter_mut()
            .find(|s| s.id == stack || (s.name == stack && !is_deleted(s)))
            .ok_or_else(|| stack_missing(stack))?;
        let described = found.clone();
        if found.status.as_deref() == Some("DELETE_IN_PROGRESS") {
            found.status = Some("DELETE_COMPLETE".to_string());
        }
        Ok(described)
    }

    async fn delete_stack(&self, stack: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.call("delete_stack", stack)?;
        let failing = state.failing_stacks.contains(stack);
        // Deleting a stack that does not exist succeeds.
        if let Some(found) = state
            .stacks
            .iter_mut()
            .find(|s| (s.id == stack || s.name == stack) && !is_deleted(s))
        {
            found.status = Some(if failing {
                "DELETE_FAILED".to_string()
            } else {
                "DELETE_IN_PROGRESS".to_string()
            });
        }
        Ok(())
    }
}

fn is_deleted(stack: &Stack) -> bool {
    stack.status.as_deref() == Some("DELETE_COMPLETE")
}

#[async_trait::async_trait]
impl EksApi for FakeAccount {
    async fn describe_cluster(&self, name: &str) -> ApiResult<Cluster> {
        let mut state = self.state();
        state.check("describe_cluster")?;
        let cluster = state
            .clusters
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(NOT_FOUND, name))?;
        // A deleting cluster is gone by the next look.
        if cluster.status.as_deref() == Some("DELETING") {
            state.clusters.remove(name);
        }
        Ok(cluster)
    }

    async fn delete_cluster(&self, name: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.call("delete_cluster", name)?;
        let cluster = state
            .clusters
            .get_mut(name)
            .ok_or_else(|| not_found(NOT_FOUND, name))?;
        cluster.status = Some("DELETING".to_string());
        Ok(())
    }
}

#[async_trait::async_trait]
impl RolesAnywhereApi for FakeAccount {
    async fn get_profile(&self, profile_id: &str) -> ApiResult<Profile> {
        let mut state = self.state();
        state.check("get_profile")?;
        state
            .profiles
            .get(profile_id)
            .map(|(profile, _)| profile.clone())
            .ok_or_else(|| not_found(NOT_FOUND, profile_id))
    }

    async fn delete_profile(&self, profile_id: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.call("delete_profile", profile_id)?;
        state
            .profiles
            .remove(profile_id)
            .map(|_| ())
            .ok_or_else(|| not_found(NOT_FOUND, profile_id))
    }

    async fn get_trust_anchor(&self, trust_anchor_id: &str) -> ApiResult<TrustAnchor> {
        let mut state = self.state();
        state.check("get_trust_anchor")?;
        state
            .trust_anchors
            .get(trust_anchor_id)
            .map(|(anchor, _)| anchor.clone())
            .ok_or_else(|| not_found(NOT_FOUND, trust_anchor_id))
    }

    async fn delete_trust_anchor(&self, trust_anchor_id: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.call("delete_trust_anchor", trust_anchor_id)?;
        state
            .trust_anchors
            .remove(trust_anchor_id)
            .map(|_| ())
            .ok_or_else(|| not_found(NOT_FOUND, trust_anchor_id))
    }

    async fn list_tags_for_resource(&self, resource_arn: &str) -> ApiResult<Vec<Tag>> {
        let mut state = self.state();
        state.check("list_tags_for_resource")?;
        let id = resource_arn.rsplit('/').next().unwrap_or_default();
        let tags = if resource_arn.contains(":profile/") {
            state.profiles.get(id).map(|(_, tags)| tags.clone())
        } else {
            state.trust_anchors.get(id).map(|(_, tags)| tags.clone())
        };
        tags.ok_or_else(|| not_found(NOT_FOUND, resource_arn))
    }
}

/// What the tagging api would report for one resource type.
fn tagged(state: &State, resource_type: &str) -> Vec<TaggedResource> {
    let resources: Vec<TaggedResource> = match resource_type {
        "ec2:instance" => state
            .instances
            .values()
            .map(|instance| TaggedResource {
                arn: arn("ec2", &format!("instance/{}", instance.id)),
                tags: instance.tags.clone(),
            })
            .collect(),
        "ssm:managed-instance" => state
            .managed_instances
            .iter()
            .map(|(id, (_, tags))| TaggedResource {
                arn: arn("ssm", &format!("managed-instance/{}", id)),
                tags: tags.clone(),
            })
            .collect(),
        "ssm:parameter" => state
            .parameters
            .iter()
            .map(|(name, (_, tags))| TaggedResource {
                arn: arn(
                    "ssm",
                    &format!("parameter/{}", name.trim_start_matches('/')),
                ),
                tags: tags.clone(),
            })
            .collect(),
        "cloudformation:stack" => state
            .stacks
            .iter()
            .map(|stack| TaggedResource {
                arn: stack.id.clone(),
                tags: stack.tags.clone(),
            })
            .collect(),
        "eks:cluster" => state
            .clusters
            .values()
            .map(|cluster| TaggedResource {
                arn: arn("eks", &format!("cluster/{}", cluster.name)),
                tags: cluster.tags.clone(),
            })
            .collect(),
        "rolesanywhere:profile" => state
            .profiles
            .iter()
            .map(|(id, (_, tags))| TaggedResource {
                arn: arn("rolesanywhere", &format!("profile/{}", id)),
                tags: tags.clone(),
            })
            .collect(),
        "rolesanywhere:trust-anchor" => state
            .trust_anchors
            .iter()
            .map(|(id, (_, tags))| TaggedResource {
                arn: arn("rolesanywhere", &format!("trust-anchor/{}", id)),
                tags: tags.clone(),
            })
            .collect(),
        _ => Vec::new(),
    };
    resources
        .into_iter()
        .chain(
            state
                .stale_tagged
                .iter()
                .filter(|(t, _)| t == resource_type)
                .map(|(_, resource)| resource.clone()),
        )
        .collect()
}

#[async_trait::async_trait]
impl TaggingApi for FakeAccount {
    async fn get_resources(
        &self,
        resource_type: &str,
        tag_key: &str,
        tag_values: &[String],
        next_token: Option<String>,
    ) -> ApiResult<Page<TaggedResource>> {
        let mut state = self.state();
        state.check("get_resources")?;
        let matching: Vec<TaggedResource> = tagged(&state, resource_type)
            .into_iter()
            .filter(|resource| {
                resource.tags.iter().any(|tag| {
                    tag.key == tag_key && (tag_values.is_empty() || tag_values.contains(&tag.value))
                })
            })
            .collect();
        let mut result = page(matching, next_token);
        // The real api ends paging with an empty token.
        if result.next_token.is_none() {
            result.next_token = Some(String::new());
        }
        Ok(result)
    }
}
