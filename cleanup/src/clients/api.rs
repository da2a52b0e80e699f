use super::error::ApiResult;
use super::model::{
    Activation, Cluster, Instance, InstanceProfile, ManagedInstance, Page, Parameter, Profile,
    Role, RouteTable, SecurityGroup, Stack, TaggedResource, TrustAnchor, Vpc,
};
use crate::resource::Tag;

/// The resource groups tagging api, used to find resources by tag across services.
#[async_trait::async_trait]
pub trait TaggingApi: Send + Sync {
    /// Resources of `resource_type` (e.g. `ec2:instance`) that carry `tag_key`, restricted to the
    /// given values when any are given.
    async fn get_resources(
        &self,
        resource_type: &str,
        tag_key: &str,
        tag_values: &[String],
        next_token: Option<String>,
    ) -> ApiResult<Page<TaggedResource>>;
}

#[async_trait::async_trait]
pub trait Ec2Api: Send + Sync {
    async fn describe_instances(
        &self,
        instance_ids: &[String],
        next_token: Option<String>,
    ) -> ApiResult<Page<Instance>>;

    async fn terminate_instances(&self, instance_ids: &[String]) -> ApiResult<()>;

    /// VPCs that carry `tag_key`, with the given value when one is given.
    async fn describe_vpcs(
        &self,
        tag_key: &str,
        tag_value: Option<&str>,
        next_token: Option<String>,
    ) -> ApiResult<Page<Vpc>>;

    /// Ids of the internet gateways attached to the VPC.
    async fn describe_internet_gateways(&self, vpc_id: &str) -> ApiResult<Vec<String>>;
    async fn detach_internet_gateway(&self, gateway_id: &str, vpc_id: &str) -> ApiResult<()>;
    async fn delete_internet_gateway(&self, gateway_id: &str) -> ApiResult<()>;

    /// Ids of the subnets in the VPC.
    async fn describe_subnets(&self, vpc_id: &str) -> ApiResult<Vec<String>>;
    async fn delete_subnet(&self, subnet_id: &str) -> ApiResult<()>;

    async fn describe_route_tables(&self, vpc_id: &str) -> ApiResult<Vec<RouteTable>>;
    async fn disassociate_route_table(&self, association_id: &str) -> ApiResult<()>;
    async fn delete_route_table(&self, route_table_id: &str) -> ApiResult<()>;

    /// Security groups in the VPC with the ids of their rules.
    async fn describe_security_groups(&self, vpc_id: &str) -> ApiResult<Vec<SecurityGroup>>;
    async fn revoke_security_group_ingress(
        &self,
        group_id: &str,
        rule_ids: &[String],
    ) -> ApiResult<()>;
    async fn revoke_security_group_egress(
        &self,
        group_id: &str,
        rule_ids: &[String],
    ) -> ApiResult<()>;
    async fn delete_security_group(&self, group_id: &str) -> ApiResult<()>;

    async fn delete_vpc(&self, vpc_id: &str) -> ApiResult<()>;
}

#[async_trait::async_trait]
pub trait IamApi: Send + Sync {
    async fn list_roles(&self, marker: Option<String>) -> ApiResult<Page<Role>>;
    async fn list_role_tags(&self, role_name: &str) -> ApiResult<Vec<Tag>>;
    /// Names of the instance profiles that contain the role.
    async fn list_instance_profiles_for_role(&self, role_name: &str) -> ApiResult<Vec<String>>;
    async fn remove_role_from_instance_profile(
        &self,
        profile_name: &str,
        role_name: &str,
    ) -> ApiResult<()>;
    /// Arns of the managed policies attached to the role.
    async fn list_attached_role_policies(&self, role_name: &str) -> ApiResult<Vec<String>>;
    async fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> ApiResult<()>;
    /// Names of the inline policies of the role.
    async fn list_role_policies(&self, role_name: &str) -> ApiResult<Vec<String>>;
    async fn delete_role_policy(&self, role_name: &str, policy_name: &str) -> ApiResult<()>;
    async fn delete_role(&self, role_name: &str) -> ApiResult<()>;

    async fn list_instance_profiles(&self, marker: Option<String>)
        -> ApiResult<Page<InstanceProfile>>;
    async fn get_instance_profile(&self, profile_name: &str) -> ApiResult<InstanceProfile>;
    async fn list_instance_profile_tags(&self, profile_name: &str) -> ApiResult<Vec<Tag>>;
    async fn delete_instance_profile(&self, profile_name: &str) -> ApiResult<()>;
}

/// The filters `describe_instance_information` is called with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceInformationFilter {
    InstanceIds(Vec<String>),
    ActivationIds(Vec<String>),
}

#[async_trait::async_trait]
pub trait SsmApi: Send + Sync {
    async fn describe_activations(&self, next_token: Option<String>)
        -> ApiResult<Page<Activation>>;
    async fn delete_activation(&self, activation_id: &str) -> ApiResult<()>;

    async fn describe_instance_information(
        &self,
        filter: &InstanceInformationFilter,
        next_token: Option<String>,
    ) -> ApiResult<Page<ManagedInstance>>;
    async fn deregister_managed_instance(&self, instance_id: &str) -> ApiResult<()>;

    /// `None` if no parameter has this name.
    async fn describe_parameter(&self, name: &str) -> ApiResult<Option<Parameter>>;
    async fn delete_parameter(&self, name: &str) -> ApiResult<()>;
}

#[async_trait::async_trait]
pub trait CloudFormationApi: Send + Sync {
    /// Accepts a stack name or id. Fails with `StackNotFoundException` or a `ValidationError`
    /// when the stack does not exist.
    async fn describe_stack(&self, stack: &str) -> ApiResult<Stack>;
    async fn delete_stack(&self, stack: &str) -> ApiResult<()>;
}

#[async_trait::async_trait]
pub trait EksApi: Send + Sync {
    async fn describe_cluster(&self, name: &str) -> ApiResult<Cluster>;
    async fn delete_cluster(&self, name: &str) -> ApiResult<()>;
}

#[async_trait::async_trait]
pub trait RolesAnywhereApi: Send + Sync {
    async fn get_profile(&self, profile_id: &str) -> ApiResult<Profile>;
    async fn delete_profile(&self, profile_id: &str) -> ApiResult<()>;
    async fn get_trust_anchor(&self, trust_anchor_id: &str) -> ApiResult<TrustAnchor>;
    async fn delete_trust_anchor(&self, trust_anchor_id: &str) -> ApiResult<()>;
    async fn list_tags_for_resource(&self, arn: &str) -> ApiResult<Vec<Tag>>;
}
