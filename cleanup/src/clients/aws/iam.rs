use super::{api_error, convert_tags, owned, to_utc};
use crate::clients::{ApiResult, IamApi, InstanceProfile, Page, Role};
use crate::resource::Tag;
use aws_sdk_iam::Client;

fn instance_profile(profile: &aws_sdk_iam::model::InstanceProfile) -> InstanceProfile {
    InstanceProfile {
        name: owned(profile.instance_profile_name()),
        created: to_utc(profile.create_date()),
        roles: profile
            .roles()
            .unwrap_or_default()
            .iter()
            .filter_map(|role| role.role_name())
            .map(str::to_string)
            .collect(),
    }
}

#[async_trait::async_trait]
impl IamApi for Client {
    async fn list_roles(&self, marker: Option<String>) -> ApiResult<Page<Role>> {
        let output = self
            .list_roles()
            .set_marker(marker)
            .send()
            .await
            .map_err(api_error)?;
        let items = output
            .roles()
            .unwrap_or_default()
            .iter()
            .map(|role| Role {
                name: owned(role.role_name()),
                created: to_utc(role.create_date()),
            })
            .collect();
        Ok(Page {
            items,
            next_token: output.marker().map(str::to_string),
        })
    }

    async fn list_role_tags(&self, role_name: &str) -> ApiResult<Vec<Tag>> {
        let mut tags = Vec::new();
        let mut marker = None;
        loop {
            let output = self
                .list_role_tags()
                .role_name(role_name)
                .set_marker(marker)
                .send()
                .await
                .map_err(api_error)?;
            tags.extend(convert_tags(output.tags()));
            marker = output.marker().map(str::to_string);
            if marker.is_none() {
                return Ok(tags);
            }
        }
    }

    async fn list_instance_profiles_for_role(&self, role_name: &str) -> ApiResult<Vec<String>> {
        let mut profiles = Vec::new();
        let mut marker = None;
        loop {
            let output = self
                .list_instance_profiles_for_role()
                .role_name(role_name)
                .set_marker(marker)
                .send()
                .await
                .map_err(api_error)?;
            profiles.extend(
                output
                    .instance_profiles()
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|profile| profile.instance_profile_name())
                    .map(str::to_string),
            );
            marker = output.marker().map(str::to_string);
            if marker.is_none() {
                return Ok(profiles);
            }
        }
    }

    async fn remove_role_from_instance_profile(
        &self,
        profile_name: &str,
        role_name: &str,
    ) -> ApiResult<()> {
        self.remove_role_from_instance_profile()
            .instance_profile_name(profile_name)
            .role_name(role_name)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn list_attached_role_policies(&self, role_name: &str) -> ApiResult<Vec<String>> {
        let mut policies = Vec::new();
        let mut marker = None;
        loop {
            let output = self
                .list_attached_role_policies()
                .role_name(role_name)
                .set_marker(marker)
                .send()
                .await
                .map_err(api_error)?;
            policies.extend(
                output
                    .attached_policies()
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|policy| policy.policy_arn())
                    .map(str::to_string),
            );
            marker = output.marker().map(str::to_string);
            if marker.is_none() {
                return Ok(policies);
            }
        }
    }

    async fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> ApiResult<()> {
        self.detach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn list_role_policies(&self, role_name: &str) -> ApiResult<Vec<String>> {
        let mut policies = Vec::new();
        let mut marker = None;
        loop {
            let output = self
                .list_role_policies()
                .role_name(role_name)
                .set_marker(marker)
                .send()
                .await
                .map_err(api_error)?;
            policies.extend(output.policy_names().unwrap_or_default().iter().cloned());
            marker = output.marker().map(str::to_string);
            if marker.is_none() {
                return Ok(policies);
            }
        }
    }

    async fn delete_role_policy(&self, role_name: &str, policy_name: &str) -> ApiResult<()> {
        self.delete_role_policy()
            .role_name(role_name)
            .policy_name(policy_name)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn delete_role(&self, role_name: &str) -> ApiResult<()> {
        self.delete_role()
            .role_name(role_name)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn list_instance_profiles(
        &self,
        marker: Option<String>,
    ) -> ApiResult<Page<InstanceProfile>> {
        let output = self
            .list_instance_profiles()
            .set_marker(marker)
            .send()
            .await
            .map_err(api_error)?;
        Ok(Page {
            items: output
                .instance_profiles()
                .unwrap_or_default()
                .iter()
                .map(instance_profile)
                .collect(),
            next_token: output.marker().map(str::to_string),
        })
    }

    async fn get_instance_profile(&self, profile_name: &str) -> ApiResult<InstanceProfile> {
        let output = self
            .get_instance_profile()
            .instance_profile_name(profile_name)
            .send()
            .await
            .map_err(api_error)?;
        Ok(output
            .instance_profile()
            .map(instance_profile)
            .unwrap_or_else(|| InstanceProfile {
                name: profile_name.to_string(),
                created: None,
                roles: Vec::new(),
            }))
    }

    async fn list_instance_profile_tags(&self, profile_name: &str) -> ApiResult<Vec<Tag>> {
        let mut tags = Vec::new();
        let mut marker = None;
        loop {
            let output = self
                .list_instance_profile_tags()
                .instance_profile_name(profile_name)
                .set_marker(marker)
                .send()
                .await
                .map_err(api_error)?;
            tags.extend(convert_tags(output.tags()));
            marker = output.marker().map(str::to_string);
            if marker.is_none() {
                return Ok(tags);
            }
        }
    }

    async fn delete_instance_profile(&self, profile_name: &str) -> ApiResult<()> {
        self.delete_instance_profile()
            .instance_profile_name(profile_name)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }
}
