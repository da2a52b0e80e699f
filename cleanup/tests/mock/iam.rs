use super::{not_found, page, FakeAccount, FakeInstanceProfile};
use e2e_cleanup::clients::{ApiError, ApiResult, IamApi, InstanceProfile, Page, Role};
use e2e_cleanup::Tag;

const NO_SUCH_ENTITY: &str = "NoSuchEntity";

fn profile_view(name: &str, profile: &FakeInstanceProfile) -> InstanceProfile {
    InstanceProfile {
        name: name.to_string(),
        created: profile.created,
        roles: profile.roles.clone(),
    }
}

fn conflict(what: &str, name: &str) -> ApiError {
    ApiError::new(
        "DeleteConflict",
        format!("Cannot delete entity, {} {} is still in use.", what, name),
    )
}

#[async_trait::async_trait]
impl IamApi for FakeAccount {
    async fn list_roles(&self, marker: Option<String>) -> ApiResult<Page<Role>> {
        let mut state = self.state();
        state.check("list_roles")?;
        let roles = state
            .roles
            .iter()
            .map(|(name, role)| Role {
                name: name.clone(),
                created: role.created,
            })
            .collect();
        Ok(page(roles, marker))
    }

    async fn list_role_tags(&self, role_name: &str) -> ApiResult<Vec<Tag>> {
        let mut state = self.state();
        state.check("list_role_tags")?;
        state
            .roles
            .get(role_name)
            .map(|role| role.tags.clone())
            .ok_or_else(|| not_found(NO_SUCH_ENTITY, role_name))
    }

    async fn list_instance_profiles_for_role(&self, role_name: &str) -> ApiResult<Vec<String>> {
        let mut state = self.state();
        state.check("list_instance_profiles_for_role")?;
        if !state.roles.contains_key(role_name) {
            return Err(not_found(NO_SUCH_ENTITY, role_name));
        }
        Ok(state
            .instance_profiles
            .iter()
            .filter(|(_, profile)| profile.roles.iter().any(|role| role == role_name))
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn remove_role_from_instance_profile(
        &self,
        profile_name: &str,
        role_name: &str,
    ) -> ApiResult<()> {
        let mut state = self.state();
        state.call("remove_role_from_instance_profile", profile_name)?;
        let profile = state
            .instance_profiles
            .get_mut(profile_name)
            .ok_or_else(|| not_found(NO_SUCH_ENTITY, profile_name))?;
        if !profile.roles.iter().any(|role| role == role_name) {
            return Err(not_found(NO_SUCH_ENTITY, role_name));
        }
        profile.roles.retain(|role| role != role_name);
        Ok(())
    }

    async fn list_attached_role_policies(&self, role_name: &str) -> ApiResult<Vec<String>> {
        let mut state = self.state();
        state.check("list_attached_role_policies")?;
        state
            .roles
            .get(role_name)
            .map(|role| role.attached_policies.clone())
            .ok_or_else(|| not_found(NO_SUCH_ENTITY, role_name))
    }

    async fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.call("detach_role_policy", role_name)?;
        let role = state
            .roles
            .get_mut(role_name)
            .ok_or_else(|| not_found(NO_SUCH_ENTITY, role_name))?;
        role.attached_policies.retain(|arn| arn != policy_arn);
        Ok(())
    }

    async fn list_role_policies(&self, role_name: &str) -> ApiResult<Vec<String>> {
        let mut state = self.state();
        state.check("list_role_policies")?;
        state
            .roles
            .get(role_name)
            .map(|role| role.inline_policies.clone())
            .ok_or_else(|| not_found(NO_SUCH_ENTITY, role_name))
    }

    async fn delete_role_policy(&self, role_name: &str, policy_name: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.call("delete_role_policy", role_name)?;
        let role = state
            .roles
            .get_mut(role_name)
            .ok_or_else(|| not_found(NO_SUCH_ENTITY, role_name))?;
        role.inline_policies.retain(|name| name != policy_name);
        Ok(())
    }

    async fn delete_role(&self, role_name: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.call("delete_role", role_name)?;
        let role = state
            .roles
            .get(role_name)
            .ok_or_else(|| not_found(NO_SUCH_ENTITY, role_name))?;
        if !role.attached_policies.is_empty() || !role.inline_policies.is_empty() {
            return Err(conflict("role", role_name));
        }
        if state
            .instance_profiles
            .values()
            .any(|profile| profile.roles.iter().any(|role| role == role_name))
        {
            return Err(conflict("role", role_name));
        }
        state.roles.remove(role_name);
        Ok(())
    }

    async fn list_instance_profiles(
        &self,
        marker: Option<String>,
    ) -> ApiResult<Page<InstanceProfile>> {
        let mut state = self.state();
        state.check("list_instance_profiles")?;
        let profiles = state
            .instance_profiles
            .iter()
            .map(|(name, profile)| profile_view(name, profile))
            .collect();
        Ok(page(profiles, marker))
    }

    async fn get_instance_profile(&self, profile_name: &str) -> ApiResult<InstanceProfile> {
        let mut state = self.state();
        state.check("get_instance_profile")?;
        state
            .instance_profiles
            .get(profile_name)
            .map(|profile| profile_view(profile_name, profile))
            .ok_or_else(|| not_found(NO_SUCH_ENTITY, profile_name))
    }

    async fn list_instance_profile_tags(&self, profile_name: &str) -> ApiResult<Vec<Tag>> {
        let mut state = self.state();
        state.check("list_instance_profile_tags")?;
        state
            .instance_profiles
            .get(profile_name)
            .map(|profile| profile.tags.clone())
            .ok_or_else(|| not_found(NO_SUCH_ENTITY, profile_name))
    }

    async fn delete_instance_profile(&self, profile_name: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.call("delete_instance_profile", profile_name)?;
        let profile = state
            .instance_profiles
            .get(profile_name)
            .ok_or_else(|| not_found(NO_SUCH_ENTITY, profile_name))?;
        if !profile.roles.is_empty() {
            return Err(conflict("instance profile", profile_name));
        }
        state.instance_profiles.remove(profile_name);
        Ok(())
    }
}
