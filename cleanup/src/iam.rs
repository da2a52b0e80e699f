use crate::clients::{ApiError, ApiResult, IamApi};
use crate::constants::TEST_CREDENTIALS_STACK_NAME_PREFIX;
use crate::error::{self, Result};
use crate::resource::{
    resource_old_enough, should_delete_resource, FilterInput, ResourceWithTags,
};
use log::info;
use snafu::ResultExt;
use std::sync::Arc;

const NO_SUCH_ENTITY: &str = "NoSuchEntity";

/// Cleans up the roles and instance profiles created by the credentials stacks. IAM cannot filter
/// by tag, so every name with the stack prefix has its tags fetched.
pub struct IamCleaner {
    iam: Arc<dyn IamApi>,
}

impl IamCleaner {
    pub fn new(iam: Arc<dyn IamApi>) -> Self {
        Self { iam }
    }

    pub async fn list_roles(&self, input: &FilterInput) -> Result<Vec<String>> {
        let mut roles = Vec::new();
        let mut marker = None;
        loop {
            let page = self
                .iam
                .list_roles(marker)
                .await
                .context(error::ListResourcesSnafu { what: "IAM roles" })?;
            for role in page.items {
                if !role.name.starts_with(TEST_CREDENTIALS_STACK_NAME_PREFIX)
                    || !resource_old_enough(role.created, input)
                {
                    continue;
                }
                let tags = self.iam.list_role_tags(&role.name).await.context(
                    error::DescribeResourceSnafu {
                        what: "IAM role tags",
                        id: role.name.as_str(),
                    },
                )?;
                let resource = ResourceWithTags::new(role.name.as_str(), role.created, tags);
                if should_delete_resource(&resource, input) {
                    roles.push(role.name);
                }
            }
            marker = page.next_token;
            if marker.is_none() {
                return Ok(roles);
            }
        }
    }

    /// Remove the role from its instance profiles, drop its policies and delete it.
    pub async fn delete_role(&self, role_name: &str) -> Result<()> {
        let profiles = match self.iam.list_instance_profiles_for_role(role_name).await {
            Ok(profiles) => profiles,
            Err(e) if e.is_code(&[NO_SUCH_ENTITY]) => {
                info!("IAM role '{}' already deleted", role_name);
                return Ok(());
            }
            Err(e) => {
                return Err(e).context(error::DescribeResourceSnafu {
                    what: "IAM instance profiles for role",
                    id: role_name,
                })
            }
        };
        for profile in profiles {
            match self
                .iam
                .remove_role_from_instance_profile(&profile, role_name)
                .await
            {
                Err(e) if !e.is_code(&[NO_SUCH_ENTITY]) => {
                    return Err(e).context(error::DeleteResourceSnafu {
                        what: "IAM role from instance profile",
                        id: profile,
                    })
                }
                _ => info!(
                    "Removed IAM role '{}' from instance profile '{}'",
                    role_name, profile
                ),
            }
        }

        let attached = self
            .iam
            .list_attached_role_policies(role_name)
            .await
            .or_else(|e| empty_if_gone(e, role_name))
            .context(error::DescribeResourceSnafu {
                what: "IAM attached role policies",
                id: role_name,
            })?;
        for policy_arn in attached {
            match self.iam.detach_role_policy(role_name, &policy_arn).await {
                Err(e) if !e.is_code(&[NO_SUCH_ENTITY]) => {
                    return Err(e).context(error::DeleteResourceSnafu {
                        what: "IAM role policy attachment",
                        id: policy_arn,
                    })
                }
                _ => info!("Detached policy '{}' from IAM role '{}'", policy_arn, role_name),
            }
        }

        let inline = self
            .iam
            .list_role_policies(role_name)
            .await
            .or_else(|e| empty_if_gone(e, role_name))
            .context(error::DescribeResourceSnafu {
                what: "IAM inline role policies",
                id: role_name,
            })?;
        for policy_name in inline {
            match self.iam.delete_role_policy(role_name, &policy_name).await {
                Err(e) if !e.is_code(&[NO_SUCH_ENTITY]) => {
                    return Err(e).context(error::DeleteResourceSnafu {
                        what: "IAM inline role policy",
                        id: policy_name,
                    })
                }
                _ => info!(
                    "Deleted inline policy '{}' of IAM role '{}'",
                    policy_name, role_name
                ),
            }
        }

        match self.iam.delete_role(role_name).await {
            Ok(()) => {
                info!("Deleted IAM role '{}'", role_name);
                Ok(())
            }
            Err(e) if e.is_code(&[NO_SUCH_ENTITY]) => {
                info!("IAM role '{}' already deleted", role_name);
                Ok(())
            }
            Err(e) => Err(e).context(error::DeleteResourceSnafu {
                what: "IAM role",
                id: role_name,
            }),
        }
    }

    pub async fn list_instance_profiles(&self, input: &FilterInput) -> Result<Vec<String>> {
        let mut profiles = Vec::new();
        let mut marker = None;
        loop {
            let page = self.iam.list_instance_profiles(marker).await.context(
                error::ListResourcesSnafu {
                    what: "IAM instance profiles",
                },
            )?;
            for profile in page.items {
                if !profile.name.starts_with(TEST_CREDENTIALS_STACK_NAME_PREFIX)
                    || !resource_old_enough(profile.created, input)
                {
                    continue;
                }
                let tags = self
                    .iam
                    .list_instance_profile_tags(&profile.name)
                    .await
                    .context(error::DescribeResourceSnafu {
                        what: "IAM instance profile tags",
                        id: profile.name.as_str(),
                    })?;
                let resource =
                    ResourceWithTags::new(profile.name.as_str(), profile.created, tags);
                if should_delete_resource(&resource, input) {
                    profiles.push(profile.name);
                }
            }
            marker = page.next_token;
            if marker.is_none() {
                return Ok(profiles);
            }
        }
    }

    /// Delete the instance profile. Roles still in it are removed first since IAM refuses to
    /// delete a profile that has any.
    pub async fn delete_instance_profile(&self, profile_name: &str) -> Result<()> {
        let profile = match self.iam.get_instance_profile(profile_name).await {
            Ok(profile) => profile,
            Err(e) if e.is_code(&[NO_SUCH_ENTITY]) => {
                info!("IAM instance profile '{}' already deleted", profile_name);
                return Ok(());
            }
            Err(e) => {
                return Err(e).context(error::DescribeResourceSnafu {
                    what: "IAM instance profile",
                    id: profile_name,
                })
            }
        };
        for role_name in &profile.roles {
            match self
                .iam
                .remove_role_from_instance_profile(profile_name, role_name)
                .await
            {
                Err(e) if !e.is_code(&[NO_SUCH_ENTITY]) => {
                    return Err(e).context(error::DeleteResourceSnafu {
                        what: "IAM role from instance profile",
                        id: profile_name,
                    })
                }
                _ => info!(
                    "Removed IAM role '{}' from instance profile '{}'",
                    role_name, profile_name
                ),
            }
        }

        match self.iam.delete_instance_profile(profile_name).await {
            Ok(()) => {
                info!("Deleted IAM instance profile '{}'", profile_name);
                Ok(())
            }
            Err(e) if e.is_code(&[NO_SUCH_ENTITY]) => {
                info!("IAM instance profile '{}' already deleted", profile_name);
                Ok(())
            }
            Err(e) => Err(e).context(error::DeleteResourceSnafu {
                what: "IAM instance profile",
                id: profile_name,
            }),
        }
    }
}

fn empty_if_gone(e: ApiError, role_name: &str) -> ApiResult<Vec<String>> {
    if e.is_code(&[NO_SUCH_ENTITY]) {
        info!("IAM role '{}' already deleted", role_name);
        Ok(Vec::new())
    } else {
        Err(e)
    }
}
