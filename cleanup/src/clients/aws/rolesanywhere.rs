use super::{api_error, convert_tags, owned, to_utc};
use crate::clients::{ApiError, ApiResult, Profile, RolesAnywhereApi, TrustAnchor};
use crate::resource::Tag;
use aws_sdk_rolesanywhere::Client;

const NOT_FOUND: &str = "ResourceNotFoundException";

#[async_trait::async_trait]
impl RolesAnywhereApi for Client {
    async fn get_profile(&self, profile_id: &str) -> ApiResult<Profile> {
        let output = self
            .get_profile()
            .profile_id(profile_id)
            .send()
            .await
            .map_err(api_error)?;
        let profile = output
            .profile()
            .ok_or_else(|| ApiError::new(NOT_FOUND, format!("Profile {} not found", profile_id)))?;
        Ok(Profile {
            id: owned(profile.profile_id()),
            name: owned(profile.name()),
            created: to_utc(profile.created_at()),
        })
    }

    async fn delete_profile(&self, profile_id: &str) -> ApiResult<()> {
        self.delete_profile()
            .profile_id(profile_id)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn get_trust_anchor(&self, trust_anchor_id: &str) -> ApiResult<TrustAnchor> {
        let output = self
            .get_trust_anchor()
            .trust_anchor_id(trust_anchor_id)
            .send()
            .await
            .map_err(api_error)?;
        let anchor = output.trust_anchor().ok_or_else(|| {
            ApiError::new(
                NOT_FOUND,
                format!("Trust anchor {} not found", trust_anchor_id),
            )
        })?;
        Ok(TrustAnchor {
            id: owned(anchor.trust_anchor_id()),
            name: owned(anchor.name()),
            created: to_utc(anchor.created_at()),
        })
    }

    async fn delete_trust_anchor(&self, trust_anchor_id: &str) -> ApiResult<()> {
        self.delete_trust_anchor()
            .trust_anchor_id(trust_anchor_id)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn list_tags_for_resource(&self, arn: &str) -> ApiResult<Vec<Tag>> {
        let output = self
            .list_tags_for_resource()
            .resource_arn(arn)
            .send()
            .await
            .map_err(api_error)?;
        Ok(convert_tags(output.tags()))
    }
}
