use crate::arn::Arn;
use crate::clients::{ApiResult, RolesAnywhereApi, TaggingApi};
use crate::constants::{TAGGING_ROLES_ANYWHERE_PROFILE, TAGGING_ROLES_ANYWHERE_TRUST_ANCHOR};
use crate::error::{self, Result};
use crate::resource::{should_delete_resource, FilterInput, ResourceWithTags};
use crate::tagger::ResourceTagger;
use chrono::{DateTime, Utc};
use log::{info, trace};
use snafu::ResultExt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

const NOT_FOUND: &[&str] = &["ResourceNotFoundException"];

#[derive(Debug, Clone, Copy)]
enum Kind {
    Profile,
    TrustAnchor,
}

impl Kind {
    fn resource_type(self) -> &'static str {
        match self {
            Kind::Profile => TAGGING_ROLES_ANYWHERE_PROFILE,
            Kind::TrustAnchor => TAGGING_ROLES_ANYWHERE_TRUST_ANCHOR,
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Profile => write!(f, "profile"),
            Kind::TrustAnchor => write!(f, "trust anchor"),
        }
    }
}

pub struct RolesAnywhereCleaner {
    rolesanywhere: Arc<dyn RolesAnywhereApi>,
    tagging: Arc<dyn TaggingApi>,
}

impl RolesAnywhereCleaner {
    pub fn new(rolesanywhere: Arc<dyn RolesAnywhereApi>, tagging: Arc<dyn TaggingApi>) -> Self {
        Self {
            rolesanywhere,
            tagging,
        }
    }

    /// Ids of the profiles selected by `input`.
    pub async fn list_profiles(&self, input: &FilterInput) -> Result<Vec<String>> {
        self.list(input, Kind::Profile).await
    }

    /// Ids of the trust anchors selected by `input`.
    pub async fn list_trust_anchors(&self, input: &FilterInput) -> Result<Vec<String>> {
        self.list(input, Kind::TrustAnchor).await
    }

    /// The tagging api can lag behind deletions, so every candidate is fetched to confirm it
    /// still exists and to read its current tags. Missing candidates are expected and skipped.
    async fn list(&self, input: &FilterInput, kind: Kind) -> Result<Vec<String>> {
        let arns = ResourceTagger::new(Arc::clone(&self.tagging), input)
            .tagged_arns(kind.resource_type())
            .await?;
        let mut ids = Vec::new();
        for arn in arns {
            let id = Arn::parse(&arn)
                .context(error::ArnSnafu)?
                .resource_id()
                .to_string();
            let created = match self.created(kind, &id).await {
                Ok(created) => created,
                Err(e) if e.is_code(NOT_FOUND) => {
                    trace!("Roles Anywhere {} '{}' no longer exists", kind, id);
                    continue;
                }
                Err(e) => {
                    return Err(e).context(error::DescribeResourceSnafu {
                        what: format!("Roles Anywhere {}", kind),
                        id,
                    })
                }
            };
            let tags = match self.rolesanywhere.list_tags_for_resource(&arn).await {
                Ok(tags) => tags,
                Err(e) if e.is_code(NOT_FOUND) => {
                    trace!("Roles Anywhere {} '{}' no longer exists", kind, id);
                    continue;
                }
                Err(e) => {
                    return Err(e).context(error::DescribeResourceSnafu {
                        what: format!("Roles Anywhere {} tags", kind),
                        id,
                    })
                }
            };
            let resource = ResourceWithTags::new(id.as_str(), created, tags);
            if should_delete_resource(&resource, input) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    async fn created(&self, kind: Kind, id: &str) -> ApiResult<Option<DateTime<Utc>>> {
        match kind {
            Kind::Profile => Ok(self.rolesanywhere.get_profile(id).await?.created),
            Kind::TrustAnchor => Ok(self.rolesanywhere.get_trust_anchor(id).await?.created),
        }
    }

    pub async fn delete_profile(&self, profile_id: &str) -> Result<()> {
        match self.rolesanywhere.delete_profile(profile_id).await {
            Ok(()) => info!("Deleted Roles Anywhere profile '{}'", profile_id),
            Err(e) if e.is_code(NOT_FOUND) => {
                info!("Roles Anywhere profile '{}' already deleted", profile_id)
            }
            Err(e) => {
                return Err(e).context(error::DeleteResourceSnafu {
                    what: "Roles Anywhere profile",
                    id: profile_id,
                })
            }
        }
        Ok(())
    }

    pub async fn delete_trust_anchor(&self, trust_anchor_id: &str) -> Result<()> {
        match self.rolesanywhere.delete_trust_anchor(trust_anchor_id).await {
            Ok(()) => info!("Deleted Roles Anywhere trust anchor '{}'", trust_anchor_id),
            Err(e) if e.is_code(NOT_FOUND) => info!(
                "Roles Anywhere trust anchor '{}' already deleted",
                trust_anchor_id
            ),
            Err(e) => {
                return Err(e).context(error::DeleteResourceSnafu {
                    what: "Roles Anywhere trust anchor",
                    id: trust_anchor_id,
                })
            }
        }
        Ok(())
    }
}
