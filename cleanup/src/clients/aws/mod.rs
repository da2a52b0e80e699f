/*!

Implementations of the client traits on top of the AWS SDK clients.

!*/

mod cloudformation;
mod ec2;
mod eks;
mod iam;
mod rolesanywhere;
mod ssm;
mod tagging;

use super::api::{
    CloudFormationApi, Ec2Api, EksApi, IamApi, RolesAnywhereApi, SsmApi, TaggingApi,
};
use super::error::ApiError;
use crate::resource::Tag;
use aws_sdk_ec2::types::SdkError;
use aws_smithy_types::retry::ProvideErrorKind;
use aws_types::SdkConfig;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::Debug;
use std::sync::Arc;

/// One handle per service, shared by every cleaner.
#[derive(Clone)]
pub struct AwsClients {
    pub ec2: Arc<dyn Ec2Api>,
    pub iam: Arc<dyn IamApi>,
    pub ssm: Arc<dyn SsmApi>,
    pub cfn: Arc<dyn CloudFormationApi>,
    pub eks: Arc<dyn EksApi>,
    pub rolesanywhere: Arc<dyn RolesAnywhereApi>,
    pub tagging: Arc<dyn TaggingApi>,
}

impl AwsClients {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            ec2: Arc::new(aws_sdk_ec2::Client::new(config)),
            iam: Arc::new(aws_sdk_iam::Client::new(config)),
            ssm: Arc::new(aws_sdk_ssm::Client::new(config)),
            cfn: Arc::new(aws_sdk_cloudformation::Client::new(config)),
            eks: Arc::new(aws_sdk_eks::Client::new(config)),
            rolesanywhere: Arc::new(aws_sdk_rolesanywhere::Client::new(config)),
            tagging: Arc::new(aws_sdk_resourcegroupstagging::Client::new(config)),
        }
    }
}

/// Keep the service error code so callers can tell "already gone" from real failures.
pub(crate) fn api_error<E, R>(err: SdkError<E, R>) -> ApiError
where
    E: ProvideErrorKind + Error + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    let (code, message) = match &err {
        SdkError::ServiceError(service_error) => (
            service_error.err().code().map(str::to_string),
            service_error.err().to_string(),
        ),
        _ => (None, err.to_string()),
    };
    ApiError::with_source(code, message, err)
}

/// Every SDK has its own tag type with the same shape.
pub(crate) trait SdkTag {
    fn tag_key(&self) -> Option<&str>;
    fn tag_value(&self) -> Option<&str>;
}

macro_rules! impl_sdk_tag {
    ($($tag:ty),+ $(,)?) => {
        $(
            impl SdkTag for $tag {
                fn tag_key(&self) -> Option<&str> {
                    self.key()
                }

                fn tag_value(&self) -> Option<&str> {
                    self.value()
                }
            }
        )+
    };
}

impl_sdk_tag!(
    aws_sdk_ec2::model::Tag,
    aws_sdk_iam::model::Tag,
    aws_sdk_ssm::model::Tag,
    aws_sdk_cloudformation::model::Tag,
    aws_sdk_rolesanywhere::model::Tag,
    aws_sdk_resourcegroupstagging::model::Tag,
);

/// Convert SDK tags, dropping any without a key.
pub(crate) fn convert_tags<T: SdkTag>(tags: Option<&[T]>) -> Vec<Tag> {
    tags.unwrap_or_default()
        .iter()
        .filter_map(|tag| {
            tag.tag_key()
                .map(|key| Tag::new(key, tag.tag_value().unwrap_or_default()))
        })
        .collect()
}

/// Convert map shaped tags, as EKS returns them.
pub(crate) fn tags_from_map(tags: Option<&HashMap<String, String>>) -> Vec<Tag> {
    let mut tags: Vec<Tag> = tags
        .into_iter()
        .flatten()
        .map(|(key, value)| Tag::new(key.as_str(), value.as_str()))
        .collect();
    tags.sort_by(|a, b| a.key.cmp(&b.key));
    tags
}

pub(crate) fn to_utc(time: Option<&aws_smithy_types::DateTime>) -> Option<DateTime<Utc>> {
    time.and_then(|time| Utc.timestamp_opt(time.secs(), time.subsec_nanos()).single())
}

pub(crate) fn owned(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}
