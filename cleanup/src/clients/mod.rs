/*!

The AWS operations that the cleaners need, expressed as traits so that an in-memory account can
stand in for AWS in tests. [`AwsClients`] bundles the SDK backed implementations from the [`aws`]
module.

!*/

mod api;
pub mod aws;
mod error;
mod model;

pub use api::{
    CloudFormationApi, Ec2Api, EksApi, IamApi, InstanceInformationFilter, RolesAnywhereApi,
    SsmApi, TaggingApi,
};
pub use aws::AwsClients;
pub use error::{ApiError, ApiResult};
pub use model::{
    Activation, Cluster, Instance, InstanceProfile, ManagedInstance, Page, Parameter, Profile,
    Role, RouteTable, RouteTableAssociation, SecurityGroup, Stack, TaggedResource, TrustAnchor,
    Vpc,
};
