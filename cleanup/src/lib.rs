/*!

`e2e-cleanup` finds and removes the AWS resources created by hybrid nodes end-to-end test runs.

Every resource a test creates carries the `Nodeadm-E2E-Tests-Cluster` tag. A [`FilterInput`]
selects which of those resources may be removed: one exact cluster, or every cluster (optionally
only those with a name prefix) whose resources are older than a threshold. Resources without the
tag are never touched.

The per-service cleaners each list candidates and delete them, treating "not found" answers as
success so that cleanups can be repeated or race each other. [`ClusterCleanup`] runs all of them
in dependency order and [`Sweeper`] runs the SSM subset as a periodic safety net.

!*/

pub mod arn;
pub mod clients;
pub mod cloudformation;
mod cluster;
pub mod constants;
pub mod duration;
pub mod ec2;
pub mod eks;
mod error;
mod filter_properties;
pub mod iam;
pub mod resource;
pub mod rolesanywhere;
pub mod ssm;
mod sweeper;
pub mod tagger;
pub mod vpc;

pub use cluster::ClusterCleanup;
pub use error::{Error, Result};
pub use resource::{
    resource_old_enough, should_delete_resource, FilterInput, ResourceWithTags, SweeperInput, Tag,
};
pub use sweeper::Sweeper;
