use std::time::Duration;

/// The tag key that identifies which test cluster owns a resource. Resources without it are never
/// eligible for deletion.
pub const TEST_CLUSTER_TAG_KEY: &str = "Nodeadm-E2E-Tests-Cluster";

/// Every credentials stack, and the IAM and Roles Anywhere objects it creates, is named with this
/// prefix.
pub const TEST_CREDENTIALS_STACK_NAME_PREFIX: &str = "EKSHybridCI";

/// Architecture stacks are credentials-prefixed too, so this must be checked first.
pub const TEST_ARCHITECTURE_STACK_NAME_PREFIX: &str = "EKSHybridCI-Arch";

// Resource types understood by the resource groups tagging api
pub const TAGGING_EC2_INSTANCE: &str = "ec2:instance";
pub const TAGGING_CFN_STACK: &str = "cloudformation:stack";
pub const TAGGING_EKS_CLUSTER: &str = "eks:cluster";
pub const TAGGING_SSM_MANAGED_INSTANCE: &str = "ssm:managed-instance";
pub const TAGGING_SSM_PARAMETER: &str = "ssm:parameter";
pub const TAGGING_ROLES_ANYWHERE_PROFILE: &str = "rolesanywhere:profile";
pub const TAGGING_ROLES_ANYWHERE_TRUST_ANCHOR: &str = "rolesanywhere:trust-anchor";

/// SSM reports hybrid nodes with this resource type, EC2 instances with `EC2Instance`.
pub const MANAGED_INSTANCE_RESOURCE_TYPE: &str = "ManagedInstance";

// Waiters
pub const INSTANCE_TERMINATE_TIMEOUT: Duration = Duration::from_secs(300);
pub const INSTANCE_TERMINATE_POLL: Duration = Duration::from_secs(5);
pub const STACK_DELETION_TIMEOUT: Duration = Duration::from_secs(8 * 60);
pub const STACK_DELETION_POLL: Duration = Duration::from_secs(5);
pub const CLUSTER_DELETION_TIMEOUT: Duration = Duration::from_secs(15 * 60);
pub const CLUSTER_DELETION_POLL: Duration = Duration::from_secs(15);

/// How many describe calls in a row may fail while polling before the waiter gives up.
pub const POLL_ERROR_BUDGET: u32 = 3;

/// The age threshold the command line uses when none is given.
pub const DEFAULT_AGE_THRESHOLD: &str = "24h";
