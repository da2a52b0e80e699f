/*!

An in-memory AWS account that implements every client trait, so that the cleaners can be tested
without AWS. Missing resources produce the same error codes that the services return, and the
dependency rules that make ordering matter (a VPC with subnets cannot be deleted, a role in an
instance profile cannot be deleted, ...) are enforced.

!*/

#![allow(dead_code)]

mod ec2;
mod iam;
mod other;

use chrono::{DateTime, Duration, Utc};
use e2e_cleanup::clients::{
    Activation, ApiError, ApiResult, AwsClients, Cluster, Instance, ManagedInstance, Page,
    Parameter, Profile, RouteTable, RouteTableAssociation, SecurityGroup, Stack, TaggedResource,
    TrustAnchor,
};
use e2e_cleanup::constants::TEST_CLUSTER_TAG_KEY;
use e2e_cleanup::Tag;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

pub const ACCOUNT: &str = "123456789012";
pub const REGION: &str = "us-west-2";

/// Listings return pages of this size so paging is exercised.
pub const PAGE_SIZE: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct FakeVpc {
    pub tags: Vec<Tag>,
    pub gateways: Vec<String>,
    pub subnets: Vec<String>,
    pub route_tables: Vec<RouteTable>,
    pub security_groups: Vec<SecurityGroup>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeRole {
    pub created: Option<DateTime<Utc>>,
    pub tags: Vec<Tag>,
    pub attached_policies: Vec<String>,
    pub inline_policies: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeInstanceProfile {
    pub created: Option<DateTime<Utc>>,
    pub tags: Vec<Tag>,
    pub roles: Vec<String>,
}

#[derive(Debug, Default)]
pub struct State {
    pub instances: BTreeMap<String, Instance>,
    pub vpcs: BTreeMap<String, FakeVpc>,
    pub detached_gateways: BTreeSet<String>,
    pub roles: BTreeMap<String, FakeRole>,
    pub instance_profiles: BTreeMap<String, FakeInstanceProfile>,
    pub activations: BTreeMap<String, Activation>,
    pub managed_instances: BTreeMap<String, (ManagedInstance, Vec<Tag>)>,
    pub parameters: BTreeMap<String, (Parameter, Vec<Tag>)>,
    pub stacks: Vec<Stack>,
    pub failing_stacks: BTreeSet<String>,
    pub clusters: BTreeMap<String, Cluster>,
    pub profiles: BTreeMap<String, (Profile, Vec<Tag>)>,
    pub trust_anchors: BTreeMap<String, (TrustAnchor, Vec<Tag>)>,
    /// Entries the tagging api still returns for resources that no longer exist.
    pub stale_tagged: Vec<(String, TaggedResource)>,
    /// Every call that changes something, e.g. `delete_vpc:vpc-1`.
    pub calls: Vec<String>,
    /// Calls by name that fail, with the error code and how many more times to fail.
    pub failures: HashMap<String, (String, u32)>,
}

impl State {
    /// Fail if a failure was injected for `op`.
    pub fn check(&mut self, op: &str) -> ApiResult<()> {
        if let Some((code, remaining)) = self.failures.get_mut(op) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ApiError::new(code.clone(), format!("injected {} failure", op)));
            }
        }
        Ok(())
    }

    pub fn call(&mut self, op: &str, id: &str) -> ApiResult<()> {
        self.check(op)?;
        self.calls.push(format!("{}:{}", op, id));
        Ok(())
    }
}

pub fn not_found(code: &str, id: &str) -> ApiError {
    ApiError::new(code, format!("The resource '{}' does not exist", id))
}

pub fn arn(service: &str, resource: &str) -> String {
    format!("arn:aws:{}:{}:{}:{}", service, REGION, ACCOUNT, resource)
}

pub fn cluster_tags(cluster: &str) -> Vec<Tag> {
    vec![
        Tag::new("Name", format!("{}-resource", cluster)),
        Tag::new(TEST_CLUSTER_TAG_KEY, cluster),
    ]
}

pub fn hours_ago(hours: i64) -> Option<DateTime<Utc>> {
    Some(Utc::now() - Duration::hours(hours))
}

/// Slice `items` into the page that starts at `token`.
pub fn page<T: Clone>(items: Vec<T>, token: Option<String>) -> Page<T> {
    let start = token.and_then(|t| t.parse::<usize>().ok()).unwrap_or(0);
    let end = (start + PAGE_SIZE).min(items.len());
    let next_token = if end < items.len() {
        Some(end.to_string())
    } else {
        None
    };
    Page {
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        next_token,
    }
}

#[derive(Clone, Default)]
pub struct FakeAccount {
    state: Arc<Mutex<State>>,
}

impl FakeAccount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn clients(&self) -> AwsClients {
        AwsClients {
            ec2: Arc::new(self.clone()),
            iam: Arc::new(self.clone()),
            ssm: Arc::new(self.clone()),
            cfn: Arc::new(self.clone()),
            eks: Arc::new(self.clone()),
            rolesanywhere: Arc::new(self.clone()),
            tagging: Arc::new(self.clone()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn fail(&self, op: &str, code: &str, times: u32) {
        self.state()
            .failures
            .insert(op.to_string(), (code.to_string(), times));
    }

    pub fn add_instance(&self, id: &str, state: &str, tags: Vec<Tag>, age_hours: i64) {
        self.state().instances.insert(
            id.to_string(),
            Instance {
                id: id.to_string(),
                state: Some(state.to_string()),
                launch_time: hours_ago(age_hours),
                tags,
            },
        );
    }

    /// A VPC with one gateway, two subnets each associated with their own route table, the
    /// main route table, the default security group and one extra group with rules.
    pub fn add_vpc(&self, id: &str, tags: Vec<Tag>) {
        let vpc = FakeVpc {
            tags,
            gateways: vec![format!("igw-{}", id)],
            subnets: vec![format!("subnet-{}-a", id), format!("subnet-{}-b", id)],
            route_tables: vec![
                RouteTable {
                    id: format!("rtb-{}-main", id),
                    associations: vec![RouteTableAssociation {
                        id: format!("rtbassoc-{}-main", id),
                        main: true,
                    }],
                },
                RouteTable {
                    id: format!("rtb-{}-a", id),
                    associations: vec![RouteTableAssociation {
                        id: format!("rtbassoc-{}-a", id),
                        main: false,
                    }],
                },
                RouteTable {
                    id: format!("rtb-{}-b", id),
                    associations: vec![RouteTableAssociation {
                        id: format!("rtbassoc-{}-b", id),
                        main: false,
                    }],
                },
            ],
            security_groups: vec![
                SecurityGroup {
                    id: format!("sg-{}-default", id),
                    name: "default".to_string(),
                    ingress_rule_ids: vec![format!("sgr-{}-default-in", id)],
                    egress_rule_ids: vec![format!("sgr-{}-default-out", id)],
                },
                SecurityGroup {
                    id: format!("sg-{}-nodes", id),
                    name: "nodes".to_string(),
                    ingress_rule_ids: vec![format!("sgr-{}-nodes-in", id)],
                    egress_rule_ids: vec![format!("sgr-{}-nodes-out", id)],
                },
            ],
        };
        self.state().vpcs.insert(id.to_string(), vpc);
    }

    pub fn add_role(&self, name: &str, tags: Vec<Tag>, age_hours: i64) {
        self.state().roles.insert(
            name.to_string(),
            FakeRole {
                created: hours_ago(age_hours),
                tags,
                attached_policies: vec![
                    "arn:aws:iam::aws:policy/AmazonSSMManagedInstanceCore".to_string()
                ],
                inline_policies: vec!["node-access".to_string()],
            },
        );
    }

    pub fn add_instance_profile(&self, name: &str, roles: &[&str], tags: Vec<Tag>, age_hours: i64) {
        self.state().instance_profiles.insert(
            name.to_string(),
            FakeInstanceProfile {
                created: hours_ago(age_hours),
                tags,
                roles: roles.iter().map(|role| role.to_string()).collect(),
            },
        );
    }

    pub fn add_activation(&self, id: &str, node: &str, tags: Vec<Tag>, age_hours: i64) {
        self.state().activations.insert(
            id.to_string(),
            Activation {
                id: id.to_string(),
                default_instance_name: Some(node.to_string()),
                created: hours_ago(age_hours),
                tags,
            },
        );
    }

    pub fn add_managed_instance(
        &self,
        id: &str,
        resource_type: &str,
        activation_id: &str,
        tags: Vec<Tag>,
        ping_hours_ago: Option<i64>,
    ) {
        self.state().managed_instances.insert(
            id.to_string(),
            (
                ManagedInstance {
                    id: id.to_string(),
                    resource_type: Some(resource_type.to_string()),
                    activation_id: Some(activation_id.to_string()),
                    last_ping: ping_hours_ago.and_then(hours_ago),
                    registered: hours_ago(24 * 30),
                },
                tags,
            ),
        );
    }

    pub fn add_parameter(&self, name: &str, tags: Vec<Tag>, age_hours: i64) {
        self.state().parameters.insert(
            name.to_string(),
            (
                Parameter {
                    name: name.to_string(),
                    last_modified: hours_ago(age_hours),
                },
                tags,
            ),
        );
    }

    pub fn add_stack(&self, name: &str, tags: Vec<Tag>, age_hours: i64) {
        self.state().stacks.push(Stack {
            id: arn(
                "cloudformation",
                &format!("stack/{}/0d3f2e10-0000-4000-8000-{:012}", name, name.len()),
            ),
            name: name.to_string(),
            status: Some("CREATE_COMPLETE".to_string()),
            created: hours_ago(age_hours),
            tags,
        });
    }

    pub fn add_cluster(&self, name: &str, tags: Vec<Tag>, age_hours: i64) {
        self.state().clusters.insert(
            name.to_string(),
            Cluster {
                name: name.to_string(),
                status: Some("ACTIVE".to_string()),
                created: hours_ago(age_hours),
                tags,
            },
        );
    }

    pub fn add_profile(&self, id: &str, tags: Vec<Tag>, age_hours: i64) {
        self.state().profiles.insert(
            id.to_string(),
            (
                Profile {
                    id: id.to_string(),
                    name: format!("EKSHybridCI-{}", id),
                    created: hours_ago(age_hours),
                },
                tags,
            ),
        );
    }

    pub fn add_trust_anchor(&self, id: &str, tags: Vec<Tag>, age_hours: i64) {
        self.state().trust_anchors.insert(
            id.to_string(),
            (
                TrustAnchor {
                    id: id.to_string(),
                    name: format!("EKSHybridCI-{}", id),
                    created: hours_ago(age_hours),
                },
                tags,
            ),
        );
    }

    /// Make the tagging api return a resource that no longer exists.
    pub fn add_stale_tagged(&self, resource_type: &str, arn: String, tags: Vec<Tag>) {
        self.state()
            .stale_tagged
            .push((resource_type.to_string(), TaggedResource { arn, tags }));
    }
}
