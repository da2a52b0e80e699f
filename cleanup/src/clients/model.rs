//! Plain views of the AWS resources the cleaners work with. Only the fields the cleaners read are
//! carried.

use crate::resource::Tag;
use chrono::{DateTime, Utc};

/// One page of a paginated listing. `next_token` is `None` on the last page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }
}

/// A resource returned by the resource groups tagging api.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedResource {
    pub arn: String,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub id: String,
    /// The state name, e.g. `running` or `terminated`.
    pub state: Option<String>,
    pub launch_time: Option<DateTime<Utc>>,
    pub tags: Vec<Tag>,
}

impl Instance {
    pub fn is_terminated(&self) -> bool {
        self.state.as_deref() == Some("terminated")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vpc {
    pub id: String,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTableAssociation {
    pub id: String,
    pub main: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    pub id: String,
    pub associations: Vec<RouteTableAssociation>,
}

impl RouteTable {
    /// The main route table goes away with its VPC and cannot be deleted on its own.
    pub fn is_main(&self) -> bool {
        self.associations.iter().any(|association| association.main)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroup {
    pub id: String,
    pub name: String,
    pub ingress_rule_ids: Vec<String>,
    pub egress_rule_ids: Vec<String>,
}

impl SecurityGroup {
    pub fn is_default(&self) -> bool {
        self.name == "default"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    pub created: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceProfile {
    pub name: String,
    pub created: Option<DateTime<Utc>>,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub id: String,
    pub default_instance_name: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedInstance {
    pub id: String,
    /// `ManagedInstance` for hybrid nodes, `EC2Instance` otherwise.
    pub resource_type: Option<String>,
    pub activation_id: Option<String>,
    pub last_ping: Option<DateTime<Utc>>,
    pub registered: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    pub id: String,
    pub name: String,
    pub status: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub name: String,
    pub status: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub created: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustAnchor {
    pub id: String,
    pub name: String,
    pub created: Option<DateTime<Utc>>,
}
