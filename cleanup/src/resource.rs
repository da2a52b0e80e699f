use crate::constants::TEST_CLUSTER_TAG_KEY;
use crate::duration::serde_duration;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// The service independent view of a resource that the filter policy decides on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceWithTags {
    /// Only used for logging and for the delete call.
    pub id: String,
    /// `None` for resource types that do not report a creation time. Such resources always count
    /// as old enough.
    pub creation_time: Option<DateTime<Utc>>,
    pub tags: Vec<Tag>,
}

impl ResourceWithTags {
    pub fn new<S: Into<String>>(
        id: S,
        creation_time: Option<DateTime<Utc>>,
        tags: Vec<Tag>,
    ) -> Self {
        Self {
            id: id.into(),
            creation_time,
            tags,
        }
    }

    /// The value of the cluster tag, if the resource has a non-empty one.
    pub fn cluster_tag(&self) -> Option<&str> {
        cluster_tag_value(&self.tags)
    }
}

pub fn cluster_tag_value(tags: &[Tag]) -> Option<&str> {
    tags.iter()
        .find(|tag| tag.key == TEST_CLUSTER_TAG_KEY)
        .map(|tag| tag.value.as_str())
        .filter(|value| !value.is_empty())
}

/// Which resources a cleanup run is allowed to remove. Empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterInput {
    pub cluster_name: String,
    pub cluster_name_prefix: String,
    pub all_clusters: bool,
    pub instance_age_threshold: Duration,
    pub dry_run: bool,
}

/// How a `FilterInput` matches cluster tags. Exactly one applies to any input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode<'a> {
    /// Tag must equal the name. Age is ignored.
    Exact(&'a str),
    /// Any cluster tag, subject to age.
    AllClusters,
    /// Tags with this prefix, subject to age.
    Prefix(&'a str),
    /// Nothing matches.
    None,
}

impl FilterInput {
    pub fn for_cluster<S: Into<String>>(cluster_name: S) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            ..Self::default()
        }
    }

    pub fn mode(&self) -> MatchMode<'_> {
        if !self.cluster_name.is_empty() {
            MatchMode::Exact(&self.cluster_name)
        } else if self.all_clusters {
            MatchMode::AllClusters
        } else if !self.cluster_name_prefix.is_empty() {
            MatchMode::Prefix(&self.cluster_name_prefix)
        } else {
            MatchMode::None
        }
    }

    /// The cluster name to narrow tag searches with, when an exact one is set.
    pub fn exact_cluster(&self) -> Option<&str> {
        match self.mode() {
            MatchMode::Exact(name) => Some(name),
            _ => None,
        }
    }
}

/// Decide whether a resource belongs to the clusters selected by `input` and is old enough to be
/// removed.
pub fn should_delete_resource(resource: &ResourceWithTags, input: &FilterInput) -> bool {
    should_delete_resource_at(resource, input, Utc::now())
}

pub fn should_delete_resource_at(
    resource: &ResourceWithTags,
    input: &FilterInput,
    now: DateTime<Utc>,
) -> bool {
    let cluster = match resource.cluster_tag() {
        Some(cluster) => cluster,
        None => return false,
    };
    match input.mode() {
        MatchMode::Exact(name) => cluster == name,
        MatchMode::AllClusters => older_than(resource.creation_time, input, now),
        MatchMode::Prefix(prefix) => {
            cluster.starts_with(prefix) && older_than(resource.creation_time, input, now)
        }
        MatchMode::None => false,
    }
}

/// A cheap age-only check used before spending an api call on tags. Always true when an exact
/// cluster name is set. `should_delete_resource` still makes the final decision.
pub fn resource_old_enough(creation_time: Option<DateTime<Utc>>, input: &FilterInput) -> bool {
    resource_old_enough_at(creation_time, input, Utc::now())
}

pub fn resource_old_enough_at(
    creation_time: Option<DateTime<Utc>>,
    input: &FilterInput,
    now: DateTime<Utc>,
) -> bool {
    match input.mode() {
        MatchMode::Exact(_) => true,
        _ => older_than(creation_time, input, now),
    }
}

fn older_than(
    creation_time: Option<DateTime<Utc>>,
    input: &FilterInput,
    now: DateTime<Utc>,
) -> bool {
    let created = match creation_time {
        Some(created) => created,
        None => return true,
    };
    let threshold = match chrono::Duration::from_std(input.instance_age_threshold) {
        Ok(threshold) => threshold,
        // Larger than anything chrono can represent, nothing is that old.
        Err(_) => return false,
    };
    now.signed_duration_since(created) > threshold
}

/// The sweeper's configuration, as given on the command line or in a YAML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SweeperInput {
    pub all_clusters: bool,
    pub dry_run: bool,
    pub cluster_name: String,
    pub cluster_name_prefix: String,
    #[serde(deserialize_with = "serde_duration::deserialize")]
    pub instance_age_threshold: Duration,
}

impl From<SweeperInput> for FilterInput {
    fn from(input: SweeperInput) -> Self {
        Self {
            cluster_name: input.cluster_name,
            cluster_name_prefix: input.cluster_name_prefix,
            all_clusters: input.all_clusters,
            instance_age_threshold: input.instance_age_threshold,
            dry_run: input.dry_run,
        }
    }
}
