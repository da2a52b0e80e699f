use snafu::{ensure, Snafu};
use std::fmt::{Display, Formatter};

#[derive(Debug, Snafu)]
#[snafu(display("Malformed ARN '{}': {}", arn, reason))]
pub struct ArnError {
    arn: String,
    reason: String,
}

/// The pieces of an Amazon Resource Name, `arn:partition:service:region:account:resource`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account: String,
    pub resource: String,
}

impl Arn {
    pub fn parse(arn: &str) -> Result<Self, ArnError> {
        let parts: Vec<&str> = arn.splitn(6, ':').collect();
        ensure!(
            parts.len() == 6,
            ArnSnafu {
                arn,
                reason: "expected six ':' separated fields",
            }
        );
        ensure!(
            parts[0] == "arn",
            ArnSnafu {
                arn,
                reason: "does not begin with 'arn'",
            }
        );
        ensure!(
            !parts[5].is_empty(),
            ArnSnafu {
                arn,
                reason: "empty resource",
            }
        );
        Ok(Self {
            partition: parts[1].to_string(),
            service: parts[2].to_string(),
            region: parts[3].to_string(),
            account: parts[4].to_string(),
            resource: parts[5].to_string(),
        })
    }

    /// The trailing component of the resource, e.g. the id in `instance/i-0123`.
    pub fn resource_id(&self) -> &str {
        self.resource
            .rsplit_once('/')
            .map(|(_, id)| id)
            .unwrap_or(&self.resource)
    }

    /// The cluster name in an EKS cluster ARN, `...:cluster/<name>`.
    pub fn eks_cluster_name(&self) -> Result<&str, ArnError> {
        match self.resource.strip_prefix("cluster/") {
            Some(name) if !name.is_empty() && !name.contains('/') => Ok(name),
            _ => ArnSnafu {
                arn: self.to_string(),
                reason: "not an EKS cluster",
            }
            .fail(),
        }
    }

    /// The SSM parameter name in a parameter ARN. Hierarchical names keep their leading `/`,
    /// which the ARN drops.
    pub fn ssm_parameter_name(&self) -> Result<String, ArnError> {
        match self.resource.strip_prefix("parameter") {
            Some(rest) if rest.starts_with('/') && rest.len() > 1 => {
                let name = &rest[1..];
                if name.contains('/') {
                    Ok(rest.to_string())
                } else {
                    Ok(name.to_string())
                }
            }
            _ => ArnSnafu {
                arn: self.to_string(),
                reason: "not an SSM parameter",
            }
            .fail(),
        }
    }
}

impl Display for Arn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account, self.resource
        )
    }
}
