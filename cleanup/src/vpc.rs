use crate::clients::{ApiResult, Ec2Api};
use crate::constants::TEST_CLUSTER_TAG_KEY;
use crate::error::{self, Error, Result};
use crate::resource::{should_delete_resource, FilterInput, ResourceWithTags};
use log::{info, warn};
use snafu::ResultExt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// How far the teardown of a VPC has progressed. Each state is reached by completing one
/// [`VpcStep`], strictly in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VpcState {
    Present,
    GatewaysDetached,
    SubnetsDeleted,
    RouteTablesCleaned,
    SecurityGroupsCleaned,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VpcStep {
    DeleteInternetGateways,
    DeleteSubnets,
    DeleteRouteTables,
    DeleteSecurityGroups,
    DeleteVpc,
}

impl VpcState {
    /// The step that leaves this state, `None` once the VPC is deleted.
    pub fn next_step(self) -> Option<VpcStep> {
        match self {
            VpcState::Present => Some(VpcStep::DeleteInternetGateways),
            VpcState::GatewaysDetached => Some(VpcStep::DeleteSubnets),
            VpcState::SubnetsDeleted => Some(VpcStep::DeleteRouteTables),
            VpcState::RouteTablesCleaned => Some(VpcStep::DeleteSecurityGroups),
            VpcState::SecurityGroupsCleaned => Some(VpcStep::DeleteVpc),
            VpcState::Deleted => None,
        }
    }
}

impl VpcStep {
    /// The state reached once this step succeeds.
    pub fn target(self) -> VpcState {
        match self {
            VpcStep::DeleteInternetGateways => VpcState::GatewaysDetached,
            VpcStep::DeleteSubnets => VpcState::SubnetsDeleted,
            VpcStep::DeleteRouteTables => VpcState::RouteTablesCleaned,
            VpcStep::DeleteSecurityGroups => VpcState::SecurityGroupsCleaned,
            VpcStep::DeleteVpc => VpcState::Deleted,
        }
    }
}

impl Display for VpcStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let step = match self {
            VpcStep::DeleteInternetGateways => "delete internet gateways",
            VpcStep::DeleteSubnets => "delete subnets",
            VpcStep::DeleteRouteTables => "delete route tables",
            VpcStep::DeleteSecurityGroups => "delete security groups",
            VpcStep::DeleteVpc => "delete VPC",
        };
        write!(f, "{}", step)
    }
}

/// Drives one VPC from [`VpcState::Present`] to [`VpcState::Deleted`]. Every step only acts on
/// what still exists, so a teardown can be started again from the beginning after a failure.
pub struct VpcTeardown<'a> {
    ec2: &'a dyn Ec2Api,
    vpc_id: String,
    state: VpcState,
}

impl<'a> VpcTeardown<'a> {
    pub fn new<S: Into<String>>(ec2: &'a dyn Ec2Api, vpc_id: S) -> Self {
        Self {
            ec2,
            vpc_id: vpc_id.into(),
            state: VpcState::Present,
        }
    }

    pub fn state(&self) -> VpcState {
        self.state
    }

    /// Perform the next step. The state only advances when the step succeeds.
    pub async fn advance(&mut self) -> Result<VpcState> {
        let step = match self.state.next_step() {
            Some(step) => step,
            None => return Ok(self.state),
        };
        let result = match step {
            VpcStep::DeleteInternetGateways => self.delete_internet_gateways().await,
            VpcStep::DeleteSubnets => self.delete_subnets().await,
            VpcStep::DeleteRouteTables => self.delete_route_tables().await,
            VpcStep::DeleteSecurityGroups => self.delete_security_groups().await,
            VpcStep::DeleteVpc => self.delete_vpc().await,
        };
        result.context(error::VpcTeardownSnafu {
            vpc_id: self.vpc_id.as_str(),
            step,
        })?;
        self.state = step.target();
        Ok(self.state)
    }

    pub async fn run(&mut self) -> Result<()> {
        while self.advance().await? != VpcState::Deleted {}
        Ok(())
    }

    async fn delete_internet_gateways(&self) -> ApiResult<()> {
        for gateway_id in self.ec2.describe_internet_gateways(&self.vpc_id).await? {
            info!(
                "Detaching internet gateway '{}' from VPC '{}'",
                gateway_id, self.vpc_id
            );
            tolerate(
                self.ec2
                    .detach_internet_gateway(&gateway_id, &self.vpc_id)
                    .await,
                &["Gateway.NotAttached", "InvalidInternetGatewayID.NotFound"],
                &gateway_id,
            )?;
            info!("Deleting internet gateway '{}'", gateway_id);
            tolerate(
                self.ec2.delete_internet_gateway(&gateway_id).await,
                &["InvalidInternetGatewayID.NotFound"],
                &gateway_id,
            )?;
        }
        Ok(())
    }

    async fn delete_subnets(&self) -> ApiResult<()> {
        for subnet_id in self.ec2.describe_subnets(&self.vpc_id).await? {
            info!("Deleting subnet '{}'", subnet_id);
            tolerate(
                self.ec2.delete_subnet(&subnet_id).await,
                &["InvalidSubnetID.NotFound"],
                &subnet_id,
            )?;
        }
        Ok(())
    }

    async fn delete_route_tables(&self) -> ApiResult<()> {
        let route_tables = self.ec2.describe_route_tables(&self.vpc_id).await?;
        for route_table in route_tables.iter().filter(|table| !table.is_main()) {
            for association in &route_table.associations {
                info!(
                    "Disassociating route table '{}' association '{}'",
                    route_table.id, association.id
                );
                tolerate(
                    self.ec2.disassociate_route_table(&association.id).await,
                    &["InvalidAssociationID.NotFound"],
                    &association.id,
                )?;
            }
            info!("Deleting route table '{}'", route_table.id);
            tolerate(
                self.ec2.delete_route_table(&route_table.id).await,
                &["InvalidRouteTableID.NotFound"],
                &route_table.id,
            )?;
        }
        Ok(())
    }

    async fn delete_security_groups(&self) -> ApiResult<()> {
        let groups = self.ec2.describe_security_groups(&self.vpc_id).await?;
        let groups: Vec<_> = groups.iter().filter(|group| !group.is_default()).collect();

        // Groups can reference each other, so every rule goes before any group.
        for group in &groups {
            if !group.ingress_rule_ids.is_empty() {
                if let Err(e) = self
                    .ec2
                    .revoke_security_group_ingress(&group.id, &group.ingress_rule_ids)
                    .await
                {
                    warn!("Error revoking ingress rules of '{}': {}", group.id, e);
                }
            }
            if !group.egress_rule_ids.is_empty() {
                if let Err(e) = self
                    .ec2
                    .revoke_security_group_egress(&group.id, &group.egress_rule_ids)
                    .await
                {
                    warn!("Error revoking egress rules of '{}': {}", group.id, e);
                }
            }
        }

        for group in &groups {
            info!("Deleting security group '{}' ({})", group.id, group.name);
            tolerate(
                self.ec2.delete_security_group(&group.id).await,
                &["InvalidGroup.NotFound"],
                &group.id,
            )?;
        }
        Ok(())
    }

    async fn delete_vpc(&self) -> ApiResult<()> {
        info!("Deleting VPC '{}'", self.vpc_id);
        tolerate(
            self.ec2.delete_vpc(&self.vpc_id).await,
            &["InvalidVpcID.NotFound"],
            &self.vpc_id,
        )
    }
}

fn tolerate(result: ApiResult<()>, codes: &[&str], id: &str) -> ApiResult<()> {
    match result {
        Err(e) if e.is_code(codes) => {
            info!("'{}' already removed: {}", id, e);
            Ok(())
        }
        other => other,
    }
}

pub struct VpcCleaner {
    ec2: Arc<dyn Ec2Api>,
}

impl VpcCleaner {
    pub fn new(ec2: Arc<dyn Ec2Api>) -> Self {
        Self { ec2 }
    }

    /// VPCs carrying the cluster tag that `input` selects. VPCs have no creation time, so they
    /// pass any age threshold.
    pub async fn list_tagged_vpcs(&self, input: &FilterInput) -> Result<Vec<String>> {
        info!("Listing tagged VPCs");
        let mut vpc_ids = Vec::new();
        let mut next_token = None;
        loop {
            let page = self
                .ec2
                .describe_vpcs(TEST_CLUSTER_TAG_KEY, input.exact_cluster(), next_token)
                .await
                .context(error::ListResourcesSnafu { what: "VPCs" })?;
            for vpc in page.items {
                let resource = ResourceWithTags::new(vpc.id.as_str(), None, vpc.tags);
                if should_delete_resource(&resource, input) {
                    vpc_ids.push(vpc.id);
                }
            }
            next_token = page.next_token;
            if next_token.is_none() {
                return Ok(vpc_ids);
            }
        }
    }

    /// Tear down one VPC and everything in it, stopping at the first step that fails.
    pub async fn delete_vpc(&self, vpc_id: &str) -> Result<()> {
        VpcTeardown::new(self.ec2.as_ref(), vpc_id).run().await?;
        info!("Deleted VPC '{}'", vpc_id);
        Ok(())
    }

    /// Tear down each VPC. A failure stops that VPC only, the others are still attempted.
    pub async fn delete_vpcs(&self, vpc_ids: &[String]) -> Result<()> {
        if vpc_ids.is_empty() {
            return Ok(());
        }
        info!("Deleting VPCs {:?}", vpc_ids);
        let mut errors = Vec::new();
        for vpc_id in vpc_ids {
            if let Err(e) = self.delete_vpc(vpc_id).await {
                errors.push(e);
            }
        }
        match Error::join(errors) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
