use crate::clients::AwsClients;
use crate::cloudformation::CfnStackCleaner;
use crate::ec2::Ec2Cleaner;
use crate::eks::EksClusterCleaner;
use crate::error::{Error, Result};
use crate::iam::IamCleaner;
use crate::resource::FilterInput;
use crate::rolesanywhere::RolesAnywhereCleaner;
use crate::ssm::SsmCleaner;
use crate::sweeper::{record, skip_deletion};
use crate::vpc::VpcCleaner;
use log::info;
use std::sync::Arc;

/// Removes everything a test run created, in an order that deletes dependents before the things
/// they depend on. A failing phase does not stop the later ones.
pub struct ClusterCleanup {
    ec2: Ec2Cleaner,
    ssm: SsmCleaner,
    rolesanywhere: RolesAnywhereCleaner,
    iam: IamCleaner,
    stacks: CfnStackCleaner,
    eks: EksClusterCleaner,
    vpc: VpcCleaner,
}

impl ClusterCleanup {
    pub fn new(clients: &AwsClients) -> Self {
        Self {
            ec2: Ec2Cleaner::new(Arc::clone(&clients.ec2), Arc::clone(&clients.tagging)),
            ssm: SsmCleaner::new(Arc::clone(&clients.ssm), Arc::clone(&clients.tagging)),
            rolesanywhere: RolesAnywhereCleaner::new(
                Arc::clone(&clients.rolesanywhere),
                Arc::clone(&clients.tagging),
            ),
            iam: IamCleaner::new(Arc::clone(&clients.iam)),
            stacks: CfnStackCleaner::new(Arc::clone(&clients.cfn), Arc::clone(&clients.tagging)),
            eks: EksClusterCleaner::new(Arc::clone(&clients.eks), Arc::clone(&clients.tagging)),
            vpc: VpcCleaner::new(Arc::clone(&clients.ec2)),
        }
    }

    /// Replace the cleaners that wait on deletions, e.g. to poll faster.
    pub fn with_waiting_cleaners(
        mut self,
        ec2: Ec2Cleaner,
        stacks: CfnStackCleaner,
        eks: EksClusterCleaner,
    ) -> Self {
        self.ec2 = ec2;
        self.stacks = stacks;
        self.eks = eks;
        self
    }

    pub async fn run(&self, input: &FilterInput) -> Result<()> {
        info!("Cleaning up resources matching {:?}", input);
        let mut errors = Vec::new();
        record(&mut errors, "EC2 instances", self.instances(input).await);
        record(
            &mut errors,
            "SSM managed instances",
            self.managed_instances(input).await,
        );
        record(&mut errors, "SSM activations", self.activations(input).await);
        record(&mut errors, "SSM parameters", self.parameters(input).await);
        record(
            &mut errors,
            "Roles Anywhere profiles",
            self.profiles(input).await,
        );
        record(
            &mut errors,
            "Roles Anywhere trust anchors",
            self.trust_anchors(input).await,
        );
        record(
            &mut errors,
            "IAM instance profiles",
            self.instance_profiles(input).await,
        );
        record(&mut errors, "IAM roles", self.roles(input).await);
        record(
            &mut errors,
            "credential stacks",
            self.credential_stacks(input).await,
        );
        record(&mut errors, "EKS clusters", self.clusters(input).await);
        record(
            &mut errors,
            "architecture stacks",
            self.architecture_stacks(input).await,
        );
        record(&mut errors, "VPCs", self.vpcs(input).await);
        match Error::join(errors) {
            Some(e) => Err(e),
            None => {
                info!("Cleanup finished");
                Ok(())
            }
        }
    }

    async fn instances(&self, input: &FilterInput) -> Result<()> {
        let ids = self.ec2.list_tagged_instances(input).await?;
        if skip_deletion(input, "EC2 instances", &ids) {
            return Ok(());
        }
        self.ec2.delete_instances(&ids).await
    }

    async fn managed_instances(&self, input: &FilterInput) -> Result<()> {
        let ids = self.ssm.list_managed_instances(input).await?;
        if skip_deletion(input, "managed instances", &ids) {
            return Ok(());
        }
        self.ssm.delete_managed_instances(&ids).await
    }

    async fn activations(&self, input: &FilterInput) -> Result<()> {
        let ids = self.ssm.list_activations(input).await?;
        if skip_deletion(input, "activations", &ids) {
            return Ok(());
        }
        self.ssm.delete_activations(&ids).await
    }

    async fn parameters(&self, input: &FilterInput) -> Result<()> {
        let names = self.ssm.list_parameters(input).await?;
        if skip_deletion(input, "SSM parameters", &names) {
            return Ok(());
        }
        self.ssm.delete_parameters(&names).await
    }

    async fn profiles(&self, input: &FilterInput) -> Result<()> {
        let ids = self.rolesanywhere.list_profiles(input).await?;
        if skip_deletion(input, "Roles Anywhere profiles", &ids) {
            return Ok(());
        }
        for id in &ids {
            self.rolesanywhere.delete_profile(id).await?;
        }
        Ok(())
    }

    async fn trust_anchors(&self, input: &FilterInput) -> Result<()> {
        let ids = self.rolesanywhere.list_trust_anchors(input).await?;
        if skip_deletion(input, "Roles Anywhere trust anchors", &ids) {
            return Ok(());
        }
        for id in &ids {
            self.rolesanywhere.delete_trust_anchor(id).await?;
        }
        Ok(())
    }

    async fn instance_profiles(&self, input: &FilterInput) -> Result<()> {
        let names = self.iam.list_instance_profiles(input).await?;
        if skip_deletion(input, "IAM instance profiles", &names) {
            return Ok(());
        }
        for name in &names {
            self.iam.delete_instance_profile(name).await?;
        }
        Ok(())
    }

    async fn roles(&self, input: &FilterInput) -> Result<()> {
        let names = self.iam.list_roles(input).await?;
        if skip_deletion(input, "IAM roles", &names) {
            return Ok(());
        }
        for name in &names {
            self.iam.delete_role(name).await?;
        }
        Ok(())
    }

    async fn credential_stacks(&self, input: &FilterInput) -> Result<()> {
        let stacks = self.stacks.list_credential_stacks(input).await?;
        if skip_deletion(input, "credential stacks", &stacks) {
            return Ok(());
        }
        self.stacks.delete_stacks(&stacks).await
    }

    async fn clusters(&self, input: &FilterInput) -> Result<()> {
        let names = self.eks.list_clusters(input).await?;
        if skip_deletion(input, "EKS clusters", &names) {
            return Ok(());
        }
        self.eks.delete_clusters(&names).await
    }

    async fn architecture_stacks(&self, input: &FilterInput) -> Result<()> {
        let stacks = self.stacks.list_architecture_stacks(input).await?;
        if skip_deletion(input, "architecture stacks", &stacks) {
            return Ok(());
        }
        self.stacks.delete_stacks(&stacks).await
    }

    async fn vpcs(&self, input: &FilterInput) -> Result<()> {
        let ids = self.vpc.list_tagged_vpcs(input).await?;
        if skip_deletion(input, "VPCs", &ids) {
            return Ok(());
        }
        self.vpc.delete_vpcs(&ids).await
    }
}
