use super::{not_found, page, FakeAccount};
use e2e_cleanup::clients::{
    ApiError, ApiResult, Ec2Api, Instance, Page, RouteTable, SecurityGroup, Vpc,
};

fn dependency(id: &str, what: &str) -> ApiError {
    ApiError::new(
        "DependencyViolation",
        format!("The {} '{}' has dependencies and cannot be deleted.", what, id),
    )
}

#[async_trait::async_trait]
impl Ec2Api for FakeAccount {
    async fn describe_instances(
        &self,
        instance_ids: &[String],
        next_token: Option<String>,
    ) -> ApiResult<Page<Instance>> {
        let mut state = self.state();
        state.check("describe_instances")?;
        let mut found = Vec::new();
        for instance in state.instances.values_mut() {
            if !instance_ids.contains(&instance.id) {
                continue;
            }
            found.push(instance.clone());
            // Shutting down instances are terminated by the next look.
            if instance.state.as_deref() == Some("shutting-down") {
                instance.state = Some("terminated".to_string());
            }
        }
        Ok(page(found, next_token))
    }

    async fn terminate_instances(&self, instance_ids: &[String]) -> ApiResult<()> {
        let mut state = self.state();
        state.call("terminate_instances", &instance_ids.join(","))?;
        if let Some(missing) = instance_ids
            .iter()
            .find(|id| !state.instances.contains_key(*id))
        {
            return Err(not_found("InvalidInstanceID.NotFound", missing));
        }
        for id in instance_ids {
            if let Some(instance) = state.instances.get_mut(id) {
                if instance.state.as_deref() != Some("terminated") {
                    instance.state = Some("shutting-down".to_string());
                }
            }
        }
        Ok(())
    }

    async fn describe_vpcs(
        &self,
        tag_key: &str,
        tag_value: Option<&str>,
        next_token: Option<String>,
    ) -> ApiResult<Page<Vpc>> {
        let mut state = self.state();
        state.check("describe_vpcs")?;
        let vpcs = state
            .vpcs
            .iter()
            .filter(|(_, vpc)| {
                vpc.tags.iter().any(|tag| {
                    tag.key == tag_key && tag_value.map_or(true, |value| tag.value == value)
                })
            })
            .map(|(id, vpc)| Vpc {
                id: id.clone(),
                tags: vpc.tags.clone(),
            })
            .collect();
        Ok(page(vpcs, next_token))
    }

    async fn describe_internet_gateways(&self, vpc_id: &str) -> ApiResult<Vec<String>> {
        let mut state = self.state();
        state.check("describe_internet_gateways")?;
        Ok(state
            .vpcs
            .get(vpc_id)
            .map(|vpc| vpc.gateways.clone())
            .unwrap_or_default())
    }

    async fn detach_internet_gateway(&self, gateway_id: &str, vpc_id: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.call("detach_internet_gateway", gateway_id)?;
        let vpc = state
            .vpcs
            .get_mut(vpc_id)
            .ok_or_else(|| not_found("InvalidVpcID.NotFound", vpc_id))?;
        let before = vpc.gateways.len();
        vpc.gateways.retain(|id| id != gateway_id);
        if vpc.gateways.len() == before {
            return Err(ApiError::new(
                "Gateway.NotAttached",
                format!("resource {} is not attached to network {}", gateway_id, vpc_id),
            ));
        }
        state.detached_gateways.insert(gateway_id.to_string());
        Ok(())
    }

    async fn delete_internet_gateway(&self, gateway_id: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.call("delete_internet_gateway", gateway_id)?;
        if state
            .vpcs
            .values()
            .any(|vpc| vpc.gateways.iter().any(|id| id == gateway_id))
        {
            return Err(dependency(gateway_id, "internet gateway"));
        }
        if !state.detached_gateways.remove(gateway_id) {
            return Err(not_found("InvalidInternetGatewayID.NotFound", gateway_id));
        }
        Ok(())
    }

    async fn describe_subnets(&self, vpc_id: &str) -> ApiResult<Vec<String>> {
        let mut state = self.state();
        state.check("describe_subnets")?;
        Ok(state
            .vpcs
            .get(vpc_id)
            .map(|vpc| vpc.subnets.clone())
            .unwrap_or_default())
    }

    async fn delete_subnet(&self, subnet_id: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.call("delete_subnet", subnet_id)?;
        for vpc in state.vpcs.values_mut() {
            if vpc.subnets.iter().any(|id| id == subnet_id) {
                vpc.subnets.retain(|id| id != subnet_id);
                return Ok(());
            }
        }
        Err(not_found("InvalidSubnetID.NotFound", subnet_id))
    }

    async fn describe_route_tables(&self, vpc_id: &str) -> ApiResult<Vec<RouteTable>> {
        let mut state = self.state();
        state.check("describe_route_tables")?;
        Ok(state
            .vpcs
            .get(vpc_id)
            .map(|vpc| vpc.route_tables.clone())
            .unwrap_or_default())
    }

    async fn disassociate_route_table(&self, association_id: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.call("disassociate_route_table", association_id)?;
        for vpc in state.vpcs.values_mut() {
            for table in vpc.route_tables.iter_mut() {
                if table
                    .associations
                    .iter()
                    .any(|association| association.id == association_id)
                {
                    table
                        .associations
                        .retain(|association| association.id != association_id);
                    return Ok(());
                }
            }
        }
        Err(not_found("InvalidAssociationID.NotFound", association_id))
    }

    async fn delete_route_table(&self, route_table_id: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.call("delete_route_table", route_table_id)?;
        for vpc in state.vpcs.values_mut() {
            if let Some(table) = vpc
                .route_tables
                .iter()
                .find(|table| table.id == route_table_id)
            {
                if !table.associations.is_empty() {
                    return Err(dependency(route_table_id, "route table"));
                }
                vpc.route_tables.retain(|table| table.id != route_table_id);
                return Ok(());
            }
        }
        Err(not_found("InvalidRouteTableID.NotFound", route_table_id))
    }

    async fn describe_security_groups(&self, vpc_id: &str) -> ApiResult<Vec<SecurityGroup>> {
        let mut state = self.state();
        state.check("describe_security_groups")?;
        Ok(state
            .vpcs
            .get(vpc_id)
            .map(|vpc| vpc.security_groups.clone())
            .unwrap_or_default())
    }

    async fn revoke_security_group_ingress(
        &self,
        group_id: &str,
        rule_ids: &[String],
    ) -> ApiResult<()> {
        let mut state = self.state();
        state.call("revoke_security_group_ingress", group_id)?;
        for vpc in state.vpcs.values_mut() {
            for group in vpc.security_groups.iter_mut().filter(|g| g.id == group_id) {
                group.ingress_rule_ids.retain(|id| !rule_ids.contains(id));
            }
        }
        Ok(())
    }

    async fn revoke_security_group_egress(
        &self,
        group_id: &str,
        rule_ids: &[String],
    ) -> ApiResult<()> {
        let mut state = self.state();
        state.call("revoke_security_group_egress", group_id)?;
        for vpc in state.vpcs.values_mut() {
            for group in vpc.security_groups.iter_mut().filter(|g| g.id == group_id) {
                group.egress_rule_ids.retain(|id| !rule_ids.contains(id));
            }
        }
        Ok(())
    }

    async fn delete_security_group(&self, group_id: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.call("delete_security_group", group_id)?;
        for vpc in state.vpcs.values_mut() {
            if let Some(group) = vpc.security_groups.iter().find(|g| g.id == group_id) {
                if group.is_default() {
                    return Err(ApiError::new(
                        "CannotDelete",
                        "the specified group cannot be deleted",
                    ));
                }
                vpc.security_groups.retain(|g| g.id != group_id);
                return Ok(());
            }
        }
        Err(not_found("InvalidGroup.NotFound", group_id))
    }

    async fn delete_vpc(&self, vpc_id: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.call("delete_vpc", vpc_id)?;
        let vpc = state
            .vpcs
            .get(vpc_id)
            .ok_or_else(|| not_found("InvalidVpcID.NotFound", vpc_id))?;
        if !vpc.gateways.is_empty()
            || !vpc.subnets.is_empty()
            || vpc.route_tables.iter().any(|table| !table.is_main())
            || vpc.security_groups.iter().any(|group| !group.is_default())
        {
            return Err(dependency(vpc_id, "vpc"));
        }
        state.vpcs.remove(vpc_id);
        Ok(())
    }
}
