use super::{api_error, convert_tags, owned, to_utc};
use crate::clients::{
    ApiResult, Ec2Api, Instance, Page, RouteTable, RouteTableAssociation, SecurityGroup, Vpc,
};
use aws_sdk_ec2::model::Filter;
use aws_sdk_ec2::Client;

fn filter(name: &str, values: Vec<String>) -> Filter {
    Filter::builder().name(name).set_values(Some(values)).build()
}

fn vpc_filter(vpc_id: &str) -> Filter {
    filter("vpc-id", vec![vpc_id.to_string()])
}

#[async_trait::async_trait]
impl Ec2Api for Client {
    async fn describe_instances(
        &self,
        instance_ids: &[String],
        next_token: Option<String>,
    ) -> ApiResult<Page<Instance>> {
        // A filter rather than the id list, which fails outright if any id is unknown.
        let output = self
            .describe_instances()
            .filters(filter("instance-id", instance_ids.to_vec()))
            .set_next_token(next_token)
            .send()
            .await
            .map_err(api_error)?;
        let items = output
            .reservations()
            .unwrap_or_default()
            .iter()
            .flat_map(|reservation| reservation.instances().unwrap_or_default())
            .map(|instance| Instance {
                id: owned(instance.instance_id()),
                state: instance
                    .state()
                    .and_then(|state| state.name())
                    .map(|name| name.as_str().to_string()),
                launch_time: to_utc(instance.launch_time()),
                tags: convert_tags(instance.tags()),
            })
            .collect();
        Ok(Page {
            items,
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn terminate_instances(&self, instance_ids: &[String]) -> ApiResult<()> {
        self.terminate_instances()
            .set_instance_ids(Some(instance_ids.to_vec()))
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn describe_vpcs(
        &self,
        tag_key: &str,
        tag_value: Option<&str>,
        next_token: Option<String>,
    ) -> ApiResult<Page<Vpc>> {
        let tag_filter = match tag_value {
            Some(value) => filter(&format!("tag:{}", tag_key), vec![value.to_string()]),
            None => filter("tag-key", vec![tag_key.to_string()]),
        };
        let output = self
            .describe_vpcs()
            .filters(tag_filter)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(api_error)?;
        let items = output
            .vpcs()
            .unwrap_or_default()
            .iter()
            .map(|vpc| Vpc {
                id: owned(vpc.vpc_id()),
                tags: convert_tags(vpc.tags()),
            })
            .collect();
        Ok(Page {
            items,
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn describe_internet_gateways(&self, vpc_id: &str) -> ApiResult<Vec<String>> {
        let mut gateways = Vec::new();
        let mut next_token = None;
        loop {
            let output = self
                .describe_internet_gateways()
                .filters(filter("attachment.vpc-id", vec![vpc_id.to_string()]))
                .set_next_token(next_token)
                .send()
                .await
                .map_err(api_error)?;
            gateways.extend(
                output
                    .internet_gateways()
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|gateway| gateway.internet_gateway_id())
                    .map(str::to_string),
            );
            next_token = output.next_token().map(str::to_string);
            if next_token.is_none() {
                return Ok(gateways);
            }
        }
    }

    async fn detach_internet_gateway(&self, gateway_id: &str, vpc_id: &str) -> ApiResult<()> {
        self.detach_internet_gateway()
            .internet_gateway_id(gateway_id)
            .vpc_id(vpc_id)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn delete_internet_gateway(&self, gateway_id: &str) -> ApiResult<()> {
        self.delete_internet_gateway()
            .internet_gateway_id(gateway_id)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn describe_subnets(&self, vpc_id: &str) -> ApiResult<Vec<String>> {
        let mut subnets = Vec::new();
        let mut next_token = None;
        loop {
            let output = self
                .describe_subnets()
                .filters(vpc_filter(vpc_id))
                .set_next_token(next_token)
                .send()
                .await
                .map_err(api_error)?;
            subnets.extend(
                output
                    .subnets()
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|subnet| subnet.subnet_id())
                    .map(str::to_string),
            );
            next_token = output.next_token().map(str::to_string);
            if next_token.is_none() {
                return Ok(subnets);
            }
        }
    }

    async fn delete_subnet(&self, subnet_id: &str) -> ApiResult<()> {
        self.delete_subnet()
            .subnet_id(subnet_id)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn describe_route_tables(&self, vpc_id: &str) -> ApiResult<Vec<RouteTable>> {
        let mut route_tables = Vec::new();
        let mut next_token = None;
        loop {
            let output = self
                .describe_route_tables()
                .filters(vpc_filter(vpc_id))
                .set_next_token(next_token)
                .send()
                .await
                .map_err(api_error)?;
            route_tables.extend(output.route_tables().unwrap_or_default().iter().map(
                |route_table| RouteTable {
                    id: owned(route_table.route_table_id()),
                    associations: route_table
                        .associations()
                        .unwrap_or_default()
                        .iter()
                        .filter_map(|association| {
                            association.route_table_association_id().map(|id| {
                                RouteTableAssociation {
                                    id: id.to_string(),
                                    main: association.main().unwrap_or(false),
                                }
                            })
                        })
                        .collect(),
                },
            ));
            next_token = output.next_token().map(str::to_string);
            if next_token.is_none() {
                return Ok(route_tables);
            }
        }
    }

    async fn disassociate_route_table(&self, association_id: &str) -> ApiResult<()> {
        self.disassociate_route_table()
            .association_id(association_id)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn delete_route_table(&self, route_table_id: &str) -> ApiResult<()> {
        self.delete_route_table()
            .route_table_id(route_table_id)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn describe_security_groups(&self, vpc_id: &str) -> ApiResult<Vec<SecurityGroup>> {
        let mut groups = Vec::new();
        let mut next_token = None;
        loop {
            let output = self
                .describe_security_groups()
                .filters(vpc_filter(vpc_id))
                .set_next_token(next_token)
                .send()
                .await
                .map_err(api_error)?;
            for group in output.security_groups().unwrap_or_default() {
                groups.push(SecurityGroup {
                    id: owned(group.group_id()),
                    name: owned(group.group_name()),
                    ingress_rule_ids: Vec::new(),
                    egress_rule_ids: Vec::new(),
                });
            }
            next_token = output.next_token().map(str::to_string);
            if next_token.is_none() {
                break;
            }
        }

        for group in groups.iter_mut() {
            let mut next_token = None;
            loop {
                let output = self
                    .describe_security_group_rules()
                    .filters(filter("group-id", vec![group.id.clone()]))
                    .set_next_token(next_token)
                    .send()
                    .await
                    .map_err(api_error)?;
                for rule in output.security_group_rules().unwrap_or_default() {
                    if let Some(rule_id) = rule.security_group_rule_id() {
                        if rule.is_egress().unwrap_or(false) {
                            group.egress_rule_ids.push(rule_id.to_string());
                        } else {
                            group.ingress_rule_ids.push(rule_id.to_string());
                        }
                    }
                }
                next_token = output.next_token().map(str::to_string);
                if next_token.is_none() {
                    break;
                }
            }
        }
        Ok(groups)
    }

    async fn revoke_security_group_ingress(
        &self,
        group_id: &str,
        rule_ids: &[String],
    ) -> ApiResult<()> {
        self.revoke_security_group_ingress()
            .group_id(group_id)
            .set_security_group_rule_ids(Some(rule_ids.to_vec()))
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn revoke_security_group_egress(
        &self,
        group_id: &str,
        rule_ids: &[String],
    ) -> ApiResult<()> {
        self.revoke_security_group_egress()
            .group_id(group_id)
            .set_security_group_rule_ids(Some(rule_ids.to_vec()))
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn delete_security_group(&self, group_id: &str) -> ApiResult<()> {
        self.delete_security_group()
            .group_id(group_id)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn delete_vpc(&self, vpc_id: &str) -> ApiResult<()> {
        self.delete_vpc()
            .vpc_id(vpc_id)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }
}
