use super::{api_error, convert_tags, owned, to_utc};
use crate::clients::{
    Activation, ApiResult, InstanceInformationFilter, ManagedInstance, Page, Parameter, SsmApi,
};
use aws_sdk_ssm::model::{InstanceInformationStringFilter, ParameterStringFilter};
use aws_sdk_ssm::Client;

#[async_trait::async_trait]
impl SsmApi for Client {
    async fn describe_activations(
        &self,
        next_token: Option<String>,
    ) -> ApiResult<Page<Activation>> {
        let output = self
            .describe_activations()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(api_error)?;
        let items = output
            .activation_list()
            .unwrap_or_default()
            .iter()
            .map(|activation| Activation {
                id: owned(activation.activation_id()),
                default_instance_name: activation.default_instance_name().map(str::to_string),
                created: to_utc(activation.created_date()),
                tags: convert_tags(activation.tags()),
            })
            .collect();
        Ok(Page {
            items,
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn delete_activation(&self, activation_id: &str) -> ApiResult<()> {
        self.delete_activation()
            .activation_id(activation_id)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn describe_instance_information(
        &self,
        filter: &InstanceInformationFilter,
        next_token: Option<String>,
    ) -> ApiResult<Page<ManagedInstance>> {
        let (key, values) = match filter {
            InstanceInformationFilter::InstanceIds(ids) => ("InstanceIds", ids),
            InstanceInformationFilter::ActivationIds(ids) => ("ActivationIds", ids),
        };
        let output = self
            .describe_instance_information()
            .filters(
                InstanceInformationStringFilter::builder()
                    .key(key)
                    .set_values(Some(values.clone()))
                    .build(),
            )
            .set_next_token(next_token)
            .send()
            .await
            .map_err(api_error)?;
        let items = output
            .instance_information_list()
            .unwrap_or_default()
            .iter()
            .map(|info| ManagedInstance {
                id: owned(info.instance_id()),
                resource_type: info
                    .resource_type()
                    .map(|resource_type| resource_type.as_str().to_string()),
                activation_id: info.activation_id().map(str::to_string),
                last_ping: to_utc(info.last_ping_date_time()),
                registered: to_utc(info.registration_date()),
            })
            .collect();
        Ok(Page {
            items,
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn deregister_managed_instance(&self, instance_id: &str) -> ApiResult<()> {
        self.deregister_managed_instance()
            .instance_id(instance_id)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn describe_parameter(&self, name: &str) -> ApiResult<Option<Parameter>> {
        let output = self
            .describe_parameters()
            .parameter_filters(
                ParameterStringFilter::builder()
                    .key("Name")
                    .option("Equals")
                    .values(name)
                    .build(),
            )
            .send()
            .await
            .map_err(api_error)?;
        Ok(output
            .parameters()
            .unwrap_or_default()
            .iter()
            .find(|parameter| parameter.name() == Some(name))
            .map(|parameter| Parameter {
                name: name.to_string(),
                last_modified: to_utc(parameter.last_modified_date()),
            }))
    }

    async fn delete_parameter(&self, name: &str) -> ApiResult<()> {
        self.delete_parameter()
            .name(name)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }
}
