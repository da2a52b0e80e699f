use crate::clients::AwsClients;
use crate::error::{Error, Result};
use crate::resource::{FilterInput, SweeperInput};
use crate::ssm::SsmCleaner;
use log::info;
use std::fmt::Debug;
use std::sync::Arc;

/// A best effort pass over resources that per-test cleanup left behind. Only the SSM resources
/// that hybrid nodes register are swept.
pub struct Sweeper {
    ssm: SsmCleaner,
}

impl Sweeper {
    pub fn new(clients: &AwsClients) -> Self {
        Self {
            ssm: SsmCleaner::new(Arc::clone(&clients.ssm), Arc::clone(&clients.tagging)),
        }
    }

    /// Deregister managed instances and then delete activations. Both are attempted even when the
    /// first fails, and every failure is returned.
    pub async fn run(&self, input: SweeperInput) -> Result<()> {
        let input = FilterInput::from(input);
        info!("Sweeping with {:?}", input);
        let mut errors = Vec::new();
        record(
            &mut errors,
            "SSM managed instances",
            self.cleanup_managed_instances(&input).await,
        );
        record(
            &mut errors,
            "SSM hybrid activations",
            self.cleanup_activations(&input).await,
        );
        match Error::join(errors) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn cleanup_managed_instances(&self, input: &FilterInput) -> Result<()> {
        let instance_ids = self.ssm.list_managed_instances(input).await?;
        if skip_deletion(input, "managed instances", &instance_ids) {
            return Ok(());
        }
        self.ssm.delete_managed_instances(&instance_ids).await
    }

    async fn cleanup_activations(&self, input: &FilterInput) -> Result<()> {
        let activation_ids = self.ssm.list_activations(input).await?;
        if skip_deletion(input, "activations", &activation_ids) {
            return Ok(());
        }
        self.ssm.delete_activations(&activation_ids).await
    }
}

/// Log what was selected. True when nothing should be deleted, either because nothing was
/// selected or because this is a dry run.
pub(crate) fn skip_deletion<T: Debug>(input: &FilterInput, what: &str, candidates: &[T]) -> bool {
    info!("Deleting {} {:?}", what, candidates);
    if input.dry_run {
        info!("Dry run, skipping {} deletion", what);
        return true;
    }
    candidates.is_empty()
}

/// Keep a failed phase's error, labelled with the phase.
pub(crate) fn record(errors: &mut Vec<Error>, phase: &str, result: Result<()>) {
    if let Err(e) = result {
        errors.push(Error::Phase {
            phase: phase.to_string(),
            source: Box::new(e),
        });
    }
}
