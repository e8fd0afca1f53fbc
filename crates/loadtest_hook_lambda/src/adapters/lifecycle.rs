use crate::runtime::contract::RunOutcome;

/// One status-update call to the deployment orchestrator. No retry policy
/// lives behind this seam.
pub trait LifecycleNotifier {
    fn put_status(
        &self,
        deployment_id: &str,
        lifecycle_event_hook_execution_id: &str,
        outcome: RunOutcome,
    ) -> Result<(), String>;
}
