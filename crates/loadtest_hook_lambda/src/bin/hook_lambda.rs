use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use aws_sdk_codedeploy::types::LifecycleEventStatus;
use aws_sdk_s3::primitives::ByteStream;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use loadtest_hook_lambda::adapters::jmeter::JMeterProcessEngine;
use loadtest_hook_lambda::adapters::lifecycle::LifecycleNotifier;
use loadtest_hook_lambda::adapters::logging::StderrEventLog;
use loadtest_hook_lambda::adapters::object_store::{ArtifactStore, ObjectFetcher};
use loadtest_hook_lambda::handlers::hook::{handle_hook_invocation, HookHandlerContext};
use loadtest_hook_lambda::runtime::contract::{HookInvocation, RunOutcome};
use loadtest_hook_lambda::runtime::storage_keys::{ScratchPaths, DEFAULT_SCRATCH_ROOT};

struct S3TransferAdapter {
    s3_client: aws_sdk_s3::Client,
}

impl ObjectFetcher for S3TransferAdapter {
    fn fetch_object(&self, bucket: &str, key: &str, destination: &Path) -> Result<(), String> {
        let bucket = bucket.to_string();
        let object_key = key.to_string();
        let destination = destination.to_path_buf();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let object = client
                    .get_object()
                    .bucket(bucket)
                    .key(object_key)
                    .send()
                    .await
                    .map_err(|error| format!("failed to read object from s3: {error}"))?;
                let body = object
                    .body
                    .collect()
                    .await
                    .map_err(|error| format!("failed to read object body from s3: {error}"))?;
                std::fs::write(&destination, body.into_bytes())
                    .map_err(|error| format!("failed to write staged file: {error}"))
            })
        })
    }
}

impl ArtifactStore for S3TransferAdapter {
    fn store_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), String> {
        let bucket = bucket.to_string();
        let object_key = key.to_string();
        let body_bytes = body.to_vec();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_object()
                    .bucket(bucket)
                    .key(object_key)
                    .body(ByteStream::from(body_bytes))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to write object to s3: {error}"))
            })
        })
    }
}

struct CodeDeployNotifier {
    codedeploy_client: aws_sdk_codedeploy::Client,
}

impl LifecycleNotifier for CodeDeployNotifier {
    fn put_status(
        &self,
        deployment_id: &str,
        lifecycle_event_hook_execution_id: &str,
        outcome: RunOutcome,
    ) -> Result<(), String> {
        let deployment_id = deployment_id.to_string();
        let execution_id = lifecycle_event_hook_execution_id.to_string();
        let status = match outcome {
            RunOutcome::Succeeded => LifecycleEventStatus::Succeeded,
            RunOutcome::Failed => LifecycleEventStatus::Failed,
        };
        let client = self.codedeploy_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_lifecycle_event_hook_execution_status()
                    .deployment_id(deployment_id)
                    .lifecycle_event_hook_execution_id(execution_id)
                    .status(status)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        format!("failed to put lifecycle event hook execution status: {error}")
                    })
            })
        })
    }
}

async fn handle_request(event: LambdaEvent<serde_json::Value>) -> Result<String, Error> {
    let invocation: HookInvocation = serde_json::from_value(event.payload)
        .map_err(|error| Error::from(format!("invalid hook invocation payload: {error}")))?;

    let environment: BTreeMap<String, String> = std::env::vars().collect();
    let context = HookHandlerContext {
        scratch: ScratchPaths::new(DEFAULT_SCRATCH_ROOT),
        working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let transfer = S3TransferAdapter {
        s3_client: aws_sdk_s3::Client::new(&aws_config),
    };
    let notifier = CodeDeployNotifier {
        codedeploy_client: aws_sdk_codedeploy::Client::new(&aws_config),
    };
    let log = StderrEventLog::new("hook_handler");

    let outcome = handle_hook_invocation(
        &invocation,
        &environment,
        &context,
        &transfer,
        &JMeterProcessEngine,
        &transfer,
        &notifier,
        &log,
    )
    .map_err(|failure| Error::from(failure.message))?;

    Ok(outcome.as_str().to_string())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
