use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use walkdir::WalkDir;

use crate::adapters::engine::{LoadTestEngine, ReportRequest, TestRunRequest};
use crate::adapters::lifecycle::LifecycleNotifier;
use crate::adapters::logging::EventLog;
use crate::adapters::object_store::{ArtifactStore, ObjectFetcher};
use crate::runtime::config::{
    EnvironmentSnapshot, ObjectStoreLocation, RunConfiguration, TestSource,
};
use crate::runtime::contract::{configuration_fingerprint, HookInvocation, RunOutcome};
use crate::runtime::storage_keys::{report_file_key, test_object_key, ScratchPaths};

/// Invocation-scoped filesystem context. Production uses `/tmp` and the
/// process working directory; tests substitute temp directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookHandlerContext {
    pub scratch: ScratchPaths,
    pub working_dir: PathBuf,
}

/// A failed call to the deployment orchestrator. This is the one failure the
/// handler does not convert into a status string: it surfaces as an
/// invocation error instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyFailure {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StageFailure {
    stage: &'static str,
    message: String,
}

impl StageFailure {
    fn new(stage: &'static str, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

/// Drives the whole workflow for one invocation: validate configuration,
/// stage inputs, execute the plan, publish the report, and report the
/// terminal status. The first stage failure wins and is converted into a
/// `Failed` notification; only a notifier error escapes as `Err`.
#[allow(clippy::too_many_arguments)]
pub fn handle_hook_invocation(
    invocation: &HookInvocation,
    environment: &EnvironmentSnapshot,
    context: &HookHandlerContext,
    fetcher: &impl ObjectFetcher,
    engine: &impl LoadTestEngine,
    store: &impl ArtifactStore,
    notifier: &impl LifecycleNotifier,
    log: &dyn EventLog,
) -> Result<RunOutcome, NotifyFailure> {
    log.info(
        "invocation_received",
        json!({
            "deployment_id": invocation.deployment_id,
            "lifecycle_event_hook_execution_id": invocation.lifecycle_event_hook_execution_id,
        }),
    );

    let configuration = match RunConfiguration::from_environment(environment) {
        Ok(value) => value,
        Err(error) => {
            log.error("configuration_rejected", json!({ "error": error.message() }));
            return report_outcome(invocation, RunOutcome::Failed, notifier, log);
        }
    };

    log.info(
        "configuration_resolved",
        json!({
            "fingerprint": configuration_fingerprint(&configuration),
            "export_html_report": configuration.export_html_report,
            "upload_results": configuration.upload.is_some(),
            "variables": configuration.variables.keys().collect::<Vec<_>>(),
        }),
    );

    match run_pipeline(&configuration, context, fetcher, engine, store, log) {
        Ok(()) => report_outcome(invocation, RunOutcome::Succeeded, notifier, log),
        Err(failure) => {
            log.error(
                "workflow_failed",
                json!({
                    "stage": failure.stage,
                    "error": failure.message,
                }),
            );
            report_outcome(invocation, RunOutcome::Failed, notifier, log)
        }
    }
}

fn report_outcome(
    invocation: &HookInvocation,
    outcome: RunOutcome,
    notifier: &impl LifecycleNotifier,
    log: &dyn EventLog,
) -> Result<RunOutcome, NotifyFailure> {
    notifier
        .put_status(
            &invocation.deployment_id,
            &invocation.lifecycle_event_hook_execution_id,
            outcome,
        )
        .map_err(|message| NotifyFailure { message })?;

    log.info("status_reported", json!({ "status": outcome.as_str() }));
    Ok(outcome)
}

fn run_pipeline(
    configuration: &RunConfiguration,
    context: &HookHandlerContext,
    fetcher: &impl ObjectFetcher,
    engine: &impl LoadTestEngine,
    store: &impl ArtifactStore,
    log: &dyn EventLog,
) -> Result<(), StageFailure> {
    let test_plan = stage_inputs(configuration, context, fetcher, log)?;
    execute_test(configuration, context, &test_plan, engine, log)?;
    publish_report(configuration, context, engine, store, log)?;
    Ok(())
}

fn stage_inputs(
    configuration: &RunConfiguration,
    context: &HookHandlerContext,
    fetcher: &impl ObjectFetcher,
    log: &dyn EventLog,
) -> Result<PathBuf, StageFailure> {
    match &configuration.source {
        TestSource::PreStaged { test_plan_path } => {
            log.info("input_prestaged", json!({ "test_plan": test_plan_path }));
            Ok(PathBuf::from(test_plan_path))
        }
        TestSource::Staged {
            location,
            test_file,
            users_file,
        } => {
            let test_plan = fetch_into_scratch(location, test_file, context, fetcher, log)?;
            fetch_into_scratch(location, users_file, context, fetcher, log)?;
            Ok(test_plan)
        }
    }
}

fn fetch_into_scratch(
    location: &ObjectStoreLocation,
    file_name: &str,
    context: &HookHandlerContext,
    fetcher: &impl ObjectFetcher,
    log: &dyn EventLog,
) -> Result<PathBuf, StageFailure> {
    let key = test_object_key(&location.base_path, file_name);
    let destination = context.scratch.staged_file(file_name);

    fetcher
        .fetch_object(&location.bucket, &key, &destination)
        .map_err(|error| StageFailure::new("stage_inputs", error))?;

    log.info(
        "input_staged",
        json!({
            "bucket": location.bucket,
            "key": key,
            "destination": destination.display().to_string(),
        }),
    );
    Ok(destination)
}

fn execute_test(
    configuration: &RunConfiguration,
    context: &HookHandlerContext,
    test_plan: &Path,
    engine: &impl LoadTestEngine,
    log: &dyn EventLog,
) -> Result<(), StageFailure> {
    let request = TestRunRequest {
        test_plan: test_plan.to_path_buf(),
        result_log: context.scratch.result_log(),
        engine_log: context.scratch.engine_log(),
        task_root: resolve_task_root(configuration, context),
        variables: configuration.variables.clone(),
    };

    engine
        .run_test(&request)
        .map_err(|error| StageFailure::new("execute_test", error))?;

    log.info(
        "test_executed",
        json!({
            "test_plan": request.test_plan.display().to_string(),
            "result_log": request.result_log.display().to_string(),
        }),
    );
    Ok(())
}

fn resolve_task_root(configuration: &RunConfiguration, context: &HookHandlerContext) -> PathBuf {
    configuration
        .task_root
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| context.working_dir.clone())
}

fn publish_report(
    configuration: &RunConfiguration,
    context: &HookHandlerContext,
    engine: &impl LoadTestEngine,
    store: &impl ArtifactStore,
    log: &dyn EventLog,
) -> Result<(), StageFailure> {
    let mut exported = false;
    if configuration.export_html_report {
        let request = ReportRequest {
            result_log: context.scratch.result_log(),
            html_output_dir: context.scratch.html_report_dir(),
            json_output_dir: context.scratch.json_report_dir(),
            temp_dir: context.scratch.temp_report_dir(),
            task_root: resolve_task_root(configuration, context),
        };

        engine
            .generate_report(&request)
            .map_err(|error| StageFailure::new("generate_report", error))?;

        log.info(
            "report_generated",
            json!({ "html_output_dir": request.html_output_dir.display().to_string() }),
        );
        exported = true;
    }

    if let Some(location) = &configuration.upload {
        let source_dir = if exported {
            context.scratch.html_report_dir()
        } else {
            context.scratch.root().to_path_buf()
        };
        upload_directory(location, &source_dir, store, log)?;
    }
    Ok(())
}

/// Recursive upload of one directory. Per-file failures are logged and
/// counted but do not fail the batch.
fn upload_directory(
    location: &ObjectStoreLocation,
    source_dir: &Path,
    store: &impl ArtifactStore,
    log: &dyn EventLog,
) -> Result<(), StageFailure> {
    let mut files_uploaded = 0usize;
    let mut files_failed = 0usize;

    for entry in WalkDir::new(source_dir) {
        let entry = entry.map_err(|error| {
            StageFailure::new(
                "upload_results",
                format!("failed to walk upload directory: {error}"),
            )
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(source_dir).map_err(|error| {
            StageFailure::new(
                "upload_results",
                format!("upload entry escaped its source directory: {error}"),
            )
        })?;
        let key = report_file_key(&location.base_path, &relative_key(relative));

        let transfer = fs::read(entry.path())
            .map_err(|error| format!("failed to read artifact: {error}"))
            .and_then(|body| store.store_object(&location.bucket, &key, &body));

        match transfer {
            Ok(()) => files_uploaded += 1,
            Err(error) => {
                files_failed += 1;
                log.error(
                    "upload_transfer_failed",
                    json!({ "key": key, "error": error }),
                );
            }
        }
    }

    log.info(
        "report_uploaded",
        json!({
            "bucket": location.bucket,
            "prefix": location.base_path,
            "files_uploaded": files_uploaded,
            "files_failed": files_failed,
        }),
    );
    Ok(())
}

fn relative_key(path: &Path) -> String {
    path.iter()
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
