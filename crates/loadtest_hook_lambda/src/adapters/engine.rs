use std::collections::BTreeMap;
use std::path::PathBuf;

/// One synchronous load-test run: the plan is executed to completion and
/// per-sample results land in `result_log`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRunRequest {
    pub test_plan: PathBuf,
    pub result_log: PathBuf,
    pub engine_log: PathBuf,
    pub task_root: PathBuf,
    pub variables: BTreeMap<String, String>,
}

/// HTML dashboard generation from an existing result log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub result_log: PathBuf,
    pub html_output_dir: PathBuf,
    pub json_output_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub task_root: PathBuf,
}

/// The load-testing engine port. Execution blocks for the full duration of
/// the test; no timeout is enforced here.
pub trait LoadTestEngine {
    fn run_test(&self, request: &TestRunRequest) -> Result<(), String>;
    fn generate_report(&self, request: &ReportRequest) -> Result<(), String>;
}
