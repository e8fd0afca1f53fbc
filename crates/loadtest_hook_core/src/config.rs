use std::collections::BTreeMap;

use serde::Serialize;

use crate::contract::ValidationError;

/// Environment entries with this prefix become test-plan variables: the
/// prefix is stripped and the remainder lower-cased.
pub const VARIABLE_PREFIX: &str = "JMETER_VARIABLE_";

pub type EnvironmentSnapshot = BTreeMap<String, String>;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ObjectStoreLocation {
    pub bucket: String,
    pub base_path: String,
}

/// Where the test plan comes from. `JMETER_TEST_FILE` selects the pre-staged
/// variant; otherwise the plan and its users data file are fetched from the
/// object store.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub enum TestSource {
    Staged {
        location: ObjectStoreLocation,
        test_file: String,
        users_file: String,
    },
    PreStaged {
        test_plan_path: String,
    },
}

/// Settings resolved from the process environment in a single pass,
/// immutable for the rest of the invocation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RunConfiguration {
    pub source: TestSource,
    pub upload: Option<ObjectStoreLocation>,
    pub export_html_report: bool,
    pub variables: BTreeMap<String, String>,
    pub task_root: Option<String>,
}

impl RunConfiguration {
    /// Required values are checked in a fixed order (bucket, base path, test
    /// file, users file) and the first missing one wins.
    pub fn from_environment(environment: &EnvironmentSnapshot) -> Result<Self, ValidationError> {
        let source = resolve_test_source(environment)?;
        let export_html_report = parse_flag(environment, "EXPORT_JMETER_HTML")?;
        let upload_results = parse_flag(environment, "UPLOAD_TO_S3")?;

        let upload = if upload_results {
            Some(match &source {
                TestSource::Staged { location, .. } => location.clone(),
                TestSource::PreStaged { .. } => resolve_location(environment)?,
            })
        } else {
            None
        };

        Ok(Self {
            source,
            upload,
            export_html_report,
            variables: collect_variables(environment),
            task_root: non_blank(environment, "LAMBDA_TASK_ROOT"),
        })
    }
}

fn resolve_test_source(environment: &EnvironmentSnapshot) -> Result<TestSource, ValidationError> {
    if let Some(test_plan_path) = non_blank(environment, "JMETER_TEST_FILE") {
        return Ok(TestSource::PreStaged { test_plan_path });
    }

    let location = resolve_location(environment)?;
    let test_file = require(environment, "JMETER_LOADTEST_FILE")?;
    let users_file = require(environment, "JMETER_USERS_FILE")?;

    Ok(TestSource::Staged {
        location,
        test_file,
        users_file,
    })
}

fn resolve_location(
    environment: &EnvironmentSnapshot,
) -> Result<ObjectStoreLocation, ValidationError> {
    let bucket = require(environment, "S3_BUCKET")?;
    let base_path = require(environment, "S3_BUCKET_PATH")?;
    Ok(ObjectStoreLocation { bucket, base_path })
}

fn collect_variables(environment: &EnvironmentSnapshot) -> BTreeMap<String, String> {
    let mut variables = BTreeMap::new();
    for (key, value) in environment {
        let Some(name) = key.strip_prefix(VARIABLE_PREFIX) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        variables.insert(name.to_lowercase(), value.clone());
    }
    variables
}

/// Blank values are treated the same as absent ones.
fn non_blank(environment: &EnvironmentSnapshot, key: &str) -> Option<String> {
    environment
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn require(environment: &EnvironmentSnapshot, key: &str) -> Result<String, ValidationError> {
    non_blank(environment, key)
        .ok_or_else(|| ValidationError::new(format!("{key} must be configured")))
}

fn parse_flag(environment: &EnvironmentSnapshot, key: &str) -> Result<bool, ValidationError> {
    let Some(raw) = non_blank(environment, key) else {
        return Ok(false);
    };

    match raw.to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(ValidationError::new(format!(
            "{key} must be one of true, false, 1, or 0 (got '{other}')"
        ))),
    }
}
