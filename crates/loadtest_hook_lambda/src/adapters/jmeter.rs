use std::path::{Path, PathBuf};
use std::process::Command;

use crate::adapters::engine::{LoadTestEngine, ReportRequest, TestRunRequest};

/// The JMeter distribution is bundled in the deployment package under the
/// task root, matching the packaging layout the hook is deployed with.
pub const ENGINE_DIST_SUBPATH: &str = "lib/apache-jmeter-5.4.3";

/// Summariser reporter name, overridable through the engine's own
/// `summariser.name` property.
pub const DEFAULT_SUMMARISER_NAME: &str = "summary";

/// Production engine adapter: drives the bundled JMeter distribution as a
/// child process and waits for it synchronously.
#[derive(Debug, Default, Clone, Copy)]
pub struct JMeterProcessEngine;

pub fn engine_home(task_root: &Path) -> PathBuf {
    task_root.join(ENGINE_DIST_SUBPATH)
}

fn engine_binary(home: &Path) -> PathBuf {
    home.join("bin").join("jmeter")
}

fn properties_file(home: &Path) -> PathBuf {
    home.join("bin").join("jmeter.properties")
}

/// Non-GUI run arguments. Injected variables travel as engine properties so
/// the plan can resolve them regardless of its own variable components.
pub fn run_arguments(request: &TestRunRequest) -> Vec<String> {
    let home = engine_home(&request.task_root);
    let mut arguments = vec![
        "-n".to_string(),
        "-t".to_string(),
        request.test_plan.display().to_string(),
        "-l".to_string(),
        request.result_log.display().to_string(),
        "-j".to_string(),
        request.engine_log.display().to_string(),
        "-p".to_string(),
        properties_file(&home).display().to_string(),
        format!("-Jsummariser.name={DEFAULT_SUMMARISER_NAME}"),
    ];
    for (name, value) in &request.variables {
        arguments.push(format!("-J{name}={value}"));
    }
    arguments
}

/// Dashboard generation arguments. The HTML output directory rides the `-o`
/// flag; the JSON intermediate and temp working directories are bound
/// through report-generator properties.
pub fn report_arguments(request: &ReportRequest) -> Vec<String> {
    vec![
        "-g".to_string(),
        request.result_log.display().to_string(),
        "-o".to_string(),
        request.html_output_dir.display().to_string(),
        format!(
            "-Jjmeter.reportgenerator.exporter.json.property.output_dir={}",
            request.json_output_dir.display()
        ),
        format!(
            "-Jjmeter.reportgenerator.temp_dir={}",
            request.temp_dir.display()
        ),
    ]
}

fn run_engine(task_root: &Path, arguments: &[String]) -> Result<(), String> {
    let home = engine_home(task_root);
    let status = Command::new(engine_binary(&home))
        .args(arguments)
        .env("JMETER_HOME", &home)
        .status()
        .map_err(|error| format!("failed to launch jmeter: {error}"))?;

    if !status.success() {
        return Err(format!("jmeter exited with {status}"));
    }
    Ok(())
}

impl LoadTestEngine for JMeterProcessEngine {
    fn run_test(&self, request: &TestRunRequest) -> Result<(), String> {
        run_engine(&request.task_root, &run_arguments(request))
    }

    fn generate_report(&self, request: &ReportRequest) -> Result<(), String> {
        run_engine(&request.task_root, &report_arguments(request))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn run_arguments_bind_plan_log_and_properties() {
        let request = TestRunRequest {
            test_plan: PathBuf::from("/tmp/checkout.jmx"),
            result_log: PathBuf::from("/tmp/result.jtl"),
            engine_log: PathBuf::from("/tmp/jmeter.log"),
            task_root: PathBuf::from("/var/task"),
            variables: BTreeMap::new(),
        };

        assert_eq!(
            run_arguments(&request),
            vec![
                "-n",
                "-t",
                "/tmp/checkout.jmx",
                "-l",
                "/tmp/result.jtl",
                "-j",
                "/tmp/jmeter.log",
                "-p",
                "/var/task/lib/apache-jmeter-5.4.3/bin/jmeter.properties",
                "-Jsummariser.name=summary",
            ]
        );
    }

    #[test]
    fn run_arguments_forward_every_variable_as_a_property() {
        let request = TestRunRequest {
            test_plan: PathBuf::from("/tmp/checkout.jmx"),
            result_log: PathBuf::from("/tmp/result.jtl"),
            engine_log: PathBuf::from("/tmp/jmeter.log"),
            task_root: PathBuf::from("/var/task"),
            variables: BTreeMap::from([
                ("host".to_string(), "example.com".to_string()),
                ("port".to_string(), "8080".to_string()),
            ]),
        };

        let arguments = run_arguments(&request);
        assert!(arguments.contains(&"-Jhost=example.com".to_string()));
        assert!(arguments.contains(&"-Jport=8080".to_string()));
    }

    #[test]
    fn report_arguments_bind_all_output_directories() {
        let request = ReportRequest {
            result_log: PathBuf::from("/tmp/result.jtl"),
            html_output_dir: PathBuf::from("/tmp/report-html"),
            json_output_dir: PathBuf::from("/tmp/report-json"),
            temp_dir: PathBuf::from("/tmp/report-temp"),
            task_root: PathBuf::from("/var/task"),
        };

        assert_eq!(
            report_arguments(&request),
            vec![
                "-g",
                "/tmp/result.jtl",
                "-o",
                "/tmp/report-html",
                "-Jjmeter.reportgenerator.exporter.json.property.output_dir=/tmp/report-json",
                "-Jjmeter.reportgenerator.temp_dir=/tmp/report-temp",
            ]
        );
    }

    #[test]
    fn engine_home_is_rooted_in_the_deployment_package() {
        assert_eq!(
            engine_home(Path::new("/var/task")),
            PathBuf::from("/var/task/lib/apache-jmeter-5.4.3")
        );
    }
}
