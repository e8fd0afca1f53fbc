use std::path::{Path, PathBuf};

/// Scratch root used by the deployed function. Tests substitute their own.
pub const DEFAULT_SCRATCH_ROOT: &str = "/tmp";

/// Input files live under a fixed `tests/` segment below the configured
/// base path.
pub fn test_object_key(base_path: &str, file_name: &str) -> String {
    let trimmed = base_path.trim_matches('/');
    format!("{trimmed}/tests/{file_name}")
}

/// Upload key for one report artifact, keyed by its path relative to the
/// uploaded directory.
pub fn report_file_key(base_path: &str, relative_path: &str) -> String {
    let trimmed = base_path.trim_matches('/');
    format!("{trimmed}/{relative_path}")
}

/// The invocation-local scratch namespace. Every path is derived from one
/// root so concurrent invocations never share files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchPaths {
    root: PathBuf,
}

impl ScratchPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn staged_file(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    pub fn result_log(&self) -> PathBuf {
        self.root.join("result.jtl")
    }

    pub fn engine_log(&self) -> PathBuf {
        self.root.join("jmeter.log")
    }

    pub fn html_report_dir(&self) -> PathBuf {
        self.root.join("report-html")
    }

    pub fn json_report_dir(&self) -> PathBuf {
        self.root.join("report-json")
    }

    pub fn temp_report_dir(&self) -> PathBuf {
        self.root.join("report-temp")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_trims_surrounding_slashes() {
        assert_eq!(
            test_object_key("/gate/loadtest/", "checkout.jmx"),
            "gate/loadtest/tests/checkout.jmx"
        );
        assert_eq!(
            test_object_key("gate", "users.csv"),
            "gate/tests/users.csv"
        );
    }

    #[test]
    fn report_file_key_preserves_nested_paths() {
        assert_eq!(
            report_file_key("/gate/loadtest", "content/css/dashboard.css"),
            "gate/loadtest/content/css/dashboard.css"
        );
    }

    #[test]
    fn scratch_paths_stay_under_one_root() {
        let scratch = ScratchPaths::new("/tmp");

        assert_eq!(scratch.result_log(), PathBuf::from("/tmp/result.jtl"));
        assert_eq!(scratch.engine_log(), PathBuf::from("/tmp/jmeter.log"));
        assert_eq!(
            scratch.staged_file("checkout.jmx"),
            PathBuf::from("/tmp/checkout.jmx")
        );
        assert_eq!(
            scratch.html_report_dir(),
            PathBuf::from("/tmp/report-html")
        );
        assert_eq!(
            scratch.json_report_dir(),
            PathBuf::from("/tmp/report-json")
        );
        assert_eq!(
            scratch.temp_report_dir(),
            PathBuf::from("/tmp/report-temp")
        );
    }

    #[test]
    fn identical_inputs_build_identical_keys() {
        assert_eq!(
            test_object_key("gate/loadtest", "checkout.jmx"),
            test_object_key("gate/loadtest", "checkout.jmx"),
        );
    }
}
