//! GitHub Actions runner integration.
//!
//! Outputs and exported variables are handed back to the workflow by
//! appending records to the files named in `GITHUB_OUTPUT` and `GITHUB_ENV`.
//! Failures are reported with the `::error::` workflow command.

use crate::error::{Result, SetupError};
use camino::{Utf8Path, Utf8PathBuf};
use log::warn;
use std::fs::OpenOptions;
use std::io::Write;

/// Variable naming the step output file.
pub const OUTPUT_FILE_VAR: &str = "GITHUB_OUTPUT";

/// Variable naming the exported environment file.
pub const ENV_FILE_VAR: &str = "GITHUB_ENV";

/// Delimiter stem for multiline records.
const HEREDOC_DELIMITER: &str = "UNITY_SETUP_EOF";

/// Handles to the runner's output and environment files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionEnvironment {
    output_file: Option<Utf8PathBuf>,
    env_file: Option<Utf8PathBuf>,
}

impl ActionEnvironment {
    /// Create an environment writing to explicit files.
    #[must_use]
    pub fn new(output_file: Option<Utf8PathBuf>, env_file: Option<Utf8PathBuf>) -> Self {
        Self {
            output_file,
            env_file,
        }
    }

    /// Read the file locations from the process environment.
    ///
    /// Unset or blank variables leave the corresponding file absent, which is
    /// the normal state outside a workflow run.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(file_from_env(OUTPUT_FILE_VAR), file_from_env(ENV_FILE_VAR))
    }

    /// Set a step output.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::ActionOutput`] when the output file cannot be
    /// appended to.
    pub fn set_output(&self, name: &str, value: &str) -> Result<()> {
        append_record(self.output_file.as_deref(), OUTPUT_FILE_VAR, name, value)
    }

    /// Export an environment variable to later workflow steps.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::ActionOutput`] when the environment file cannot
    /// be appended to.
    pub fn export_variable(&self, name: &str, value: &str) -> Result<()> {
        append_record(self.env_file.as_deref(), ENV_FILE_VAR, name, value)
    }
}

fn file_from_env(var: &str) -> Option<Utf8PathBuf> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(Utf8PathBuf::from)
}

fn append_record(file: Option<&Utf8Path>, var: &str, name: &str, value: &str) -> Result<()> {
    let Some(path) = file else {
        warn!("{var} is not set; skipping {name}={value}");
        return Ok(());
    };

    let record = format_record(name, value);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| file.write_all(record.as_bytes()))
        .map_err(|source| SetupError::ActionOutput {
            path: path.to_owned(),
            source,
        })
}

/// Render one `name=value` record, switching to the delimited form when the
/// value spans several lines.
///
/// # Examples
///
/// ```
/// use unity_setup::github::format_record;
///
/// assert_eq!(format_record("unity-version", "2022.3.10f1"), "unity-version=2022.3.10f1\n");
/// assert!(format_record("notes", "a\nb").starts_with("notes<<"));
/// ```
#[must_use]
pub fn format_record(name: &str, value: &str) -> String {
    if !value.contains('\n') && !value.contains('\r') {
        return format!("{name}={value}\n");
    }

    let mut delimiter = HEREDOC_DELIMITER.to_owned();
    while value.contains(&delimiter) {
        delimiter.push('_');
    }
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
}

/// Render a failure message as an `::error::` workflow command.
///
/// # Examples
///
/// ```
/// use unity_setup::github::error_command;
///
/// assert_eq!(error_command("boom\nagain"), "::error::boom%0Aagain");
/// ```
#[must_use]
pub fn error_command(message: &str) -> String {
    let escaped = message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::error::{escaped}")
}
