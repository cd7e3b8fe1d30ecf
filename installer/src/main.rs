//! Unity setup entrypoint.
//!
//! This binary provisions the Unity editor for a CI job and publishes the
//! resolved version and editor path back to the workflow.

use clap::Parser;
use std::io::Write;
use tracing_subscriber::EnvFilter;
use unity_setup::cli::Cli;
use unity_setup::dirs::SystemBaseDirs;
use unity_setup::download::HttpDownloader;
use unity_setup::error::Result;
use unity_setup::github::{ActionEnvironment, error_command};
use unity_setup::runner::SystemCommandRunner;
use unity_setup::setup::{
    SetupContext, SetupOutcome, default_download_dir, plan_setup, run_setup,
};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut stdout = std::io::stdout();
    let run_result = run(&cli, &mut stdout);
    let exit_code = exit_code_for_run_result(run_result, &mut stdout);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Installs the log backend. `RUST_LOG` applies unless verbose is requested.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: &Cli, stdout: &mut dyn Write) -> Result<()> {
    let request = cli.setup_request();
    let runner = SystemCommandRunner;
    let downloader = HttpDownloader::default();
    let context = SetupContext {
        runner: &runner,
        downloader: &downloader,
        dirs: &SystemBaseDirs,
        download_dir: default_download_dir()?,
    };

    if cli.dry_run {
        let plan = plan_setup(&request, std::env::consts::OS, &context)?;
        write_line(stdout, plan);
        return Ok(());
    }

    let outcome = run_setup(&request, std::env::consts::OS, &context)?;
    publish_outcome(&ActionEnvironment::from_env(), &outcome)
}

/// Hands the installed version and editor path to later workflow steps.
fn publish_outcome(action: &ActionEnvironment, outcome: &SetupOutcome) -> Result<()> {
    let editor_path = outcome.editor_path.as_str();
    action.set_output("unity-version", &outcome.version)?;
    action.set_output("unity-path", editor_path)?;
    action.export_variable("UNITY_PATH", editor_path)?;
    action.export_variable("UNITY_VERSION", &outcome.version)?;
    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stdout: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_line(stdout, error_command(&err.to_string()));
            1
        }
    }
}

fn write_line(out: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(out, "{message}").is_err() {
        // Best-effort output; ignore write failures.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use unity_setup::error::SetupError;

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stdout = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stdout);
        assert_eq!(exit_code, 0);
        assert!(stdout.is_empty());
    }

    #[test]
    fn exit_code_for_run_result_reports_error_annotation() {
        let err = SetupError::ProjectNotFound {
            path: Utf8PathBuf::from("game/ProjectSettings/ProjectVersion.txt"),
        };

        let mut stdout = Vec::new();
        let exit_code = exit_code_for_run_result(Err(err), &mut stdout);
        assert_eq!(exit_code, 1);

        let text = String::from_utf8(stdout).expect("stdout was not UTF-8");
        assert_eq!(
            text,
            "::error::project not found at path: game/ProjectSettings/ProjectVersion.txt\n"
        );
    }

    #[test]
    fn publish_outcome_writes_outputs_and_exports() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("UTF-8 temp dir");
        let action = ActionEnvironment::new(Some(root.join("output")), Some(root.join("env")));
        let outcome = SetupOutcome {
            version: "2022.3.10f1".to_owned(),
            editor_path: Utf8PathBuf::from("/opt/unity/Editor/Unity"),
        };

        publish_outcome(&action, &outcome).expect("publish outcome");

        let outputs = std::fs::read_to_string(root.join("output")).expect("read outputs");
        let env = std::fs::read_to_string(root.join("env")).expect("read env");
        assert_eq!(
            outputs,
            "unity-version=2022.3.10f1\nunity-path=/opt/unity/Editor/Unity\n"
        );
        assert_eq!(
            env,
            "UNITY_PATH=/opt/unity/Editor/Unity\nUNITY_VERSION=2022.3.10f1\n"
        );
    }
}
