//! Process execution for installer and hub commands.
//!
//! Commands are described as an explicit [`Invocation`] rather than a shell
//! string, and every run yields a [`CommandResult`]. Callers that cannot trust
//! exit codes (the hub tool) opt into [`RunOptions::tolerant`] and decide
//! success from the captured text with [`CommandResult::satisfies`].

use crate::error::{Result, SetupError};
use log::{debug, info};
use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::thread;

/// Program used to elevate privileges.
const ELEVATION_PROGRAM: &str = "sudo";

/// A program together with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
}

impl Invocation {
    /// Create an invocation of `program` with no arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// use unity_setup::runner::Invocation;
    ///
    /// let invocation = Invocation::new("chmod").arg("-R").arg("o+rwx").arg("/opt/unity");
    /// assert_eq!(invocation.to_string(), "chmod -R o+rwx /opt/unity");
    /// ```
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The program to execute.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The arguments passed to the program.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Wrap this invocation so it runs through the elevation program.
    #[must_use]
    pub fn elevated(self) -> Self {
        Self::new(ELEVATION_PROGRAM)
            .arg(self.program)
            .args(self.args)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(text: &str) -> String {
    if text.contains(char::is_whitespace) {
        format!("\"{text}\"")
    } else {
        text.to_owned()
    }
}

/// How a command should be run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Run through `sudo`.
    pub elevate: bool,
    /// Treat a non-zero exit code as a normal outcome.
    pub ignore_return_code: bool,
}

impl RunOptions {
    /// Options that elevate when `elevate` is true and fail on non-zero exit.
    #[must_use]
    pub fn elevated_if(elevate: bool) -> Self {
        Self {
            elevate,
            ignore_return_code: false,
        }
    }

    /// Options that never fail on exit status.
    #[must_use]
    pub fn tolerant() -> Self {
        Self {
            elevate: false,
            ignore_return_code: true,
        }
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    /// Captured standard output.
    pub stdout: String,
    /// Exit code, or `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl CommandResult {
    /// Build a result from captured stdout and an exit code.
    #[must_use]
    pub fn new(stdout: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stdout: stdout.into(),
            exit_code: Some(exit_code),
        }
    }

    /// Decide success by applying `predicate` to the captured stdout.
    ///
    /// # Examples
    ///
    /// ```
    /// use unity_setup::runner::CommandResult;
    ///
    /// let result = CommandResult::new("modules installed successfully", 1);
    /// assert!(result.satisfies(|out| out.contains("successfully")));
    /// ```
    #[must_use]
    pub fn satisfies(&self, predicate: impl Fn(&str) -> bool) -> bool {
        predicate(&self.stdout)
    }
}

/// Abstraction for running external commands.
pub trait CommandRunner {
    /// Run `invocation` and capture its standard output.
    ///
    /// # Errors
    ///
    /// Returns an error when the process cannot be spawned, or when it exits
    /// unsuccessfully and `options.ignore_return_code` is false.
    fn run(&self, invocation: &Invocation, options: RunOptions) -> Result<CommandResult>;
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, invocation: &Invocation, options: RunOptions) -> Result<CommandResult> {
        let invocation = if options.elevate {
            invocation.clone().elevated()
        } else {
            invocation.clone()
        };
        info!("[command]{invocation}");

        let mut child = Command::new(invocation.program())
            .args(invocation.arguments())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                if let Err(err) = stderr.read_to_end(&mut buf) {
                    debug!("stderr unreadable: {err}");
                }
                buf
            })
        });
        let stdout = match child.stdout.take() {
            Some(stdout) => stream_lines(stdout)?,
            None => String::new(),
        };
        let status = child.wait()?;
        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();
        for line in String::from_utf8_lossy(&stderr).lines() {
            debug!("{line}");
        }

        if !status.success() && !options.ignore_return_code {
            return Err(SetupError::CommandFailed {
                command: invocation.to_string(),
                code: status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&stderr).trim().to_owned(),
            });
        }

        Ok(CommandResult {
            stdout,
            exit_code: status.code(),
        })
    }
}

/// Log each line of `output` as it arrives and return everything read.
fn stream_lines(output: impl Read) -> Result<String> {
    let mut captured = String::new();
    for line in BufReader::new(output).split(b'\n') {
        let line = line?;
        let text = String::from_utf8_lossy(&line);
        let text = text.trim_end_matches('\r');
        info!("{text}");
        captured.push_str(text);
        captured.push('\n');
    }
    Ok(captured)
}
