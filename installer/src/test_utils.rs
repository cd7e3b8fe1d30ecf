//! Shared test utilities for the setup crate.

use crate::error::{Result, SetupError};
use crate::runner::{CommandResult, CommandRunner, Invocation, RunOptions};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The invocation the runner should receive.
    pub invocation: Invocation,
    /// The options the runner should receive.
    pub options: RunOptions,
    /// The result to return when this command is invoked.
    pub result: Result<CommandResult>,
}

impl ExpectedCall {
    /// Expect `invocation` and answer with `stdout` and exit code zero.
    #[must_use]
    pub fn ok(invocation: Invocation, options: RunOptions, stdout: &str) -> Self {
        Self {
            invocation,
            options,
            result: Ok(CommandResult::new(stdout, 0)),
        }
    }

    /// Expect `invocation` and answer with the given result.
    #[must_use]
    pub fn returning(
        invocation: Invocation,
        options: RunOptions,
        result: Result<CommandResult>,
    ) -> Self {
        Self {
            invocation,
            options,
            result,
        }
    }
}

/// A stub implementation of [`CommandRunner`] for testing.
///
/// Replays expected command invocations in order. A call that does not match
/// the next expectation yields [`SetupError::StubMismatch`].
#[derive(Debug, Default)]
pub struct StubRunner {
    expected: RefCell<VecDeque<ExpectedCall>>,
    received: RefCell<Vec<Invocation>>,
}

impl StubRunner {
    /// Creates a new `StubRunner` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
            received: RefCell::new(Vec::new()),
        }
    }

    /// Invocations received so far, in order.
    #[must_use]
    pub fn received(&self) -> Vec<Invocation> {
        self.received.borrow().clone()
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        let remaining: Vec<String> = self
            .expected
            .borrow()
            .iter()
            .map(|call| call.invocation.to_string())
            .collect();
        assert!(
            remaining.is_empty(),
            "expected further command invocations: {remaining:?}"
        );
    }
}

impl CommandRunner for StubRunner {
    fn run(&self, invocation: &Invocation, options: RunOptions) -> Result<CommandResult> {
        self.received.borrow_mut().push(invocation.clone());
        let Some(call) = self.expected.borrow_mut().pop_front() else {
            return Err(SetupError::StubMismatch {
                message: format!("unexpected command invocation: {invocation}"),
            });
        };

        if call.invocation != *invocation || call.options != options {
            return Err(SetupError::StubMismatch {
                message: format!(
                    "expected `{}` with {:?}, received `{invocation}` with {options:?}",
                    call.invocation, call.options
                ),
            });
        }

        call.result
    }
}
