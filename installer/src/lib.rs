//! Unity setup library.
//!
//! This crate provisions a Unity editor on CI runners: it resolves the editor
//! version and changeset, installs Unity Hub when missing, installs the editor
//! through the hub, and adds optional modules. It backs the `unity-setup`
//! binary and can be driven programmatically with stubbed collaborators for
//! testing.
//!
//! # Modules
//!
//! - [`cli`] - Command-line and action input definitions
//! - [`dirs`] - Home directory resolution abstraction
//! - [`download`] - HTTP downloads with retry
//! - [`editor`] - Editor discovery and installation through the hub
//! - [`error`] - Semantic error types
//! - [`github`] - Step outputs, exported variables, and error annotations
//! - [`hub`] - Unity Hub installation and headless invocation
//! - [`modules`] - Optional module installation
//! - [`parser`] - Parsers for hub listings, release pages, and version files
//! - [`platform`] - Per-platform paths, URLs, and command wrappers
//! - [`resolver`] - Version and changeset resolution
//! - [`runner`] - External command execution
//! - [`setup`] - End-to-end provisioning run
//! - [`version`] - Version specs and release channels

pub mod cli;
pub mod dirs;
pub mod download;
pub mod editor;
pub mod error;
pub mod github;
pub mod hub;
pub mod modules;
pub mod parser;
pub mod platform;
pub mod resolver;
pub mod runner;
pub mod setup;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod version;
