//! A library for driving waf based C projects through CI.
//!
//! Each CI step calls the `buildbot` binary with a command name and a JSON
//! properties bag. The library turns those into waf invocations and, after
//! install, compiles a standalone example against the installed static libs.
//!
//! Tool paths can be adjusted in an optional buildbot.toml file.
//!

/// Contains the CI commands and the dispatcher
pub mod commands;
/// Error types
pub mod error;
/// Contains parse related functions
pub mod parser;
/// Contains external process execution
pub mod runner;
/// Contains logger and environment config
pub mod utils;
