//! External process execution.
//!
//! Every command buildbot issues goes through a [`ProcessRunner`], so the
//! dispatcher can be driven against a fake in tests.

use itertools::Itertools;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// A command line together with the directory it runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub argv: Vec<String>,
    /// `None` runs in the current working directory
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(argv: Vec<String>) -> Self {
        Invocation { argv, cwd: None }
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv.iter().join(" "))
    }
}

/// Runs external processes to completion.
pub trait ProcessRunner {
    /// Runs the invocation and blocks until it exits.
    /// Returns the exit code, or `None` if the process was killed by a signal.
    fn run(&mut self, invocation: &Invocation) -> io::Result<Option<i32>>;
}

/// Spawns real processes that share stdin, stdout and stderr with buildbot
#[derive(Debug, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> io::Result<Option<i32>> {
        let (program, args) = invocation
            .argv
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command line"))?;
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = &invocation.cwd {
            cmd.current_dir(dir);
        }
        let status = cmd.status()?;
        Ok(status.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_argv() {
        let inv = Invocation::new(vec!["python3".into(), "waf".into(), "build".into(), "-v".into()]);
        assert_eq!(inv.to_string(), "python3 waf build -v");
    }

    #[test]
    fn test_empty_command_line() {
        let err = SystemRunner.run(&Invocation::new(Vec::new())).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_exit_codes() {
        let ok = Invocation::new(vec!["sh".into(), "-c".into(), "exit 0".into()]);
        assert_eq!(SystemRunner.run(&ok).unwrap(), Some(0));
        let fail = Invocation::new(vec!["sh".into(), "-c".into(), "exit 3".into()]);
        assert_eq!(SystemRunner.run(&fail).unwrap(), Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let inv = Invocation::new(vec!["sh".into(), "-c".into(), "touch marker".into()])
            .in_dir(dir.path());
        assert_eq!(SystemRunner.run(&inv).unwrap(), Some(0));
        assert!(dir.path().join("marker").exists());
    }
}
