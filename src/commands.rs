use crate::error::{BotError, Result};
use crate::parser::{BotConfig, Properties};
use crate::runner::{Invocation, ProcessRunner};
use crate::utils::log::{log, LogLevel};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Scratch directory for the standalone example, relative to the install path
static EXAMPLE_DIR: &str = "temp_example";
static VALGRIND_RUN_CMD: &str = "valgrind --error-exitcode=1 %s";
/// Minimum line coverage demanded from the coverage job
pub const REQUIRED_LINE_COVERAGE: f64 = 90.0;

/// The commands a CI step can ask for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Configure,
    Build,
    RunTests,
    Install,
    Unknown(String),
}

impl Command {
    pub fn from_name(name: &str) -> Command {
        match name {
            "configure" => Command::Configure,
            "build" => Command::Build,
            "run_tests" => Command::RunTests,
            "install" => Command::Install,
            other => Command::Unknown(other.to_string()),
        }
    }
}

/// Maps commands and properties onto build tool and compiler invocations
pub struct Dispatcher<R: ProcessRunner> {
    config: BotConfig,
    runner: R,
}

impl<R: ProcessRunner> Dispatcher<R> {
    pub fn new(config: BotConfig, runner: R) -> Self {
        Dispatcher { config, runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs one command. Unknown commands are reported and otherwise ignored.
    pub fn dispatch(&mut self, command: &Command, properties: &Properties) -> Result<()> {
        match command {
            Command::Configure => self.configure(properties),
            Command::Build => self.build(),
            Command::RunTests => self.run_tests(properties),
            Command::Install => self.install(properties),
            Command::Unknown(name) => {
                log(LogLevel::Warn, &format!("Unknown command: {}", name));
                Ok(())
            }
        }
    }

    /// Configures the project, `cxx_mkspec` is required
    pub fn configure(&mut self, properties: &Properties) -> Result<()> {
        let mkspec = properties.required_mkspec()?;
        let mut command = self.config.waf_command();

        if properties.flag("build_distclean") {
            command.push("distclean".to_string());
        }
        command.push("configure".to_string());
        command.push("--git_protocol=git@".to_string());

        if let Some(resolve_path) = properties.string("waf_resolve_path")? {
            command.push(format!("--resolve_path={}", resolve_path));
        }
        match (
            properties.string("dependency_project")?,
            properties.string("dependency_checkout")?,
        ) {
            (Some(project), Some(checkout)) => {
                command.push(format!("--{}_checkout={}", project, checkout));
            }
            (Some(project), None) => log(
                LogLevel::Warn,
                &format!("dependency_project '{}' given without dependency_checkout", project),
            ),
            _ => {}
        }
        command.push(format!("--cxx_mkspec={}", mkspec));
        command.extend(properties.tool_option_flags()?);

        self.run_command(Invocation::new(command))
    }

    pub fn build(&mut self) -> Result<()> {
        let mut command = self.config.waf_command();
        command.push("build".to_string());
        command.push("-v".to_string());
        self.run_command(Invocation::new(command))
    }

    /// Runs the unit tests, optionally under valgrind
    pub fn run_tests(&mut self, properties: &Properties) -> Result<()> {
        let mut command = self.config.waf_command();
        command.push("-v".to_string());
        command.push("--run_tests".to_string());

        if properties.flag("valgrind_run") {
            command.push(format!("--run_cmd={}", VALGRIND_RUN_CMD));
        }
        command.extend(properties.tool_option_flags()?);

        self.run_command(Invocation::new(command))
    }

    /// Installs headers and static libs, then checks that the example
    /// builds against them without waf
    pub fn install(&mut self, properties: &Properties) -> Result<()> {
        let mut command = self.config.waf_command();
        command.push("-v".to_string());
        command.push("install".to_string());

        let install_path = properties.string("install_path")?;
        if let Some(install_path) = install_path {
            command.push(format!("--install_path={}", install_path));
            // Remove the previous install folder
            let path = Path::new(install_path);
            if path.is_dir() {
                log(LogLevel::Info, &format!("Removing previous install: {}", install_path));
                fs::remove_dir_all(path)
                    .map_err(|e| BotError::io("Could not remove install directory", path, e))?;
            }
        }
        if properties.flag("install_relative") {
            command.push("--install_relative".to_string());
        }
        command.push("--install_static_libs".to_string());
        self.run_command(Invocation::new(command))?;

        // Static libs built by a cross-compiler target another platform
        let mkspec = properties.string("cxx_mkspec")?.unwrap_or("");
        if !mkspec.starts_with(&self.config.native_mkspec_prefix) {
            log(
                LogLevel::Info,
                &format!("Skipping standalone example for mkspec '{}'", mkspec),
            );
            return Ok(());
        }
        let install_path = install_path.ok_or(BotError::MissingProperty("install_path"))?;
        self.smoke_test(Path::new(install_path))
    }

    /// Compiles the example with the native compiler against the installed
    /// libraries and runs it
    fn smoke_test(&mut self, install_path: &Path) -> Result<()> {
        let example_dir = install_path.join(EXAMPLE_DIR);
        if !example_dir.is_dir() {
            fs::create_dir_all(&example_dir)
                .map_err(|e| BotError::io("Could not create example directory", &example_dir, e))?;
        }
        // The example runs with its own directory as cwd, so its path must not be relative
        let example_dir = fs::canonicalize(&example_dir)
            .map_err(|e| BotError::io("Could not resolve example directory", &example_dir, e))?;
        let source = self.config.example_source()?.to_string();
        let binary = self.config.example_binary()?.to_string();
        fs::copy(&self.config.example, example_dir.join(&source))
            .map_err(|e| BotError::io("Could not copy example source", &self.config.example, e))?;

        let mut command = vec![
            self.config.compiler.clone(),
            source,
            "-o".to_string(),
            binary.clone(),
        ];
        command.extend(
            ["-I../include", "-Wl,-Bstatic", "-L.."]
                .iter()
                .map(|&arg| arg.to_string()),
        );
        command.extend(self.config.static_libs.iter().map(|lib| format!("-l{}", lib)));
        command.push("-Wl,-Bdynamic".to_string());
        command.extend(self.config.dynamic_libs.iter().map(|lib| format!("-l{}", lib)));
        self.run_command(Invocation::new(command).in_dir(&example_dir))?;

        let binary_path: PathBuf = example_dir.join(&binary);
        let run = Invocation::new(vec![binary_path.to_string_lossy().into_owned()]).in_dir(&example_dir);
        self.run_command(run)?;
        log(LogLevel::Log, &format!("Standalone example {} passed", binary));
        Ok(())
    }

    /// Logs and runs one invocation, any unsuccessful exit is an error
    fn run_command(&mut self, invocation: Invocation) -> Result<()> {
        log(LogLevel::Log, &format!("Running: {}", invocation));
        let code = self
            .runner
            .run(&invocation)
            .map_err(|source| BotError::Spawn {
                command: invocation.to_string(),
                source,
            })?;
        match code {
            Some(0) => Ok(()),
            Some(code) => Err(BotError::CommandFailed {
                command: invocation.to_string(),
                status: format!("exit code {}", code),
            }),
            None => Err(BotError::CommandFailed {
                command: invocation.to_string(),
                status: "terminated by signal".to_string(),
            }),
        }
    }
}

/// Fills in the thresholds read by the coverage job
pub fn coverage_settings(options: &mut Map<String, Value>) {
    options.insert(
        "required_line_coverage".to_string(),
        Value::from(REQUIRED_LINE_COVERAGE),
    );
}
