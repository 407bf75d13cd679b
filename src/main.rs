use buildbot::commands::{Command, Dispatcher};
use buildbot::error::Result;
use buildbot::parser::{self, Properties};
use buildbot::runner::SystemRunner;
use buildbot::utils::env;
use buildbot::utils::log::{log, LogLevel};
use clap::error::ErrorKind;
use clap::Parser;
use std::path::Path;

#[derive(Parser, Debug)]
#[command(name = "buildbot", version, about = "Drives waf through the CI build steps")]
struct Cli {
    /// One of configure, build, run_tests or install
    #[arg(allow_hyphen_values = true)]
    command: String,

    /// JSON object holding the build properties
    properties: String,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => {
            // A wrong argument count is not an error for the CI job
            let program = std::env::args().next().unwrap_or_else(|| "buildbot".to_string());
            println!("Usage: {} <command> <properties>", program);
            std::process::exit(0);
        }
    };

    if let Err(e) = run(&cli) {
        log(LogLevel::Error, &e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let properties = Properties::parse(&cli.properties)?;
    let command = Command::from_name(&cli.command);

    let mut config = parser::parse_config(Path::new(parser::CONFIG_FILE))?;
    env::config_env(&mut config);

    let mut dispatcher = Dispatcher::new(config, SystemRunner);
    dispatcher.dispatch(&command, &properties)
}
