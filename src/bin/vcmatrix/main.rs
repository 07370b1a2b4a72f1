//! vcmatrix CLI - drive MSBuild across a platform/configuration matrix

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::Session;
use vcmatrix::core::ManifestError;

/// Exit status for failed phases.
const EXIT_FAILURE: i32 = 1;

/// Exit status for problems found before anything ran.
const EXIT_CONFIG: i32 = 2;

fn main() {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("vcmatrix=debug")
    } else if cli.quiet {
        EnvFilter::new("vcmatrix=error")
    } else {
        EnvFilter::new("vcmatrix=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let mut session = Session::from_cli(&cli);

    // Execute command
    let result = match cli.command {
        Commands::Build => commands::build::build(&mut session),
        Commands::Clean => commands::build::clean(&mut session),
        Commands::Testbuild => commands::build::test_build(&mut session),
        Commands::Testgen => commands::check::testgen(&mut session),
        Commands::Test => commands::check::test(&mut session),
        Commands::Cppcheck => commands::check::cppcheck(&mut session),
        Commands::Vera => commands::check::vera(&mut session),
        Commands::Check => commands::check::check(&mut session),
        Commands::Sonar(args) => commands::sonar::execute(&mut session, args),
        Commands::Completions(args) => commands::completions::execute(args),
    };

    if let Err(e) = result {
        std::process::exit(report(&session, &e));
    }
}

/// Print `e` and pick the exit status.
fn report(session: &Session, e: &anyhow::Error) -> i32 {
    if let Some(error) = e.downcast_ref::<vcmatrix::Error>() {
        session.shell.diagnostic(&error.to_diagnostic());
        return if error.is_configuration() {
            EXIT_CONFIG
        } else {
            EXIT_FAILURE
        };
    }

    if let Some(error) = e.downcast_ref::<ManifestError>() {
        session.shell.diagnostic(&error.to_diagnostic());
        return EXIT_CONFIG;
    }

    let diag = vcmatrix::util::Diagnostic::error(format!("{:#}", e));
    session.shell.diagnostic(&diag);
    if e.downcast_ref::<toml::de::Error>().is_some() {
        EXIT_CONFIG
    } else {
        EXIT_FAILURE
    }
}
